//! # Scene Files
//!
//! Scenes are saved as YAML with the settings first, then `objects` and
//! `blueprints`. Numeric vectors are written as flow sequences:
//!
//! ```yaml
//! backgroundColor: [0.1, 0.1, 0.1]
//! ambientColor: [1.0, 1.0, 1.0]
//! ambientIntensity: 0.1
//! vsync: true
//! objects:
//! - name: Lamp
//!   components:
//!   - name: Transform
//!     position: [0.0, 2.0, 0.0]
//!     rotation: [0.0, 0.0, 0.0, 1.0]
//!     scale: [1.0, 1.0, 1.0]
//!   - name: Light
//!     type: 0
//!     linearAttenuation: 0.09
//!     quadAttenuation: 0.032
//!     color: [1.0, 0.9, 0.8]
//!   children: []
//! blueprints: []
//! ```
//!
//! Loading builds the complete forest aside and swaps it in only once every
//! object and component has been read; any failure leaves the running scene
//! as it was.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::{
    error::{LoadError, SaveError, SceneError},
    gfx::resources::Resources,
};

use super::{
    component::ComponentRegistry,
    object::{Object, ObjectId, ObjectIds},
    scene::{Scene, SceneSettings},
};

/// File used when no other is given
pub const DEFAULT_SCENE_FILE: &str = "my.scene";

#[derive(Serialize, Deserialize)]
struct SceneDocument {
    #[serde(flatten)]
    settings: SceneSettings,
    objects: Vec<Value>,
    #[serde(default)]
    blueprints: Vec<Value>,
}

impl Scene {
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        let document = SceneDocument {
            settings: self.settings.clone(),
            objects: self
                .objects
                .iter()
                .map(|o| write_object(o, &self.blueprints))
                .collect(),
            blueprints: self
                .blueprints
                .iter()
                .map(|o| write_object(o, &[]))
                .collect(),
        };
        serde_yaml::to_string(&document).map(|text| flow_vectors(&text))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SaveError> {
        let path = path.as_ref();
        let text = self.to_yaml()?;
        fs::write(path, text).map_err(|source| SaveError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!(
            "saved {} objects and {} blueprints to {}",
            self.objects.len(),
            self.blueprints.len(),
            path.display()
        );
        Ok(())
    }

    /// Replaces the forest, blueprints and settings with those in `text`
    pub fn load_yaml(&mut self, text: &str) -> Result<(), LoadError> {
        let document: SceneDocument = serde_yaml::from_str(text)?;
        let mut reader = Reader {
            registry: self.registry(),
            resources: &self.resources,
            ids: self.ids().clone(),
        };

        let mut blueprints = Vec::with_capacity(document.blueprints.len());
        for value in &document.blueprints {
            blueprints.push(reader.object(value, &[])?);
        }
        let blueprint_ids: Vec<ObjectId> = blueprints.iter().map(Object::id).collect();

        let mut objects = Vec::with_capacity(document.objects.len());
        for value in &document.objects {
            objects.push(reader.object(value, &blueprint_ids)?);
        }

        let ids = reader.ids;
        *self.ids_mut() = ids;
        self.replace_contents(objects, blueprints, document.settings);
        Ok(())
    }

    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<(), LoadError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.load_yaml(&text)?;
        log::info!(
            "loaded {} objects and {} blueprints from {}",
            self.objects.len(),
            self.blueprints.len(),
            path.display()
        );
        Ok(())
    }
}

fn write_object(object: &Object, blueprints: &[Object]) -> Value {
    let mut map = Mapping::new();
    map.insert("name".into(), object.name.as_str().into());
    map.insert(
        "components".into(),
        Value::Sequence(
            object
                .components()
                .iter()
                .map(|c| Value::Mapping(c.serialise()))
                .collect(),
        ),
    );
    map.insert(
        "children".into(),
        Value::Sequence(
            object
                .children()
                .iter()
                .map(|c| write_object(c, blueprints))
                .collect(),
        ),
    );
    let link = object
        .blueprint
        .and_then(|id| blueprints.iter().position(|b| b.id() == id));
    if let Some(index) = link {
        map.insert("blueprint".into(), (index as u64).into());
    }
    Value::Mapping(map)
}

/// Rewrites block sequences of plain numbers as `[a, b, c]`
///
/// The emitter only writes block style. A sequence under `key:` has its items
/// at the key's own column, so they are found by that prefix; sequences with
/// any non-numeric item are left alone.
fn flow_vectors(yaml: &str) -> String {
    let lines: Vec<&str> = yaml.lines().collect();
    let mut out = String::with_capacity(yaml.len());
    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        i += 1;

        if let Some(key) = line.strip_suffix(':') {
            let column = key.len() - key.trim_start_matches([' ', '-']).len();
            let prefix = format!("{}- ", " ".repeat(column));
            let items: Vec<&str> = lines[i..]
                .iter()
                .map_while(|l| l.strip_prefix(prefix.as_str()))
                .collect();
            if !items.is_empty() && items.iter().all(|v| v.parse::<f64>().is_ok()) {
                out.push_str(line);
                out.push_str(" [");
                out.push_str(&items.join(", "));
                out.push_str("]\n");
                i += items.len();
                continue;
            }
        }

        out.push_str(line);
        out.push('\n');
    }
    out
}

struct Reader<'a> {
    registry: &'a ComponentRegistry,
    resources: &'a Resources,
    ids: ObjectIds,
}

impl Reader<'_> {
    fn object(&mut self, value: &Value, blueprint_ids: &[ObjectId]) -> Result<Object, LoadError> {
        let map = value.as_mapping().ok_or_else(|| LoadError::InvalidObject {
            object: "<unnamed>".to_string(),
            reason: "expected a mapping".to_string(),
        })?;
        let name = map
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| LoadError::InvalidObject {
                object: "<unnamed>".to_string(),
                reason: "missing a string 'name'".to_string(),
            })?;
        let invalid = |reason: &str| LoadError::InvalidObject {
            object: name.to_string(),
            reason: reason.to_string(),
        };

        let mut object = Object::new(self.ids.allocate(), name);

        let components = map
            .get("components")
            .and_then(Value::as_sequence)
            .ok_or_else(|| invalid("missing a 'components' sequence"))?;
        for record in components {
            let record = record
                .as_mapping()
                .ok_or_else(|| invalid("component records must be mappings"))?;
            let kind = record
                .get("name")
                .and_then(Value::as_str)
                .ok_or_else(|| LoadError::MissingField {
                    component: "<component>".to_string(),
                    field: "name",
                })?;
            let mut component = self
                .registry
                .create(kind, object.id())
                .ok_or_else(|| LoadError::UnknownComponent(kind.to_string()))?;
            component.deserialise(record, self.resources)?;
            object.add_component(component).map_err(|e| match e {
                SceneError::DuplicateComponent(component) => LoadError::DuplicateComponent {
                    object: name.to_string(),
                    component,
                },
                other => invalid(&other.to_string()),
            })?;
        }

        let children = map
            .get("children")
            .and_then(Value::as_sequence)
            .ok_or_else(|| invalid("missing a 'children' sequence"))?;
        for child in children {
            let child = self.object(child, blueprint_ids)?;
            object.add_child(child);
        }

        if let Some(link) = map.get("blueprint") {
            let index = link
                .as_u64()
                .ok_or_else(|| invalid("'blueprint' must be an index"))?;
            let id = blueprint_ids
                .get(index as usize)
                .ok_or_else(|| invalid(&format!("no blueprint at index {}", index)))?;
            object.blueprint = Some(*id);
        }

        Ok(object)
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use cgmath::{Deg, Quaternion, Rotation3, Vector3};

    use super::*;
    use crate::{
        gfx::resources::Texture,
        scene::component::Component,
        scene::components::{
            light::Light, Bob, Camera, CubeRenderer, MeshRenderer, RenderMode, Spin, Transform,
        },
    };

    fn sample_scene() -> Scene {
        let mut scene = Scene::new();
        scene
            .resources
            .textures
            .push(Rc::new(Texture::from_rgba("bricks", 1, 1, vec![200; 4])));
        scene.settings.background_color = [0.1, 0.2, 0.3];
        scene.settings.ambient_intensity = 0.25;
        scene.settings.vsync = false;

        let lamp = scene.create_object("Lamp");
        {
            let object = scene.find_mut(lamp).unwrap();
            let transform = object.get_component_mut::<Transform>().unwrap();
            transform.position = Vector3::new(1.0, 2.0, 3.0);
            transform.rotation = Quaternion::from_angle_y(Deg(45.0));
            let mut light = Light::directional(lamp);
            light.color = Vector3::new(1.0, 0.9, 0.8);
            light.linear_attenuation = 0.09;
            light.quad_attenuation = 0.032;
            object.add_component(Box::new(light)).unwrap();
            object.add_component(Box::new(Spin::new(lamp))).unwrap();
            object.add_component(Box::new(Bob::new(lamp))).unwrap();
        }

        let crate_box = scene.create_child(lamp, "Crate").unwrap();
        {
            let texture = scene.resources.texture("bricks").cloned();
            let object = scene.find_mut(crate_box).unwrap();
            let mut cube = CubeRenderer::new(crate_box);
            cube.material.mode = RenderMode::TexMap;
            cube.material.diffuse_texture = texture;
            cube.material.shininess = 8.0;
            object.add_component(Box::new(cube)).unwrap();
        }

        let eye = scene.create_object("Eye");
        scene.add_component(eye, Camera::NAME).unwrap();
        let index = scene.make_blueprint(crate_box).unwrap();
        scene.instantiate_blueprint(index).unwrap();
        scene
    }

    #[test]
    fn test_save_then_load_reproduces_the_scene() {
        let scene = sample_scene();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_SCENE_FILE);
        scene.save(&path).unwrap();

        let mut loaded = Scene::new();
        loaded.resources.textures = scene.resources.textures.clone();
        loaded.load(&path).unwrap();

        assert_eq!(loaded.settings, scene.settings);
        assert_eq!(loaded.objects.len(), scene.objects.len());
        assert_eq!(loaded.blueprints.len(), 1);
        assert_eq!(loaded.to_yaml().unwrap(), scene.to_yaml().unwrap());

        let lamp = &loaded.objects[0];
        assert_eq!(lamp.name, "Lamp");
        let light = lamp.get_component::<Light>().unwrap();
        assert_eq!(light.owner(), lamp.id());
        assert_eq!(light.color, Vector3::new(1.0, 0.9, 0.8));

        let cube = lamp.children()[0].get_component::<CubeRenderer>().unwrap();
        assert!(Rc::ptr_eq(
            cube.material.diffuse_texture.as_ref().unwrap(),
            &loaded.resources.textures[0]
        ));

        let instance = loaded.objects.last().unwrap();
        assert_eq!(instance.blueprint, Some(loaded.blueprints[0].id()));
    }

    #[test]
    fn test_top_level_keys_are_ordered() {
        let text = sample_scene().to_yaml().unwrap();
        let keys: Vec<usize> = [
            "backgroundColor:",
            "ambientColor:",
            "ambientIntensity:",
            "vsync:",
            "objects:",
            "blueprints:",
        ]
        .iter()
        .map(|key| text.find(key).unwrap())
        .collect();
        assert!(keys.windows(2).all(|w| w[0] < w[1]), "{}", text);
    }

    fn assert_load_fails_untouched(text: &str, check: impl Fn(&LoadError) -> bool) {
        let mut scene = sample_scene();
        let before = scene.to_yaml().unwrap();
        let err = scene.load_yaml(text).unwrap_err();
        assert!(check(&err), "unexpected error: {}", err);
        assert_eq!(scene.to_yaml().unwrap(), before);
    }

    const HEADER: &str = "backgroundColor: [0, 0, 0]\nambientColor: [1, 1, 1]\nambientIntensity: 0\nvsync: true\n";

    #[test]
    fn test_unknown_component_aborts_load() {
        let text = format!(
            "{}objects:\n  - name: Ghost\n    components:\n      - name: Teleporter\n    children: []\n",
            HEADER
        );
        assert_load_fails_untouched(&text, |e| {
            matches!(e, LoadError::UnknownComponent(kind) if kind == "Teleporter")
        });
    }

    #[test]
    fn test_missing_field_aborts_load() {
        let text = format!(
            "{}objects:\n  - name: Ok\n    components: []\n    children: []\n  - name: Lamp\n    components:\n      - name: Light\n        type: 0\n        linearAttenuation: 0.1\n        color: [1, 1, 1]\n    children: []\n",
            HEADER
        );
        assert_load_fails_untouched(&text, |e| {
            matches!(e, LoadError::MissingField { field: "quadAttenuation", .. })
        });
    }

    #[test]
    fn test_out_of_range_light_type_aborts_load() {
        let text = format!(
            "{}objects:\n  - name: Lamp\n    components: []\n    children:\n      - name: Bulb\n        components:\n          - name: Light\n            type: 2\n            linearAttenuation: 0\n            quadAttenuation: 0\n            color: [1, 1, 1]\n        children: []\n",
            HEADER
        );
        assert_load_fails_untouched(&text, |e| {
            matches!(e, LoadError::InvalidField { field: "type", .. })
        });
    }

    #[test]
    fn test_duplicate_transform_aborts_load() {
        let transform = "      - name: Transform\n        position: [0, 0, 0]\n        rotation: [0, 0, 0, 1]\n        scale: [1, 1, 1]\n";
        let text = format!(
            "{}objects:\n  - name: Twice\n    components:\n{}{}    children: []\n",
            HEADER, transform, transform
        );
        assert_load_fails_untouched(&text, |e| matches!(e, LoadError::DuplicateComponent { .. }));
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let mut scene = Scene::new();
        let dir = tempfile::tempdir().unwrap();
        let err = scene.load(dir.path().join("absent.scene")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn test_mesh_renderer_without_mesh_round_trips() {
        let mut scene = Scene::new();
        let id = scene.create_object("Statue");
        scene.add_component(id, MeshRenderer::NAME).unwrap();

        let text = scene.to_yaml().unwrap();
        assert!(!text.contains("mesh:"));
        let mut loaded = Scene::new();
        loaded.load_yaml(&text).unwrap();
        assert!(loaded.objects[0].get_component::<MeshRenderer>().unwrap().mesh.is_none());
    }

    #[test]
    fn test_vectors_are_written_inline() {
        let text = sample_scene().to_yaml().unwrap();
        assert!(text.starts_with("backgroundColor: [0.1, 0.2, 0.3]\n"), "{}", text);
        assert!(text.contains("    position: [1.0, 2.0, 3.0]\n"), "{}", text);
        assert!(text.contains("    color: [1.0, 0.9, 0.8]\n"), "{}", text);
        assert!(text.contains("  children: []\n"), "{}", text);

        let block_items = text
            .lines()
            .filter_map(|l| l.trim_start().strip_prefix("- "))
            .filter(|v| v.parse::<f64>().is_ok())
            .count();
        assert_eq!(block_items, 0, "{}", text);
    }

    #[test]
    fn test_flow_vectors_leaves_other_sequences_alone() {
        let block = "a:\n- 1.0\n- -2.5\nb:\n- x\n- 1.0\nc:\n  d:\n  - 3\n  - name: e\n";
        assert_eq!(
            flow_vectors(block),
            "a: [1.0, -2.5]\nb:\n- x\n- 1.0\nc:\n  d:\n  - 3\n  - name: e\n"
        );
    }
}

