//! # Scene
//!
//! The [`Scene`] owns everything the editor shows: the object forest, the
//! resource pools, blueprints and the scene-wide settings. It drives the three
//! per-frame passes:
//!
//! 1. [`Scene::update`] runs every component and script.
//! 2. [`Scene::render`] records a shadow pass from the sun and a main pass
//!    from the active camera into a [`RenderContext`].
//! 3. [`Scene::render_ui`] draws registered editor windows, the hierarchy and
//!    the inspector.

use std::path::Path;

use cgmath::{ortho, InnerSpace, Matrix4, Point3, SquareMatrix, Vector3};
use serde::{Deserialize, Serialize};

use crate::{
    error::SceneError,
    gfx::{
        rendering::uniforms::MAX_LIGHTS,
        resources::{AssetReport, Resources},
        Framebuffer, RenderContext, UniformValue,
    },
    ui::{panel, EditorWindow},
};

use super::{
    component::{ComponentRegistry, UpdateContext},
    components::{
        self,
        camera::{Camera, OPENGL_TO_WGPU_MATRIX},
        light::{self, LightType},
        Transform,
    },
    object::{Object, ObjectId, ObjectIds},
};

/// Texture unit the shadow map is sampled from
pub const SHADOW_MAP_UNIT: i32 = 2;

/// Half extent of the sun's orthographic shadow volume
const SHADOW_EXTENT: f32 = 12.0;
/// Distance from the origin the sun's shadow camera sits at
const SHADOW_DISTANCE: f32 = 20.0;

/// Scene-wide values saved with the scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneSettings {
    pub background_color: [f32; 3],
    pub ambient_color: [f32; 3],
    pub ambient_intensity: f32,
    pub vsync: bool,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            background_color: [0.0, 0.0, 0.0],
            ambient_color: [1.0, 1.0, 1.0],
            ambient_intensity: 0.1,
            vsync: true,
        }
    }
}

/// A point light as bound to the shader
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLightData {
    pub owner: ObjectId,
    pub position: Vector3<f32>,
    pub color: Vector3<f32>,
    pub linear_attenuation: f32,
    pub quad_attenuation: f32,
}

/// The directional light acting as the sun
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunData {
    pub owner: ObjectId,
    pub direction: Vector3<f32>,
    pub color: Vector3<f32>,
}

/// Lights gathered for one frame
#[derive(Debug, Clone, Default)]
pub struct FrameLights {
    pub sun: Option<SunData>,
    /// At most [`MAX_LIGHTS`], in depth-first order
    pub points: Vec<PointLightData>,
}

/// View from the active camera
#[derive(Debug, Clone, Copy)]
pub struct CameraView {
    pub view: Matrix4<f32>,
    pub projection: Matrix4<f32>,
    pub position: Vector3<f32>,
}

/// What one call to [`Scene::render`] did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub shadow_draws: usize,
    pub draws: usize,
    /// Renderers skipped in the main pass
    pub skipped: usize,
}

pub struct Scene {
    pub objects: Vec<Object>,
    pub settings: SceneSettings,
    pub resources: Resources,
    pub blueprints: Vec<Object>,
    /// Object shown in the inspector
    pub inspected: Option<ObjectId>,
    /// Preferred directional light; the first one found stands in otherwise
    pub sun: Option<ObjectId>,
    /// Preferred camera; the first one found stands in otherwise
    pub active_camera: Option<ObjectId>,
    registry: ComponentRegistry,
    ids: ObjectIds,
    windows: Vec<Box<dyn EditorWindow>>,
    elapsed: f32,
    delta_time: f32,
    aspect: f32,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Empty scene with the built-in shaders and component kinds
    ///
    /// Call [`load_assets`](Self::load_assets) afterwards to fill the pools.
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            settings: SceneSettings::default(),
            resources: Resources::new(),
            blueprints: Vec::new(),
            inspected: None,
            sun: None,
            active_camera: None,
            registry: components::builtin_registry(),
            ids: ObjectIds::new(),
            windows: Vec::new(),
            elapsed: 0.0,
            delta_time: 0.0,
            aspect: 16.0 / 9.0,
        }
    }

    pub fn load_assets(&mut self, path: impl AsRef<Path>) -> AssetReport {
        self.resources.load_assets(path)
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ComponentRegistry {
        &mut self.registry
    }

    pub fn ids(&self) -> &ObjectIds {
        &self.ids
    }

    pub fn ids_mut(&mut self) -> &mut ObjectIds {
        &mut self.ids
    }

    pub fn add_window(&mut self, window: Box<dyn EditorWindow>) {
        self.windows.push(window);
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Object with a Transform, detached from the forest
    pub fn new_object(&mut self, name: &str) -> Object {
        let mut object = Object::new(self.ids.allocate(), name);
        let transform = Transform::new(object.id());
        // A fresh object has no components yet
        let _ = object.add_component(Box::new(transform));
        object
    }

    /// Adds a root object with a Transform and returns its id
    pub fn create_object(&mut self, name: &str) -> ObjectId {
        let object = self.new_object(name);
        self.add_object(object)
    }

    pub fn add_object(&mut self, object: Object) -> ObjectId {
        let id = object.id();
        self.objects.push(object);
        id
    }

    /// Adds a child with a Transform under `parent`
    pub fn create_child(&mut self, parent: ObjectId, name: &str) -> Result<ObjectId, SceneError> {
        let child = self.new_object(name);
        let id = child.id();
        self.find_mut(parent)
            .ok_or(SceneError::ObjectNotFound(parent.raw()))?
            .add_child(child);
        Ok(id)
    }

    pub fn find(&self, id: ObjectId) -> Option<&Object> {
        self.objects.iter().find_map(|o| o.find(id))
    }

    pub fn find_mut(&mut self, id: ObjectId) -> Option<&mut Object> {
        self.objects.iter_mut().find_map(|o| o.find_mut(id))
    }

    /// Parent of `id`, `None` for roots and unknown ids
    pub fn parent_of(&self, id: ObjectId) -> Option<ObjectId> {
        let mut parent = None;
        for root in &self.objects {
            root.walk(&mut |o| {
                if o.children().iter().any(|c| c.id() == id) {
                    parent = Some(o.id());
                }
            });
        }
        parent
    }

    /// Adds a component of the registered kind `name` to `id`
    pub fn add_component(&mut self, id: ObjectId, name: &str) -> Result<(), SceneError> {
        let component = self
            .registry
            .create(name, id)
            .ok_or_else(|| SceneError::UnknownComponent(name.to_string()))?;
        self.find_mut(id)
            .ok_or(SceneError::ObjectNotFound(id.raw()))?
            .add_component(component)
    }

    /// Detaches `id` and its subtree from the forest
    ///
    /// References held by the scene into the removed subtree are cleared.
    pub fn remove_object(&mut self, id: ObjectId) -> Option<Object> {
        let removed = match self.objects.iter().position(|o| o.id() == id) {
            Some(index) => Some(self.objects.remove(index)),
            None => self
                .objects
                .iter_mut()
                .find_map(|o| o.remove_descendant(id)),
        }?;

        for slot in [&mut self.inspected, &mut self.sun, &mut self.active_camera] {
            if slot.is_some_and(|held| removed.find(held).is_some()) {
                *slot = None;
            }
        }
        Some(removed)
    }

    /// Deep copy of `id` placed next to it, under the same parent
    pub fn duplicate(&mut self, id: ObjectId) -> Result<ObjectId, SceneError> {
        let source = self
            .objects
            .iter()
            .find_map(|o| o.find(id))
            .ok_or(SceneError::ObjectNotFound(id.raw()))?;
        let copy = source.clone_with(&mut self.ids);
        let copy_id = copy.id();

        match self.parent_of(id).and_then(|p| self.find_mut(p)) {
            Some(parent) => parent.add_child(copy),
            None => self.objects.push(copy),
        }
        Ok(copy_id)
    }

    /// Stores a copy of `id` as a blueprint and returns its index
    pub fn make_blueprint(&mut self, id: ObjectId) -> Result<usize, SceneError> {
        let source = self
            .objects
            .iter()
            .find_map(|o| o.find(id))
            .ok_or(SceneError::ObjectNotFound(id.raw()))?;
        let mut blueprint = source.clone_with(&mut self.ids);
        blueprint.blueprint = None;
        self.blueprints.push(blueprint);
        Ok(self.blueprints.len() - 1)
    }

    /// Adds a root copy of blueprint `index`, linked back to it
    pub fn instantiate_blueprint(&mut self, index: usize) -> Result<ObjectId, SceneError> {
        let blueprint = self
            .blueprints
            .get(index)
            .ok_or(SceneError::BlueprintNotFound(index))?;
        let mut instance = blueprint.clone_with(&mut self.ids);
        instance.blueprint = Some(blueprint.id());
        Ok(self.add_object(instance))
    }

    /// Advances every object by `delta_time` seconds
    pub fn update(&mut self, delta_time: f32) {
        self.delta_time = delta_time;
        self.elapsed += delta_time;
        let ctx = UpdateContext {
            delta_time,
            elapsed: self.elapsed,
        };
        for object in &mut self.objects {
            object.update(&ctx);
        }
    }

    /// Sun and point lights for this frame
    ///
    /// Point lights beyond [`MAX_LIGHTS`] are dropped in depth-first order.
    /// The sun is [`Scene::sun`] when it names a directional light, else the
    /// first directional light found.
    pub fn lights(&self) -> FrameLights {
        let mut lights = FrameLights::default();
        let mut first_sun = None;
        let mut chosen_sun = None;

        for root in &self.objects {
            root.walk_world(Matrix4::identity(), &mut |object, world| {
                let Some(world) = world else {
                    return;
                };
                for light in object.components().iter().filter_map(|c| c.as_light()) {
                    match light.light_type {
                        LightType::Point => lights.points.push(PointLightData {
                            owner: object.id(),
                            position: light::position(&world),
                            color: light.color,
                            linear_attenuation: light.linear_attenuation,
                            quad_attenuation: light.quad_attenuation,
                        }),
                        LightType::Directional => {
                            let sun = SunData {
                                owner: object.id(),
                                direction: light::direction(&world),
                                color: light.color,
                            };
                            if self.sun == Some(object.id()) {
                                chosen_sun = Some(sun);
                            }
                            first_sun.get_or_insert(sun);
                        }
                    }
                }
            });
        }

        lights.points.truncate(MAX_LIGHTS);
        lights.sun = chosen_sun.or(first_sun);
        lights
    }

    /// View and projection from the active camera
    ///
    /// Falls back to the first camera in the forest, then to a fixed view
    /// looking at the origin.
    pub fn camera_view(&self) -> CameraView {
        let mut first = None;
        let mut chosen = None;
        for root in &self.objects {
            root.walk_world(Matrix4::identity(), &mut |object, world| {
                if let (Some(camera), Some(world)) = (object.get_component::<Camera>(), world) {
                    let found = (camera.clone(), world);
                    if self.active_camera == Some(object.id()) {
                        chosen = Some(found.clone());
                    }
                    first.get_or_insert(found);
                }
            });
        }

        match chosen.or(first) {
            Some((camera, world)) => CameraView {
                view: Camera::view(&world),
                projection: camera.projection(self.aspect),
                position: light::position(&world),
            },
            None => {
                let eye = Point3::new(0.0, 3.0, 8.0);
                CameraView {
                    view: Matrix4::look_at_rh(eye, Point3::new(0.0, 0.0, 0.0), Vector3::unit_y()),
                    projection: Camera::new(ObjectId::from_raw(0)).projection(self.aspect),
                    position: Vector3::new(eye.x, eye.y, eye.z),
                }
            }
        }
    }

    /// Records the shadow pass and the main pass
    pub fn render(&self, ctx: &mut dyn RenderContext) -> FrameStats {
        let mut stats = FrameStats::default();
        let lights = self.lights();
        let light_space = lights
            .sun
            .map_or_else(Matrix4::identity, |sun| light_space_matrix(sun.direction));

        let mut drawables = Vec::new();
        for root in &self.objects {
            root.walk_world(Matrix4::identity(), &mut |object, world| {
                if let Some(renderer) = object.renderer() {
                    drawables.push((object, renderer, world));
                }
            });
        }

        // Shadow pass
        ctx.bind_framebuffer(Framebuffer::Shadow);
        ctx.clear(None);
        if lights.sun.is_some() {
            match self.resources.shadow_shader().filter(|s| s.is_valid()) {
                Some(shadow) => {
                    ctx.use_shader(shadow);
                    ctx.set_uniform("lightSpaceMat", UniformValue::Mat4(light_space));
                    for (_, renderer, world) in &drawables {
                        if let (Some(world), Some(_)) = (world, renderer.geometry()) {
                            renderer.render(ctx, world);
                            stats.shadow_draws += 1;
                        }
                    }
                }
                None => log::warn!("shadow shader is unavailable; skipping the shadow pass"),
            }
        }

        // Main pass
        ctx.bind_framebuffer(Framebuffer::Default);
        ctx.clear(Some(self.settings.background_color));
        let camera = self.camera_view();
        for (object, renderer, world) in &drawables {
            let Some(world) = world else {
                log::warn!(
                    "object '{}' ({}) has a renderer but no Transform; skipping",
                    object.name,
                    object.id()
                );
                stats.skipped += 1;
                continue;
            };
            if renderer.geometry().is_none() {
                log::warn!(
                    "object '{}' ({}) has nothing to draw; skipping",
                    object.name,
                    object.id()
                );
                stats.skipped += 1;
                continue;
            }
            let shader = renderer
                .material()
                .shader
                .as_ref()
                .or_else(|| self.resources.default_shader());
            let Some(shader) = shader.filter(|s| s.is_valid()) else {
                log::warn!(
                    "object '{}' ({}) has no valid shader; skipping",
                    object.name,
                    object.id()
                );
                stats.skipped += 1;
                continue;
            };

            ctx.use_shader(shader);
            self.bind_frame_uniforms(ctx, &camera, &lights, light_space);
            renderer.render(ctx, world);
            stats.draws += 1;
        }

        log::debug!(
            "recorded {} shadow draws, {} draws, {} skipped",
            stats.shadow_draws,
            stats.draws,
            stats.skipped
        );
        stats
    }

    fn bind_frame_uniforms(
        &self,
        ctx: &mut dyn RenderContext,
        camera: &CameraView,
        lights: &FrameLights,
        light_space: Matrix4<f32>,
    ) {
        ctx.set_uniform("view", UniformValue::Mat4(camera.view));
        ctx.set_uniform("projection", UniformValue::Mat4(camera.projection));
        ctx.set_uniform("viewPos", UniformValue::Vec3(camera.position));
        ctx.set_uniform("lightSpaceMat", UniformValue::Mat4(light_space));
        ctx.set_uniform("shadowMap", UniformValue::Int(SHADOW_MAP_UNIT));

        ctx.set_uniform(
            "ambientColor",
            UniformValue::Vec3(self.settings.ambient_color.into()),
        );
        ctx.set_uniform(
            "ambientIntensity",
            UniformValue::Float(self.settings.ambient_intensity),
        );

        ctx.set_uniform("hasDirLight", UniformValue::Bool(lights.sun.is_some()));
        if let Some(sun) = &lights.sun {
            ctx.set_uniform("dirLight.direction", UniformValue::Vec3(sun.direction));
            ctx.set_uniform("dirLight.color", UniformValue::Vec3(sun.color));
        }

        ctx.set_uniform("numPointLights", UniformValue::Int(lights.points.len() as i32));
        for (i, light) in lights.points.iter().enumerate() {
            ctx.set_uniform(
                &format!("pointLights[{}].position", i),
                UniformValue::Vec3(light.position),
            );
            ctx.set_uniform(
                &format!("pointLights[{}].color", i),
                UniformValue::Vec3(light.color),
            );
            ctx.set_uniform(
                &format!("pointLights[{}].linearAttenuation", i),
                UniformValue::Float(light.linear_attenuation),
            );
            ctx.set_uniform(
                &format!("pointLights[{}].quadAttenuation", i),
                UniformValue::Float(light.quad_attenuation),
            );
        }
    }

    /// Draws registered windows, the hierarchy and the inspector
    pub fn render_ui(&mut self, ui: &imgui::Ui) {
        // Windows get the scene mutably, so they are taken out while they draw
        let mut windows = std::mem::take(&mut self.windows);
        for window in &mut windows {
            window.render(ui, self);
        }
        windows.append(&mut self.windows);
        self.windows = windows;

        panel::hierarchy(ui, self);
        panel::inspector(ui, self);
    }

    /// Replaces the forest and settings, keeping pools and windows
    pub(crate) fn replace_contents(
        &mut self,
        objects: Vec<Object>,
        blueprints: Vec<Object>,
        settings: SceneSettings,
    ) {
        self.objects = objects;
        self.blueprints = blueprints;
        self.settings = settings;
        self.inspected = None;
        self.sun = None;
        self.active_camera = None;
    }
}

/// Orthographic projection times a look-at along `direction`
pub fn light_space_matrix(direction: Vector3<f32>) -> Matrix4<f32> {
    let direction = if direction.magnitude2() > f32::EPSILON {
        direction.normalize()
    } else {
        -Vector3::unit_y()
    };
    let up = if direction.dot(Vector3::unit_y()).abs() > 0.99 {
        Vector3::unit_z()
    } else {
        Vector3::unit_y()
    };
    let eye = Point3::new(0.0, 0.0, 0.0) - direction * SHADOW_DISTANCE;
    let view = Matrix4::look_at_rh(eye, Point3::new(0.0, 0.0, 0.0), up);
    let projection = ortho(
        -SHADOW_EXTENT,
        SHADOW_EXTENT,
        -SHADOW_EXTENT,
        SHADOW_EXTENT,
        0.1,
        SHADOW_DISTANCE * 2.0,
    );
    OPENGL_TO_WGPU_MATRIX * projection * view
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use approx::assert_relative_eq;
    use cgmath::Vector4;

    use super::*;
    use crate::{
        gfx::{geometry, resources::Shader, CommandList},
        scene::components::{light::Light, CubeRenderer, PlaneRenderer},
    };

    fn light_at(scene: &mut Scene, x: f32) -> ObjectId {
        let id = scene.create_object(&format!("Light {}", x));
        let object = scene.find_mut(id).unwrap();
        object.get_component_mut::<Transform>().unwrap().position = Vector3::new(x, 1.0, 0.0);
        object.add_component(Box::new(Light::new(id))).unwrap();
        id
    }

    #[test]
    fn test_point_lights_cap_at_sixteen_in_order() {
        let mut scene = Scene::new();
        let ids: Vec<_> = (0..20).map(|i| light_at(&mut scene, i as f32)).collect();
        let cube = scene.create_object("Cube");
        scene.add_component(cube, CubeRenderer::NAME).unwrap();

        let lights = scene.lights();
        assert_eq!(lights.points.len(), MAX_LIGHTS);
        for (light, id) in lights.points.iter().zip(&ids) {
            assert_eq!(light.owner, *id);
        }

        let mut list = CommandList::new();
        scene.render(&mut list);
        let record = list.draw_records().pop().unwrap();
        assert_eq!(record.uniform("numPointLights"), Some(UniformValue::Int(16)));
        assert_eq!(
            record.uniform("pointLights[15].position"),
            Some(UniformValue::Vec3(Vector3::new(15.0, 1.0, 0.0)))
        );
        assert!(record.uniform("pointLights[16].position").is_none());
    }

    #[test]
    fn test_missing_transform_skips_only_that_object() {
        let mut scene = Scene::new();
        let floating = Object::new(scene.ids_mut().allocate(), "No Transform");
        let floating_id = scene.add_object(floating);
        scene.add_component(floating_id, CubeRenderer::NAME).unwrap();

        let plane = scene.create_object("Floor");
        scene.add_component(plane, PlaneRenderer::NAME).unwrap();

        let mut list = CommandList::new();
        let stats = scene.render(&mut list);

        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.draws, 1);
        let records = list.draw_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].geometry_label, "Plane");
        assert_eq!(records[0].framebuffer, Framebuffer::Default);
    }

    #[test]
    fn test_shadow_pass_precedes_main_pass() {
        let mut scene = Scene::new();
        let sun = scene.create_object("Sun");
        scene
            .find_mut(sun)
            .unwrap()
            .add_component(Box::new(Light::directional(sun)))
            .unwrap();
        let cube = scene.create_object("Cube");
        scene.add_component(cube, CubeRenderer::NAME).unwrap();

        let mut list = CommandList::new();
        let stats = scene.render(&mut list);
        assert_eq!((stats.shadow_draws, stats.draws), (1, 1));

        let records = list.draw_records();
        assert_eq!(records[0].framebuffer, Framebuffer::Shadow);
        assert_eq!(records[0].shader.as_deref(), Some("shadow"));
        assert_eq!(records[1].framebuffer, Framebuffer::Default);
        assert_eq!(records[1].shader.as_deref(), Some("default"));
        assert_eq!(records[1].uniform("hasDirLight"), Some(UniformValue::Bool(true)));
        assert_eq!(
            records[1].uniform("dirLight.direction"),
            Some(UniformValue::Vec3(Vector3::new(0.0, -1.0, 0.0)))
        );
    }

    #[test]
    fn test_own_shader_wins_and_invalid_shader_skips() {
        let mut scene = Scene::new();
        let custom = Rc::new(Shader::from_source("toon", ""));
        let broken = Rc::new(Shader::from_source("broken", ""));
        broken.mark_invalid("expected ';'".to_string());

        for (name, shader) in [("Toon", custom), ("Broken", broken)] {
            let id = scene.create_object(name);
            let mut cube = CubeRenderer::new(id);
            cube.material.shader = Some(shader);
            scene.find_mut(id).unwrap().add_component(Box::new(cube)).unwrap();
        }

        let mut list = CommandList::new();
        let stats = scene.render(&mut list);
        assert_eq!((stats.draws, stats.skipped), (1, 1));
        assert_eq!(list.draw_records()[0].shader.as_deref(), Some("toon"));
    }

    #[test]
    fn test_children_are_drawn_in_world_space() {
        let mut scene = Scene::new();
        let parent = scene.create_object("Parent");
        scene
            .find_mut(parent)
            .unwrap()
            .get_component_mut::<Transform>()
            .unwrap()
            .position = Vector3::new(0.0, 2.0, 0.0);
        let child = scene.create_child(parent, "Child").unwrap();
        scene.add_component(child, CubeRenderer::NAME).unwrap();

        let mut list = CommandList::new();
        scene.render(&mut list);
        let Some(UniformValue::Mat4(model)) = list.draw_records()[0].uniform("model") else {
            panic!("model was not bound");
        };
        let origin = model * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert_relative_eq!(origin.y, 2.0);
    }

    #[test]
    fn test_geometry_is_shared_across_many_renderers() {
        let mut scene = Scene::new();
        for i in 0..10 {
            let id = scene.create_object(&format!("Cube {}", i));
            scene.add_component(id, CubeRenderer::NAME).unwrap();
        }
        let first = geometry::cube();
        let mut count = 0;
        for root in &scene.objects {
            let geometry = root.renderer().unwrap().geometry().unwrap();
            assert!(std::sync::Arc::ptr_eq(&geometry, &first));
            count += 1;
        }
        assert_eq!(count, 10);
    }

    #[test]
    fn test_remove_object_clears_references() {
        let mut scene = Scene::new();
        let parent = scene.create_object("Parent");
        let child = scene.create_child(parent, "Child").unwrap();
        scene.inspected = Some(child);
        scene.active_camera = Some(child);

        let removed = scene.remove_object(parent).unwrap();
        assert!(removed.find(child).is_some());
        assert!(scene.objects.is_empty());
        assert_eq!(scene.inspected, None);
        assert_eq!(scene.active_camera, None);
    }

    #[test]
    fn test_duplicate_lands_beside_original() {
        let mut scene = Scene::new();
        let parent = scene.create_object("Parent");
        let child = scene.create_child(parent, "Child").unwrap();

        let copy = scene.duplicate(child).unwrap();
        assert_ne!(copy, child);
        assert_eq!(scene.parent_of(copy), Some(parent));
        assert_eq!(scene.find(parent).unwrap().children().len(), 2);
        assert_eq!(scene.duplicate(ObjectId::from_raw(999)), Err(SceneError::ObjectNotFound(999)));
    }

    #[test]
    fn test_blueprint_instances_link_back() {
        let mut scene = Scene::new();
        let lamp = scene.create_object("Lamp");
        scene.add_component(lamp, Light::NAME).unwrap();

        let index = scene.make_blueprint(lamp).unwrap();
        let first = scene.instantiate_blueprint(index).unwrap();
        let second = scene.instantiate_blueprint(index).unwrap();

        let blueprint_id = scene.blueprints[index].id();
        assert_ne!(first, second);
        assert_eq!(scene.find(first).unwrap().blueprint, Some(blueprint_id));
        assert!(scene.find(second).unwrap().get_component::<Light>().is_some());
        assert_eq!(
            scene.instantiate_blueprint(7),
            Err(SceneError::BlueprintNotFound(7))
        );
    }

    #[test]
    fn test_active_camera_falls_back_to_first_camera() {
        let mut scene = Scene::new();
        let first = scene.create_object("Camera A");
        scene.add_component(first, Camera::NAME).unwrap();
        scene
            .find_mut(first)
            .unwrap()
            .get_component_mut::<Transform>()
            .unwrap()
            .position = Vector3::new(0.0, 0.0, 5.0);
        let second = scene.create_object("Camera B");
        scene.add_component(second, Camera::NAME).unwrap();

        assert_eq!(scene.camera_view().position, Vector3::new(0.0, 0.0, 5.0));
        scene.active_camera = Some(second);
        assert_eq!(scene.camera_view().position, Vector3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_camera_with_collapsed_depth_range_still_renders() {
        let mut scene = Scene::new();
        let eye = scene.create_object("Eye");
        scene.add_component(eye, Camera::NAME).unwrap();
        scene.active_camera = Some(eye);
        let cube = scene.create_object("Cube");
        scene.add_component(cube, CubeRenderer::NAME).unwrap();
        {
            let camera = scene
                .find_mut(eye)
                .unwrap()
                .get_component_mut::<Camera>()
                .unwrap();
            camera.near = 5.0;
            camera.far = 5.0;
        }

        let expected = Camera::new(eye).projection(16.0 / 9.0);
        assert_eq!(scene.camera_view().projection, expected);
        let stats = scene.render(&mut CommandList::new());
        assert_eq!(stats.draws, 1);
    }
}

