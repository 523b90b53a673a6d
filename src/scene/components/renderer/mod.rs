//! # Renderers
//!
//! Components that draw their owner. Cube, plane and mesh renderers differ
//! only in where their geometry comes from; everything else lives in the
//! shared [`Material`].
//!
//! ## Binding discipline
//!
//! Texture units keep whatever was last bound to them, so [`Material::bind`]
//! always writes units 0 and 1. In [`RenderMode::Material`] both are unbound;
//! in [`RenderMode::TexMap`] each gets its texture or is unbound.

pub mod cube;
pub mod mesh;
pub mod plane;

use std::{rc::Rc, sync::Arc};

use cgmath::{Matrix, Matrix3, Matrix4, SquareMatrix, Vector3, Zero};
use serde_yaml::Mapping;

use crate::{
    error::LoadError,
    gfx::{
        geometry::Geometry,
        resources::{Resources, Shader, Texture, SHADER_PAYLOAD, TEXTURE_PAYLOAD},
        RenderContext, UniformValue,
    },
    scene::{
        component::InspectorContext,
        record::{Record, RecordWriter},
    },
    ui::drag_drop,
};

pub const DIFFUSE_UNIT: u32 = 0;
pub const SPECULAR_UNIT: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// Flat diffuse and specular colors
    #[default]
    Material = 0,
    /// Diffuse and specular maps
    TexMap = 1,
}

impl TryFrom<i64> for RenderMode {
    type Error = i64;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Material),
            1 => Ok(Self::TexMap),
            other => Err(other),
        }
    }
}

/// Surface description shared by every renderer kind
#[derive(Debug, Clone)]
pub struct Material {
    /// `None` draws with the scene's default shader
    pub shader: Option<Rc<Shader>>,
    pub mode: RenderMode,
    pub diffuse_color: Vector3<f32>,
    pub specular_color: Vector3<f32>,
    pub diffuse_texture: Option<Rc<Texture>>,
    pub specular_texture: Option<Rc<Texture>>,
    pub shininess: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            shader: None,
            mode: RenderMode::Material,
            diffuse_color: Vector3::new(1.0, 1.0, 1.0),
            specular_color: Vector3::zero(),
            diffuse_texture: None,
            specular_texture: None,
            shininess: 32.0,
        }
    }
}

fn same_rc<T>(a: &Option<Rc<T>>, b: &Option<Rc<T>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Rc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

/// Resources compare by identity
impl PartialEq for Material {
    fn eq(&self, other: &Self) -> bool {
        same_rc(&self.shader, &other.shader)
            && self.mode == other.mode
            && self.diffuse_color == other.diffuse_color
            && self.specular_color == other.specular_color
            && same_rc(&self.diffuse_texture, &other.diffuse_texture)
            && same_rc(&self.specular_texture, &other.specular_texture)
            && self.shininess == other.shininess
    }
}

impl Material {
    /// Writes colors, shininess and both texture units for the current mode
    pub fn bind(&self, ctx: &mut dyn RenderContext) {
        match self.mode {
            RenderMode::Material => {
                ctx.set_uniform("diffuseColor", UniformValue::Vec3(self.diffuse_color));
                ctx.set_uniform("specularColor", UniformValue::Vec3(self.specular_color));
                ctx.bind_texture(DIFFUSE_UNIT, None);
                ctx.bind_texture(SPECULAR_UNIT, None);
                ctx.set_uniform("shininess", UniformValue::Float(self.shininess));
            }
            RenderMode::TexMap => {
                ctx.set_uniform("diffuseColor", UniformValue::Vec3(Vector3::zero()));
                ctx.set_uniform("specularColor", UniformValue::Vec3(Vector3::zero()));
                ctx.set_uniform("shininess", UniformValue::Float(self.shininess));
                ctx.bind_texture(DIFFUSE_UNIT, usable(&self.diffuse_texture));
                ctx.bind_texture(SPECULAR_UNIT, usable(&self.specular_texture));
                ctx.set_uniform("diffuseTex", UniformValue::Int(DIFFUSE_UNIT as i32));
                ctx.set_uniform("specularTex", UniformValue::Int(SPECULAR_UNIT as i32));
            }
        }
    }

    /// Appends the material fields to a component record
    pub fn write(&self, record: RecordWriter) -> RecordWriter {
        record
            .i64("mode", self.mode as i64)
            .vec3("diffuseColor", self.diffuse_color)
            .vec3("specularColor", self.specular_color)
            .f32("shininess", self.shininess)
            .opt_str("shader", self.shader.as_deref().map(Shader::name))
            .opt_str("diffuseTex", self.diffuse_texture.as_deref().map(Texture::name))
            .opt_str("specularTex", self.specular_texture.as_deref().map(Texture::name))
    }

    /// Reads the material fields, resolving resource names through the pools
    pub fn read(record: &Record<'_>, component: &str, resources: &Resources) -> Result<Self, LoadError> {
        let mode = RenderMode::try_from(record.i64("mode")?).map_err(|value| {
            LoadError::InvalidField {
                component: component.to_string(),
                field: "mode",
                reason: format!("{} is not a render mode (0 material, 1 texture map)", value),
            }
        })?;

        Ok(Self {
            shader: resolve(record.opt_str("shader")?, "shader", |n| resources.shader(n)),
            mode,
            diffuse_color: record.vec3("diffuseColor")?,
            specular_color: record.vec3("specularColor")?,
            diffuse_texture: resolve(record.opt_str("diffuseTex")?, "texture", |n| {
                resources.texture(n)
            }),
            specular_texture: resolve(record.opt_str("specularTex")?, "texture", |n| {
                resources.texture(n)
            }),
            shininess: record.f32("shininess")?,
        })
    }

    pub fn render_inspector(&mut self, ui: &imgui::Ui, ctx: &mut InspectorContext<'_>) {
        let shader_label = self
            .shader
            .as_deref()
            .map_or("default", Shader::name)
            .to_string();
        ui.text("Shader:");
        ui.same_line();
        ui.button(&shader_label);
        if let Some(index) = drag_drop::accept_index(ui, SHADER_PAYLOAD) {
            self.shader = ctx.resources.shaders.get(index).cloned();
        }
        if self.shader.is_some() {
            ui.same_line();
            if ui.small_button("Reset##shader") {
                self.shader = None;
            }
        }

        ui.text("Mode");
        ui.same_line();
        ui.radio_button("Material", &mut self.mode, RenderMode::Material);
        ui.same_line();
        ui.radio_button("Texture Map", &mut self.mode, RenderMode::TexMap);

        match self.mode {
            RenderMode::Material => {
                let mut diffuse: [f32; 3] = self.diffuse_color.into();
                if ui.color_edit3("Diffuse", &mut diffuse) {
                    self.diffuse_color = diffuse.into();
                }
                let mut specular: [f32; 3] = self.specular_color.into();
                if ui.color_edit3("Specular", &mut specular) {
                    self.specular_color = specular.into();
                }
            }
            RenderMode::TexMap => {
                texture_slot(ui, "Diffuse Map", &mut self.diffuse_texture, ctx);
                texture_slot(ui, "Specular Map", &mut self.specular_texture, ctx);
            }
        }

        imgui::Drag::new("Shininess")
            .speed(0.1)
            .range(0.0, f32::MAX)
            .build(ui, &mut self.shininess);
    }
}

fn usable(texture: &Option<Rc<Texture>>) -> Option<&Rc<Texture>> {
    texture.as_ref().filter(|t| t.is_valid())
}

fn resolve<'r, T: 'r>(
    name: Option<&str>,
    kind: &str,
    lookup: impl FnOnce(&str) -> Option<&'r Rc<T>>,
) -> Option<Rc<T>> {
    let name = name?;
    let found = lookup(name).cloned();
    if found.is_none() {
        log::warn!("{} '{}' is not loaded; leaving the slot empty", kind, name);
    }
    found
}

fn texture_slot(
    ui: &imgui::Ui,
    label: &str,
    slot: &mut Option<Rc<Texture>>,
    ctx: &mut InspectorContext<'_>,
) {
    let _id = ui.push_id(label);
    ui.text(label);
    let caption = slot
        .as_deref()
        .map_or("Drop Texture Here", Texture::name)
        .to_string();
    ui.button_with_size(&caption, [160.0, 0.0]);
    if let Some(index) = drag_drop::accept_index(ui, TEXTURE_PAYLOAD) {
        *slot = ctx.resources.textures.get(index).cloned();
    }
    if slot.is_some() {
        ui.same_line();
        if ui.small_button("Clear") {
            *slot = None;
        }
    }
}

/// `transpose(inverse(model))`, upper 3x3
pub fn normal_matrix(model: &Matrix4<f32>) -> Matrix3<f32> {
    let m = model.invert().unwrap_or_else(Matrix4::identity).transpose();
    Matrix3::from_cols(m.x.truncate(), m.y.truncate(), m.z.truncate())
}

/// Capability shared by every component that draws its owner
pub trait Renderer {
    fn material(&self) -> &Material;
    fn material_mut(&mut self) -> &mut Material;

    /// What to draw; `None` skips the object for this frame
    fn geometry(&self) -> Option<Arc<Geometry>>;

    /// Binds `model`, `normalMat` and the material, then draws
    ///
    /// The caller has already selected the shader and bound the scene-wide
    /// uniforms.
    fn render(&self, ctx: &mut dyn RenderContext, world: &Matrix4<f32>) {
        let Some(geometry) = self.geometry() else {
            return;
        };
        ctx.set_uniform("model", UniformValue::Mat4(*world));
        ctx.set_uniform("normalMat", UniformValue::Mat3(normal_matrix(world)));
        self.material().bind(ctx);
        ctx.draw(&geometry);
    }
}

/// Shared body of the three renderer records
pub(crate) fn read_material(
    component: &'static str,
    record: &Mapping,
    resources: &Resources,
) -> Result<Material, LoadError> {
    Material::read(&Record::new(component, record), component, resources)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::gfx::CommandList;

    fn texture(name: &str) -> Rc<Texture> {
        Rc::new(Texture::from_rgba(name, 1, 1, vec![255; 4]))
    }

    #[test]
    fn test_switch_to_tex_map_rebinds_both_units() {
        let stale = texture("stale");
        let diffuse = texture("bricks");
        let mut list = CommandList::new();

        // A previous draw leaves something on both units
        list.bind_texture(DIFFUSE_UNIT, Some(&stale));
        list.bind_texture(SPECULAR_UNIT, Some(&stale));
        list.draw(&crate::gfx::geometry::cube());

        let mut material = Material::default();
        material.bind(&mut list);
        list.draw(&crate::gfx::geometry::cube());

        material.mode = RenderMode::TexMap;
        material.diffuse_texture = Some(diffuse.clone());
        material.bind(&mut list);
        list.draw(&crate::gfx::geometry::cube());

        let records = list.draw_records();
        for record in &records[1..] {
            assert!(record.rebound_units.contains(&DIFFUSE_UNIT));
            assert!(record.rebound_units.contains(&SPECULAR_UNIT));
        }
        assert_eq!(records[1].textures[&DIFFUSE_UNIT], None);
        assert_eq!(records[1].textures[&SPECULAR_UNIT], None);
        assert_eq!(records[2].textures[&DIFFUSE_UNIT], Some(diffuse.id()));
        assert_eq!(records[2].textures[&SPECULAR_UNIT], None);
        assert_eq!(
            records[2].uniform("diffuseColor"),
            Some(UniformValue::Vec3(Vector3::zero()))
        );
        assert_eq!(records[2].uniform("specularTex"), Some(UniformValue::Int(1)));
    }

    #[test]
    fn test_invalid_texture_is_unbound() {
        let broken = Rc::new(Texture::invalid(
            std::path::Path::new("missing.png"),
            &crate::error::ResourceError::EmptyMesh("missing.png".into()),
        ));
        let material = Material {
            mode: RenderMode::TexMap,
            diffuse_texture: Some(broken),
            ..Material::default()
        };
        let mut list = CommandList::new();
        material.bind(&mut list);
        list.draw(&crate::gfx::geometry::plane());

        assert_eq!(list.draw_records()[0].textures[&DIFFUSE_UNIT], None);
    }

    #[test]
    fn test_material_round_trip_resolves_pool_entries() {
        let mut resources = Resources::new();
        let bricks = texture("bricks");
        resources.textures.push(bricks.clone());
        let shader = resources.default_shader().cloned();

        let material = Material {
            shader,
            mode: RenderMode::TexMap,
            diffuse_color: Vector3::new(0.25, 0.5, 0.75),
            specular_color: Vector3::new(1.0, 1.0, 1.0),
            diffuse_texture: Some(bricks),
            specular_texture: None,
            shininess: 64.0,
        };
        let record = material.write(RecordWriter::new("CubeRenderer")).finish();
        let loaded = read_material("CubeRenderer", &record, &resources).unwrap();
        assert_eq!(loaded, material);
    }

    #[test]
    fn test_unknown_resource_name_leaves_slot_empty() {
        let record = Material {
            diffuse_texture: Some(texture("gone")),
            ..Material::default()
        }
        .write(RecordWriter::new("PlaneRenderer"))
        .finish();

        let loaded = read_material("PlaneRenderer", &record, &Resources::new()).unwrap();
        assert!(loaded.diffuse_texture.is_none());
    }

    #[test]
    fn test_normal_matrix_undoes_non_uniform_scale() {
        let model = Matrix4::from_nonuniform_scale(2.0, 4.0, 1.0);
        let n = normal_matrix(&model);
        assert_relative_eq!(n.x.x, 0.5);
        assert_relative_eq!(n.y.y, 0.25);
        assert_relative_eq!(n.z.z, 1.0);
    }

    #[test]
    fn test_bad_mode_and_ill_typed_names_are_rejected() {
        let resources = Resources::new();
        let mut record = Material::default()
            .write(RecordWriter::new("CubeRenderer"))
            .finish();
        record.insert("mode".into(), 5.into());
        assert!(matches!(
            read_material("CubeRenderer", &record, &resources),
            Err(LoadError::InvalidField { field: "mode", .. })
        ));

        record.insert("mode".into(), 0.into());
        record.insert("diffuseTex".into(), 7.into());
        assert!(matches!(
            read_material("CubeRenderer", &record, &resources),
            Err(LoadError::InvalidField { field: "diffuseTex", .. })
        ));

        record.remove("diffuseTex");
        record.insert("shininess".into(), "glossy".into());
        assert!(matches!(
            read_material("CubeRenderer", &record, &resources),
            Err(LoadError::InvalidField { field: "shininess", .. })
        ));
    }

    #[test]
    fn test_texture_rejected_by_gpu_falls_back() {
        let tiles = Rc::new(Texture::from_rgba("tiles", 1, 1, vec![255; 4]));
        let material = Material {
            mode: RenderMode::TexMap,
            diffuse_texture: Some(tiles.clone()),
            ..Material::default()
        };
        tiles.mark_invalid("texture too large".to_string());

        let mut list = CommandList::new();
        material.bind(&mut list);
        list.draw(&crate::gfx::geometry::plane());
        assert_eq!(list.draw_records()[0].textures[&DIFFUSE_UNIT], None);
    }
}
