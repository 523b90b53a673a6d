//! # Render Commands
//!
//! The scene never touches the GPU directly. Each frame it records an ordered
//! list of framebuffer, shader, uniform, texture and draw commands through the
//! [`RenderContext`] trait. The wgpu [`RenderEngine`](crate::gfx::rendering::RenderEngine)
//! replays that list; tests inspect it instead.
//!
//! Binding state behaves like a classic immediate-mode API: a uniform or
//! texture unit keeps its value until something sets it again, so renderers
//! must explicitly unbind what they do not use.

use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    rc::Rc,
    sync::Arc,
};

use cgmath::{Matrix3, Matrix4, Vector3};

use super::{
    geometry::Geometry,
    resources::{Shader, Texture, TextureId},
};

/// Render target selected by [`RenderContext::bind_framebuffer`]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Framebuffer {
    /// The window surface with its depth buffer
    Default,
    /// The sun's depth-only shadow map
    Shadow,
}

/// Typed value for a named shader uniform
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum UniformValue {
    Int(i32),
    Bool(bool),
    Float(f32),
    Vec3(Vector3<f32>),
    Mat3(Matrix3<f32>),
    Mat4(Matrix4<f32>),
}

#[derive(Clone, Debug)]
pub enum RenderCommand {
    BindFramebuffer(Framebuffer),
    /// Clears depth, and color too when given
    Clear(Option<[f32; 3]>),
    UseShader(Rc<Shader>),
    SetUniform { name: String, value: UniformValue },
    /// `None` explicitly unbinds the unit
    BindTexture {
        unit: u32,
        texture: Option<Rc<Texture>>,
    },
    DrawIndexed(Arc<Geometry>),
}

/// Sink for the commands issued while rendering a scene
pub trait RenderContext {
    fn bind_framebuffer(&mut self, target: Framebuffer);
    fn clear(&mut self, color: Option<[f32; 3]>);
    fn use_shader(&mut self, shader: &Rc<Shader>);
    fn set_uniform(&mut self, name: &str, value: UniformValue);
    fn bind_texture(&mut self, unit: u32, texture: Option<&Rc<Texture>>);
    fn draw(&mut self, geometry: &Arc<Geometry>);
}

/// Recorded commands for one frame
#[derive(Default, Debug)]
pub struct CommandList {
    commands: Vec<RenderCommand>,
}

impl CommandList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn draw_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, RenderCommand::DrawIndexed(_)))
            .count()
    }

    /// Walks the list tracking bound state and returns what each draw saw
    pub fn draw_records(&self) -> Vec<DrawRecord> {
        let mut records = Vec::new();
        let mut framebuffer = Framebuffer::Default;
        let mut shader: Option<Rc<Shader>> = None;
        let mut textures = BTreeMap::new();
        let mut rebound = BTreeSet::new();
        let mut uniforms = HashMap::new();

        for command in &self.commands {
            match command {
                RenderCommand::BindFramebuffer(target) => framebuffer = *target,
                RenderCommand::Clear(_) => {}
                RenderCommand::UseShader(s) => shader = Some(s.clone()),
                RenderCommand::SetUniform { name, value } => {
                    uniforms.insert(name.clone(), *value);
                }
                RenderCommand::BindTexture { unit, texture } => {
                    textures.insert(*unit, texture.as_ref().map(|t| t.id()));
                    rebound.insert(*unit);
                }
                RenderCommand::DrawIndexed(geometry) => {
                    records.push(DrawRecord {
                        framebuffer,
                        shader: shader.as_ref().map(|s| s.name().to_string()),
                        geometry_label: geometry.label().to_string(),
                        textures: textures.clone(),
                        rebound_units: std::mem::take(&mut rebound),
                        uniforms: uniforms.clone(),
                    });
                }
            }
        }
        records
    }
}

/// Snapshot of the binding state at one draw call
#[derive(Clone, Debug)]
pub struct DrawRecord {
    pub framebuffer: Framebuffer,
    pub shader: Option<String>,
    pub geometry_label: String,
    /// Current binding of every unit touched so far (`None` = unbound)
    pub textures: BTreeMap<u32, Option<TextureId>>,
    /// Units bound since the previous draw
    pub rebound_units: BTreeSet<u32>,
    pub uniforms: HashMap<String, UniformValue>,
}

impl DrawRecord {
    pub fn uniform(&self, name: &str) -> Option<UniformValue> {
        self.uniforms.get(name).copied()
    }
}

impl RenderContext for CommandList {
    fn bind_framebuffer(&mut self, target: Framebuffer) {
        self.commands.push(RenderCommand::BindFramebuffer(target));
    }

    fn clear(&mut self, color: Option<[f32; 3]>) {
        self.commands.push(RenderCommand::Clear(color));
    }

    fn use_shader(&mut self, shader: &Rc<Shader>) {
        self.commands.push(RenderCommand::UseShader(shader.clone()));
    }

    fn set_uniform(&mut self, name: &str, value: UniformValue) {
        self.commands.push(RenderCommand::SetUniform {
            name: name.to_string(),
            value,
        });
    }

    fn bind_texture(&mut self, unit: u32, texture: Option<&Rc<Texture>>) {
        self.commands.push(RenderCommand::BindTexture {
            unit,
            texture: texture.cloned(),
        });
    }

    fn draw(&mut self, geometry: &Arc<Geometry>) {
        self.commands.push(RenderCommand::DrawIndexed(geometry.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::geometry;

    #[test]
    fn test_draw_records_track_state() {
        let shader = Rc::new(Shader::from_source("flat", ""));
        let texture = Rc::new(Texture::from_rgba("white", 1, 1, vec![255; 4]));
        let mut list = CommandList::new();

        list.bind_framebuffer(Framebuffer::Shadow);
        list.use_shader(&shader);
        list.set_uniform("shininess", UniformValue::Float(8.0));
        list.bind_texture(0, Some(&texture));
        list.draw(&geometry::cube());
        list.bind_framebuffer(Framebuffer::Default);
        list.draw(&geometry::plane());

        let records = list.draw_records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].framebuffer, Framebuffer::Shadow);
        assert_eq!(records[0].shader.as_deref(), Some("flat"));
        assert_eq!(records[0].textures[&0], Some(texture.id()));
        assert!(records[0].rebound_units.contains(&0));

        // State persists, but nothing was rebound for the second draw
        assert_eq!(records[1].framebuffer, Framebuffer::Default);
        assert_eq!(records[1].uniform("shininess"), Some(UniformValue::Float(8.0)));
        assert!(records[1].rebound_units.is_empty());
        assert_eq!(list.draw_count(), 2);
    }
}
