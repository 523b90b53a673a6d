//! Built-in component kinds
//!
//! - [`transform::Transform`] - Local position, rotation and scale
//! - [`light::Light`] - Point and directional lights
//! - [`camera::Camera`] - Perspective camera
//! - [`renderer`] - Cube, plane and mesh renderers sharing a [`renderer::Material`]
//! - [`script`] - `Spin` and `Bob` animation scripts

pub mod camera;
pub mod light;
pub mod renderer;
pub mod script;
pub mod transform;

use super::component::ComponentRegistry;

pub use camera::Camera;
pub use light::{Light, LightType};
pub use renderer::{
    cube::CubeRenderer, mesh::MeshRenderer, plane::PlaneRenderer, Material, RenderMode, Renderer,
};
pub use script::{Bob, Spin};
pub use transform::Transform;

/// Registry holding every built-in kind, in "Add Component" menu order
pub fn builtin_registry() -> ComponentRegistry {
    let mut registry = ComponentRegistry::new();
    registry.register(Transform::NAME, |owner| Box::new(Transform::new(owner)));
    registry.register(Light::NAME, |owner| Box::new(Light::new(owner)));
    registry.register(Camera::NAME, |owner| Box::new(Camera::new(owner)));
    registry.register(CubeRenderer::NAME, |owner| Box::new(CubeRenderer::new(owner)));
    registry.register(PlaneRenderer::NAME, |owner| Box::new(PlaneRenderer::new(owner)));
    registry.register(MeshRenderer::NAME, |owner| Box::new(MeshRenderer::new(owner)));
    registry.register(Spin::NAME, |owner| Box::new(Spin::new(owner)));
    registry.register(Bob::NAME, |owner| Box::new(Bob::new(owner)));
    registry
}
