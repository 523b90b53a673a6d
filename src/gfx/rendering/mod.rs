//! Core rendering functionality
//!
//! Replays recorded frame commands on the GPU: pipeline management, the
//! named uniform interface, GPU textures and the built-in WGSL shaders.

pub mod pipeline_manager;
pub mod render_engine;
pub mod texture_resource;
pub mod uniforms;

// Re-export main types
pub use pipeline_manager::{PassKind, PipelineConfig, PipelineManager};
pub use render_engine::{RenderEngine, SHADOW_MAP_SIZE};
pub use texture_resource::TextureResource;
pub use uniforms::{ShaderUniforms, UniformState, MAX_LIGHTS};
