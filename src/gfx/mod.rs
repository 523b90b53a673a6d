//! # Graphics Module
//!
//! Everything between the scene and the GPU.
//!
//! ## Architecture Overview
//!
//! - **Geometry** ([`geometry`]) - Vertex format and the shared cube/plane
//! - **Resources** ([`resources`]) - Shader, texture and mesh pools
//! - **Commands** ([`commands`]) - What the scene asks the GPU to do each frame
//! - **Rendering** ([`rendering`]) - wgpu backend replaying those commands
//!
//! The scene records a [`CommandList`] through the [`RenderContext`] trait and
//! the [`RenderEngine`] turns it into render passes. Keeping the GPU behind a
//! recorded list lets the scene's render logic run in tests without a device.

pub mod commands;
pub mod geometry;
pub mod rendering;
pub mod resources;

// Re-export commonly used types
pub use commands::{CommandList, Framebuffer, RenderCommand, RenderContext, UniformValue};
pub use rendering::render_engine::RenderEngine;
pub use resources::Resources;
