//! WGPU utility functions and helpers

pub mod binding_types;

pub use binding_types::*;
