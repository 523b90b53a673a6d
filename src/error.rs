//! Error types for the editor
//!
//! Errors are split by how far they reach:
//! - [`LoadError`] aborts a whole scene load (structural problems in a file)
//! - [`SaveError`] reports a scene that could not be written
//! - [`ResourceError`] marks a single pool entry invalid
//! - [`SceneError`] rejects a single edit to the object graph
//! - [`RenderError`] reports GPU side failures (adapter, device, surface)
//! - [`UniformError`] rejects a uniform write that the shader interface lacks

use std::path::PathBuf;

use thiserror::Error;

/// Structural failure while reading a scene file.
///
/// Any of these aborts the load; the running scene is left untouched.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read scene file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed scene document: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("unknown component '{0}'")]
    UnknownComponent(String),

    #[error("component '{component}' is missing field '{field}'")]
    MissingField {
        component: String,
        field: &'static str,
    },

    #[error("component '{component}' has an invalid '{field}': {reason}")]
    InvalidField {
        component: String,
        field: &'static str,
        reason: String,
    },

    #[error("object '{object}' is malformed: {reason}")]
    InvalidObject { object: String, reason: String },

    #[error("object '{object}' has more than one '{component}' component")]
    DuplicateComponent { object: String, component: String },
}

/// Failure while writing a scene file.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("failed to write scene file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode scene: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Failure to load or compile a shared resource.
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to load mesh {path}: {source}")]
    Obj {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },

    #[error("mesh {0} contains no geometry")]
    EmptyMesh(PathBuf),

    #[error("image {path} is {width}x{height}; textures must be 1 to {max} pixels per side")]
    TextureSize {
        path: PathBuf,
        width: u32,
        height: u32,
        max: u32,
    },
}

/// Rejected edit to the object graph.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SceneError {
    #[error("object already has a '{0}' component")]
    DuplicateComponent(String),

    #[error("no object with id {0}")]
    ObjectNotFound(u64),

    #[error("no blueprint at index {0}")]
    BlueprintNotFound(usize),

    #[error("no component kind named '{0}'")]
    UnknownComponent(String),
}

/// GPU side failure.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("no suitable GPU adapter: {0}")]
    Adapter(String),

    #[error("failed to create GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("surface texture unavailable: {0}")]
    SurfaceTexture(#[from] wgpu::SurfaceError),
}

/// A uniform write that does not match the shader interface.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UniformError {
    #[error("unknown uniform '{0}'")]
    Unknown(String),

    #[error("uniform '{name}' expects a {expected} value")]
    TypeMismatch { name: String, expected: &'static str },

    #[error("point light index {0} is out of range")]
    LightIndex(usize),
}
