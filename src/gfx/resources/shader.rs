//! Shader pool entries
//!
//! A [`Shader`] is a named WGSL module exposing `vs_main` and `fs_main`. It is
//! shared by reference (`Rc<Shader>`) between every renderer that uses it, so
//! edits through [`Shader::set_source`] are seen by all of them at once. The
//! render engine compiles lazily and rebuilds pipelines whenever the
//! [`revision`](Shader::revision) changes.

use std::{
    cell::{Cell, RefCell},
    fs,
    path::{Path, PathBuf},
    sync::atomic::{AtomicU64, Ordering},
};

use crate::error::ResourceError;

/// Built-in forward shading module; always pool index 0
pub const DEFAULT_SHADER_SOURCE: &str = include_str!("../rendering/shaders/default.wgsl");
/// Built-in depth-only module used as the shadow pass override
pub const SHADOW_SHADER_SOURCE: &str = include_str!("../rendering/shaders/shadow.wgsl");

pub const DEFAULT_SHADER_NAME: &str = "default";
pub const SHADOW_SHADER_NAME: &str = "shadow";

static NEXT_SHADER_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShaderId(u64);

#[derive(Debug)]
pub struct Shader {
    id: ShaderId,
    name: String,
    path: Option<PathBuf>,
    source: RefCell<String>,
    revision: Cell<u64>,
    error: RefCell<Option<String>>,
}

impl Shader {
    /// Creates a shader from in-memory WGSL source
    pub fn from_source(name: &str, source: &str) -> Self {
        Self {
            id: ShaderId(NEXT_SHADER_ID.fetch_add(1, Ordering::Relaxed)),
            name: name.to_string(),
            path: None,
            source: RefCell::new(source.to_string()),
            revision: Cell::new(0),
            error: RefCell::new(None),
        }
    }

    /// Reads a `.wgsl` file; the shader is named after the file stem
    pub fn load(path: &Path) -> Result<Self, ResourceError> {
        let source = fs::read_to_string(path).map_err(|source| ResourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut shader = Self::from_source(&stem(path), &source);
        shader.path = Some(path.to_path_buf());
        Ok(shader)
    }

    /// A pool placeholder for a shader that could not be loaded.
    ///
    /// It keeps its slot and name so references stay resolvable, but
    /// [`is_valid`](Self::is_valid) reports false and renderers skip it.
    pub fn invalid(path: &Path, error: &ResourceError) -> Self {
        let mut shader = Self::from_source(&stem(path), "");
        shader.path = Some(path.to_path_buf());
        shader.mark_invalid(error.to_string());
        shader
    }

    pub fn id(&self) -> ShaderId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn source(&self) -> String {
        self.source.borrow().clone()
    }

    /// Replaces the source; the next frame recompiles it for every user
    pub fn set_source(&self, source: &str) {
        *self.source.borrow_mut() = source.to_string();
        *self.error.borrow_mut() = None;
        self.revision.set(self.revision.get() + 1);
    }

    /// Re-reads the file this shader was loaded from
    pub fn reload(&self) -> Result<(), ResourceError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let source = fs::read_to_string(path).map_err(|source| ResourceError::Io {
            path: path.clone(),
            source,
        })?;
        self.set_source(&source);
        Ok(())
    }

    pub fn revision(&self) -> u64 {
        self.revision.get()
    }

    pub fn is_valid(&self) -> bool {
        self.error.borrow().is_none()
    }

    pub fn error(&self) -> Option<String> {
        self.error.borrow().clone()
    }

    pub fn mark_invalid(&self, message: String) {
        log::error!("shader '{}' is invalid: {}", self.name, message);
        *self.error.borrow_mut() = Some(message);
    }
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unnamed".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_source_bumps_revision_and_clears_error() {
        let shader = Shader::from_source("unlit", "fn vs_main() {}");
        shader.mark_invalid("boom".into());
        assert!(!shader.is_valid());

        shader.set_source("fn fs_main() {}");
        assert!(shader.is_valid());
        assert_eq!(shader.revision(), 1);
        assert_eq!(shader.source(), "fn fs_main() {}");
    }

    #[test]
    fn test_missing_file_becomes_invalid_placeholder() {
        let path = Path::new("does/not/exist/toon.wgsl");
        let error = Shader::load(path).unwrap_err();
        let shader = Shader::invalid(path, &error);
        assert_eq!(shader.name(), "toon");
        assert!(!shader.is_valid());
    }

    #[test]
    fn test_builtin_sources_expose_entry_points() {
        assert!(DEFAULT_SHADER_SOURCE.contains("fn vs_main"));
        assert!(DEFAULT_SHADER_SOURCE.contains("fn fs_main"));
        assert!(SHADOW_SHADER_SOURCE.contains("fn vs_main"));
    }
}
