//! Shared resource pools
//!
//! Shaders, textures and meshes live in [`Resources`], owned by the scene.
//! Components hold `Rc` handles into these pools; the UI refers to entries by
//! pool index (the drag-and-drop payload) and save files by name.
//!
//! Loading never fails as a whole: an entry that cannot be read stays in its
//! pool marked invalid, and consumers check `is_valid()` before use.

pub mod mesh;
pub mod shader;
pub mod texture;

use std::{
    fs,
    path::{Path, PathBuf},
    rc::Rc,
};

pub use mesh::Mesh;
pub use shader::{Shader, ShaderId};
pub use texture::{Texture, TextureId};

use shader::{
    DEFAULT_SHADER_NAME, DEFAULT_SHADER_SOURCE, SHADOW_SHADER_NAME, SHADOW_SHADER_SOURCE,
};

/// Drag-and-drop payload tags; each carries a `usize` pool index
pub const SHADER_PAYLOAD: &str = "SHADER";
pub const TEXTURE_PAYLOAD: &str = "TEXTURE";
pub const MESH_PAYLOAD: &str = "MESH";

const TEXTURE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "bmp", "tga"];

/// Summary of one [`Resources::load_assets`] call
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AssetReport {
    pub shaders: usize,
    pub textures: usize,
    pub meshes: usize,
    pub failed: usize,
}

pub struct Resources {
    pub shaders: Vec<Rc<Shader>>,
    pub textures: Vec<Rc<Texture>>,
    pub meshes: Vec<Rc<Mesh>>,
}

impl Default for Resources {
    fn default() -> Self {
        Self::new()
    }
}

impl Resources {
    /// Creates pools holding the built-in shaders.
    ///
    /// `default` is always index 0 and is the fallback for renderers without
    /// a shader of their own.
    pub fn new() -> Self {
        Self {
            shaders: vec![
                Rc::new(Shader::from_source(DEFAULT_SHADER_NAME, DEFAULT_SHADER_SOURCE)),
                Rc::new(Shader::from_source(SHADOW_SHADER_NAME, SHADOW_SHADER_SOURCE)),
            ],
            textures: Vec::new(),
            meshes: Vec::new(),
        }
    }

    pub fn default_shader(&self) -> Option<&Rc<Shader>> {
        self.shaders.first()
    }

    pub fn shadow_shader(&self) -> Option<&Rc<Shader>> {
        self.shader(SHADOW_SHADER_NAME)
    }

    pub fn shader(&self, name: &str) -> Option<&Rc<Shader>> {
        self.shaders.iter().find(|s| s.name() == name)
    }

    pub fn texture(&self, name: &str) -> Option<&Rc<Texture>> {
        self.textures.iter().find(|t| t.name() == name)
    }

    pub fn mesh(&self, name: &str) -> Option<&Rc<Mesh>> {
        self.meshes.iter().find(|m| m.name() == name)
    }

    /// Scans `path` recursively and adds every shader, texture and mesh found.
    ///
    /// # Arguments
    /// * `path` - Asset root, `./res` by default
    ///
    /// # Returns
    /// Counts of what was added. Failed files are still added as invalid
    /// entries and counted in `failed` as well.
    pub fn load_assets(&mut self, path: impl AsRef<Path>) -> AssetReport {
        let root = path.as_ref();
        let mut files = Vec::new();
        if let Err(e) = collect_files(root, &mut files) {
            log::error!("failed to scan asset directory {}: {}", root.display(), e);
            return AssetReport::default();
        }
        files.sort();

        let mut report = AssetReport::default();
        for file in files {
            let Some(extension) = file
                .extension()
                .map(|e| e.to_string_lossy().to_ascii_lowercase())
            else {
                continue;
            };

            match extension.as_str() {
                "wgsl" => {
                    report.shaders += 1;
                    let shader = Shader::load(&file).unwrap_or_else(|e| {
                        report.failed += 1;
                        Shader::invalid(&file, &e)
                    });
                    self.shaders.push(Rc::new(shader));
                }
                "obj" => {
                    report.meshes += 1;
                    let mesh = Mesh::load(&file).unwrap_or_else(|e| {
                        report.failed += 1;
                        Mesh::invalid(&file, &e)
                    });
                    self.meshes.push(Rc::new(mesh));
                }
                ext if TEXTURE_EXTENSIONS.contains(&ext) => {
                    report.textures += 1;
                    let texture = Texture::load(&file).unwrap_or_else(|e| {
                        report.failed += 1;
                        Texture::invalid(&file, &e)
                    });
                    self.textures.push(Rc::new(texture));
                }
                _ => {}
            }
        }

        log::info!(
            "loaded assets from {}: {} shaders, {} textures, {} meshes ({} failed)",
            root.display(),
            report.shaders,
            report.textures,
            report.meshes,
            report.failed
        );
        report
    }
}

fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_files(&path, files)?;
        } else {
            files.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_shaders_registered() {
        let resources = Resources::new();
        assert_eq!(resources.default_shader().unwrap().name(), "default");
        assert!(resources.shadow_shader().is_some());
        assert!(resources.textures.is_empty());
    }

    #[test]
    fn test_load_assets_scans_tree() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("shaders");
        fs::create_dir(&nested).unwrap();
        fs::write(nested.join("toon.wgsl"), shader::DEFAULT_SHADER_SOURCE).unwrap();
        fs::write(dir.path().join("broken.png"), b"not an image").unwrap();
        fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();
        image::RgbaImage::new(4, 4)
            .save(dir.path().join("white.png"))
            .unwrap();

        let mut resources = Resources::new();
        let report = resources.load_assets(dir.path());

        assert_eq!(report.shaders, 1);
        assert_eq!(report.textures, 2);
        assert_eq!(report.failed, 1);
        assert!(resources.shader("toon").unwrap().is_valid());
        assert!(!resources.texture("broken").unwrap().is_valid());
        assert!(resources.texture("white").unwrap().is_valid());
    }

    #[test]
    fn test_missing_directory_loads_nothing() {
        let mut resources = Resources::new();
        let report = resources.load_assets("definitely/not/here");
        assert_eq!(report, AssetReport::default());
        assert_eq!(resources.shaders.len(), 2);
    }
}
