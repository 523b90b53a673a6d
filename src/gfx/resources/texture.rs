//! Texture pool entries
//!
//! CPU copies of RGBA8 images. The render engine uploads each texture the
//! first time a draw binds it, keyed by [`TextureId`].

use std::{
    cell::RefCell,
    path::{Path, PathBuf},
    sync::atomic::{AtomicU64, Ordering},
};

use crate::error::ResourceError;

/// Largest width or height the render engine asks the device for
pub const MAX_TEXTURE_SIZE: u32 = 4096;

static NEXT_TEXTURE_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(u64);

#[derive(Debug)]
pub struct Texture {
    id: TextureId,
    name: String,
    path: Option<PathBuf>,
    width: u32,
    height: u32,
    /// `None` when loading failed; the entry stays in the pool so it can be
    /// shown, but it never reaches the GPU.
    pixels: Option<Vec<u8>>,
    error: RefCell<Option<String>>,
}

impl Texture {
    /// Wraps raw RGBA8 pixel data (4 bytes per pixel)
    pub fn from_rgba(name: &str, width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(pixels.len(), (width * height * 4) as usize);
        Self {
            id: TextureId(NEXT_TEXTURE_ID.fetch_add(1, Ordering::Relaxed)),
            name: name.to_string(),
            path: None,
            width,
            height,
            pixels: Some(pixels),
            error: RefCell::new(None),
        }
    }

    /// Decodes an image file; the texture is named after the file stem
    pub fn load(path: &Path) -> Result<Self, ResourceError> {
        let image = image::open(path).map_err(|source| ResourceError::Image {
            path: path.to_path_buf(),
            source,
        })?;
        // Flip so v = 0 is the bottom row, matching the mesh texcoords
        let rgba = image.flipv().into_rgba8();
        let (width, height) = rgba.dimensions();
        if width == 0 || height == 0 || width > MAX_TEXTURE_SIZE || height > MAX_TEXTURE_SIZE {
            return Err(ResourceError::TextureSize {
                path: path.to_path_buf(),
                width,
                height,
                max: MAX_TEXTURE_SIZE,
            });
        }

        let mut texture = Self::from_rgba(&stem(path), width, height, rgba.into_raw());
        texture.path = Some(path.to_path_buf());
        Ok(texture)
    }

    /// A pool placeholder for an image that could not be loaded
    pub fn invalid(path: &Path, error: &ResourceError) -> Self {
        log::error!("{}", error);
        Self {
            id: TextureId(NEXT_TEXTURE_ID.fetch_add(1, Ordering::Relaxed)),
            name: stem(path),
            path: Some(path.to_path_buf()),
            width: 0,
            height: 0,
            pixels: None,
            error: RefCell::new(Some(error.to_string())),
        }
    }

    pub fn id(&self) -> TextureId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn pixels(&self) -> Option<&[u8]> {
        self.pixels.as_deref()
    }

    pub fn is_valid(&self) -> bool {
        self.pixels.is_some() && self.error.borrow().is_none()
    }

    pub fn error(&self) -> Option<String> {
        self.error.borrow().clone()
    }

    /// Marks a texture the GPU refused; renderers fall back to unbound
    pub fn mark_invalid(&self, message: String) {
        log::error!("texture '{}' is invalid: {}", self.name, message);
        *self.error.borrow_mut() = Some(message);
    }
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unnamed".to_string())
}
