//! Mesh pool entries loaded from Wavefront OBJ files

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{
    error::ResourceError,
    gfx::geometry::{Geometry, Vertex3D},
};

#[derive(Debug)]
pub struct Mesh {
    name: String,
    path: Option<PathBuf>,
    /// `None` when the file failed to load
    geometry: Option<Arc<Geometry>>,
    error: Option<String>,
}

impl Mesh {
    pub fn from_geometry(name: &str, geometry: Arc<Geometry>) -> Self {
        Self {
            name: name.to_string(),
            path: None,
            geometry: Some(geometry),
            error: None,
        }
    }

    /// Loads an OBJ file, merging every model it contains into one geometry.
    ///
    /// Normals are taken from the file when present for every position,
    /// otherwise they are averaged from the faces.
    pub fn load(path: &Path) -> Result<Self, ResourceError> {
        let (models, _materials) = tobj::load_obj(
            path,
            &tobj::LoadOptions {
                triangulate: true,
                single_index: true,
                ..Default::default()
            },
        )
        .map_err(|source| ResourceError::Obj {
            path: path.to_path_buf(),
            source,
        })?;

        let mut vertices = Vec::new();
        let mut indices = Vec::new();

        for model in &models {
            let mesh = &model.mesh;
            let base = vertices.len() as u32;

            let normals = if mesh.normals.len() == mesh.positions.len() {
                mesh.normals.clone()
            } else {
                log::debug!("'{}' has no usable normals, calculating them", model.name);
                Geometry::calculate_normals(&mesh.positions, &mesh.indices)
            };

            for i in 0..mesh.positions.len() / 3 {
                let tex_coords = if mesh.texcoords.len() >= (i + 1) * 2 {
                    [mesh.texcoords[i * 2], mesh.texcoords[i * 2 + 1]]
                } else {
                    [0.0, 0.0]
                };
                vertices.push(Vertex3D {
                    position: [
                        mesh.positions[i * 3],
                        mesh.positions[i * 3 + 1],
                        mesh.positions[i * 3 + 2],
                    ],
                    normal: [normals[i * 3], normals[i * 3 + 1], normals[i * 3 + 2]],
                    tex_coords,
                });
            }
            indices.extend(mesh.indices.iter().map(|index| base + index));
        }

        if indices.is_empty() {
            return Err(ResourceError::EmptyMesh(path.to_path_buf()));
        }

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unnamed".to_string());
        log::debug!(
            "loaded mesh '{}': {} models, {} vertices, {} triangles",
            name,
            models.len(),
            vertices.len(),
            indices.len() / 3
        );

        Ok(Self {
            geometry: Some(Arc::new(Geometry::new(&name, vertices, indices))),
            name,
            path: Some(path.to_path_buf()),
            error: None,
        })
    }

    /// A pool placeholder for a mesh that could not be loaded
    pub fn invalid(path: &Path, error: &ResourceError) -> Self {
        log::error!("{}", error);
        Self {
            name: path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "unnamed".to_string()),
            path: Some(path.to_path_buf()),
            geometry: None,
            error: Some(error.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn geometry(&self) -> Option<&Arc<Geometry>> {
        self.geometry.as_ref()
    }

    pub fn is_valid(&self) -> bool {
        self.geometry.is_some()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const QUAD_OBJ: &str = "\
o quad
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 1.0 0.0 1.0
v 0.0 0.0 1.0
f 1 3 2
f 1 4 3
";

    #[test]
    fn test_load_obj_without_normals() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quad.obj");
        fs::write(&path, QUAD_OBJ).unwrap();

        let mesh = Mesh::load(&path).unwrap();
        assert_eq!(mesh.name(), "quad");
        let geometry = mesh.geometry().unwrap();
        assert_eq!(geometry.vertices().len(), 4);
        assert_eq!(geometry.index_count(), 6);
        for vertex in geometry.vertices() {
            approx::assert_relative_eq!(vertex.normal[1].abs(), 1.0);
        }
    }

    #[test]
    fn test_empty_obj_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.obj");
        fs::write(&path, "o nothing\n").unwrap();

        let error = Mesh::load(&path).unwrap_err();
        let mesh = Mesh::invalid(&path, &error);
        assert!(!mesh.is_valid());
        assert_eq!(mesh.name(), "empty");
    }
}
