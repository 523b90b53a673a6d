//! # Geometry
//!
//! CPU-side vertex and index data shared between renderers and uploaded once
//! per [`GeometryId`] by the render engine.
//!
//! ## Key Components
//!
//! - [`GeometryData`] - Builder-style separate attribute arrays
//! - [`Geometry`] - Interleaved, immutable geometry with a stable id
//! - [`primitives`] - Unit cube and plane used by the built-in renderers
//!
//! Geometry is handed around as `Arc<Geometry>`; the cube and plane are
//! process-wide and created exactly once (see [`primitives::cube`]).

pub mod primitives;
pub mod vertex;

use std::sync::atomic::{AtomicU64, Ordering};

pub use primitives::{cube, plane};
pub use vertex::Vertex3D;

static NEXT_GEOMETRY_ID: AtomicU64 = AtomicU64::new(1);

/// Identifies one geometry allocation for GPU buffer caching
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeometryId(u64);

/// Represents generated geometry data ready for interleaving
#[derive(Debug, Clone, Default)]
pub struct GeometryData {
    /// Vertex positions (x, y, z)
    pub vertices: Vec<[f32; 3]>,
    /// Texture coordinates (u, v)
    pub tex_coords: Vec<[f32; 2]>,
    /// Normal vectors (x, y, z)
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices (counter-clockwise winding)
    pub indices: Vec<u32>,
}

impl GeometryData {
    /// Create a new empty geometry data structure
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of vertices in this geometry
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of triangles in this geometry
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Interleaves the attribute arrays into an immutable [`Geometry`].
    ///
    /// Missing normals default to +Y and missing texture coordinates to zero.
    pub fn build(self, label: &str) -> Geometry {
        let vertices = self
            .vertices
            .iter()
            .enumerate()
            .map(|(i, position)| Vertex3D {
                position: *position,
                normal: self.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
                tex_coords: self.tex_coords.get(i).copied().unwrap_or([0.0, 0.0]),
            })
            .collect();

        Geometry::new(label, vertices, self.indices)
    }
}

/// Immutable interleaved geometry
#[derive(Debug)]
pub struct Geometry {
    id: GeometryId,
    label: String,
    vertices: Vec<Vertex3D>,
    indices: Vec<u32>,
}

impl Geometry {
    pub fn new(label: &str, vertices: Vec<Vertex3D>, indices: Vec<u32>) -> Self {
        Self {
            id: GeometryId(NEXT_GEOMETRY_ID.fetch_add(1, Ordering::Relaxed)),
            label: label.to_string(),
            vertices,
            indices,
        }
    }

    pub fn id(&self) -> GeometryId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn vertices(&self) -> &[Vertex3D] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    /// Smooth per-vertex normals averaged from the faces touching each vertex.
    ///
    /// Used for meshes whose source file carries no normals.
    pub fn calculate_normals(positions: &[f32], indices: &[u32]) -> Vec<f32> {
        let vertex_count = positions.len() / 3;
        let mut normals = vec![0.0; positions.len()];

        let vertex = |i: usize| {
            cgmath::Vector3::new(positions[i * 3], positions[i * 3 + 1], positions[i * 3 + 2])
        };

        for triangle in indices.chunks_exact(3) {
            let (i0, i1, i2) = (
                triangle[0] as usize,
                triangle[1] as usize,
                triangle[2] as usize,
            );
            if i0.max(i1).max(i2) >= vertex_count {
                continue;
            }
            let face_normal = (vertex(i1) - vertex(i0)).cross(vertex(i2) - vertex(i0));
            for index in [i0, i1, i2] {
                normals[index * 3] += face_normal.x;
                normals[index * 3 + 1] += face_normal.y;
                normals[index * 3 + 2] += face_normal.z;
            }
        }

        for normal in normals.chunks_exact_mut(3) {
            let length = (normal[0].powi(2) + normal[1].powi(2) + normal[2].powi(2)).sqrt();
            if length > 0.0 {
                normal.iter_mut().for_each(|n| *n /= length);
            }
        }

        normals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_fills_missing_attributes() {
        let mut data = GeometryData::new();
        data.vertices = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]];
        data.indices = vec![0, 1, 2];

        let geometry = data.build("triangle");
        assert_eq!(geometry.vertices().len(), 3);
        assert_eq!(geometry.vertices()[1].normal, [0.0, 1.0, 0.0]);
        assert_eq!(geometry.index_count(), 3);
    }

    #[test]
    fn test_geometry_ids_are_unique() {
        let a = GeometryData::new().build("a");
        let b = GeometryData::new().build("b");
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_calculated_normals_face_up() {
        let positions = [0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0];
        let normals = Geometry::calculate_normals(&positions, &[0, 1, 2]);
        for normal in normals.chunks_exact(3) {
            assert_eq!(normal, [0.0, 1.0, 0.0]);
        }
    }
}
