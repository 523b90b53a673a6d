//! # Primitive Shapes
//!
//! The unit cube and unit plane drawn by `CubeRenderer` and `PlaneRenderer`.
//! Both are process-wide: the first renderer of a kind builds the geometry
//! and every later instance shares the same `Arc`. The GPU side caches by
//! [`GeometryId`](super::GeometryId), so the buffers are uploaded once too.

use std::sync::{Arc, OnceLock};

use super::{Geometry, GeometryData};

static CUBE: OnceLock<Arc<Geometry>> = OnceLock::new();
static PLANE: OnceLock<Arc<Geometry>> = OnceLock::new();

/// Shared unit cube, built on first use.
pub fn cube() -> Arc<Geometry> {
    CUBE.get_or_init(|| Arc::new(generate_cube().build("Cube"))).clone()
}

/// Shared unit plane, built on first use.
pub fn plane() -> Arc<Geometry> {
    PLANE.get_or_init(|| Arc::new(generate_plane().build("Plane"))).clone()
}

/// Generate a unit cube centered at the origin
///
/// Vertices span -0.5 to 0.5 on all axes. Each face has its own four
/// vertices so normals stay flat, drawn as two triangles.
#[rustfmt::skip]
pub fn generate_cube() -> GeometryData {
    let mut data = GeometryData::new();

    data.vertices = vec![
        // Back face (-Z)
        [-0.5, -0.5, -0.5], [0.5, -0.5, -0.5], [0.5, 0.5, -0.5], [-0.5, 0.5, -0.5],
        // Front face (+Z)
        [-0.5, -0.5, 0.5], [0.5, -0.5, 0.5], [0.5, 0.5, 0.5], [-0.5, 0.5, 0.5],
        // Left face (-X)
        [-0.5, 0.5, 0.5], [-0.5, 0.5, -0.5], [-0.5, -0.5, -0.5], [-0.5, -0.5, 0.5],
        // Right face (+X)
        [0.5, 0.5, 0.5], [0.5, 0.5, -0.5], [0.5, -0.5, -0.5], [0.5, -0.5, 0.5],
        // Bottom face (-Y)
        [-0.5, -0.5, -0.5], [0.5, -0.5, -0.5], [0.5, -0.5, 0.5], [-0.5, -0.5, 0.5],
        // Top face (+Y)
        [-0.5, 0.5, -0.5], [0.5, 0.5, -0.5], [0.5, 0.5, 0.5], [-0.5, 0.5, 0.5],
    ];

    let face_normals: [[f32; 3]; 6] = [
        [0.0, 0.0, -1.0],
        [0.0, 0.0, 1.0],
        [-1.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, -1.0, 0.0],
        [0.0, 1.0, 0.0],
    ];
    data.normals = face_normals
        .iter()
        .flat_map(|normal| std::iter::repeat(*normal).take(4))
        .collect();

    data.tex_coords = vec![
        [0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0],
        [0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0],
        [1.0, 1.0], [0.0, 1.0], [0.0, 0.0], [1.0, 0.0],
        [0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0],
        [0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0],
        [0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0],
    ];

    data.indices = (0..6u32)
        .flat_map(|face| {
            let base = face * 4;
            [base, base + 1, base + 2, base + 2, base + 3, base]
        })
        .collect();

    data
}

/// Generate a flat 2x2 plane in XZ centered at the origin, facing +Y
pub fn generate_plane() -> GeometryData {
    let mut data = GeometryData::new();

    data.vertices = vec![
        [-1.0, 0.0, -1.0],
        [-1.0, 0.0, 1.0],
        [1.0, 0.0, -1.0],
        [1.0, 0.0, 1.0],
    ];
    data.normals = vec![[0.0, 1.0, 0.0]; 4];
    data.tex_coords = vec![[0.0, 1.0], [0.0, 0.0], [1.0, 1.0], [1.0, 0.0]];
    // Two halves, counter-clockwise seen from above
    data.indices = vec![0, 1, 2, 2, 1, 3];

    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_generation() {
        let cube = generate_cube();
        assert_eq!(cube.vertex_count(), 24); // 6 faces * 4 vertices
        assert_eq!(cube.indices.len(), 36); // 6 faces * 2 triangles * 3 indices
        assert_eq!(cube.normals.len(), 24);
        assert_eq!(cube.triangle_count(), 12);
    }

    #[test]
    fn test_plane_generation() {
        let plane = generate_plane();
        assert_eq!(plane.vertex_count(), 4);
        assert_eq!(plane.triangle_count(), 2);
    }

    #[test]
    fn test_shared_geometry_is_built_once() {
        let first = cube();
        for _ in 0..100 {
            assert!(Arc::ptr_eq(&first, &cube()));
        }
        assert_eq!(first.id(), cube().id());
        assert!(!Arc::ptr_eq(&first, &plane()));
        assert!(Arc::ptr_eq(&plane(), &plane()));
    }
}
