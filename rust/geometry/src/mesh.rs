// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh data structures

use nalgebra::{Matrix4, Point3, Vector3};

/// Triangle mesh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// Vertex positions (x, y, z)
    pub positions: Vec<f32>,
    /// Vertex normals (nx, ny, nz); empty until computed
    pub normals: Vec<f32>,
    /// Triangle indices (i0, i1, i2)
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mesh with capacity
    pub fn with_capacity(vertex_count: usize, index_count: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertex_count * 3),
            normals: Vec::with_capacity(vertex_count * 3),
            indices: Vec::with_capacity(index_count),
        }
    }

    /// Add a vertex with normal, returning its index
    #[inline]
    pub fn add_vertex(&mut self, position: Point3<f64>, normal: Vector3<f64>) -> u32 {
        let index = self.vertex_count() as u32;
        self.positions
            .extend_from_slice(&[position.x as f32, position.y as f32, position.z as f32]);
        self.normals
            .extend_from_slice(&[normal.x as f32, normal.y as f32, normal.z as f32]);
        index
    }

    #[inline]
    pub fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        self.indices.extend_from_slice(&[i0, i1, i2]);
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty() || self.positions.is_empty()
    }

    /// Vertex position as f64
    #[inline]
    pub fn position(&self, index: usize) -> Point3<f64> {
        let i = index * 3;
        Point3::new(
            self.positions[i] as f64,
            self.positions[i + 1] as f64,
            self.positions[i + 2] as f64,
        )
    }

    /// Append another mesh, offsetting its indices
    pub fn merge(&mut self, other: &Mesh) {
        if other.is_empty() {
            return;
        }
        let offset = self.vertex_count() as u32;

        // Keep normals aligned with positions when only one side has them
        if self.normals.len() != self.positions.len() || other.normals.len() != other.positions.len() {
            self.normals.clear();
        } else {
            self.normals.extend_from_slice(&other.normals);
        }

        self.positions.extend_from_slice(&other.positions);
        self.indices.extend(other.indices.iter().map(|i| i + offset));
    }

    /// Merge many meshes into one
    pub fn merge_all<'m>(meshes: impl IntoIterator<Item = &'m Mesh>) -> Mesh {
        let mut combined = Mesh::new();
        for mesh in meshes {
            combined.merge(mesh);
        }
        combined
    }

    /// Apply an affine transform to positions and normals
    ///
    /// Mirroring transforms flip the triangle winding so faces stay outward.
    pub fn transform(&mut self, matrix: &Matrix4<f64>) {
        if matrix.fixed_view::<3, 3>(0, 0).determinant() < 0.0 {
            for tri in self.indices.chunks_exact_mut(3) {
                tri.swap(1, 2);
            }
        }

        for chunk in self.positions.chunks_exact_mut(3) {
            let p = matrix.transform_point(&Point3::new(
                chunk[0] as f64,
                chunk[1] as f64,
                chunk[2] as f64,
            ));
            chunk[0] = p.x as f32;
            chunk[1] = p.y as f32;
            chunk[2] = p.z as f32;
        }

        if self.normals.is_empty() {
            return;
        }
        let linear = matrix.fixed_view::<3, 3>(0, 0).into_owned();
        let normal_matrix = linear
            .try_inverse()
            .map(|m| m.transpose())
            .unwrap_or(linear);
        for chunk in self.normals.chunks_exact_mut(3) {
            let n = normal_matrix
                * Vector3::new(chunk[0] as f64, chunk[1] as f64, chunk[2] as f64);
            let n = n.try_normalize(1e-12).unwrap_or(n);
            chunk[0] = n.x as f32;
            chunk[1] = n.y as f32;
            chunk[2] = n.z as f32;
        }
    }

    /// Uniformly scale positions
    pub fn scale(&mut self, factor: f64) {
        if (factor - 1.0).abs() < f64::EPSILON {
            return;
        }
        for value in &mut self.positions {
            *value = (*value as f64 * factor) as f32;
        }
    }

    /// Convert from the IFC Z-up frame to a Y-up frame: (x, y, z) -> (x, z, -y)
    pub fn to_y_up(&mut self) {
        for chunk in self.positions.chunks_exact_mut(3).chain(self.normals.chunks_exact_mut(3)) {
            let (y, z) = (chunk[1], chunk[2]);
            chunk[1] = z;
            chunk[2] = -y;
        }
    }

    /// Un-index the mesh so every triangle carries its own face normal
    pub fn into_flat_shaded(self) -> Mesh {
        let mut flat = Mesh::with_capacity(self.indices.len(), self.indices.len());
        for tri in self.indices.chunks_exact(3) {
            let (a, b, c) = (
                self.position(tri[0] as usize),
                self.position(tri[1] as usize),
                self.position(tri[2] as usize),
            );
            let Some(normal) = (b - a).cross(&(c - a)).try_normalize(1e-12) else {
                // Degenerate triangle
                continue;
            };
            let i0 = flat.add_vertex(a, normal);
            let i1 = flat.add_vertex(b, normal);
            let i2 = flat.add_vertex(c, normal);
            flat.add_triangle(i0, i1, i2);
        }
        flat
    }

    /// Axis-aligned bounds `(min, max)`, `None` when empty
    pub fn bounds(&self) -> Option<(Point3<f32>, Point3<f32>)> {
        let mut chunks = self.positions.chunks_exact(3);
        let first = chunks.next()?;
        let mut min = Point3::new(first[0], first[1], first[2]);
        let mut max = min;
        for c in chunks {
            min = Point3::new(min.x.min(c[0]), min.y.min(c[1]), min.z.min(c[2]));
            max = Point3::new(max.x.max(c[0]), max.y.max(c[1]), max.z.max(c[2]));
        }
        Some((min, max))
    }

    /// Drop triangles that index past the vertex buffer
    pub fn retain_valid_triangles(&mut self) {
        let count = self.vertex_count() as u32;
        let mut kept = Vec::with_capacity(self.indices.len());
        for tri in self.indices.chunks_exact(3) {
            if tri.iter().all(|&i| i < count) {
                kept.extend_from_slice(tri);
            }
        }
        self.indices = kept;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn triangle() -> Mesh {
        Mesh {
            positions: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            normals: Vec::new(),
            indices: vec![0, 1, 2],
        }
    }

    #[test]
    fn test_merge_offsets_indices() {
        let mut mesh = triangle();
        mesh.merge(&triangle());
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.indices, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_flat_normals() {
        let flat = triangle().into_flat_shaded();
        assert_eq!(flat.normals.len(), 9);
        assert_relative_eq!(flat.normals[2], 1.0);
    }

    #[test]
    fn test_y_up_conversion() {
        let mut mesh = Mesh {
            positions: vec![1.0, 2.0, 3.0],
            normals: vec![0.0, 0.0, 1.0],
            indices: vec![0, 0, 0],
        };
        mesh.to_y_up();
        assert_eq!(mesh.positions, vec![1.0, 3.0, -2.0]);
        assert_eq!(mesh.normals, vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_transform_and_bounds() {
        let mut mesh = triangle();
        mesh.transform(&Matrix4::new_translation(&Vector3::new(10.0, 0.0, 0.0)));
        mesh.scale(0.5);
        let (min, max) = mesh.bounds().unwrap();
        assert_relative_eq!(min.x, 5.0);
        assert_relative_eq!(max.x, 5.5);
        assert_relative_eq!(max.y, 0.5);
    }

    #[test]
    fn test_mirror_flips_winding() {
        let mut mesh = triangle();
        mesh.transform(&Matrix4::new_nonuniform_scaling(&Vector3::new(-1.0, 1.0, 1.0)));
        assert_eq!(mesh.indices, vec![0, 2, 1]);
        let flat = mesh.into_flat_shaded();
        assert_relative_eq!(flat.normals[2], 1.0);
    }

    #[test]
    fn test_retain_valid_triangles() {
        let mut mesh = triangle();
        mesh.indices.extend_from_slice(&[0, 1, 7]);
        mesh.retain_valid_triangles();
        assert_eq!(mesh.triangle_count(), 1);
    }
}
