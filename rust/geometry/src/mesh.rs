// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Owned triangle mesh.
//!
//! Positions are f64 for repair/decimation math; the GLB codec converts to
//! f32 at the container boundary. Faces use counter-clockwise winding when
//! viewed from outside, so normals point outward by the right-hand rule.

use nalgebra::{Point3, Vector3};
use rustc_hash::FxHashMap;
use scenesmith_core::UpAxis;

/// Triangle mesh with optional per-vertex color and UV attributes
#[derive(Debug, Clone, Default)]
pub struct TriMesh {
    /// Vertex positions
    pub positions: Vec<Point3<f64>>,
    /// Triangle faces as indices into the vertex array
    pub faces: Vec<[u32; 3]>,
    /// Optional RGBA8 vertex colors, parallel to `positions`
    pub colors: Option<Vec<[u8; 4]>>,
    /// Optional UV coordinates, parallel to `positions`
    pub uvs: Option<Vec<[f32; 2]>>,
}

impl TriMesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mesh with pre-allocated capacity
    pub fn with_capacity(vertex_count: usize, face_count: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertex_count),
            faces: Vec::with_capacity(face_count),
            colors: None,
            uvs: None,
        }
    }

    /// Create a mesh from vertices and faces
    pub fn from_parts(positions: Vec<Point3<f64>>, faces: Vec<[u32; 3]>) -> Self {
        Self {
            positions,
            faces,
            colors: None,
            uvs: None,
        }
    }

    /// Get vertex count
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Get triangle count
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if mesh has no geometry
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() || self.faces.is_empty()
    }

    /// Axis-aligned bounds (min, max); origin twice for an empty mesh
    pub fn bounds(&self) -> (Point3<f64>, Point3<f64>) {
        if self.positions.is_empty() {
            return (Point3::origin(), Point3::origin());
        }
        let mut min = Point3::new(f64::MAX, f64::MAX, f64::MAX);
        let mut max = Point3::new(f64::MIN, f64::MIN, f64::MIN);
        for p in &self.positions {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
        }
        (min, max)
    }

    /// Axis-aligned bounding-box size
    pub fn extents(&self) -> Vector3<f64> {
        let (min, max) = self.bounds();
        max - min
    }

    /// Average of all vertex positions
    pub fn centroid(&self) -> Point3<f64> {
        if self.positions.is_empty() {
            return Point3::origin();
        }
        let mut sum = Vector3::zeros();
        for p in &self.positions {
            sum += p.coords;
        }
        Point3::from(sum / self.positions.len() as f64)
    }

    /// Translation that moves the pivot to base-center: lateral bounding-box
    /// center at the origin, up-axis minimum at zero.
    pub fn base_center_offset(&self, up_axis: UpAxis) -> Vector3<f64> {
        let (min, max) = self.bounds();
        let (lat_a, lat_b) = up_axis.lateral_indices();
        let up = up_axis.index();

        let mut offset = Vector3::zeros();
        offset[lat_a] = -(min[lat_a] + max[lat_a]) / 2.0;
        offset[lat_b] = -(min[lat_b] + max[lat_b]) / 2.0;
        offset[up] = -min[up];
        offset
    }

    /// Scale each axis independently about the origin
    pub fn apply_scale(&mut self, scale: Vector3<f64>) {
        for p in &mut self.positions {
            p.x *= scale.x;
            p.y *= scale.y;
            p.z *= scale.z;
        }
    }

    /// Translate all vertices
    pub fn apply_translation(&mut self, offset: Vector3<f64>) {
        for p in &mut self.positions {
            *p += offset;
        }
    }

    /// Unnormalized face normal (cross product of the edge vectors)
    #[inline]
    pub fn face_normal_raw(&self, face: &[u32; 3]) -> Vector3<f64> {
        let v0 = self.positions[face[0] as usize];
        let v1 = self.positions[face[1] as usize];
        let v2 = self.positions[face[2] as usize];
        (v1 - v0).cross(&(v2 - v0))
    }

    /// Face area
    #[inline]
    pub fn face_area(&self, face: &[u32; 3]) -> f64 {
        self.face_normal_raw(face).norm() * 0.5
    }

    /// Append another mesh's geometry, offsetting its indices.
    ///
    /// Color/UV attributes survive only when both meshes carry them.
    pub fn concat(&mut self, other: &TriMesh) {
        if other.is_empty() {
            return;
        }
        let vertex_offset = self.positions.len() as u32;
        self.positions.extend_from_slice(&other.positions);
        self.faces.extend(
            other
                .faces
                .iter()
                .map(|f| [f[0] + vertex_offset, f[1] + vertex_offset, f[2] + vertex_offset]),
        );

        self.colors = match (self.colors.take(), &other.colors) {
            (Some(mut a), Some(b)) => {
                a.extend_from_slice(b);
                Some(a)
            }
            _ => None,
        };
        self.uvs = match (self.uvs.take(), &other.uvs) {
            (Some(mut a), Some(b)) => {
                a.extend_from_slice(b);
                Some(a)
            }
            _ => None,
        };
    }

    /// Paint every vertex with one RGBA8 color
    pub fn paint_vertex_colors(&mut self, rgba: [u8; 4]) {
        self.colors = Some(vec![rgba; self.positions.len()]);
    }

    /// Count how many faces use each undirected edge
    pub fn edge_use_counts(&self) -> FxHashMap<(u32, u32), u32> {
        let mut counts: FxHashMap<(u32, u32), u32> = FxHashMap::default();
        for face in &self.faces {
            for i in 0..3 {
                let a = face[i];
                let b = face[(i + 1) % 3];
                let edge = if a < b { (a, b) } else { (b, a) };
                *counts.entry(edge).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Every edge shared by exactly two faces
    pub fn is_watertight(&self) -> bool {
        if self.is_empty() {
            return false;
        }
        self.edge_use_counts().values().all(|&c| c == 2)
    }

    /// Winding is globally consistent when no directed edge is used twice:
    /// two faces sharing an edge must traverse it in opposite directions.
    pub fn is_winding_consistent(&self) -> bool {
        let mut seen: FxHashMap<(u32, u32), u32> = FxHashMap::default();
        for face in &self.faces {
            for i in 0..3 {
                let a = face[i];
                let b = face[(i + 1) % 3];
                *seen.entry((a, b)).or_insert(0) += 1;
            }
        }
        seen.values().all(|&c| c == 1)
    }

    /// Signed volume via the divergence theorem; positive when winding is
    /// outward-consistent on a closed mesh.
    pub fn signed_volume(&self) -> f64 {
        let mut volume = 0.0;
        for face in &self.faces {
            let v0 = self.positions[face[0] as usize].coords;
            let v1 = self.positions[face[1] as usize].coords;
            let v2 = self.positions[face[2] as usize].coords;
            volume += v0.dot(&v1.cross(&v2)) / 6.0;
        }
        volume
    }

    /// Smooth per-vertex normals, area-weighted by incident faces.
    ///
    /// Vertices with no well-defined normal (degenerate or unreferenced)
    /// get +up as a placeholder so the export buffer stays valid.
    pub fn vertex_normals(&self) -> Vec<Vector3<f32>> {
        let mut accum = vec![Vector3::<f64>::zeros(); self.positions.len()];
        for face in &self.faces {
            let n = self.face_normal_raw(face);
            for &vi in face {
                accum[vi as usize] += n;
            }
        }
        accum
            .into_iter()
            .map(|n| {
                let len = n.norm();
                if len > 1e-12 {
                    Vector3::new((n.x / len) as f32, (n.y / len) as f32, (n.z / len) as f32)
                } else {
                    Vector3::new(0.0, 1.0, 0.0)
                }
            })
            .collect()
    }
}

/// Unit cube centered at the origin, 12 triangles, outward winding.
/// Shared by tests across the workspace.
pub fn unit_cube() -> TriMesh {
    let h = 0.5;
    let positions = vec![
        Point3::new(-h, -h, -h),
        Point3::new(h, -h, -h),
        Point3::new(h, h, -h),
        Point3::new(-h, h, -h),
        Point3::new(-h, -h, h),
        Point3::new(h, -h, h),
        Point3::new(h, h, h),
        Point3::new(-h, h, h),
    ];
    let faces = vec![
        // -Z
        [0, 2, 1],
        [0, 3, 2],
        // +Z
        [4, 5, 6],
        [4, 6, 7],
        // -Y
        [0, 1, 5],
        [0, 5, 4],
        // +Y
        [3, 6, 2],
        [3, 7, 6],
        // -X
        [0, 4, 7],
        [0, 7, 3],
        // +X
        [1, 2, 6],
        [1, 6, 5],
    ];
    TriMesh::from_parts(positions, faces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_mesh() {
        let mesh = TriMesh::new();
        assert!(mesh.is_empty());
        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.extents(), Vector3::zeros());
    }

    #[test]
    fn test_unit_cube_shape() {
        let cube = unit_cube();
        assert_eq!(cube.vertex_count(), 8);
        assert_eq!(cube.triangle_count(), 12);
        assert_relative_eq!(cube.extents().x, 1.0);
        assert_relative_eq!(cube.extents().y, 1.0);
        assert_relative_eq!(cube.extents().z, 1.0);
    }

    #[test]
    fn test_unit_cube_topology() {
        let cube = unit_cube();
        assert!(cube.is_watertight());
        assert!(cube.is_winding_consistent());
        assert_relative_eq!(cube.signed_volume(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_flipped_face_breaks_winding() {
        let mut cube = unit_cube();
        cube.faces[0].swap(1, 2);
        assert!(!cube.is_winding_consistent());
        assert!(cube.is_watertight()); // undirected edge counts are unchanged
    }

    #[test]
    fn test_base_center_offset_y_up() {
        let mut cube = unit_cube();
        cube.apply_translation(Vector3::new(3.0, 2.0, -1.0));
        let offset = cube.base_center_offset(UpAxis::Y);
        cube.apply_translation(offset);

        let (min, max) = cube.bounds();
        assert_relative_eq!((min.x + max.x) / 2.0, 0.0, epsilon = 1e-12);
        assert_relative_eq!((min.z + max.z) / 2.0, 0.0, epsilon = 1e-12);
        assert_relative_eq!(min.y, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_base_center_offset_z_up() {
        let mut cube = unit_cube();
        cube.apply_translation(Vector3::new(1.0, 1.0, 1.0));
        let offset = cube.base_center_offset(UpAxis::Z);
        cube.apply_translation(offset);

        let (min, max) = cube.bounds();
        assert_relative_eq!((min.x + max.x) / 2.0, 0.0, epsilon = 1e-12);
        assert_relative_eq!((min.y + max.y) / 2.0, 0.0, epsilon = 1e-12);
        assert_relative_eq!(min.z, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_non_uniform_scale() {
        let mut cube = unit_cube();
        cube.apply_scale(Vector3::new(0.5, 0.25, 0.3));
        let e = cube.extents();
        assert_relative_eq!(e.x, 0.5, epsilon = 1e-12);
        assert_relative_eq!(e.y, 0.25, epsilon = 1e-12);
        assert_relative_eq!(e.z, 0.3, epsilon = 1e-12);
    }

    #[test]
    fn test_concat_offsets_indices() {
        let mut a = unit_cube();
        let mut b = unit_cube();
        b.apply_translation(Vector3::new(2.0, 0.0, 0.0));
        a.concat(&b);
        assert_eq!(a.vertex_count(), 16);
        assert_eq!(a.triangle_count(), 24);
        assert!(a.faces[12..].iter().all(|f| f.iter().all(|&i| i >= 8)));
    }

    #[test]
    fn test_concat_drops_mismatched_colors() {
        let mut a = unit_cube();
        a.paint_vertex_colors([255, 0, 0, 255]);
        let b = unit_cube();
        a.concat(&b);
        assert!(a.colors.is_none());
    }

    #[test]
    fn test_vertex_normals_point_outward() {
        let cube = unit_cube();
        let normals = cube.vertex_normals();
        assert_eq!(normals.len(), 8);
        // Corner normals of a cube point diagonally outward
        for (p, n) in cube.positions.iter().zip(&normals) {
            let outward = Vector3::new(p.x as f32, p.y as f32, p.z as f32);
            assert!(n.dot(&outward) > 0.0);
        }
    }

    #[test]
    fn test_face_area() {
        let mesh = TriMesh::from_parts(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2]],
        );
        assert_relative_eq!(mesh.face_area(&mesh.faces[0]), 0.5, epsilon = 1e-12);
    }
}
