// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Triangle budget reduction via quadric error metric edge collapse.
//!
//! Collapses the cheapest edges first until the face count reaches the
//! target. Collapse cost is the quadric error of the merged vertex against
//! the planes of every face that ever touched either endpoint, so flat
//! regions collapse long before silhouette features do.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::mesh::TriMesh;
use nalgebra::Point3;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, info};

/// Symmetric 4x4 plane-distance quadric, upper triangle only.
#[derive(Debug, Clone, Copy, Default)]
struct Quadric {
    m: [f64; 10],
}

impl Quadric {
    /// Quadric of a single plane ax + by + cz + d = 0 with unit normal.
    fn from_plane(a: f64, b: f64, c: f64, d: f64) -> Self {
        Self {
            m: [
                a * a,
                a * b,
                a * c,
                a * d,
                b * b,
                b * c,
                b * d,
                c * c,
                c * d,
                d * d,
            ],
        }
    }

    fn add(&mut self, other: &Self) {
        for (lhs, rhs) in self.m.iter_mut().zip(other.m.iter()) {
            *lhs += rhs;
        }
    }

    /// v^T Q v for v = [x, y, z, 1]
    fn evaluate(&self, p: &Point3<f64>) -> f64 {
        let [a, b, c, d, e, f, g, h, i, j] = self.m;
        let (x, y, z) = (p.x, p.y, p.z);
        a * x * x
            + e * y * y
            + h * z * z
            + 2.0 * (b * x * y + c * x * z + f * y * z + d * x + g * y + i * z)
            + j
    }

    /// Point minimizing the quadric error, if the 3x3 system is solvable.
    fn optimal_point(&self) -> Option<Point3<f64>> {
        let [a, b, c, d, e, f, g, h, i, _] = self.m;

        let det = a * (e * h - f * f) - b * (b * h - c * f) + c * (b * f - c * e);
        if det.abs() < 1e-10 {
            return None;
        }
        let inv_det = 1.0 / det;

        let m00 = (e * h - f * f) * inv_det;
        let m01 = (c * f - b * h) * inv_det;
        let m02 = (b * f - c * e) * inv_det;
        let m11 = (a * h - c * c) * inv_det;
        let m12 = (b * c - a * f) * inv_det;
        let m22 = (a * e - b * b) * inv_det;

        Some(Point3::new(
            -(m00 * d + m01 * g + m02 * i),
            -(m01 * d + m11 * g + m12 * i),
            -(m02 * d + m12 * g + m22 * i),
        ))
    }
}

/// Candidate collapse in the min-heap, ordered by cost.
#[derive(Debug, Clone)]
struct EdgeCollapse {
    v1: u32,
    v2: u32,
    cost: f64,
    merged_pos: Point3<f64>,
}

impl PartialEq for EdgeCollapse {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost
    }
}

impl Eq for EdgeCollapse {}

impl PartialOrd for EdgeCollapse {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EdgeCollapse {
    fn cmp(&self, other: &Self) -> Ordering {
        // Inverted so BinaryHeap pops the cheapest collapse first
        other
            .cost
            .partial_cmp(&self.cost)
            .unwrap_or(Ordering::Equal)
    }
}

/// Reduce `mesh` in place to at most `target_triangles` faces.
///
/// Returns the number of collapses performed. The mesh is untouched if it
/// is already within budget. The loop stops early if the heap runs out of
/// valid collapses; callers should treat residual faces above the target
/// as best effort, not an error.
pub fn decimate_to_target(mesh: &mut TriMesh, target_triangles: usize) -> usize {
    let original = mesh.faces.len();
    if original <= target_triangles || original == 0 {
        return 0;
    }

    info!(original, target = target_triangles, "Decimating mesh");

    let mut positions: Vec<Option<Point3<f64>>> =
        mesh.positions.iter().copied().map(Some).collect();
    let mut faces: Vec<Option<[u32; 3]>> = mesh.faces.iter().copied().map(Some).collect();
    let mut active_faces = original;

    let mut quadrics = vertex_quadrics(mesh);
    let mut heap = initial_queue(mesh, &quadrics);
    let mut remap: FxHashMap<u32, u32> = FxHashMap::default();
    let mut collapses = 0usize;

    while active_faces > target_triangles {
        let Some(collapse) = heap.pop() else {
            break;
        };

        let v1 = resolve(collapse.v1, &remap);
        let v2 = resolve(collapse.v2, &remap);
        if v1 == v2 || positions[v1 as usize].is_none() || positions[v2 as usize].is_none() {
            continue;
        }
        if !collapse_is_manifold(&positions, &faces, v1, v2) {
            continue;
        }

        positions[v1 as usize] = Some(collapse.merged_pos);
        let q2 = quadrics[v2 as usize];
        quadrics[v1 as usize].add(&q2);
        positions[v2 as usize] = None;
        remap.insert(v2, v1);

        for face_opt in &mut faces {
            let Some(face) = face_opt else { continue };
            let mut touched = false;
            for idx in face.iter_mut() {
                let actual = resolve(*idx, &remap);
                if actual != *idx {
                    *idx = actual;
                    touched = true;
                }
            }
            if touched && (face[0] == face[1] || face[1] == face[2] || face[0] == face[2]) {
                *face_opt = None;
                active_faces -= 1;
            }
        }

        collapses += 1;
        requeue_around(v1, &positions, &faces, &quadrics, &mut heap);
    }

    compact(mesh, &positions, &faces);
    debug!(
        final_triangles = mesh.faces.len(),
        collapses, "Decimation complete"
    );
    collapses
}

fn resolve(mut v: u32, remap: &FxHashMap<u32, u32>) -> u32 {
    while let Some(&next) = remap.get(&v) {
        v = next;
    }
    v
}

fn ordered(v1: u32, v2: u32) -> (u32, u32) {
    if v1 < v2 {
        (v1, v2)
    } else {
        (v2, v1)
    }
}

fn vertex_quadrics(mesh: &TriMesh) -> Vec<Quadric> {
    let mut quadrics = vec![Quadric::default(); mesh.positions.len()];
    for face in &mesh.faces {
        let n = mesh.face_normal_raw(face);
        let len = n.norm();
        if len < 1e-10 {
            continue;
        }
        let n = n / len;
        let v0 = mesh.positions[face[0] as usize];
        let d = -n.dot(&v0.coords);
        let q = Quadric::from_plane(n.x, n.y, n.z, d);
        for &vi in face {
            quadrics[vi as usize].add(&q);
        }
    }
    quadrics
}

fn collapse_cost(
    v1: u32,
    v2: u32,
    p1: Point3<f64>,
    p2: Point3<f64>,
    quadrics: &[Quadric],
) -> EdgeCollapse {
    let mut combined = quadrics[v1 as usize];
    combined.add(&quadrics[v2 as usize]);

    let midpoint = Point3::from((p1.coords + p2.coords) * 0.5);
    let merged_pos = combined.optimal_point().unwrap_or(midpoint);
    let cost = combined.evaluate(&merged_pos);

    EdgeCollapse {
        v1,
        v2,
        cost,
        merged_pos,
    }
}

fn initial_queue(mesh: &TriMesh, quadrics: &[Quadric]) -> BinaryHeap<EdgeCollapse> {
    let mut heap = BinaryHeap::new();
    let mut seen: FxHashSet<(u32, u32)> = FxHashSet::default();

    for face in &mesh.faces {
        for i in 0..3 {
            let v1 = face[i];
            let v2 = face[(i + 1) % 3];
            if !seen.insert(ordered(v1, v2)) {
                continue;
            }
            heap.push(collapse_cost(
                v1,
                v2,
                mesh.positions[v1 as usize],
                mesh.positions[v2 as usize],
                quadrics,
            ));
        }
    }
    heap
}

/// Reject collapses that would pinch the surface: the edge endpoints may
/// share at most the two vertices of their common triangles.
fn collapse_is_manifold(
    positions: &[Option<Point3<f64>>],
    faces: &[Option<[u32; 3]>],
    v1: u32,
    v2: u32,
) -> bool {
    let mut n1: FxHashSet<u32> = FxHashSet::default();
    let mut n2: FxHashSet<u32> = FxHashSet::default();

    for face in faces.iter().flatten() {
        let has_v1 = face.contains(&v1);
        let has_v2 = face.contains(&v2);
        for &vi in face {
            if vi == v1 || vi == v2 || positions[vi as usize].is_none() {
                continue;
            }
            if has_v1 {
                n1.insert(vi);
            }
            if has_v2 {
                n2.insert(vi);
            }
        }
    }

    n1.intersection(&n2).count() <= 2
}

fn requeue_around(
    v1: u32,
    positions: &[Option<Point3<f64>>],
    faces: &[Option<[u32; 3]>],
    quadrics: &[Quadric],
    heap: &mut BinaryHeap<EdgeCollapse>,
) {
    let Some(p1) = positions[v1 as usize] else {
        return;
    };

    let mut neighbors: FxHashSet<u32> = FxHashSet::default();
    for face in faces.iter().flatten() {
        if face.contains(&v1) {
            for &vi in face {
                if vi != v1 && positions[vi as usize].is_some() {
                    neighbors.insert(vi);
                }
            }
        }
    }

    for &v2 in &neighbors {
        let Some(p2) = positions[v2 as usize] else {
            continue;
        };
        heap.push(collapse_cost(v1, v2, p1, p2, quadrics));
    }
}

/// Rebuild the mesh arrays, dropping dead vertices and faces. Surviving
/// vertices keep their original attributes.
fn compact(mesh: &mut TriMesh, positions: &[Option<Point3<f64>>], faces: &[Option<[u32; 3]>]) {
    let mut remap: FxHashMap<u32, u32> = FxHashMap::default();
    let mut new_positions = Vec::new();
    let mut new_colors = mesh.colors.as_ref().map(|_| Vec::new());
    let mut new_uvs = mesh.uvs.as_ref().map(|_| Vec::new());

    for (old_idx, pos) in positions.iter().enumerate() {
        let Some(pos) = pos else { continue };
        remap.insert(old_idx as u32, new_positions.len() as u32);
        new_positions.push(*pos);
        if let (Some(out), Some(colors)) = (&mut new_colors, &mesh.colors) {
            out.push(colors[old_idx]);
        }
        if let (Some(out), Some(uvs)) = (&mut new_uvs, &mesh.uvs) {
            out.push(uvs[old_idx]);
        }
    }

    let mut new_faces = Vec::new();
    for face in faces.iter().flatten() {
        if let (Some(&i0), Some(&i1), Some(&i2)) = (
            remap.get(&face[0]),
            remap.get(&face[1]),
            remap.get(&face[2]),
        ) {
            new_faces.push([i0, i1, i2]);
        }
    }

    mesh.positions = new_positions;
    mesh.faces = new_faces;
    mesh.colors = new_colors;
    mesh.uvs = new_uvs;
}
