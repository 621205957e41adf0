// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh repair passes: vertex welding, face cleanup, winding repair.
//!
//! Raw generator output arrives with coincident vertices, degenerate and
//! duplicated faces, and no winding guarantee. Each pass here is
//! independent; the normalizer applies them in a fixed order because each
//! pass's postcondition is the next one's precondition.

use crate::mesh::TriMesh;
use nalgebra::Point3;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

/// Default welding tolerance, in mesh units
pub const WELD_EPSILON: f64 = 1e-8;

/// Face area below which a triangle counts as degenerate
pub const DEGENERATE_AREA: f64 = 1e-12;

/// Merge vertices closer than `epsilon` using a spatial hash with a 3×3×3
/// neighborhood probe. Returns the number of vertices merged away.
///
/// Faces that collapse to fewer than three distinct vertices are dropped.
pub fn weld_vertices(mesh: &mut TriMesh, epsilon: f64) -> usize {
    if mesh.positions.is_empty() {
        return 0;
    }

    let cell_size = epsilon * 2.0;
    let mut spatial_hash: FxHashMap<(i64, i64, i64), Vec<u32>> = FxHashMap::default();
    for (idx, p) in mesh.positions.iter().enumerate() {
        spatial_hash.entry(pos_to_cell(p, cell_size)).or_default().push(idx as u32);
    }

    let mut remap: Vec<u32> = (0..mesh.positions.len() as u32).collect();
    let mut merged = 0usize;

    for (idx, p) in mesh.positions.iter().enumerate() {
        let idx = idx as u32;
        if remap[idx as usize] != idx {
            continue;
        }
        let cell = pos_to_cell(p, cell_size);
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let neighbor = (cell.0 + dx, cell.1 + dy, cell.2 + dz);
                    let Some(candidates) = spatial_hash.get(&neighbor) else {
                        continue;
                    };
                    for &other in candidates {
                        if other <= idx || remap[other as usize] != other {
                            continue;
                        }
                        if (p - mesh.positions[other as usize]).norm() < epsilon {
                            remap[other as usize] = idx;
                            merged += 1;
                        }
                    }
                }
            }
        }
    }

    if merged == 0 {
        return 0;
    }

    // Resolve transitive merges
    for i in 0..remap.len() {
        let mut target = remap[i];
        while remap[target as usize] != target {
            target = remap[target as usize];
        }
        remap[i] = target;
    }

    for face in &mut mesh.faces {
        for idx in face.iter_mut() {
            *idx = remap[*idx as usize];
        }
    }
    mesh.faces.retain(|&[a, b, c]| a != b && b != c && a != c);

    debug!(merged, "Welded duplicate vertices");
    merged
}

/// Remove faces with area below `area_threshold` or repeated indices.
/// Returns the number of faces removed.
pub fn remove_degenerate_faces(mesh: &mut TriMesh, area_threshold: f64) -> usize {
    let original = mesh.faces.len();
    let positions = std::mem::take(&mut mesh.positions);
    mesh.faces.retain(|face| {
        if face[0] == face[1] || face[1] == face[2] || face[0] == face[2] {
            return false;
        }
        let v0 = positions[face[0] as usize];
        let v1 = positions[face[1] as usize];
        let v2 = positions[face[2] as usize];
        (v1 - v0).cross(&(v2 - v0)).norm() * 0.5 >= area_threshold
    });
    mesh.positions = positions;
    original - mesh.faces.len()
}

/// Remove faces that reference the same vertex set as an earlier face,
/// regardless of winding or starting vertex. Returns the number removed.
pub fn remove_duplicate_faces(mesh: &mut TriMesh) -> usize {
    let original = mesh.faces.len();
    let mut seen: FxHashSet<[u32; 3]> = FxHashSet::default();
    mesh.faces.retain(|face| {
        let mut key = *face;
        key.sort_unstable();
        seen.insert(key)
    });
    original - mesh.faces.len()
}

/// Drop vertices with no incident face and compact the vertex array,
/// remapping faces and any per-vertex attributes. Returns the number
/// removed.
pub fn remove_unreferenced_vertices(mesh: &mut TriMesh) -> usize {
    let original = mesh.positions.len();
    let mut referenced = vec![false; original];
    for face in &mesh.faces {
        for &vi in face {
            referenced[vi as usize] = true;
        }
    }

    let mut remap = vec![u32::MAX; original];
    let mut kept = 0u32;
    for (i, &used) in referenced.iter().enumerate() {
        if used {
            remap[i] = kept;
            kept += 1;
        }
    }
    if kept as usize == original {
        return 0;
    }

    let mut new_positions = Vec::with_capacity(kept as usize);
    for (i, p) in mesh.positions.iter().enumerate() {
        if referenced[i] {
            new_positions.push(*p);
        }
    }
    mesh.positions = new_positions;

    if let Some(colors) = &mut mesh.colors {
        let mut new_colors = Vec::with_capacity(kept as usize);
        for (i, c) in colors.iter().enumerate() {
            if referenced[i] {
                new_colors.push(*c);
            }
        }
        *colors = new_colors;
    }
    if let Some(uvs) = &mut mesh.uvs {
        let mut new_uvs = Vec::with_capacity(kept as usize);
        for (i, uv) in uvs.iter().enumerate() {
            if referenced[i] {
                new_uvs.push(*uv);
            }
        }
        *uvs = new_uvs;
    }

    for face in &mut mesh.faces {
        for idx in face.iter_mut() {
            *idx = remap[*idx as usize];
        }
    }

    let removed = original - kept as usize;
    debug!(removed, "Removed unreferenced vertices");
    removed
}

/// Make winding consistent across each connected component, then orient the
/// whole mesh outward. Returns the number of faces flipped.
///
/// Consistency: BFS over the face adjacency graph; a neighbor that
/// traverses the shared edge in the same direction as the current face is
/// flipped. Orientation: closed meshes use the signed-volume sign; open
/// meshes fall back to the centroid heuristic (majority of faces should
/// point away from the centroid).
pub fn fix_winding(mesh: &mut TriMesh) -> usize {
    if mesh.faces.is_empty() {
        return 0;
    }

    // Undirected edge -> adjacent face indices
    let mut edge_faces: FxHashMap<(u32, u32), Vec<usize>> = FxHashMap::default();
    for (fi, face) in mesh.faces.iter().enumerate() {
        for i in 0..3 {
            let a = face[i];
            let b = face[(i + 1) % 3];
            let edge = if a < b { (a, b) } else { (b, a) };
            edge_faces.entry(edge).or_default().push(fi);
        }
    }

    let mut flipped = 0usize;
    let mut visited = vec![false; mesh.faces.len()];
    let mut queue = std::collections::VecDeque::new();

    for seed in 0..mesh.faces.len() {
        if visited[seed] {
            continue;
        }
        visited[seed] = true;
        queue.push_back(seed);

        while let Some(fi) = queue.pop_front() {
            let face = mesh.faces[fi];
            for i in 0..3 {
                let a = face[i];
                let b = face[(i + 1) % 3];
                let edge = if a < b { (a, b) } else { (b, a) };
                let Some(neighbors) = edge_faces.get(&edge) else {
                    continue;
                };
                for &nf in neighbors {
                    if visited[nf] {
                        continue;
                    }
                    visited[nf] = true;
                    // Consistent neighbors traverse the shared edge in the
                    // opposite direction
                    if directed_edge_in(&mesh.faces[nf], a, b) {
                        mesh.faces[nf].swap(1, 2);
                        flipped += 1;
                    }
                    queue.push_back(nf);
                }
            }
        }
    }

    let outward = if mesh.is_watertight() {
        mesh.signed_volume() >= 0.0
    } else {
        majority_faces_outward(mesh)
    };
    if !outward {
        for face in &mut mesh.faces {
            face.swap(1, 2);
        }
        flipped += mesh.faces.len();
    }

    debug!(flipped, "Repaired face winding");
    flipped
}

/// True if the face traverses the directed edge a→b
fn directed_edge_in(face: &[u32; 3], a: u32, b: u32) -> bool {
    (face[0] == a && face[1] == b)
        || (face[1] == a && face[2] == b)
        || (face[2] == a && face[0] == b)
}

/// Centroid heuristic: do most face normals point away from the centroid?
fn majority_faces_outward(mesh: &TriMesh) -> bool {
    let centroid = mesh.centroid();
    let mut outward = 0usize;
    let mut inward = 0usize;

    for face in &mesh.faces {
        let n = mesh.face_normal_raw(face);
        if n.norm() < 1e-12 {
            continue;
        }
        let v0 = mesh.positions[face[0] as usize];
        let v1 = mesh.positions[face[1] as usize];
        let v2 = mesh.positions[face[2] as usize];
        let face_center = Point3::from((v0.coords + v1.coords + v2.coords) / 3.0);
        if n.dot(&(face_center - centroid)) >= 0.0 {
            outward += 1;
        } else {
            inward += 1;
        }
    }
    outward >= inward
}

fn pos_to_cell(p: &Point3<f64>, cell_size: f64) -> (i64, i64, i64) {
    (
        (p.x / cell_size).floor() as i64,
        (p.y / cell_size).floor() as i64,
        (p.z / cell_size).floor() as i64,
    )
}
