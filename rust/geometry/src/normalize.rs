// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The ordered normalization pipeline.
//!
//! Takes raw generator output and produces a cleaned mesh ready for
//! export: weld, face cleanup, winding repair, triangle budget, rescale
//! to target extents, base-center pivot, then the PBR base color painted
//! as vertex colors. Order matters; rescale must see the decimated mesh
//! and the pivot must be computed after rescale.

use crate::color::{hex_to_linear_rgba, linear_to_rgba8};
use crate::decimate::decimate_to_target;
use crate::error::{Error, Result};
use crate::mesh::TriMesh;
use crate::repair::{
    fix_winding, remove_degenerate_faces, remove_duplicate_faces, remove_unreferenced_vertices,
    weld_vertices, DEGENERATE_AREA, WELD_EPSILON,
};
use nalgebra::Vector3;
use scenesmith_core::{AssetSpec, PipelineDefaults, ResolvedPbr, UpAxis, Vec3};
use tracing::info;

/// Parameters the pipeline needs from the asset spec, resolved against
/// pipeline defaults so every field has a concrete value.
#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    /// Target physical extents in meters; axes at zero are left unscaled
    pub target_size: Option<Vec3>,
    pub max_tris: u32,
    pub pbr: ResolvedPbr,
    pub up_axis: UpAxis,
}

impl NormalizeOptions {
    pub fn from_spec(spec: &AssetSpec, defaults: &PipelineDefaults, up_axis: UpAxis) -> Self {
        Self {
            target_size: spec.object.size_m,
            max_tris: defaults.resolve_max_tris(spec),
            pbr: defaults.resolve_pbr(spec),
            up_axis,
        }
    }
}

/// What each pass of the pipeline did, for logging and diagnostics.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct NormalizeStats {
    pub input_vertices: usize,
    pub input_triangles: usize,
    pub welded_vertices: usize,
    pub removed_degenerate_faces: usize,
    pub removed_duplicate_faces: usize,
    pub removed_unreferenced_vertices: usize,
    pub flipped_faces: usize,
    pub collapsed_edges: usize,
    pub final_vertices: usize,
    pub final_triangles: usize,
}

/// Normalization output: the cleaned mesh plus the material constants the
/// exporter patches into the container.
#[derive(Debug, Clone)]
pub struct CleanedMesh {
    pub mesh: TriMesh,
    /// Linear-space base color for the glTF material
    pub base_color_linear: [f64; 4],
    pub metallic: f64,
    pub roughness: f64,
    pub stats: NormalizeStats,
}

/// Run the full pipeline over one or more raw sub-meshes.
///
/// Multiple sub-meshes are flattened into one before cleanup, matching
/// how a multi-primitive container is treated downstream. Fails with
/// [`Error::EmptyMesh`] when no triangle geometry is present at all, and
/// [`Error::UnsupportedScene`] when cleanup eliminates every face.
pub fn normalize(sub_meshes: Vec<TriMesh>, options: &NormalizeOptions) -> Result<CleanedMesh> {
    let mut mesh = flatten(sub_meshes)?;

    let mut stats = NormalizeStats {
        input_vertices: mesh.vertex_count(),
        input_triangles: mesh.triangle_count(),
        ..NormalizeStats::default()
    };
    info!(
        vertices = stats.input_vertices,
        triangles = stats.input_triangles,
        "Normalizing mesh"
    );

    stats.welded_vertices = weld_vertices(&mut mesh, WELD_EPSILON);
    stats.removed_degenerate_faces = remove_degenerate_faces(&mut mesh, DEGENERATE_AREA);
    stats.removed_duplicate_faces = remove_duplicate_faces(&mut mesh);
    stats.removed_unreferenced_vertices = remove_unreferenced_vertices(&mut mesh);

    if mesh.is_empty() {
        return Err(Error::UnsupportedScene(
            "all faces were degenerate or duplicate".into(),
        ));
    }

    stats.flipped_faces = fix_winding(&mut mesh);

    if mesh.triangle_count() > options.max_tris as usize {
        stats.collapsed_edges = decimate_to_target(&mut mesh, options.max_tris as usize);
    }

    if let Some(target) = options.target_size {
        mesh.apply_scale(scale_to_target(&mesh, target));
    }

    let pivot = mesh.base_center_offset(options.up_axis);
    mesh.apply_translation(pivot);

    let base_color_linear = hex_to_linear_rgba(&options.pbr.base_color_hex)?;
    mesh.paint_vertex_colors(linear_to_rgba8(&base_color_linear));

    stats.final_vertices = mesh.vertex_count();
    stats.final_triangles = mesh.triangle_count();
    info!(
        vertices = stats.final_vertices,
        triangles = stats.final_triangles,
        welded = stats.welded_vertices,
        flipped = stats.flipped_faces,
        "Normalization complete"
    );

    Ok(CleanedMesh {
        mesh,
        base_color_linear,
        metallic: options.pbr.metallic,
        roughness: options.pbr.roughness,
        stats,
    })
}

fn flatten(sub_meshes: Vec<TriMesh>) -> Result<TriMesh> {
    let mut iter = sub_meshes.into_iter().filter(|m| !m.is_empty());
    let Some(mut mesh) = iter.next() else {
        return Err(Error::EmptyMesh("no triangle geometry found".into()));
    };
    for other in iter {
        mesh.concat(&other);
    }
    Ok(mesh)
}

/// Per-axis scale factors toward the target extents. An axis is left at
/// 1.0 when the target is unset (zero) or the mesh is flat along it.
fn scale_to_target(mesh: &TriMesh, target: Vec3) -> Vector3<f64> {
    let extents = mesh.extents();
    let factor = |target_len: f64, extent: f64| {
        if target_len > 0.0 && extent > 1e-6 {
            target_len / extent
        } else {
            1.0
        }
    };
    Vector3::new(
        factor(target.x, extents.x),
        factor(target.y, extents.y),
        factor(target.z, extents.z),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::unit_cube;
    use approx::assert_relative_eq;
    use nalgebra::{Point3, Vector3};

    fn options(target: Option<Vec3>) -> NormalizeOptions {
        NormalizeOptions {
            target_size: target,
            max_tris: 80_000,
            pbr: ResolvedPbr {
                base_color_hex: "#808080".into(),
                metallic: 0.0,
                roughness: 0.5,
            },
            up_axis: UpAxis::Y,
        }
    }

    #[test]
    fn test_cube_scenario() {
        // Off-origin cube fed through the full pipeline
        let mut cube = unit_cube();
        cube.apply_translation(Vector3::new(5.0, -2.0, 3.0));

        let cleaned = normalize(vec![cube], &options(Some(Vec3::new(0.5, 0.25, 0.3)))).unwrap();
        let mesh = &cleaned.mesh;

        assert_eq!(mesh.triangle_count(), 12);
        let extents = mesh.extents();
        assert_relative_eq!(extents.x, 0.5, epsilon = 1e-9);
        assert_relative_eq!(extents.y, 0.25, epsilon = 1e-9);
        assert_relative_eq!(extents.z, 0.3, epsilon = 1e-9);

        // Pivot at base-center
        let (min, max) = mesh.bounds();
        assert_relative_eq!((min.x + max.x) / 2.0, 0.0, epsilon = 1e-9);
        assert_relative_eq!((min.z + max.z) / 2.0, 0.0, epsilon = 1e-9);
        assert_relative_eq!(min.y, 0.0, epsilon = 1e-9);

        // Mid-gray paint: sRGB 0x80 on every vertex
        let colors = mesh.colors.as_ref().unwrap();
        assert_eq!(colors.len(), mesh.vertex_count());
        assert_eq!(colors[0], [128, 128, 128, 255]);
    }

    #[test]
    fn test_normalize_is_idempotent_on_clean_mesh() {
        let opts = options(Some(Vec3::new(1.0, 1.0, 1.0)));
        let once = normalize(vec![unit_cube()], &opts).unwrap();
        let twice = normalize(vec![once.mesh.clone()], &opts).unwrap();

        assert_eq!(once.mesh.faces, twice.mesh.faces);
        for (a, b) in once.mesh.positions.iter().zip(twice.mesh.positions.iter()) {
            assert_relative_eq!(a.x, b.x, epsilon = 1e-9);
            assert_relative_eq!(a.y, b.y, epsilon = 1e-9);
            assert_relative_eq!(a.z, b.z, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_zero_target_axis_left_unscaled() {
        let cleaned = normalize(vec![unit_cube()], &options(Some(Vec3::new(2.0, 0.0, 0.0))))
            .unwrap();
        let extents = cleaned.mesh.extents();
        assert_relative_eq!(extents.x, 2.0, epsilon = 1e-9);
        assert_relative_eq!(extents.y, 1.0, epsilon = 1e-9);
        assert_relative_eq!(extents.z, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_flat_axis_left_unscaled() {
        // A single triangle in the XZ plane has zero Y extent
        let tri = TriMesh::from_parts(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 0.0, 1.0),
            ],
            vec![[0, 1, 2]],
        );
        let cleaned = normalize(vec![tri], &options(Some(Vec3::new(2.0, 3.0, 2.0)))).unwrap();
        let extents = cleaned.mesh.extents();
        assert_relative_eq!(extents.x, 2.0, epsilon = 1e-9);
        assert_relative_eq!(extents.y, 0.0, epsilon = 1e-9);
        assert_relative_eq!(extents.z, 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_empty_input_rejected() {
        assert!(matches!(
            normalize(vec![], &options(None)),
            Err(Error::EmptyMesh(_))
        ));
        assert!(matches!(
            normalize(vec![TriMesh::new()], &options(None)),
            Err(Error::EmptyMesh(_))
        ));
    }

    #[test]
    fn test_all_degenerate_rejected() {
        let junk = TriMesh::from_parts(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
            ],
            vec![[0, 1, 2], [0, 0, 1]],
        );
        assert!(matches!(
            normalize(vec![junk], &options(None)),
            Err(Error::UnsupportedScene(_))
        ));
    }

    #[test]
    fn test_multiple_sub_meshes_flattened() {
        let a = unit_cube();
        let mut b = unit_cube();
        b.apply_translation(Vector3::new(10.0, 0.0, 0.0));

        let cleaned = normalize(vec![a, b], &options(None)).unwrap();
        assert_eq!(cleaned.mesh.triangle_count(), 24);
    }

    /// Closed box with each face subdivided into an n-by-n grid. Faces
    /// carry their own vertex grids; the weld pass stitches the shared
    /// edges (corner coordinates are bit-identical across faces).
    fn gridded_box(n: u32) -> TriMesh {
        let c = |i: u32| i as f64 / n as f64 - 0.5;
        let mut mesh = TriMesh::new();
        // (u axis, v axis, fixed axis, fixed value, flip winding)
        let sides = [
            (0, 1, 2, 0.5, false),
            (0, 1, 2, -0.5, true),
            (1, 2, 0, 0.5, false),
            (1, 2, 0, -0.5, true),
            (2, 0, 1, 0.5, false),
            (2, 0, 1, -0.5, true),
        ];
        for (u, v, fixed, value, flip) in sides {
            let base = mesh.positions.len() as u32;
            for j in 0..=n {
                for i in 0..=n {
                    let mut p = [0.0; 3];
                    p[u] = c(i);
                    p[v] = c(j);
                    p[fixed] = value;
                    mesh.positions.push(Point3::new(p[0], p[1], p[2]));
                }
            }
            let idx = |i: u32, j: u32| base + j * (n + 1) + i;
            for j in 0..n {
                for i in 0..n {
                    let mut t0 = [idx(i, j), idx(i + 1, j), idx(i + 1, j + 1)];
                    let mut t1 = [idx(i, j), idx(i + 1, j + 1), idx(i, j + 1)];
                    if flip {
                        t0.swap(1, 2);
                        t1.swap(1, 2);
                    }
                    mesh.faces.push(t0);
                    mesh.faces.push(t1);
                }
            }
        }
        mesh
    }

    #[test]
    fn test_decimation_reaches_triangle_budget() {
        // 6 * 10 * 10 * 2 = 1200 triangles going in
        let dense = gridded_box(10);
        let mut opts = options(None);
        opts.max_tris = 300;

        let cleaned = normalize(vec![dense], &opts).unwrap();
        assert_eq!(cleaned.stats.input_triangles, 1200);
        assert!(cleaned.stats.collapsed_edges > 0);
        assert!(cleaned.mesh.triangle_count() <= 300);
        assert_eq!(cleaned.stats.final_triangles, cleaned.mesh.triangle_count());

        // Still a closed box after collapsing
        assert!(cleaned.mesh.is_watertight());
        let extents = cleaned.mesh.extents();
        assert!(extents.x > 0.5 && extents.y > 0.5 && extents.z > 0.5);
    }

    #[test]
    fn test_decimation_skipped_when_under_budget() {
        let cleaned = normalize(vec![unit_cube()], &options(None)).unwrap();
        assert_eq!(cleaned.stats.collapsed_edges, 0);
        assert_eq!(cleaned.mesh.triangle_count(), 12);
    }

    #[test]
    fn test_material_constants_carried() {
        let mut opts = options(None);
        opts.pbr = ResolvedPbr {
            base_color_hex: "#ff0000".into(),
            metallic: 0.8,
            roughness: 0.2,
        };
        let cleaned = normalize(vec![unit_cube()], &opts).unwrap();
        assert_relative_eq!(cleaned.base_color_linear[0], 1.0, epsilon = 1e-9);
        assert_relative_eq!(cleaned.base_color_linear[1], 0.0, epsilon = 1e-9);
        assert_relative_eq!(cleaned.metallic, 0.8);
        assert_relative_eq!(cleaned.roughness, 0.2);
    }
}
