// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The validation battery: a fixed, ordered list of checks.
//!
//! Every check returns a `Result<CheckOutcome>`; the runner converts an
//! `Err` into a failed outcome carrying the error text, so one broken
//! check can never abort the battery or skew the order of the report.

use crate::context::CheckContext;
use crate::error::Result;
use scenesmith_core::{CheckOutcome, PipelineDefaults, Units, ValidationReport, WorldContext};
use std::path::Path;
use tracing::info;

/// Relative tolerance for bounding box vs spec comparison
pub const BBOX_TOLERANCE_FRAC: f64 = 0.30;

/// Face area below which a face counts as degenerate for validation
const DEGENERATE_AREA: f64 = 1e-10;

/// Plausible physical extent range for a single object, in meters
const HARD_MIN_M: f64 = 0.01;
const HARD_MAX_M: f64 = 10.0;

/// Checks whose failure fails the whole candidate. Everything else only
/// lowers the score.
pub const HARD_FAIL_CHECKS: [&str; 6] = [
    "file_exists",
    "can_load",
    "no_inverted_normals",
    "bbox_vs_spec",
    "realistic_scale",
    "textures_present",
];

type CheckFn = fn(&CheckContext) -> Result<CheckOutcome>;

const CHECKS: [(&str, CheckFn); 12] = [
    ("file_exists", check_file_exists),
    ("can_load", check_can_load),
    ("polycount", check_polycount),
    ("no_inverted_normals", check_no_inverted_normals),
    ("no_ngons", check_no_ngons),
    ("no_degenerate_faces", check_no_degenerate_faces),
    ("bbox_vs_spec", check_bbox_vs_spec),
    ("realistic_scale", check_realistic_scale),
    ("textures_present", check_textures_present),
    ("pivot_at_base", check_pivot_at_base),
    ("watertight", check_watertight),
    ("world_unit_match", check_world_unit_match),
];

/// Run the whole battery over one cleaned asset.
pub fn run_all_checks(
    glb_path: &Path,
    spec: &scenesmith_core::AssetSpec,
    world: &WorldContext,
    defaults: &PipelineDefaults,
) -> ValidationReport {
    let context = CheckContext::new(glb_path, spec, world, defaults);

    let mut checks = Vec::with_capacity(CHECKS.len());
    for (name, check) in CHECKS {
        let outcome = match check(&context) {
            Ok(outcome) => outcome,
            Err(err) => CheckOutcome::new(name, false, format!("Exception: {err}")),
        };
        info!(
            check = name,
            passed = outcome.passed,
            message = %outcome.message,
            "Validation check"
        );
        checks.push(outcome);
    }

    let passed_count = checks.iter().filter(|c| c.passed).count();
    let total = checks.len();
    let score = (passed_count as f64 / total as f64 * 1000.0).round() / 1000.0;

    let passed = checks
        .iter()
        .filter(|c| HARD_FAIL_CHECKS.contains(&c.name.as_str()))
        .all(|c| c.passed);

    ValidationReport {
        passed,
        score,
        checks,
        summary: format!("{passed_count}/{total} checks passed"),
    }
}

fn check_file_exists(ctx: &CheckContext) -> Result<CheckOutcome> {
    let exists = ctx.file_size.is_some_and(|size| size > 0);
    let message = if exists {
        ctx.glb_path.display().to_string()
    } else {
        format!("File missing or empty: {}", ctx.glb_path.display())
    };
    Ok(CheckOutcome::new("file_exists", exists, message))
}

fn check_can_load(ctx: &CheckContext) -> Result<CheckOutcome> {
    match ctx.contents() {
        Some(contents) if !contents.meshes.is_empty() => Ok(CheckOutcome::new(
            "can_load",
            true,
            format!("{} mesh(es) loaded", contents.meshes.len()),
        )),
        Some(_) => Ok(CheckOutcome::new(
            "can_load",
            false,
            "no triangle geometry in container",
        )),
        None => Ok(CheckOutcome::new(
            "can_load",
            false,
            ctx.load_error().unwrap_or("could not load container"),
        )),
    }
}

fn check_polycount(ctx: &CheckContext) -> Result<CheckOutcome> {
    let name = "polycount";
    let Some(mesh) = ctx.mesh() else {
        return Ok(CheckOutcome::new(name, false, "Could not load mesh"));
    };
    let max_tris = ctx.defaults.resolve_max_tris(ctx.spec);
    let tri_count = mesh.triangle_count();
    Ok(CheckOutcome::new(
        name,
        tri_count <= max_tris as usize,
        format!("{tri_count} tris (max {max_tris})"),
    ))
}

fn check_no_inverted_normals(ctx: &CheckContext) -> Result<CheckOutcome> {
    let name = "no_inverted_normals";
    let Some(mesh) = ctx.mesh() else {
        return Ok(CheckOutcome::new(name, false, "Could not load mesh"));
    };

    if !mesh.is_watertight() {
        // Open mesh: only verify normals are not collapsing to zero
        let zero_count = mesh
            .faces
            .iter()
            .filter(|f| mesh.face_normal_raw(f).norm() < 1e-6)
            .count();
        let ok = (zero_count as f64) < mesh.triangle_count() as f64 * 0.05;
        return Ok(CheckOutcome::new(
            name,
            ok,
            format!(
                "{zero_count} degenerate normals out of {}",
                mesh.triangle_count()
            ),
        ));
    }

    let consistent = mesh.is_winding_consistent();
    Ok(CheckOutcome::new(
        name,
        consistent,
        if consistent {
            "winding consistent"
        } else {
            "inconsistent winding detected"
        },
    ))
}

fn check_no_ngons(ctx: &CheckContext) -> Result<CheckOutcome> {
    let name = "no_ngons";
    let Some(_) = ctx.mesh() else {
        return Ok(CheckOutcome::new(name, false, "Could not load mesh"));
    };
    // Triangle primitives are the only face type the container can carry
    Ok(CheckOutcome::new(name, true, "all triangles"))
}

fn check_no_degenerate_faces(ctx: &CheckContext) -> Result<CheckOutcome> {
    let name = "no_degenerate_faces";
    let Some(mesh) = ctx.mesh() else {
        return Ok(CheckOutcome::new(name, false, "Could not load mesh"));
    };
    let total = mesh.triangle_count();
    let degenerate = mesh
        .faces
        .iter()
        .filter(|f| mesh.face_area(f) < DEGENERATE_AREA)
        .count();
    let ok = (degenerate as f64) < total as f64 * 0.01;
    Ok(CheckOutcome::new(
        name,
        ok,
        format!("{degenerate}/{total} degenerate faces"),
    ))
}

fn check_bbox_vs_spec(ctx: &CheckContext) -> Result<CheckOutcome> {
    let name = "bbox_vs_spec";
    let Some(mesh) = ctx.mesh() else {
        return Ok(CheckOutcome::new(name, false, "Could not load mesh"));
    };
    let Some(spec_size) = ctx.spec.object.size_m else {
        return Ok(CheckOutcome::new(name, true, "No size_m in spec - skipped"));
    };

    let extents = mesh.extents();
    let mut failures = Vec::new();
    for (axis, spec_val, mesh_val) in [
        ("x", spec_size.x, extents.x),
        ("y", spec_size.y, extents.y),
        ("z", spec_size.z, extents.z),
    ] {
        if spec_val <= 0.0 {
            continue;
        }
        let rel_err = (mesh_val - spec_val).abs() / spec_val;
        if rel_err > BBOX_TOLERANCE_FRAC {
            failures.push(format!(
                "{axis}: mesh={mesh_val:.3}m spec={spec_val:.3}m err={:.1}%",
                rel_err * 100.0
            ));
        }
    }

    let ok = failures.is_empty();
    Ok(CheckOutcome::new(
        name,
        ok,
        if ok {
            "within tolerance".to_owned()
        } else {
            failures.join("; ")
        },
    ))
}

fn check_realistic_scale(ctx: &CheckContext) -> Result<CheckOutcome> {
    let name = "realistic_scale";
    let Some(mesh) = ctx.mesh() else {
        return Ok(CheckOutcome::new(name, false, "Could not load mesh"));
    };

    let extents = mesh.extents();
    let factor = ctx.world.units.to_meters_factor();
    let max_m = extents.max() * factor;
    let min_m = extents.min() * factor;

    let ok = HARD_MIN_M <= min_m && max_m <= HARD_MAX_M;
    Ok(CheckOutcome::new(
        name,
        ok,
        format!(
            "extents={:.3}x{:.3}x{:.3} max={max_m:.3}m",
            extents.x, extents.y, extents.z
        ),
    ))
}

fn check_textures_present(ctx: &CheckContext) -> Result<CheckOutcome> {
    let name = "textures_present";
    let Some(contents) = ctx.contents() else {
        return Ok(CheckOutcome::new(
            name,
            false,
            format!(
                "Could not inspect GLB textures: {}",
                ctx.load_error().unwrap_or("unreadable container")
            ),
        ));
    };

    let ok = contents.has_textures() || contents.has_vertex_colors;
    Ok(CheckOutcome::new(
        name,
        ok,
        format!(
            "{} texture(s), {} image(s), vertex_colors={}",
            contents.texture_count, contents.image_count, contents.has_vertex_colors
        ),
    ))
}

fn check_pivot_at_base(ctx: &CheckContext) -> Result<CheckOutcome> {
    let name = "pivot_at_base";
    let Some(mesh) = ctx.mesh() else {
        return Ok(CheckOutcome::new(name, false, "Could not load mesh"));
    };

    let (min, max) = mesh.bounds();
    let extents = mesh.extents();
    let max_ext = if extents.max() > 0.0 {
        extents.max()
    } else {
        1.0
    };

    let center_x = (min.x + max.x) / 2.0;
    let center_z = (min.z + max.z) / 2.0;
    let base_y = min.y;

    let dist_lateral = (center_x * center_x + center_z * center_z).sqrt();
    let dist_y = base_y.abs();
    let threshold = max_ext * BBOX_TOLERANCE_FRAC;

    let ok = dist_lateral < threshold && dist_y < threshold;
    Ok(CheckOutcome::new(
        name,
        ok,
        format!(
            "lateral offset={dist_lateral:.4}m y_base={base_y:.4}m threshold={threshold:.4}m"
        ),
    ))
}

fn check_watertight(ctx: &CheckContext) -> Result<CheckOutcome> {
    let name = "watertight";
    let Some(mesh) = ctx.mesh() else {
        return Ok(CheckOutcome::new(name, true, "Could not load - skipped"));
    };
    // Diagnostic only, never blocks
    Ok(CheckOutcome::new(
        name,
        true,
        if mesh.is_watertight() {
            "watertight"
        } else {
            "NOT watertight (soft warning)"
        },
    ))
}

fn check_world_unit_match(ctx: &CheckContext) -> Result<CheckOutcome> {
    let name = "world_unit_match";
    let Some(mesh) = ctx.mesh() else {
        return Ok(CheckOutcome::new(name, true, "Could not load - skipped"));
    };

    let max_ext = mesh.extents().max();
    if ctx.world.units == Units::Meters && max_ext > 100.0 {
        return Ok(CheckOutcome::new(
            name,
            false,
            format!(
                "World is meters but object max extent is {max_ext:.1} - possible unit mismatch"
            ),
        ));
    }

    Ok(CheckOutcome::new(
        name,
        true,
        format!("units={:?} max_extent={max_ext:.3}", ctx.world.units),
    ))
}
