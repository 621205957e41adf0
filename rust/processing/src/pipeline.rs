// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-candidate pipeline: normalize, export, place, validate.

use crate::error::Result;
use scenesmith_core::{
    AssetSpec, PipelineDefaults, ValidationReport, WorldContext, WorldPatch,
};
use scenesmith_geometry::{
    export_glb, load_glb, normalize, patch_material, NormalizeOptions, NormalizeStats,
};
use scenesmith_placement::{extents_from_glb, resolve_placement};
use scenesmith_validation::run_all_checks;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Outcome of one candidate's trip through the pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateResult {
    pub id: String,
    pub cleaned_glb: PathBuf,
    pub stats: NormalizeStats,
    pub report: ValidationReport,
    pub world_patch: WorldPatch,
}

/// Run one raw candidate through the full pipeline.
///
/// Writes three artifacts under `out_dir/<id>/`: `cleaned.glb`,
/// `validation_report.json`, and `world_patch.json`. The report and the
/// patch are also returned so callers rank without re-reading files.
pub fn process_candidate(
    id: &str,
    raw_glb: &[u8],
    spec: &AssetSpec,
    world: &WorldContext,
    defaults: &PipelineDefaults,
    out_dir: &Path,
) -> Result<CandidateResult> {
    info!(candidate = id, bytes = raw_glb.len(), "Processing candidate");

    let raw = load_glb(raw_glb)?;
    let options = NormalizeOptions::from_spec(spec, defaults, world.up_axis);
    let cleaned = normalize(raw.meshes, &options)?;

    let mut glb_bytes = export_glb(&cleaned.mesh)?;
    patch_material(
        &mut glb_bytes,
        cleaned.base_color_linear,
        cleaned.metallic,
        cleaned.roughness,
    )?;

    let candidate_dir = out_dir.join(id);
    std::fs::create_dir_all(&candidate_dir)?;
    let cleaned_glb = candidate_dir.join("cleaned.glb");
    std::fs::write(&cleaned_glb, &glb_bytes)?;

    let extents = extents_from_glb(&glb_bytes, defaults);
    let world_patch = resolve_placement(
        spec,
        world,
        extents,
        &cleaned_glb.display().to_string(),
        defaults,
    );

    let report = run_all_checks(&cleaned_glb, spec, world, defaults);

    write_json(&candidate_dir.join("validation_report.json"), &report)?;
    write_json(&candidate_dir.join("world_patch.json"), &world_patch)?;

    info!(
        candidate = id,
        passed = report.passed,
        score = report.score,
        "Candidate processed"
    );

    Ok(CandidateResult {
        id: id.to_owned(),
        cleaned_glb,
        stats: cleaned.stats,
        report,
        world_patch,
    })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    std::fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}
