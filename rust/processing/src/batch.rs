// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parallel batch orchestration and winner selection.

use crate::error::{Error, Result};
use crate::pipeline::{process_candidate, CandidateResult};
use rayon::prelude::*;
use scenesmith_core::{AssetSpec, PipelineDefaults, WorldContext};
use scenesmith_validation::rank_reports;
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

/// One raw candidate, as produced by a mesh generator.
#[derive(Debug, Clone)]
pub struct CandidateInput {
    pub id: String,
    pub raw_glb: Vec<u8>,
}

/// Batch result: every surviving candidate plus the ranked winner.
#[derive(Debug, Serialize)]
pub struct BatchOutput {
    pub candidates: Vec<CandidateResult>,
    /// Index into `candidates` of the best-ranked entry
    pub best: usize,
}

impl BatchOutput {
    #[inline]
    pub fn winner(&self) -> &CandidateResult {
        &self.candidates[self.best]
    }
}

/// Process a batch of candidates in parallel and pick the winner.
///
/// Candidates are independent, so they fan out across the rayon pool. A
/// candidate that errors out is logged and dropped; the batch only fails
/// when no candidate survives. Ranking prefers passing candidates, then
/// higher scores, and keeps submission order on ties.
pub fn run_pipeline(
    candidates: &[CandidateInput],
    spec: &AssetSpec,
    world: &WorldContext,
    defaults: &PipelineDefaults,
    out_dir: &Path,
) -> Result<BatchOutput> {
    spec.validate()?;
    info!(count = candidates.len(), "Running candidate batch");

    let mut survivors: Vec<CandidateResult> = candidates
        .par_iter()
        .filter_map(|candidate| {
            match process_candidate(
                &candidate.id,
                &candidate.raw_glb,
                spec,
                world,
                defaults,
                out_dir,
            ) {
                Ok(result) => Some(result),
                Err(err) => {
                    warn!(candidate = %candidate.id, error = %err, "Candidate dropped");
                    None
                }
            }
        })
        .collect();

    if survivors.is_empty() {
        return Err(Error::NoCandidates);
    }

    // Parallel collection preserves input order, so ranking stays stable
    // with respect to submission order.
    let reports: Vec<_> = survivors.iter().map(|c| c.report.clone()).collect();
    let ranking = rank_reports(&reports);
    let best = ranking[0];

    info!(
        winner = %survivors[best].id,
        score = survivors[best].report.score,
        passed = survivors[best].report.passed,
        "Batch complete"
    );

    // Reorder so callers can also iterate best-first
    let mut ranked = Vec::with_capacity(survivors.len());
    for index in ranking {
        ranked.push(survivors[index].clone());
    }
    survivors = ranked;

    Ok(BatchOutput {
        candidates: survivors,
        best: 0,
    })
}
