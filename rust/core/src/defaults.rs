// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Centralized pipeline defaults.
//!
//! Every fallback constant the pipeline uses lives here, constructed once
//! per candidate and threaded explicitly through the normalizer, resolver,
//! and validator instead of being re-derived in each function.

use crate::spec::{AssetSpec, PbrSpec, PlacementSpec};

/// Fallback constants for one candidate run
#[derive(Debug, Clone)]
pub struct PipelineDefaults {
    /// Vertical clearance above the resolved surface
    pub clearance_m: f64,
    /// Triangle budget when the spec has none
    pub max_tris: u32,
    /// Per-axis extent assumed when the mesh has no usable bounding box
    pub fallback_extent_m: f64,
    /// Flat material applied when the spec has no materials
    pub base_color_hex: String,
    pub metallic: f64,
    pub roughness: f64,
    /// Anchors written to the patch when the spec lists none
    pub anchors: Vec<String>,
    /// Gravity written to the patch when the world has no physics block
    pub gravity: f64,
    /// Patch document schema version
    pub schema_version: String,
}

impl Default for PipelineDefaults {
    fn default() -> Self {
        Self {
            clearance_m: 0.02,
            max_tris: 80_000,
            fallback_extent_m: 0.5,
            base_color_hex: "#808080".to_string(),
            metallic: 0.0,
            roughness: 0.5,
            anchors: vec!["sit_flat".to_string()],
            gravity: 9.81,
            schema_version: "1.0".to_string(),
        }
    }
}

impl PipelineDefaults {
    /// Triangle budget: spec value when present, default otherwise
    pub fn resolve_max_tris(&self, spec: &AssetSpec) -> u32 {
        spec.generation_plan
            .quality_targets
            .max_tris
            .unwrap_or(self.max_tris)
    }

    /// Clearance: spec value when present, default otherwise
    pub fn resolve_clearance(&self, placement: &PlacementSpec) -> f64 {
        placement.clearance_m.unwrap_or(self.clearance_m)
    }

    /// Anchors: spec list when non-empty, default otherwise
    pub fn resolve_anchors(&self, placement: &PlacementSpec) -> Vec<String> {
        if placement.anchors.is_empty() {
            self.anchors.clone()
        } else {
            placement.anchors.clone()
        }
    }

    /// Resolve the effective PBR constants: the first material entry with
    /// missing fields filled from the defaults.
    pub fn resolve_pbr(&self, spec: &AssetSpec) -> ResolvedPbr {
        let pbr = spec
            .object
            .materials
            .first()
            .map(|m| m.pbr.clone())
            .unwrap_or_else(PbrSpec::default);
        ResolvedPbr {
            base_color_hex: pbr.base_color.unwrap_or_else(|| self.base_color_hex.clone()),
            metallic: pbr.metallic.unwrap_or(self.metallic),
            roughness: pbr.roughness.unwrap_or(self.roughness),
        }
    }
}

/// PBR constants with every field resolved
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPbr {
    pub base_color_hex: String,
    pub metallic: f64,
    pub roughness: f64,
}
