// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Output documents: the validation report and the world patch.
//!
//! Both are produced once per candidate and immutable afterwards.

use crate::spec::Vec3;
use serde::{Deserialize, Serialize};

/// Result of one validation check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub name: String,
    pub passed: bool,
    pub message: String,
}

impl CheckOutcome {
    /// Build an outcome; message accepts anything stringifiable
    pub fn new(name: &str, passed: bool, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            passed,
            message: message.into(),
        }
    }
}

/// Aggregated validation verdict (`validation_report.json`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub passed: bool,
    /// Fraction of checks passed, rounded to 3 decimals
    pub score: f64,
    pub checks: Vec<CheckOutcome>,
    pub summary: String,
}

/// World patch document (`world_patch.json`) telling a world engine how to
/// insert the generated object into the existing scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldPatch {
    pub schema_version: String,
    pub world_id: String,
    pub object: PatchObject,
    pub transform: PatchTransform,
    pub placement: PatchPlacement,
    pub physics: PatchPhysics,
    pub warnings: Vec<String>,
}

/// Identity of the inserted object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchObject {
    pub name: String,
    pub category: String,
    /// Local path of the exported container; replaced with a cloud URI by
    /// the consuming application.
    pub asset_uri: String,
}

/// Final world-space transform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchTransform {
    pub position: Vec3,
    pub rotation_euler_deg: Vec3,
    pub scale: Vec3,
    /// Flat 16-float column-major matrix (glTF convention)
    pub matrix_4x4_col_major: Vec<f64>,
}

/// Placement parameters echoed back for the consumer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchPlacement {
    pub target_surface_id: String,
    pub clearance_m: f64,
    pub anchors: Vec<String>,
    pub collision_allowed: bool,
}

/// Physics hints for the world engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchPhysics {
    pub gravity: f64,
    pub is_static: bool,
    pub collision_mesh: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_serialization_shape() {
        let report = ValidationReport {
            passed: true,
            score: 0.917,
            checks: vec![CheckOutcome::new("file_exists", true, "/tmp/a.glb")],
            summary: "11/12 checks passed".to_string(),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["passed"], true);
        assert_eq!(json["score"], 0.917);
        assert_eq!(json["checks"][0]["name"], "file_exists");
        assert_eq!(json["checks"][0]["passed"], true);
        assert!(json["checks"][0]["message"].is_string());
    }

    #[test]
    fn test_patch_matrix_length() {
        let patch = WorldPatch {
            schema_version: "1.0".to_string(),
            world_id: "unknown".to_string(),
            object: PatchObject {
                name: "generated_asset".to_string(),
                category: "prop".to_string(),
                asset_uri: "cleaned.glb".to_string(),
            },
            transform: PatchTransform {
                position: Vec3::default(),
                rotation_euler_deg: Vec3::default(),
                scale: Vec3::new(1.0, 1.0, 1.0),
                matrix_4x4_col_major: vec![0.0; 16],
            },
            placement: PatchPlacement {
                target_surface_id: "unknown".to_string(),
                clearance_m: 0.02,
                anchors: vec!["sit_flat".to_string()],
                collision_allowed: false,
            },
            physics: PatchPhysics {
                gravity: 9.81,
                is_static: true,
                collision_mesh: "convex_hull".to_string(),
            },
            warnings: vec![],
        };
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json["transform"]["matrix_4x4_col_major"].as_array().unwrap().len(), 16);
    }
}
