// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Asset specification tree (`asset_spec.json`).
//!
//! Three subtrees matter to the pipeline: `object` (name, target size,
//! materials), `placement` (surface, pose, clearance), and
//! `generation_plan.quality_targets` (triangle budget). Everything is
//! optional-with-defaults so a sparse spec still normalizes and places.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Upper bound accepted for `max_tris`; larger budgets are a spec error.
pub const MAX_TRIS_CAP: u32 = 120_000;

/// A 3-component vector serialized as `{x, y, z}`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl Vec3 {
    /// Create a new vector
    #[inline]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Component by axis index (0 = x, 1 = y, 2 = z)
    #[inline]
    pub fn component(&self, axis: usize) -> f64 {
        match axis {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    /// Set a component by axis index
    #[inline]
    pub fn set_component(&mut self, axis: usize, value: f64) {
        match axis {
            0 => self.x = value,
            1 => self.y = value,
            _ => self.z = value,
        }
    }

    /// True if all three components are finite
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Full asset specification
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetSpec {
    #[serde(default)]
    pub object: ObjectSpec,
    #[serde(default)]
    pub placement: PlacementSpec,
    #[serde(default)]
    pub generation_plan: GenerationPlan,
}

/// The `object` subtree: identity, physical size, materials
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObjectSpec {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    /// Target physical extents in meters; `None` or a zero axis means
    /// "no target on that axis".
    #[serde(default)]
    pub size_m: Option<Vec3>,
    #[serde(default)]
    pub materials: Vec<MaterialSpec>,
}

/// One material entry; only the first is consulted by the normalizer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaterialSpec {
    #[serde(default)]
    pub pbr: PbrSpec,
}

/// Constant PBR parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PbrSpec {
    /// 3- or 6-digit hex, `#` optional
    #[serde(rename = "baseColor", default)]
    pub base_color: Option<String>,
    #[serde(default)]
    pub metallic: Option<f64>,
    #[serde(default)]
    pub roughness: Option<f64>,
    #[serde(default)]
    pub emissive: Option<String>,
}

/// The `placement` subtree
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlacementSpec {
    #[serde(default)]
    pub target_surface_id: Option<String>,
    #[serde(default)]
    pub pose: Pose,
    /// Vertical offset above the resolved surface; defaults handled by
    /// [`crate::PipelineDefaults`].
    #[serde(default)]
    pub clearance_m: Option<f64>,
    #[serde(default)]
    pub collision_allowed: bool,
    #[serde(default)]
    pub anchors: Vec<String>,
}

/// Desired pose: position plus extrinsic ZYX Euler rotation in degrees
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Pose {
    #[serde(default)]
    pub position: Vec3,
    #[serde(default)]
    pub rotation_euler_deg: Vec3,
}

/// The `generation_plan` subtree (only quality targets are in scope here)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationPlan {
    #[serde(default)]
    pub quality_targets: QualityTargets,
}

/// Mesh quality budget
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QualityTargets {
    #[serde(default)]
    pub max_tris: Option<u32>,
    #[serde(default)]
    pub texture_resolution: Option<u32>,
}

impl AssetSpec {
    /// Check the invariants the pipeline relies on: every numeric field is
    /// finite and the triangle budget is within the accepted cap.
    ///
    /// Malformed hex colors are caught later, at resolution time, so a spec
    /// that never touches its material block still validates.
    pub fn validate(&self) -> Result<()> {
        if let Some(size) = &self.object.size_m {
            if !size.is_finite() {
                return Err(Error::InvalidSpec(format!(
                    "object.size_m must be finite, got ({}, {}, {})",
                    size.x, size.y, size.z
                )));
            }
        }
        if !self.placement.pose.position.is_finite() {
            return Err(Error::InvalidSpec(
                "placement.pose.position must be finite".to_string(),
            ));
        }
        if !self.placement.pose.rotation_euler_deg.is_finite() {
            return Err(Error::InvalidSpec(
                "placement.pose.rotation_euler_deg must be finite".to_string(),
            ));
        }
        if let Some(clearance) = self.placement.clearance_m {
            if !clearance.is_finite() {
                return Err(Error::InvalidSpec("placement.clearance_m must be finite".to_string()));
            }
        }
        for (i, material) in self.object.materials.iter().enumerate() {
            for (field, value) in [
                ("metallic", material.pbr.metallic),
                ("roughness", material.pbr.roughness),
            ] {
                if let Some(v) = value {
                    if !v.is_finite() || !(0.0..=1.0).contains(&v) {
                        return Err(Error::InvalidSpec(format!(
                            "materials[{i}].pbr.{field} must be in [0, 1], got {v}"
                        )));
                    }
                }
            }
        }
        if let Some(max_tris) = self.generation_plan.quality_targets.max_tris {
            if max_tris == 0 || max_tris > MAX_TRIS_CAP {
                return Err(Error::InvalidSpec(format!(
                    "quality_targets.max_tris must be in 1..={MAX_TRIS_CAP}, got {max_tris}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_spec_validates() {
        let spec = AssetSpec::default();
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn test_spec_roundtrip() {
        let json = r##"{
            "object": {
                "name": "ceramic mug",
                "category": "prop",
                "size_m": {"x": 0.1, "y": 0.12, "z": 0.1},
                "materials": [{"pbr": {"baseColor": "#aa4400", "metallic": 0.1, "roughness": 0.7}}]
            },
            "placement": {
                "target_surface_id": "table_01",
                "pose": {"position": {"x": 1.0, "y": 0.0, "z": -0.5}},
                "clearance_m": 0.02,
                "collision_allowed": false,
                "anchors": ["sit_flat"]
            },
            "generation_plan": {"quality_targets": {"max_tris": 80000, "texture_resolution": 1024}}
        }"##;
        let spec: AssetSpec = serde_json::from_str(json).unwrap();
        assert!(spec.validate().is_ok());
        assert_eq!(spec.object.name.as_deref(), Some("ceramic mug"));
        assert_eq!(spec.object.materials[0].pbr.base_color.as_deref(), Some("#aa4400"));
        assert_eq!(spec.placement.target_surface_id.as_deref(), Some("table_01"));
        assert_eq!(spec.generation_plan.quality_targets.max_tris, Some(80_000));

        let back = serde_json::to_string(&spec).unwrap();
        let reparsed: AssetSpec = serde_json::from_str(&back).unwrap();
        assert_eq!(reparsed.placement.pose.position.x, 1.0);
    }

    #[test]
    fn test_sparse_spec_defaults() {
        let spec: AssetSpec = serde_json::from_str(r#"{"object": {"name": "lamp"}}"#).unwrap();
        assert!(spec.object.size_m.is_none());
        assert!(spec.placement.target_surface_id.is_none());
        assert!(!spec.placement.collision_allowed);
        assert!(spec.generation_plan.quality_targets.max_tris.is_none());
    }

    #[test]
    fn test_non_finite_size_rejected() {
        let mut spec = AssetSpec::default();
        spec.object.size_m = Some(Vec3::new(f64::NAN, 0.2, 0.3));
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_max_tris_cap() {
        let mut spec = AssetSpec::default();
        spec.generation_plan.quality_targets.max_tris = Some(200_000);
        assert!(spec.validate().is_err());
        spec.generation_plan.quality_targets.max_tris = Some(120_000);
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn test_metallic_out_of_range() {
        let mut spec = AssetSpec::default();
        spec.object.materials.push(MaterialSpec {
            pbr: PbrSpec {
                metallic: Some(1.5),
                ..Default::default()
            },
        });
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_vec3_component_access() {
        let mut v = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(v.component(0), 1.0);
        assert_eq!(v.component(2), 3.0);
        v.set_component(1, 5.0);
        assert_eq!(v.y, 5.0);
    }
}
