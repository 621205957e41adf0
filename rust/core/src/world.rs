// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! World context (`world_context.json`): the scene the asset lands in.
//!
//! Surfaces are horizontal rectangles with a top height; occupied regions
//! are lateral rectangles already claimed by other objects. Coordinates use
//! the world's own up axis and unit system.

use serde::{Deserialize, Serialize};

/// World up axis. Y-up is the default (glTF convention).
///
/// Producers disagree on case, so both `"Y"` and `"y"` parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UpAxis {
    #[serde(alias = "x")]
    X,
    #[default]
    #[serde(alias = "y")]
    Y,
    #[serde(alias = "z")]
    Z,
}

impl UpAxis {
    /// Index of the up axis (0 = x, 1 = y, 2 = z)
    #[inline]
    pub fn index(self) -> usize {
        match self {
            UpAxis::X => 0,
            UpAxis::Y => 1,
            UpAxis::Z => 2,
        }
    }

    /// Indices of the two lateral axes, in ascending order
    #[inline]
    pub fn lateral_indices(self) -> (usize, usize) {
        match self {
            UpAxis::X => (1, 2),
            UpAxis::Y => (0, 2),
            UpAxis::Z => (0, 1),
        }
    }
}

/// World length units.
///
/// Unknown unit strings deserialize to [`Units::Other`], which downstream
/// code treats as meters (the safe default for scale heuristics).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Meters,
    Centimeters,
    #[serde(other)]
    Other,
}

impl Units {
    /// Multiplier converting this unit to meters
    #[inline]
    pub fn to_meters_factor(self) -> f64 {
        match self {
            Units::Meters | Units::Other => 1.0,
            Units::Centimeters => 0.01,
        }
    }
}

/// Full world description handed to placement and validation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldContext {
    #[serde(default)]
    pub world_id: Option<String>,
    #[serde(default)]
    pub up_axis: UpAxis,
    #[serde(default)]
    pub units: Units,
    #[serde(default)]
    pub surfaces: Vec<Surface>,
    #[serde(default)]
    pub occupied_regions: Vec<OccupiedRegion>,
    #[serde(default)]
    pub physics: Option<WorldPhysics>,
}

impl WorldContext {
    /// Look up a surface by id; `None` when the id is unknown or absent.
    pub fn surface_by_id(&self, id: &str) -> Option<&Surface> {
        self.surfaces.iter().find(|s| s.id == id)
    }
}

/// A placeable surface (table top, shelf, floor region)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Surface {
    pub id: String,
    #[serde(default)]
    pub bbox: SurfaceBbox,
    #[serde(default)]
    pub pose: Option<SurfacePose>,
}

impl Surface {
    /// Height of the surface top along the up axis.
    ///
    /// Derivation chain mirrors the world-patch producers this format came
    /// from: `max_<up>` when present and non-zero, else `pose.<up> +
    /// bbox.height`, else 0.0. A `max_<up>` of exactly 0.0 intentionally
    /// falls through to the pose + height derivation.
    pub fn top_height(&self, up_axis: UpAxis) -> f64 {
        if let Some(max_up) = self.bbox.max_y {
            if max_up != 0.0 {
                return max_up;
            }
        }
        let pose_up = self
            .pose
            .as_ref()
            .map(|p| match up_axis {
                UpAxis::X => p.x,
                UpAxis::Y => p.y,
                UpAxis::Z => p.z,
            })
            .unwrap_or(0.0);
        pose_up + self.bbox.height.unwrap_or(0.0)
    }
}

/// Surface bounding description. `max_y` holds the top coordinate along the
/// world up axis regardless of which axis that is (legacy field name from
/// the Y-up JSON producers).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SurfaceBbox {
    #[serde(default)]
    pub min_x: Option<f64>,
    #[serde(default)]
    pub max_x: Option<f64>,
    #[serde(default)]
    pub min_z: Option<f64>,
    #[serde(default)]
    pub max_z: Option<f64>,
    #[serde(default)]
    pub max_y: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub center_x: Option<f64>,
    #[serde(default)]
    pub center_z: Option<f64>,
}

/// World-space pose of a surface
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SurfacePose {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

/// A lateral rectangle already claimed by another object
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OccupiedRegion {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub bbox: RegionBbox,
}

/// Lateral extent of an occupied region
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RegionBbox {
    #[serde(default)]
    pub min_x: f64,
    #[serde(default)]
    pub max_x: f64,
    #[serde(default)]
    pub min_z: f64,
    #[serde(default)]
    pub max_z: f64,
}

/// World physics parameters consumed by the patch document
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WorldPhysics {
    pub gravity: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_up_axis_indices() {
        assert_eq!(UpAxis::Y.index(), 1);
        assert_eq!(UpAxis::Y.lateral_indices(), (0, 2));
        assert_eq!(UpAxis::Z.lateral_indices(), (0, 1));
        assert_eq!(UpAxis::X.lateral_indices(), (1, 2));
    }

    #[test]
    fn test_up_axis_accepts_lowercase() {
        let w: WorldContext = serde_json::from_str(r#"{"up_axis": "y"}"#).unwrap();
        assert_eq!(w.up_axis, UpAxis::Y);
        let w: WorldContext = serde_json::from_str(r#"{"up_axis": "z"}"#).unwrap();
        assert_eq!(w.up_axis, UpAxis::Z);
        let w: WorldContext = serde_json::from_str(r#"{"up_axis": "X"}"#).unwrap();
        assert_eq!(w.up_axis, UpAxis::X);
    }

    #[test]
    fn test_units_parsing() {
        let w: WorldContext = serde_json::from_str(r#"{"units": "centimeters"}"#).unwrap();
        assert_eq!(w.units, Units::Centimeters);
        assert_eq!(w.units.to_meters_factor(), 0.01);

        let w: WorldContext = serde_json::from_str(r#"{"units": "furlongs"}"#).unwrap();
        assert_eq!(w.units, Units::Other);
        assert_eq!(w.units.to_meters_factor(), 1.0);
    }

    #[test]
    fn test_default_world() {
        let w: WorldContext = serde_json::from_str("{}").unwrap();
        assert_eq!(w.up_axis, UpAxis::Y);
        assert_eq!(w.units, Units::Meters);
        assert!(w.surfaces.is_empty());
    }

    #[test]
    fn test_surface_top_from_max() {
        let s: Surface = serde_json::from_str(
            r#"{"id": "table", "bbox": {"max_y": 0.9, "center_x": 1.0, "center_z": 2.0}}"#,
        )
        .unwrap();
        assert_eq!(s.top_height(UpAxis::Y), 0.9);
    }

    #[test]
    fn test_surface_top_from_pose_plus_height() {
        let s: Surface = serde_json::from_str(
            r#"{"id": "shelf", "bbox": {"height": 0.3}, "pose": {"y": 1.2}}"#,
        )
        .unwrap();
        assert!((s.top_height(UpAxis::Y) - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_surface_top_defaults_to_zero() {
        let s: Surface = serde_json::from_str(r#"{"id": "floor"}"#).unwrap();
        assert_eq!(s.top_height(UpAxis::Y), 0.0);
    }

    #[test]
    fn test_surface_lookup() {
        let w: WorldContext = serde_json::from_str(
            r#"{"surfaces": [{"id": "a"}, {"id": "b"}]}"#,
        )
        .unwrap();
        assert_eq!(w.surface_by_id("b").unwrap().id, "b");
        assert!(w.surface_by_id("missing").is_none());
    }
}
