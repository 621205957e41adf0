// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Scenesmith Core
//!
//! Data model shared by every stage of the asset pipeline:
//!
//! - **AssetSpec**: what to build (target size, materials, placement intent,
//!   quality budget)
//! - **WorldContext**: where it goes (up axis, units, surfaces, occupied
//!   regions)
//! - **ValidationReport** / **WorldPatch**: what came out (per-check results
//!   and the world-space transform document)
//! - **PipelineDefaults**: every fallback constant in one place, constructed
//!   once per candidate and threaded through explicitly
//!
//! All types round-trip through serde with the field names the JSON
//! documents use on disk.

pub mod defaults;
pub mod error;
pub mod report;
pub mod spec;
pub mod world;

pub use defaults::{PipelineDefaults, ResolvedPbr};
pub use error::{Error, Result};
pub use report::{CheckOutcome, PatchObject, PatchPhysics, PatchPlacement, PatchTransform, ValidationReport, WorldPatch};
pub use spec::{AssetSpec, GenerationPlan, MaterialSpec, ObjectSpec, PbrSpec, PlacementSpec, Pose, QualityTargets, Vec3};
pub use world::{OccupiedRegion, RegionBbox, Surface, SurfaceBbox, SurfacePose, Units, UpAxis, WorldContext, WorldPhysics};
