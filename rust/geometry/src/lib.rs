// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scenesmith Geometry
//!
//! Mesh-side core of the asset pipeline: the owned triangle mesh type,
//! repair and decimation passes, the ordered normalization pipeline, and
//! the self-contained GLB container codec used to persist cleaned meshes.

pub mod color;
pub mod decimate;
pub mod error;
pub mod glb;
pub mod mesh;
pub mod normalize;
pub mod repair;

// Re-export nalgebra types for convenience
pub use nalgebra::{Matrix4, Point3, Vector3};

pub use color::{hex_to_linear_rgba, linear_to_srgb, srgb_to_linear};
pub use decimate::decimate_to_target;
pub use error::{Error, Result};
pub use glb::{export_glb, load_glb, patch_material, GlbContents};
pub use mesh::TriMesh;
pub use normalize::{normalize, CleanedMesh, NormalizeOptions, NormalizeStats};
