// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scenesmith Placement
//!
//! Turns an asset spec pose plus a world context into a concrete world
//! transform: snaps the object onto its target surface, warns about
//! overlaps with occupied regions, and assembles the world patch document
//! a scene engine consumes.

pub mod resolver;
pub mod transform;

pub use resolver::{extents_from_glb, resolve_placement};
pub use transform::{matrix_col_major, transform_matrix};
