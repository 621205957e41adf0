// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scenesmith Validation
//!
//! The automated check battery run over every cleaned asset: a fixed,
//! ordered list of checks producing a [`ValidationReport`], plus the
//! cross-candidate ranking that picks the best mesh of a batch.

pub mod checks;
pub mod context;
pub mod error;
pub mod rank;

pub use checks::{run_all_checks, HARD_FAIL_CHECKS};
pub use context::CheckContext;
pub use error::{Error, Result};
pub use rank::rank_reports;
