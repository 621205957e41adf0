// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scenesmith Processing
//!
//! Glues the pipeline together: each raw candidate mesh is normalized,
//! exported, placed, and validated independently; candidates run in
//! parallel and the ranked winner is selected at the end.

pub mod batch;
pub mod error;
pub mod pipeline;

pub use batch::{run_pipeline, BatchOutput, CandidateInput};
pub use error::{Error, Result};
pub use pipeline::{process_candidate, CandidateResult};
