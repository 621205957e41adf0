// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while running the candidate pipeline
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Geometry(#[from] scenesmith_geometry::Error),

    #[error(transparent)]
    Spec(#[from] scenesmith_core::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no candidate survived the pipeline")]
    NoCandidates,
}
