// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during mesh processing
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid color format: {0}")]
    InvalidColorFormat(String),

    #[error("Empty mesh: {0}")]
    EmptyMesh(String),

    #[error("Unsupported scene: {0}")]
    UnsupportedScene(String),

    #[error("Container format error: {0}")]
    ContainerFormat(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
