// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for core data-model operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while validating input documents
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid asset spec: {0}")]
    InvalidSpec(String),

    #[error("Invalid world context: {0}")]
    InvalidWorld(String),
}
