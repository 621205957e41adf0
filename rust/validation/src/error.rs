// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for check execution
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised inside an individual check. The runner converts these
/// into failed check outcomes; they never abort the battery.
#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Geometry(#[from] scenesmith_geometry::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
