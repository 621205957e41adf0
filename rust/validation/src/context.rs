// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shared state for the check battery.

use scenesmith_core::{AssetSpec, PipelineDefaults, WorldContext};
use scenesmith_geometry::{load_glb, GlbContents, TriMesh};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Everything a check may inspect, loaded once up front so the battery
/// never re-reads the container. A container that fails to load leaves
/// `contents` empty and carries the error text for `can_load`.
pub struct CheckContext<'a> {
    pub glb_path: PathBuf,
    pub spec: &'a AssetSpec,
    pub world: &'a WorldContext,
    pub defaults: &'a PipelineDefaults,
    /// File size in bytes, if the file exists
    pub file_size: Option<u64>,
    contents: Option<GlbContents>,
    merged: Option<TriMesh>,
    load_error: Option<String>,
}

impl<'a> CheckContext<'a> {
    pub fn new(
        glb_path: &Path,
        spec: &'a AssetSpec,
        world: &'a WorldContext,
        defaults: &'a PipelineDefaults,
    ) -> Self {
        let file_size = std::fs::metadata(glb_path).ok().map(|m| m.len());

        let (contents, load_error) = match std::fs::read(glb_path) {
            Ok(bytes) => match load_glb(&bytes) {
                Ok(contents) => (Some(contents), None),
                Err(err) => (None, Some(err.to_string())),
            },
            Err(err) => (None, Some(err.to_string())),
        };

        let merged = contents
            .as_ref()
            .filter(|c| !c.meshes.is_empty())
            .map(GlbContents::merged);

        debug!(
            path = %glb_path.display(),
            loaded = merged.is_some(),
            "Check context prepared"
        );

        Self {
            glb_path: glb_path.to_path_buf(),
            spec,
            world,
            defaults,
            file_size,
            contents,
            merged,
            load_error,
        }
    }

    /// Parsed container, if the bytes were a readable GLB
    #[inline]
    pub fn contents(&self) -> Option<&GlbContents> {
        self.contents.as_ref()
    }

    /// All sub-meshes flattened into one, if any loaded
    #[inline]
    pub fn mesh(&self) -> Option<&TriMesh> {
        self.merged.as_ref()
    }

    /// Why loading failed, when it did
    #[inline]
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }
}
