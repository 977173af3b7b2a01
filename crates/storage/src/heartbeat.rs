// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Generic atomic heartbeat writer, shared by the Encode Daemon and Poller
//! Daemon status files.

use std::path::{Path, PathBuf};

use serde::Serialize;
use twr_core::fsutil::atomic_write_json;

use crate::error::SlotError;

/// Writes a `T` to `path` atomically (temp-then-rename) on every call. Kept
/// as a thin struct rather than a bare function so callers can hold one
/// instance per status file without re-deriving the path each tick.
pub struct HeartbeatWriter {
    path: PathBuf,
}

impl HeartbeatWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write<T: Serialize>(&self, status: &T) -> Result<(), SlotError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| SlotError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        atomic_write_json(&self.path, status).map_err(|source| SlotError::Io {
            path: self.path.clone(),
            source,
        })
    }
}
