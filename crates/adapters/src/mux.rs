// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wraps the external mux tool for the two post-capture steps that do not
//! need mid-flight signaling: concatenating recorded parts into one `.ts`,
//! and remuxing that `.ts` into a faststart `.mp4`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::AdapterError;

#[derive(Debug, Clone)]
pub struct MuxTool {
    pub binary: PathBuf,
}

impl MuxTool {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Concatenate `parts`, in order, into `out_ts`.
    pub async fn merge_parts(
        &self,
        parts: &[PathBuf],
        out_ts: &Path,
        timeout: Duration,
    ) -> Result<(), AdapterError> {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("merge");
        for part in parts {
            cmd.arg(part);
        }
        cmd.arg("--output").arg(out_ts);

        debug!(count = parts.len(), out = %out_ts.display(), "merging parts");

        let output = twr_shell::run_with_timeout(cmd, timeout, "merge")
            .await
            .map_err(AdapterError::Merge)?;

        if !output.status.success() {
            warn!(status = %output.status, out = %out_ts.display(), "merge tool exited nonzero");
            return Err(AdapterError::MergeNonZero {
                status: output.status.to_string(),
                count: parts.len(),
                path: out_ts.to_path_buf(),
            });
        }
        Ok(())
    }

    /// Remux `ts_path` into `mp4_path` with the moov atom moved to the
    /// front (faststart), stream-copying rather than re-encoding.
    pub async fn remux_to_mp4(
        &self,
        ts_path: &Path,
        mp4_path: &Path,
        timeout: Duration,
    ) -> Result<(), AdapterError> {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("remux")
            .arg(ts_path)
            .arg("--output")
            .arg(mp4_path)
            .arg("--faststart");

        debug!(ts = %ts_path.display(), mp4 = %mp4_path.display(), "remuxing to mp4");

        let output = twr_shell::run_with_timeout(cmd, timeout, "remux")
            .await
            .map_err(AdapterError::Remux)?;

        if !output.status.success() {
            warn!(status = %output.status, mp4 = %mp4_path.display(), "remux tool exited nonzero");
            return Err(AdapterError::RemuxNonZero {
                status: output.status.to_string(),
                path: mp4_path.to_path_buf(),
            });
        }
        Ok(())
    }
}
