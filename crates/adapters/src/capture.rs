// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wraps the external capture tool: given a user identifier and a quality
//! string, it writes one segment to a path passed on the command line,
//! exiting 0 on a clean stream end and nonzero on error/unavailability.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::AdapterError;

/// Outcome of one capture-tool invocation. A nonzero exit is an ordinary,
/// expected outcome (the caller retries within the recorder's retry
/// window) — it is not an [`AdapterError`]; only a failure to even spawn
/// the tool, or the tool hanging past its hard timeout, is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// The capture tool exited 0: the stream ended cleanly.
    Ended,
    /// The capture tool exited nonzero or was killed for exceeding its
    /// per-segment timeout: the caller may retry within the retry window.
    Failed,
}

#[derive(Debug, Clone)]
pub struct CaptureTool {
    pub binary: PathBuf,
}

impl CaptureTool {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Invoke the capture tool to write the next segment for `user` at
    /// `quality` to `segment_path`.
    pub async fn capture_segment(
        &self,
        user: &str,
        quality: &str,
        segment_path: &Path,
        timeout: Duration,
    ) -> Result<CaptureOutcome, AdapterError> {
        debug!(user, quality, segment = %segment_path.display(), "starting capture segment");

        let mut cmd = Command::new(&self.binary);
        cmd.arg(user)
            .arg("--quality")
            .arg(quality)
            .arg(segment_path);

        match twr_shell::run_with_timeout(cmd, timeout, "capture").await {
            Ok(output) if output.status.success() => {
                debug!(user, segment = %segment_path.display(), "capture segment ended cleanly");
                Ok(CaptureOutcome::Ended)
            }
            Ok(output) => {
                warn!(user, status = %output.status, "capture tool exited nonzero");
                Ok(CaptureOutcome::Failed)
            }
            Err(twr_shell::ShellError::Timeout { .. }) => {
                warn!(user, timeout_secs = timeout.as_secs(), "capture tool timed out");
                Ok(CaptureOutcome::Failed)
            }
            Err(e) => {
                warn!(user, error = %e, "failed to run capture tool");
                Err(AdapterError::Capture(e))
            }
        }
    }
}
