// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wraps the external probe tool: given a user identifier, reports whether
//! the user is currently live and, if so, the stream URL the capture tool
//! should be pointed at.

use std::path::PathBuf;
use std::time::Duration;

use tokio::process::Command;
use tracing::debug;

use crate::error::AdapterError;

#[derive(Debug, Clone)]
pub struct ProbeTool {
    pub binary: PathBuf,
}

impl ProbeTool {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Probe `user`. Exit 0 with a URL on stdout means live; nonzero means
    /// not live. A probe that cannot even be spawned is an [`AdapterError`].
    pub async fn probe(&self, user: &str, timeout: Duration) -> Result<Option<String>, AdapterError> {
        let mut cmd = Command::new(&self.binary);
        cmd.arg(user);

        let output = twr_shell::run_with_timeout(cmd, timeout, "probe")
            .await
            .map_err(AdapterError::Probe)?;

        if !output.status.success() {
            debug!(user, status = %output.status, "probe reports user not live");
            return Ok(None);
        }
        let url = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if url.is_empty() {
            debug!(user, "probe exited 0 but printed no url, treating as not live");
            return Ok(None);
        }
        debug!(user, "probe reports user live");
        Ok(Some(url))
    }
}
