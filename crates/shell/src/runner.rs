// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run-to-completion-or-timeout invocation of an external tool.
//!
//! This covers every external call except the transcoder, which needs to be
//! signaled mid-flight (see [`crate::pausable`]).

use std::process::Output;
use std::time::Duration;

use tokio::process::Command;

use crate::error::ShellError;

/// Default timeout for a liveness probe.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(15);

/// Default timeout for one capture-tool segment invocation.
pub const CAPTURE_SEGMENT_TIMEOUT: Duration = Duration::from_secs(3600);

/// Default timeout for a merge (concat) invocation.
pub const MERGE_TIMEOUT: Duration = Duration::from_secs(300);

/// Default timeout for a remux invocation.
pub const REMUX_TIMEOUT: Duration = Duration::from_secs(300);

/// Run a subprocess command with a timeout.
///
/// Wraps `Command::output()` with `tokio::time::timeout`, converting timeout
/// expiration into a descriptive error. The child process is killed
/// automatically if the timeout elapses (via the tokio `Child` drop
/// implementation).
pub async fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
    description: &str,
) -> Result<Output, ShellError> {
    cmd.kill_on_drop(true);
    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(source)) => Err(ShellError::Spawn {
            description: description.to_string(),
            source,
        }),
        Err(_elapsed) => Err(ShellError::Timeout {
            description: description.to_string(),
            timeout_secs: timeout.as_secs(),
        }),
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
