// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Logging setup, shared by every subcommand.
//!
//! One-shot commands log to stderr. The two long-lived daemons
//! (`encode-daemon run`, `poller run`) additionally write to a rotating
//! file under `paths.logs_dir` so `tail`-ing a log survives the process
//! that's detached from any terminal.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Held for the lifetime of the process so the non-blocking writer keeps
/// flushing. Dropping it early truncates whatever hasn't been flushed yet.
pub struct LogGuard(#[allow(dead_code)] WorkerGuard);

/// Maximum log file size before rotation.
const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;

/// Number of rotated log files to keep (`name.log.1`, `.2`, `.3`).
const MAX_ROTATED_LOGS: u32 = 3;

/// Set up global tracing. `log_file`, when given, additionally tees output
/// to that path (rotating it first if it has grown too large); otherwise
/// output goes to stderr only.
pub fn setup_logging(json: bool, log_file: Option<&Path>) -> anyhow::Result<LogGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (writer, guard) = match log_file {
        Some(path) => {
            rotate_log_if_needed(path);
            let dir = path.parent().unwrap_or_else(|| Path::new("."));
            std::fs::create_dir_all(dir)?;
            let file_name = path
                .file_name()
                .ok_or_else(|| anyhow::anyhow!("log path {} has no file name", path.display()))?;
            let appender = tracing_appender::rolling::never(dir, file_name);
            tracing_appender::non_blocking(appender)
        }
        None => tracing_appender::non_blocking(std::io::stderr()),
    };

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .with_writer(writer)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .init();
    }

    Ok(LogGuard(guard))
}

/// Rotate `path` if it exceeds [`MAX_LOG_SIZE`]: shifts `name.log` ->
/// `name.log.1` -> ... -> `name.log.3`, dropping the oldest. Best-effort —
/// a failure here must never stop the daemon from starting.
fn rotate_log_if_needed(path: &Path) {
    let size = match std::fs::metadata(path) {
        Ok(m) => m.len(),
        Err(_) => return,
    };
    if size < MAX_LOG_SIZE {
        return;
    }

    let path_str = path.display().to_string();
    for i in (1..MAX_ROTATED_LOGS).rev() {
        let from = format!("{path_str}.{i}");
        let to = format!("{path_str}.{}", i + 1);
        let _ = std::fs::rename(&from, &to);
    }
    let _ = std::fs::rename(path, format!("{path_str}.1"));
}
