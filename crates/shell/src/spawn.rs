// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Detached, fire-and-forget process spawning.
//!
//! Used by the Poller to launch Recorders, and by the CLI to launch the
//! long-lived daemons in the background. Spawning (and the `fork`/`exec`
//! underneath it) can take a few milliseconds; this runs it on a dedicated
//! OS thread so an async caller is never blocked waiting for it.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;

/// Spawn `program` (resolved via `PATH`, never absolute-pathed, so operators
/// can upgrade the binary in place) with `args`, redirecting stdout/stderr to
/// `log_path` and stdin to `/dev/null`. Fire-and-forget: the child is
/// reparented to init and this function does not wait on it.
///
/// Runs the actual spawn on a dedicated thread, matching the `Command
/// Spawner` thread pattern used elsewhere in the ecosystem for background
/// process launches, so the caller's event loop is never blocked by the
/// underlying `fork`/`exec` syscalls.
pub fn spawn_detached(program: OsString, args: Vec<OsString>, log_path: PathBuf) {
    std::thread::Builder::new()
        .name("twr-detached-spawn".to_owned())
        .spawn(move || spawn_detached_sync(program, args, log_path))
        .map(|_| ())
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "failed to spawn detached-spawn thread");
        });
}

fn spawn_detached_sync(program: OsString, args: Vec<OsString>, log_path: PathBuf) {
    let log_file = match open_append(&log_path) {
        Ok(f) => f,
        Err(e) => {
            tracing::error!(path = %log_path.display(), error = %e, "failed to open log file for detached spawn");
            return;
        }
    };
    let log_file_err = match log_file.try_clone() {
        Ok(f) => f,
        Err(e) => {
            tracing::error!(error = %e, "failed to clone log file handle");
            return;
        }
    };

    let mut cmd = std::process::Command::new(&program);
    cmd.args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::from(log_file))
        .stderr(Stdio::from(log_file_err));

    match cmd.spawn() {
        Ok(child) => {
            // Intentionally do not wait: the OS reparents the child once this
            // process exits, and we never call wait() on it here either, so
            // it is never a zombie of this process.
            drop(child);
        }
        Err(e) => {
            tracing::error!(
                program = %program.to_string_lossy(),
                error = %e,
                "failed to spawn detached process"
            );
        }
    }
}

fn open_append(path: &std::path::Path) -> std::io::Result<std::fs::File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::OpenOptions::new().create(true).append(true).open(path)
}
