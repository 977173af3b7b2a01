// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Atomic file writes and PID liveness checks shared by every component.

use std::path::Path;

use nix::sys::signal::kill;
use nix::unistd::Pid;

/// Atomically write `bytes` to `path` via write-to-temp-then-rename on the
/// same filesystem. The rename is the only step that must be atomic; the
/// write itself may be interrupted without ever exposing a torn `path`.
///
/// `path` and its `.tmp` sibling must live on the same filesystem — callers
/// are responsible for keeping the directory layout (e.g. queue `tmp/`
/// alongside the queue itself) on one mount.
pub fn atomic_write(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let tmp_path = tmp_sibling(path);
    std::fs::write(&tmp_path, bytes)?;
    std::fs::rename(&tmp_path, path)
}

/// Atomically write a serde-serializable value as pretty JSON.
pub fn atomic_write_json<T: serde::Serialize>(path: &Path, value: &T) -> std::io::Result<()> {
    let json = serde_json::to_vec_pretty(value).map_err(std::io::Error::other)?;
    atomic_write(path, &json)
}

fn tmp_sibling(path: &Path) -> std::path::PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{file_name}.tmp"))
}

/// Check whether a process with the given PID is alive, using `kill(pid, 0)`
/// semantics (no signal is actually delivered). Returns `false` for PIDs that
/// don't exist or that this process lacks permission to signal — a process
/// owned by a different user would never be a stale owner of *our* slots in
/// the first place, since every component in this system runs as one OS user.
pub fn pid_is_alive(pid: u32) -> bool {
    let Ok(raw) = i32::try_from(pid) else {
        return false;
    };
    kill(Pid::from_raw(raw), None).is_ok()
}
