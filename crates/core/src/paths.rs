// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Well-known filesystem layout shared by every component.
//!
//! Paths that must agree across independently-started processes (the slot
//! runtime directory, per-user lock directory) are computed here rather than
//! left to each component to derive on its own.

use std::path::{Path, PathBuf};

/// Directory name for the slot registry under the runtime root.
const SLOT_REGISTRY_DIRNAME: &str = "twitch-record-slots";

/// Directory name for per-user locks under the runtime root.
const ACTIVE_USERS_DIRNAME: &str = "twitch-active-users";

/// Resolve the slot registry directory: prefer the per-user runtime tmpfs
/// (`$XDG_RUNTIME_DIR`), falling back to a world-writable tmp path when the
/// runtime dir isn't set or isn't writable.
pub fn slot_registry_dir() -> PathBuf {
    runtime_root().join(SLOT_REGISTRY_DIRNAME)
}

/// Resolve the per-user lock directory, alongside the slot registry.
pub fn active_users_dir() -> PathBuf {
    runtime_root().join(ACTIVE_USERS_DIRNAME)
}

fn runtime_root() -> PathBuf {
    std::env::var_os("XDG_RUNTIME_DIR")
        .map(PathBuf::from)
        .filter(|dir| is_writable(dir))
        .unwrap_or_else(|| std::env::temp_dir())
}

fn is_writable(dir: &Path) -> bool {
    // A cheap writability probe: try to create and immediately remove a
    // throwaway file. Good enough at startup; any later failure (disk went
    // read-only mid-run) surfaces as an ordinary I/O error from the caller.
    let probe = dir.join(format!(".twr-writable-probe-{}", std::process::id()));
    match std::fs::write(&probe, b"") {
        Ok(()) => {
            let _ = std::fs::remove_file(&probe);
            true
        }
        Err(_) => false,
    }
}

/// Per-user lock file path.
pub fn user_lock_path(active_users_dir: &Path, username: &str) -> PathBuf {
    active_users_dir.join(format!("{username}.lock"))
}

/// Encode queue subdirectories, relative to the configured `paths.queue_dir`.
pub struct QueueLayout {
    pub jobs_dir: PathBuf,
    pub tmp_dir: PathBuf,
    pub inflight_dir: PathBuf,
    pub failed_dir: PathBuf,
}

impl QueueLayout {
    pub fn new(queue_dir: &Path) -> Self {
        Self {
            jobs_dir: queue_dir.join("jobs"),
            tmp_dir: queue_dir.join("tmp"),
            inflight_dir: queue_dir.join("inflight"),
            failed_dir: queue_dir.join("failed"),
        }
    }

    pub fn ensure_exists(&self) -> std::io::Result<()> {
        for dir in [&self.jobs_dir, &self.tmp_dir, &self.inflight_dir, &self.failed_dir] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

/// Per-username recorder log file, under `paths.logs_dir`.
pub fn recorder_log_path(logs_dir: &Path, username: &str) -> PathBuf {
    logs_dir.join(format!("{username}.log"))
}

/// Poller status heartbeat path, under `paths.logs_dir`.
pub fn poller_status_path(logs_dir: &Path) -> PathBuf {
    logs_dir.join("poller").join("status.json")
}

/// Encode Daemon status heartbeat path, under `paths.logs_dir`.
pub fn encoder_status_path(logs_dir: &Path) -> PathBuf {
    logs_dir.join("encoder").join("status.json")
}

/// Singleton lock file for the Encode Daemon.
pub fn encoder_lock_path(logs_dir: &Path) -> PathBuf {
    logs_dir.join("encoder").join("encoder.lock")
}

/// Singleton lock file for the Poller Daemon.
pub fn poller_lock_path(logs_dir: &Path) -> PathBuf {
    logs_dir.join("poller").join("poller.lock")
}

/// `temp/` subdirectory of a recorder's output directory, where in-progress
/// segments and merged/remuxed artifacts live until finalization. Must live
/// on the same filesystem as `record_dir` so finalization is an atomic
/// rename.
pub fn record_temp_dir(record_dir: &Path) -> PathBuf {
    record_dir.join("temp")
}

/// Validate a username is non-empty and filename-safe (no path separators,
/// no leading dot, ASCII alphanumeric plus `-`/`_`).
pub fn is_filename_safe_username(username: &str) -> bool {
    !username.is_empty()
        && !username.starts_with('.')
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    #[parameterized(
        empty = { "", false },
        leading_dot = { ".hidden", false },
        path_sep = { "a/b", false },
        space = { "a b", false },
        plain = { "streamer_one", true },
        with_dash = { "streamer-one-2", true },
    )]
    fn username_safety(name: &str, expected: bool) {
        assert_eq!(is_filename_safe_username(name), expected);
    }

    #[test]
    fn queue_layout_creates_all_subdirs() {
        let dir = tempfile::tempdir().expect("tempdir");
        let layout = QueueLayout::new(dir.path());
        layout.ensure_exists().expect("ensure_exists");
        assert!(layout.jobs_dir.is_dir());
        assert!(layout.tmp_dir.is_dir());
        assert!(layout.inflight_dir.is_dir());
        assert!(layout.failed_dir.is_dir());
    }

    #[test]
    fn user_lock_path_is_scoped_by_username() {
        let dir = PathBuf::from("/run/user/1000/twitch-active-users");
        assert_eq!(
            user_lock_path(&dir, "alice"),
            dir.join("alice.lock")
        );
    }
}
