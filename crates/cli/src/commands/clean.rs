// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `twr clean` - sweep the stale state a crashed process can leave behind:
//! dead slot owners, jobs stranded in `inflight/` by a crashed encoder, and
//! `temp/` residue from a crashed recorder. Idempotent: a second run finds
//! nothing left to do.

use std::path::{Path, PathBuf};

use clap::Args;
use twr_core::config::Config;
use twr_core::paths;
use twr_storage::{acquire_user_lock, EncodeQueue, SlotRegistry};

#[derive(Args)]
pub struct CleanArgs {}

pub async fn run(_args: CleanArgs, config: &Config) -> anyhow::Result<()> {
    let registry = SlotRegistry::new(paths::slot_registry_dir(), config.limits.record_limit);
    let before = registry.sweep_and_count()?;
    if before > 0 {
        println!("swept {before} stale slot owner(s)");
    }

    let queue = EncodeQueue::new(&config.paths.queue_dir)?;
    let recovered = queue.recover_inflight()?;
    if recovered > 0 {
        println!("recovered {recovered} job(s) left in-flight by a crashed encoder");
    }

    let orphaned = clean_temp_residue(&config.paths.record_dir)?;
    if orphaned > 0 {
        println!("removed {orphaned} orphaned temp artifact(s)");
    }

    if before == 0 && recovered == 0 && orphaned == 0 {
        println!("nothing to clean");
    }

    Ok(())
}

/// Delete every file under `record_dir/temp` whose base name's per-user
/// lock is currently free — i.e. no recorder is actively producing it.
fn clean_temp_residue(record_dir: &std::path::Path) -> anyhow::Result<usize> {
    let orphaned = orphaned_temp_files(record_dir)?;
    for path in &orphaned {
        let _ = std::fs::remove_file(path);
    }
    Ok(orphaned.len())
}

/// List every file under `record_dir/temp` whose base name's per-user lock
/// is currently free — i.e. no recorder is actively producing it. Read-only:
/// callers decide whether to act on the result (`clean` deletes them,
/// `doctor` just reports the count). Acquiring-then-dropping the lock is
/// the same non-destructive liveness check the Poller uses to decide
/// whether a user is already being recorded.
pub(crate) fn orphaned_temp_files(record_dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let temp_dir = paths::record_temp_dir(record_dir);
    let entries = match std::fs::read_dir(&temp_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let active_users_dir = paths::active_users_dir();
    let mut orphaned = Vec::new();
    for entry in entries.filter_map(|e| e.ok()) {
        let path = entry.path();
        let Some(username) = base_username(&path) else {
            continue;
        };
        if acquire_user_lock(&active_users_dir, &username).is_ok() {
            // Lock was free: nothing is actively producing this artifact.
            orphaned.push(path);
        }
    }
    Ok(orphaned)
}

/// Extract the username prefix from a `temp/` artifact file name, which is
/// always `<username>-<UTC timestamp>[.partNNN|.ts|.mp4]`.
fn base_username(path: &std::path::Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let base = stem.split(".part").next().unwrap_or(stem);
    base.rsplit_once('-').map(|(username, _timestamp)| username.to_string())
}
