// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `twr doctor` - diagnose the host: external tools on `PATH`, writable
//! directories, and the same stale-state sweep `clean` performs. Unlike
//! `clean`, this always reports every check's outcome rather than only the
//! ones that found something to fix.

use clap::Args;
use twr_core::config::Config;
use twr_core::paths;
use twr_storage::{EncodeQueue, SlotRegistry};

const TOOLS: &[(&str, &str)] = &[
    ("capture", "twr-capture"),
    ("probe", "twr-probe"),
    ("mux", "twr-mux"),
    ("transcode", "twr-transcode"),
];

#[derive(Args)]
pub struct DoctorArgs {}

pub async fn run(_args: DoctorArgs, config: &Config) -> anyhow::Result<()> {
    let mut ok = true;

    for (label, bin) in TOOLS {
        match which(bin) {
            Some(path) => println!("[ok]   {label} tool found: {}", path.display()),
            None => {
                println!("[fail] {label} tool `{bin}` not found on PATH");
                ok = false;
            }
        }
    }

    ok &= check_writable("record dir", &config.paths.record_dir);
    ok &= check_writable("queue dir", &config.paths.queue_dir);
    ok &= check_writable("logs dir", &config.paths.logs_dir);
    ok &= check_writable("slot registry dir", &paths::slot_registry_dir());
    ok &= check_writable("active users dir", &paths::active_users_dir());

    let registry = SlotRegistry::new(paths::slot_registry_dir(), config.limits.record_limit);
    match registry.sweep_and_count() {
        Ok(swept) => println!("[ok]   slot registry sweep: removed {swept} stale owner(s)"),
        Err(e) => {
            println!("[fail] slot registry sweep failed: {e}");
            ok = false;
        }
    }

    match EncodeQueue::new(&config.paths.queue_dir).and_then(|q| q.recover_inflight()) {
        Ok(recovered) => println!("[ok]   encode queue: recovered {recovered} stranded job(s)"),
        Err(e) => {
            println!("[fail] encode queue check failed: {e}");
            ok = false;
        }
    }

    match super::clean::orphaned_temp_files(&config.paths.record_dir) {
        Ok(orphaned) => println!("[ok]   temp dir: {} orphaned artifact(s) (run `twr clean` to remove)", orphaned.len()),
        Err(e) => {
            println!("[fail] temp dir check failed: {e}");
            ok = false;
        }
    }

    if ok {
        println!("\nall checks passed");
        Ok(())
    } else {
        Err(crate::exit_error::exit_error(
            twr_core::ErrorKind::External,
            "one or more doctor checks failed",
        ))
    }
}

fn check_writable(label: &str, dir: &std::path::Path) -> bool {
    match std::fs::create_dir_all(dir) {
        Ok(()) => {
            let probe = dir.join(format!(".twr-doctor-probe-{}", std::process::id()));
            match std::fs::write(&probe, b"") {
                Ok(()) => {
                    let _ = std::fs::remove_file(&probe);
                    println!("[ok]   {label} writable: {}", dir.display());
                    true
                }
                Err(e) => {
                    println!("[fail] {label} not writable ({}): {e}", dir.display());
                    false
                }
            }
        }
        Err(e) => {
            println!("[fail] {label} could not be created ({}): {e}", dir.display());
            false
        }
    }
}

/// Resolve `bin` against `PATH`, the same resolution the adapters/poller use
/// when spawning it, without actually invoking it.
fn which(bin: &str) -> Option<std::path::PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var).map(|dir| dir.join(bin)).find(|candidate| {
        std::fs::metadata(candidate)
            .map(|m| m.is_file())
            .unwrap_or(false)
    })
}
