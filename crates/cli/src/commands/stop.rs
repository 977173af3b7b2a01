// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `twr stop <slot>` - stop an in-progress recording by slot number, plus
//! the shared pid-from-lock-file signaling used by the daemon `stop`
//! subcommands.

use std::path::Path;
use std::time::Duration;

use clap::Args;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use twr_core::config::Config;
use twr_core::{fsutil, paths, schema::OwnerRecord, ErrorKind};

use crate::exit_error::exit_error;

/// How long `stop <slot>` waits for the owner to exit after `SIGTERM`
/// before giving up (or, with `--force`, escalating to `SIGKILL`).
const STOP_GRACE: Duration = Duration::from_secs(10);
const STOP_POLL_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Args)]
pub struct StopArgs {
    /// Slot number to stop (as shown by `twr status`)
    pub slot: usize,

    /// Escalate to SIGKILL if the owner is still alive after the grace period
    #[arg(long)]
    pub force: bool,
}

pub async fn run(args: StopArgs, _config: &Config) -> anyhow::Result<()> {
    let slots_dir = paths::slot_registry_dir();
    let owner_path = slots_dir.join(format!("slot{}.owner", args.slot));

    let text = std::fs::read_to_string(&owner_path).map_err(|_| {
        exit_error(ErrorKind::NotLive, format!("slot {} is not held", args.slot))
    })?;
    let owner: OwnerRecord = serde_json::from_str(&text)
        .map_err(|source| exit_error(ErrorKind::Internal, format!("{}: {source}", owner_path.display())))?;

    if !fsutil::pid_is_alive(owner.pid) {
        return Err(exit_error(
            ErrorKind::NotLive,
            format!("slot {} owner (pid {}) is already gone", args.slot, owner.pid),
        ));
    }

    send_signal(owner.pid, Signal::SIGTERM)?;
    println!(
        "sent SIGTERM to pid {} (slot {}, user {}), waiting up to {}s",
        owner.pid,
        args.slot,
        owner.username,
        STOP_GRACE.as_secs()
    );

    if wait_for_exit(owner.pid, STOP_GRACE).await {
        println!("pid {} exited", owner.pid);
        return Ok(());
    }

    if !args.force {
        return Err(exit_error(
            ErrorKind::Internal,
            format!("pid {} is still alive after {}s (use --force to kill)", owner.pid, STOP_GRACE.as_secs()),
        ));
    }

    send_signal(owner.pid, Signal::SIGKILL)?;
    println!("pid {} still alive after grace period, sent SIGKILL", owner.pid);
    Ok(())
}

/// Poll `pid_is_alive` until it reports dead or `grace` elapses.
async fn wait_for_exit(pid: u32, grace: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + grace;
    while fsutil::pid_is_alive(pid) {
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(STOP_POLL_INTERVAL).await;
    }
    true
}

/// Read a raw pid from a singleton lock file (see `twr_daemon::singleton`)
/// and send it SIGTERM. Used by both `encode-daemon stop` and `poller stop`.
pub async fn signal_daemon(lock_path: &Path, label: &str) -> anyhow::Result<()> {
    let text = match std::fs::read_to_string(lock_path) {
        Ok(text) => text,
        Err(_) => {
            println!("{label}: not running");
            return Ok(());
        }
    };
    let pid: u32 = text
        .trim()
        .parse()
        .map_err(|_| exit_error(ErrorKind::Internal, format!("{}: not a valid pid", lock_path.display())))?;

    if !fsutil::pid_is_alive(pid) {
        println!("{label}: not running");
        return Ok(());
    }

    send_signal(pid, Signal::SIGTERM)?;
    println!("{label}: sent SIGTERM to pid {pid}");
    Ok(())
}

fn send_signal(pid: u32, signal: Signal) -> anyhow::Result<()> {
    let raw = i32::try_from(pid).map_err(|_| exit_error(ErrorKind::Internal, format!("pid {pid} out of range")))?;
    kill(Pid::from_raw(raw), signal)
        .map_err(|source| exit_error(ErrorKind::External, format!("failed to signal pid {pid}: {source}")))
}
