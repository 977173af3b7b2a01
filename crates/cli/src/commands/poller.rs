// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `twr poller run|stop|status` - the singleton liveness-polling daemon.

use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand};
use tokio::sync::watch;
use twr_adapters::ProbeTool;
use twr_core::config::Config;
use twr_core::schema::PollerStatus;
use twr_core::{paths, ErrorKind};
use twr_daemon::{acquire_singleton, Poller};

use crate::exit_error::{exit_error, IntoExitError};

/// Default binary name for the probe tool, looked up via `PATH`.
const DEFAULT_PROBE_BIN: &str = "twr-probe";

/// Binary the poller spawns a detached Recorder with. Never canonicalized
/// to an absolute path, so operators can upgrade `twr` in place.
const RECORDER_BINARY: &str = "twr";

#[derive(Args)]
pub struct PollerArgs {
    #[command(subcommand)]
    pub command: PollerCommand,
}

#[derive(Subcommand)]
pub enum PollerCommand {
    /// Run in the foreground until a shutdown signal is received
    Run {
        /// Probe tool binary (overrides the built-in default)
        #[arg(long, value_name = "BIN")]
        probe_bin: Option<PathBuf>,
    },
    /// Signal a running daemon to shut down
    Stop,
    /// Print the daemon's last-written status heartbeat
    Status,
}

pub async fn run(args: PollerArgs, config: &Config) -> anyhow::Result<()> {
    match args.command {
        PollerCommand::Run { probe_bin } => run_daemon(config, probe_bin).await,
        PollerCommand::Stop => stop(config).await,
        PollerCommand::Status => status(config).await,
    }
}

async fn run_daemon(config: &Config, probe_bin: Option<PathBuf>) -> anyhow::Result<()> {
    let lock_path = paths::poller_lock_path(&config.paths.logs_dir);
    let _singleton = acquire_singleton(&lock_path).exit_ctx()?;

    let probe = ProbeTool::new(probe_bin.unwrap_or_else(|| PathBuf::from(DEFAULT_PROBE_BIN)));
    let status_path = paths::poller_status_path(&config.paths.logs_dir);

    let poller = Poller::new(
        config.poller.users_file.clone(),
        paths::active_users_dir(),
        paths::slot_registry_dir(),
        config.limits.record_limit,
        status_path,
        probe,
        Duration::from_secs(config.poller.timeout_secs),
        config.poller.probe_concurrency,
        Duration::from_secs(config.poller.interval_secs),
        OsString::from(RECORDER_BINARY),
        Vec::new(),
        config.paths.logs_dir.clone(),
    );

    let (tx, rx) = watch::channel(false);
    let shutdown = crate::shutdown::watch_signals(tx);
    tracing::info!("poller starting, pid {}", std::process::id());
    poller.run(rx).await.exit_ctx()?;
    shutdown.abort();
    Ok(())
}

async fn stop(config: &Config) -> anyhow::Result<()> {
    let lock_path = paths::poller_lock_path(&config.paths.logs_dir);
    crate::commands::stop::signal_daemon(&lock_path, "poller").await
}

async fn status(config: &Config) -> anyhow::Result<()> {
    let status_path = paths::poller_status_path(&config.paths.logs_dir);
    match std::fs::read_to_string(&status_path) {
        Ok(text) => {
            let status: PollerStatus = serde_json::from_str(&text)
                .map_err(|source| exit_error(ErrorKind::Internal, format!("{}: {source}", status_path.display())))?;
            println!("poller: running (pid {})", status.pid);
            println!("last poll: {}", status.last_poll);
            println!("next poll: {}", status.next_poll);
            println!("cycle: {}", status.cycle_count);
            println!("live now: {}", status.live_now.join(", "));
            println!("spawned now: {}", status.spawned_now.join(", "));
            Ok(())
        }
        Err(_) => {
            println!("poller: not running");
            Ok(())
        }
    }
}
