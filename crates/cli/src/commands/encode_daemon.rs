// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `twr encode-daemon run|stop|status` - the singleton queue-draining daemon.

use clap::{Args, Subcommand};
use tokio::sync::watch;
use twr_adapters::TranscodeTool;
use twr_core::config::{Config, PartialEncodeDaemon};
use twr_core::schema::EncoderStatus;
use twr_core::{paths, ErrorKind};
use twr_daemon::{acquire_singleton, EncodeDaemon};

use crate::exit_error::{exit_error, IntoExitError};

/// Default binary name for the transcode tool, looked up via `PATH`.
const DEFAULT_TRANSCODE_BIN: &str = "twr-transcode";

#[derive(Args)]
pub struct EncodeDaemonArgs {
    #[command(subcommand)]
    pub command: EncodeDaemonCommand,
}

#[derive(Subcommand)]
pub enum EncodeDaemonCommand {
    /// Run in the foreground until a shutdown signal is received
    Run {
        /// Transcode tool binary (overrides the built-in default)
        #[arg(long, value_name = "BIN")]
        transcode_bin: Option<std::path::PathBuf>,
    },
    /// Signal a running daemon to shut down
    Stop,
    /// Print the daemon's last-written status heartbeat
    Status,
}

pub async fn run(
    args: EncodeDaemonArgs,
    config: &Config,
    overrides: &PartialEncodeDaemon,
) -> anyhow::Result<()> {
    match args.command {
        EncodeDaemonCommand::Run { transcode_bin } => run_daemon(config, overrides, transcode_bin).await,
        EncodeDaemonCommand::Stop => stop(config).await,
        EncodeDaemonCommand::Status => status(config).await,
    }
}

async fn run_daemon(
    config: &Config,
    overrides: &PartialEncodeDaemon,
    transcode_bin: Option<std::path::PathBuf>,
) -> anyhow::Result<()> {
    let lock_path = paths::encoder_lock_path(&config.paths.logs_dir);
    let _singleton = acquire_singleton(&lock_path).exit_ctx()?;

    let transcode = TranscodeTool::new(
        transcode_bin.unwrap_or_else(|| std::path::PathBuf::from(DEFAULT_TRANSCODE_BIN)),
    );
    let status_path = paths::encoder_status_path(&config.paths.logs_dir);
    let daemon = EncodeDaemon::new(
        config.paths.queue_dir.clone(),
        paths::slot_registry_dir(),
        config.limits.record_limit,
        status_path,
        transcode,
        overrides.clone(),
        config.record.delete_input_on_success,
    );

    let (tx, rx) = watch::channel(false);
    let shutdown = crate::shutdown::watch_signals(tx);
    tracing::info!("encode daemon starting, pid {}", std::process::id());
    daemon.run(rx).await.exit_ctx()?;
    shutdown.abort();
    Ok(())
}

async fn stop(config: &Config) -> anyhow::Result<()> {
    let lock_path = paths::encoder_lock_path(&config.paths.logs_dir);
    crate::commands::stop::signal_daemon(&lock_path, "encode daemon").await
}

async fn status(config: &Config) -> anyhow::Result<()> {
    let status_path = paths::encoder_status_path(&config.paths.logs_dir);
    match std::fs::read_to_string(&status_path) {
        Ok(text) => {
            let status: EncoderStatus = serde_json::from_str(&text)
                .map_err(|source| exit_error(ErrorKind::Internal, format!("{}: {source}", status_path.display())))?;
            println!("encode daemon: running (pid {})", status.pid);
            println!("state: {:?}", status.state);
            println!(
                "current job: {}",
                status.current_job.as_deref().unwrap_or("<none>")
            );
            println!("last tick: {}", status.last_tick);
            Ok(())
        }
        Err(_) => {
            println!("encode daemon: not running");
            Ok(())
        }
    }
}
