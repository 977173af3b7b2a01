// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `twr` - entrypoint binary for the recorder/encoder coordination core.
//! Parses the command line, loads layered configuration, sets up logging,
//! and dispatches to the subcommand implementations under `commands/`.

mod commands;
mod exit_error;
mod logging;
mod shutdown;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use twr_core::config::{Config, PartialConfig};
use twr_core::ErrorKind;

use exit_error::ExitError;

#[derive(Parser)]
#[command(name = "twr", version = env!("BUILD_GIT_HASH"), about = "Personal streaming recorder/encoder coordination core")]
struct Cli {
    /// Path to a TOML config file (default: platform config dir / twr/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Emit structured JSON logs instead of human-readable text
    #[arg(long, global = true)]
    json_logs: bool,

    /// Increase log verbosity (can be repeated); overridden by RUST_LOG if set
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record one user's stream end to end
    Record(commands::record::RecordArgs),
    /// The singleton queue-draining daemon
    EncodeDaemon(commands::encode_daemon::EncodeDaemonArgs),
    /// The singleton liveness-polling daemon
    Poller(commands::poller::PollerArgs),
    /// Stop an in-progress recording by slot number
    Stop(commands::stop::StopArgs),
    /// One-shot overview of slots and both daemons
    Status(commands::status::StatusArgs),
    /// Sweep stale slot owners, stranded jobs, and temp residue
    Clean(commands::clean::CleanArgs),
    /// Diagnose the host: tool availability, writable dirs, stale state
    Doctor(commands::doctor::DoctorArgs),
    /// Maintain the Poller's users file
    Users(commands::users::UsersArgs),
    /// Toggle whether finished recordings are enqueued for transcoding
    EncodeMode(commands::encode_mode::EncodeModeArgs),
    /// Batch offline transcode: compress files directly, bypassing the queue
    Tscompress(commands::tscompress::TscompressArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    std::process::exit(run(cli).await);
}

async fn run(cli: Cli) -> i32 {
    if cli.verbose > 0 && std::env::var_os("RUST_LOG").is_none() {
        let level = match cli.verbose {
            1 => "debug",
            _ => "trace",
        };
        std::env::set_var("RUST_LOG", level);
    }

    let config_path = cli.config.clone().or_else(default_config_path);
    let (overrides, config) =
        match Config::load_with_overrides(PartialConfig::default(), config_path.as_deref()) {
            Ok(pair) => pair,
            Err(e) => {
                eprintln!("config error: {e}");
                return ErrorKind::Config.exit_code();
            }
        };

    let log_file = log_file_for(&cli.command, &config.paths.logs_dir);
    let _guard = match logging::setup_logging(cli.json_logs, log_file.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("failed to set up logging: {e}");
            return ErrorKind::Internal.exit_code();
        }
    };

    match dispatch(cli.command, &config, &overrides.encode_daemon).await {
        Ok(()) => twr_core::error::exit_code::SUCCESS,
        Err(e) => {
            if let Some(exit_err) = e.downcast_ref::<ExitError>() {
                eprintln!("error: {exit_err}");
                exit_err.code
            } else {
                eprintln!("error: {e}");
                ErrorKind::Internal.exit_code()
            }
        }
    }
}

async fn dispatch(
    command: Commands,
    config: &Config,
    encode_daemon_overrides: &twr_core::config::PartialEncodeDaemon,
) -> anyhow::Result<()> {
    match command {
        Commands::Record(args) => commands::record::run(args, config).await,
        Commands::EncodeDaemon(args) => commands::encode_daemon::run(args, config, encode_daemon_overrides).await,
        Commands::Poller(args) => commands::poller::run(args, config).await,
        Commands::Stop(args) => commands::stop::run(args, config).await,
        Commands::Status(args) => commands::status::run(args, config).await,
        Commands::Clean(args) => commands::clean::run(args, config).await,
        Commands::Doctor(args) => commands::doctor::run(args, config).await,
        Commands::Users(args) => commands::users::run(args, config).await,
        Commands::EncodeMode(args) => commands::encode_mode::run(args, config).await,
        Commands::Tscompress(args) => commands::tscompress::run(args, config).await,
    }
}

/// The two long-lived daemons additionally tee logs to a file under the
/// resolved `paths.logs_dir`; every other subcommand logs to stderr only
/// (see `logging::setup_logging`).
fn log_file_for(command: &Commands, logs_dir: &std::path::Path) -> Option<PathBuf> {
    match command {
        Commands::EncodeDaemon(args) => matches!(args.command, commands::encode_daemon::EncodeDaemonCommand::Run { .. })
            .then(|| logs_dir.join("encoder.log")),
        Commands::Poller(args) => matches!(args.command, commands::poller::PollerCommand::Run { .. })
            .then(|| logs_dir.join("poller.log")),
        _ => None,
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("twr").join("config.toml"))
}
