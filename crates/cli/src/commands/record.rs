// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `twr record <username>` - record one user's stream end to end.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use twr_adapters::{CaptureTool, MuxTool};
use twr_core::config::Config;
use twr_core::schema::{EncodeParams, FpsValue};
use twr_core::{paths, ErrorKind, SystemClock};
use twr_engine::{Recorder, RecorderConfig, RecorderOutcome};

use crate::exit_error::{exit_error, IntoExitError};

/// Default binary name for the capture tool, looked up via `PATH`.
const DEFAULT_CAPTURE_BIN: &str = "twr-capture";
/// Default binary name for the mux tool (merge + remux), looked up via `PATH`.
const DEFAULT_MUX_BIN: &str = "twr-mux";

#[derive(Args)]
pub struct RecordArgs {
    /// Username to record
    pub username: String,

    /// Stream quality to request from the capture tool
    #[arg(long)]
    pub quality: Option<String>,

    /// Don't wait for a free slot; fail immediately if none are available
    #[arg(long)]
    pub fail_fast: bool,

    /// Capture tool binary (overrides the built-in default)
    #[arg(long, value_name = "BIN")]
    pub capture_bin: Option<PathBuf>,

    /// Mux tool binary (overrides the built-in default)
    #[arg(long, value_name = "BIN")]
    pub mux_bin: Option<PathBuf>,
}

pub async fn run(args: RecordArgs, config: &Config) -> anyhow::Result<()> {
    if !paths::is_filename_safe_username(&args.username) {
        return Err(exit_error(
            ErrorKind::Config,
            format!("'{}' is not a valid username", args.username),
        ));
    }

    let recorder_config = RecorderConfig {
        username: args.username.clone(),
        quality: args.quality.unwrap_or_else(|| config.record.quality.clone()),
        fail_fast: args.fail_fast,
        retry_delay: Duration::from_secs(config.record.retry_delay_secs),
        retry_window: Duration::from_secs(config.record.retry_window_secs),
        record_dir: config.paths.record_dir.clone(),
        active_users_dir: paths::active_users_dir(),
        slots_dir: paths::slot_registry_dir(),
        record_limit: config.limits.record_limit,
        disk_free_min_bytes: config.storage.disk_free_min_bytes,
        enable_remux: config.record.enable_remux,
        delete_ts_after_remux: config.record.delete_ts_after_remux,
        queue_dir: config.paths.queue_dir.clone(),
        encode_params: encode_params(config),
        auto_enqueue: super::encode_mode::is_enabled(config),
    };

    let capture = CaptureTool::new(
        args.capture_bin
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CAPTURE_BIN)),
    );
    let mux = MuxTool::new(args.mux_bin.unwrap_or_else(|| PathBuf::from(DEFAULT_MUX_BIN)));

    let recorder = Recorder::new(recorder_config, capture, mux, SystemClock);
    let outcome = recorder.run().await.exit_ctx()?;

    match outcome {
        RecorderOutcome::Recorded { base_name, job_id } => {
            println!("recorded {base_name}");
            if let Some(id) = job_id {
                println!("enqueued as job {id}");
            }
            Ok(())
        }
        RecorderOutcome::NotLive => Err(exit_error(
            ErrorKind::NotLive,
            format!("{} is not live", args.username),
        )),
    }
}

fn encode_params(config: &Config) -> EncodeParams {
    EncodeParams {
        height: config.encode_daemon.height,
        fps: FpsValue::parse(&config.encode_daemon.fps),
        crf: config.encode_daemon.crf,
        preset: config.encode_daemon.preset.clone(),
        threads: config.encode_daemon.threads,
        loglevel: config.encode_daemon.loglevel.clone(),
        audio_bitrate_kbps: config.encode_daemon.audio_bitrate_kbps,
    }
}
