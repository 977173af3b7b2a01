// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `twr tscompress <files...>` - the batch offline transcode helper:
//! compress already-recorded artifacts directly, bypassing the encode
//! queue and the Slot Registry pause/resume dance entirely. Useful for a
//! backlog of files recorded before the Encode Daemon existed, or a
//! one-off re-encode with different parameters.
//!
//! Each file is transcoded sequentially via the same external transcode
//! tool the Encode Daemon uses; unlike the daemon, nothing here pauses for
//! active recordings, since this is an explicit, interactive operator
//! action rather than a background drain.

use std::path::PathBuf;

use clap::Args;
use twr_adapters::TranscodeTool;
use twr_core::config::Config;
use twr_core::schema::{EncodeParams, FpsValue};
use twr_core::ErrorKind;

use crate::exit_error::exit_error;

const DEFAULT_TRANSCODE_BIN: &str = "twr-transcode";

#[derive(Args)]
pub struct TscompressArgs {
    /// Input files to compress, one output per input
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Transcode tool binary (overrides the built-in default)
    #[arg(long, value_name = "BIN")]
    pub transcode_bin: Option<PathBuf>,

    /// Delete each input on successful compression
    #[arg(long)]
    pub delete_input: bool,
}

pub async fn run(args: TscompressArgs, config: &Config) -> anyhow::Result<()> {
    let transcode = TranscodeTool::new(
        args.transcode_bin.unwrap_or_else(|| PathBuf::from(DEFAULT_TRANSCODE_BIN)),
    );
    let params = encode_params(config);

    let mut failures = 0;
    for input in &args.files {
        match compress_one(&transcode, input, &params, args.delete_input).await {
            Ok(output) => println!("compressed {} -> {}", input.display(), output.display()),
            Err(e) => {
                eprintln!("failed to compress {}: {e}", input.display());
                failures += 1;
            }
        }
    }

    if failures > 0 {
        return Err(exit_error(
            ErrorKind::TranscodeFailed,
            format!("{failures} of {} file(s) failed to compress", args.files.len()),
        ));
    }
    Ok(())
}

async fn compress_one(
    transcode: &TranscodeTool,
    input: &std::path::Path,
    params: &EncodeParams,
    delete_input: bool,
) -> anyhow::Result<PathBuf> {
    let output = compressed_path(input);
    let mut handle = transcode.spawn(input, &output, params)?;
    let status = handle.wait().await?;
    if !status.success() {
        return Err(anyhow::anyhow!("transcode tool exited with {status}"));
    }
    if delete_input {
        let _ = std::fs::remove_file(input);
    }
    Ok(output)
}

fn compressed_path(input: &std::path::Path) -> PathBuf {
    let stem = input.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    let dir = input.parent().map(std::path::Path::to_path_buf).unwrap_or_default();
    dir.join(format!("{stem}-compressed.mp4"))
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
