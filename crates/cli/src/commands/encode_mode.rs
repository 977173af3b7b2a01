// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `twr encode-mode on|off|status` - toggle whether a finished recording is
//! enqueued for transcoding at all.
//!
//! Persisted as a one-line flag file alongside the other daemon state under
//! `paths.logs_dir`, rather than a `Config` field, since it's operator state
//! that changes between runs rather than a deployment setting.

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use twr_core::config::Config;
use twr_core::{fsutil, ErrorKind};

use crate::exit_error::exit_error;

#[derive(Args)]
pub struct EncodeModeArgs {
    #[command(subcommand)]
    pub command: EncodeModeCommand,
}

#[derive(Subcommand)]
pub enum EncodeModeCommand {
    /// Enqueue finished recordings for transcoding (the default)
    On,
    /// Leave finished recordings in place, untouched by the Encode Daemon
    Off,
    /// Print the current setting
    Status,
}

fn flag_path(config: &Config) -> PathBuf {
    config.paths.logs_dir.join("encode-mode")
}

/// Whether a recording finalized right now should be enqueued. Missing
/// file (never toggled, or swept away) means the default, on.
pub fn is_enabled(config: &Config) -> bool {
    match std::fs::read_to_string(flag_path(config)) {
        Ok(text) => text.trim() != "off",
        Err(_) => true,
    }
}

pub async fn run(args: EncodeModeArgs, config: &Config) -> anyhow::Result<()> {
    match args.command {
        EncodeModeCommand::On => {
            write_flag(&flag_path(config), "on")?;
            println!("encode-mode: on");
            Ok(())
        }
        EncodeModeCommand::Off => {
            write_flag(&flag_path(config), "off")?;
            println!("encode-mode: off");
            Ok(())
        }
        EncodeModeCommand::Status => {
            println!("encode-mode: {}", if is_enabled(config) { "on" } else { "off" });
            Ok(())
        }
    }
}

fn write_flag(path: &Path, value: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|source| exit_error(ErrorKind::Internal, format!("{}: {source}", parent.display())))?;
    }
    fsutil::atomic_write(path, value.as_bytes())
        .map_err(|source| exit_error(ErrorKind::Internal, format!("{}: {source}", path.display())))?;
    Ok(())
}
