// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared error taxonomy, independent of which crate raises the error.
//!
//! Every leaf error type in the workspace implements [`HasKind`] so the CLI
//! can compute an exit code without matching on a crate-specific enum.

/// Classification of an error, used only to compute a process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Slot cap reached.
    Busy,
    /// Per-user lock held by another recorder.
    UserBusy,
    /// Stream not live after exhausting retries.
    NotLive,
    CaptureFailed,
    MergeFailed,
    /// Non-fatal: falls through to keeping the `.ts`.
    RemuxFailed,
    EnqueueFailed,
    TranscodeFailed,
    DiskLow,
    Config,
    /// External tool missing or permission denied.
    External,
    Internal,
}

/// Process exit codes, per the command surface contract.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERIC_FAILURE: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const BUSY: i32 = 3;
    pub const NOT_LIVE: i32 = 4;
    pub const DISK_LOW: i32 = 5;
}

impl ErrorKind {
    /// Map this error kind to the process exit code a CLI command should return.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorKind::Busy | ErrorKind::UserBusy => exit_code::BUSY,
            ErrorKind::NotLive => exit_code::NOT_LIVE,
            ErrorKind::DiskLow => exit_code::DISK_LOW,
            ErrorKind::Config => exit_code::USAGE,
            ErrorKind::CaptureFailed
            | ErrorKind::MergeFailed
            | ErrorKind::RemuxFailed
            | ErrorKind::EnqueueFailed
            | ErrorKind::TranscodeFailed
            | ErrorKind::External
            | ErrorKind::Internal => exit_code::GENERIC_FAILURE,
        }
    }

    /// True if this kind should abort a daemon at startup rather than be
    /// recorded and skipped as a per-job failure.
    pub fn fatal_at_startup(self) -> bool {
        matches!(self, ErrorKind::Config | ErrorKind::External)
    }
}

/// Implemented by every crate-local error enum so the CLI's exit-code
/// mapping stays in one place (see `twr-cli::exit_error`).
pub trait HasKind {
    fn kind(&self) -> ErrorKind;
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
