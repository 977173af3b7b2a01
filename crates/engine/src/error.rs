// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use thiserror::Error;
use twr_adapters::AdapterError;
use twr_core::{ErrorKind, HasKind};
use twr_storage::{QueueError, SlotError, UserLockError};

#[derive(Debug, Error)]
pub enum RecorderError {
    #[error("user busy: {0}")]
    UserBusy(#[source] UserLockError),
    #[error("no recording slots available")]
    Busy(#[source] SlotError),
    #[error("slot registry error: {0}")]
    Slot(#[source] SlotError),
    #[error("capture/merge/remux tool error: {0}")]
    Tool(#[source] AdapterError),
    #[error("failed to enqueue encode job: {0}")]
    Enqueue(#[source] QueueError),
    #[error("free disk space below threshold ({available} < {minimum} bytes) at {path}")]
    DiskLow {
        available: u64,
        minimum: u64,
        path: PathBuf,
    },
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl HasKind for RecorderError {
    fn kind(&self) -> ErrorKind {
        match self {
            RecorderError::UserBusy(_) => ErrorKind::UserBusy,
            RecorderError::Busy(_) => ErrorKind::Busy,
            RecorderError::Slot(_) => ErrorKind::Internal,
            RecorderError::Tool(e) => e.kind(),
            RecorderError::Enqueue(_) => ErrorKind::EnqueueFailed,
            RecorderError::DiskLow { .. } => ErrorKind::DiskLow,
            RecorderError::Io { .. } => ErrorKind::Internal,
        }
    }
}
