// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use thiserror::Error;
use twr_core::{ErrorKind, HasKind};

#[derive(Debug, Error)]
pub enum SlotError {
    #[error("no slots available")]
    Busy,
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("owner record at {path} is not valid JSON: {source}")]
    InvalidOwnerRecord {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl HasKind for SlotError {
    fn kind(&self) -> ErrorKind {
        match self {
            SlotError::Busy => ErrorKind::Busy,
            SlotError::Io { .. } | SlotError::InvalidOwnerRecord { .. } => ErrorKind::Internal,
        }
    }
}

#[derive(Debug, Error)]
pub enum UserLockError {
    #[error("user is already being recorded")]
    UserBusy,
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl HasKind for UserLockError {
    fn kind(&self) -> ErrorKind {
        match self {
            UserLockError::UserBusy => ErrorKind::UserBusy,
            UserLockError::Io { .. } => ErrorKind::Internal,
        }
    }
}

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("job file {path} is not valid JSON: {source}")]
    InvalidJob {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl HasKind for QueueError {
    fn kind(&self) -> ErrorKind {
        match self {
            QueueError::Io { .. } => ErrorKind::EnqueueFailed,
            QueueError::InvalidJob { .. } => ErrorKind::Internal,
        }
    }
}
