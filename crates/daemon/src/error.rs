// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use thiserror::Error;
use twr_adapters::AdapterError;
use twr_core::{ErrorKind, HasKind};
use twr_storage::{QueueError, SlotError};

#[derive(Debug, Error)]
pub enum SingletonError {
    #[error("another instance is already running (pid {pid})")]
    AlreadyRunning { pid: Option<u32> },
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl HasKind for SingletonError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::External
    }
}

#[derive(Debug, Error)]
pub enum EncodeDaemonError {
    #[error("singleton lock conflict: {0}")]
    Singleton(#[source] SingletonError),
    #[error("slot registry error: {0}")]
    Slot(#[source] SlotError),
    #[error("queue error: {0}")]
    Queue(#[source] QueueError),
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl HasKind for EncodeDaemonError {
    fn kind(&self) -> ErrorKind {
        match self {
            EncodeDaemonError::Singleton(_) => ErrorKind::External,
            EncodeDaemonError::Slot(_) => ErrorKind::Internal,
            EncodeDaemonError::Queue(_) => ErrorKind::EnqueueFailed,
            EncodeDaemonError::Io { .. } => ErrorKind::Internal,
        }
    }
}

#[derive(Debug, Error)]
pub enum PollerError {
    #[error("singleton lock conflict: {0}")]
    Singleton(#[source] SingletonError),
    #[error("slot registry error: {0}")]
    Slot(#[source] SlotError),
    #[error("probe tool error: {0}")]
    Probe(#[source] AdapterError),
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl HasKind for PollerError {
    fn kind(&self) -> ErrorKind {
        match self {
            PollerError::Singleton(_) => ErrorKind::External,
            PollerError::Slot(_) => ErrorKind::Internal,
            PollerError::Probe(e) => e.kind(),
            PollerError::Io { .. } => ErrorKind::Internal,
        }
    }
}
