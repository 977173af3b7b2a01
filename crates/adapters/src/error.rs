// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use thiserror::Error;
use twr_core::{ErrorKind, HasKind};
use twr_shell::ShellError;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("capture tool failed: {0}")]
    Capture(#[source] ShellError),
    #[error("capture tool exited {status} for segment {path}")]
    CaptureNonZero { status: String, path: PathBuf },
    #[error("probe tool failed: {0}")]
    Probe(#[source] ShellError),
    #[error("merge tool failed: {0}")]
    Merge(#[source] ShellError),
    #[error("merge tool exited {status} concatenating {count} part(s) into {path}")]
    MergeNonZero {
        status: String,
        count: usize,
        path: PathBuf,
    },
    #[error("remux tool failed: {0}")]
    Remux(#[source] ShellError),
    #[error("remux tool exited {status} producing {path}")]
    RemuxNonZero { status: String, path: PathBuf },
    #[error("transcode tool failed: {0}")]
    Transcode(#[source] ShellError),
    #[error("transcode tool exited {status} producing {path}")]
    TranscodeNonZero { status: String, path: PathBuf },
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl HasKind for AdapterError {
    fn kind(&self) -> ErrorKind {
        match self {
            AdapterError::Capture(_) | AdapterError::CaptureNonZero { .. } => {
                ErrorKind::CaptureFailed
            }
            AdapterError::Probe(_) => ErrorKind::External,
            AdapterError::Merge(_) | AdapterError::MergeNonZero { .. } => ErrorKind::MergeFailed,
            AdapterError::Remux(_) | AdapterError::RemuxNonZero { .. } => ErrorKind::RemuxFailed,
            AdapterError::Transcode(_) | AdapterError::TranscodeNonZero { .. } => {
                ErrorKind::TranscodeFailed
            }
            AdapterError::Io { .. } => ErrorKind::Internal,
        }
    }
}
