// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;
use twr_core::{ErrorKind, HasKind};

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("{description} failed: {source}")]
    Spawn {
        description: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{description} timed out after {timeout_secs}s")]
    Timeout {
        description: String,
        timeout_secs: u64,
    },
    #[error("signal delivery to pid {pid} failed: {source}")]
    Signal {
        pid: u32,
        #[source]
        source: nix::Error,
    },
}

impl HasKind for ShellError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::External
    }
}
