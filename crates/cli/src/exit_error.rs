// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Custom error type that carries a process exit code.
//!
//! Commands return an ordinary `anyhow::Result`; wrapping an error in
//! `ExitError` (directly via [`exit_error`], or via [`IntoExitError::exit_ctx`]
//! for anything that already implements `HasKind`) lets `main()` compute the
//! right exit code without every command matching on it by hand.

use std::fmt;

use twr_core::{ErrorKind, HasKind};

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExitError {}

/// Build an `anyhow::Error` carrying the exit code `kind` maps to.
pub fn exit_error(kind: ErrorKind, message: impl fmt::Display) -> anyhow::Error {
    anyhow::Error::new(ExitError::new(kind.exit_code(), message.to_string()))
}

/// Converts a `Result<T, E: HasKind>` into `anyhow::Result<T>`, tagging the
/// error with the exit code its `ErrorKind` maps to.
///
/// A named trait rather than a blanket `From` impl: every crate in the
/// workspace defines its own leaf error enum, and a blanket `From<E> for
/// anyhow::Error` would conflict with anyhow's own generic `From` impl.
pub trait IntoExitError<T> {
    fn exit_ctx(self) -> anyhow::Result<T>;
}

impl<T, E> IntoExitError<T> for Result<T, E>
where
    E: HasKind + fmt::Display,
{
    fn exit_ctx(self) -> anyhow::Result<T> {
        self.map_err(|e| exit_error(e.kind(), &e))
    }
}
