// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The command-runner: the single abstraction through which every external
//! tool (capture, probe, mux/remux, transcode) is invoked.
//!
//! Two call shapes, not one enum of operation variants: most tools are
//! run-to-completion-or-timeout ([`runner::run_with_timeout`]); the
//! transcoder alone needs to be signaled mid-flight, so it gets its own
//! handle type ([`pausable::Pausable`]).

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod error;
pub mod pausable;
pub mod runner;
pub mod spawn;

pub use error::ShellError;
pub use pausable::Pausable;
pub use runner::run_with_timeout;
pub use spawn::spawn_detached;
