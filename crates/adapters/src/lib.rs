// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thin per-operation wrappers around the external tools the recorder and
//! encode daemon shell out to (capture, probe, mux/remux, transcode),
//! built on the two primitives in `twr-shell`.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod capture;
pub mod error;
pub mod mux;
pub mod probe;
pub mod transcode;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use capture::{CaptureOutcome, CaptureTool};
pub use error::AdapterError;
pub use mux::MuxTool;
pub use probe::ProbeTool;
pub use transcode::TranscodeTool;
