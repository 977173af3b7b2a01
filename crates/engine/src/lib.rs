// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Recorder: drives one capture-to-enqueue run for a single username,
//! built on `twr-storage`'s slot/lock/queue primitives and `twr-adapters`'
//! external-tool wrappers.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod error;
pub mod recorder;

pub use error::RecorderError;
pub use recorder::{Recorder, RecorderConfig, RecorderOutcome};
