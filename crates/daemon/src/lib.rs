// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The two singleton long-lived roles — the Encode Daemon and the Poller
//! Daemon — plus the exclusive-lock primitive (`singleton`) that keeps at
//! most one instance of each running.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

use std::time::Duration;

use tokio::sync::watch;

pub mod encode_daemon;
pub mod error;
pub mod poller;
pub mod singleton;

pub use encode_daemon::EncodeDaemon;
pub use error::{EncodeDaemonError, PollerError, SingletonError};
pub use poller::Poller;
pub use singleton::{acquire_singleton, SingletonGuard};

/// Sleep for `duration`, returning early with `true` if `shutdown` flips to
/// `true` in the meantime. Shared by both daemons' idle/inter-cycle waits so
/// shutdown is never delayed by a full sleep.
pub(crate) async fn wait_or_shutdown(duration: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(duration) => false,
        changed = shutdown.changed() => changed.is_ok() && *shutdown.borrow(),
    }
}
