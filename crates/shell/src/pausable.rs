// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A spawned child that can be cooperatively paused and resumed mid-flight,
//! via `SIGSTOP`/`SIGCONT`. Used exclusively for the transcoder child, the
//! one external call whose process must be signaled while it is running
//! rather than simply awaited to completion (see [`crate::runner`] for
//! everything else).

use std::process::ExitStatus;

use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use tokio::process::{Child, Command};

use crate::error::ShellError;

/// A running child process that supports stop/continue/terminate/kill in
/// addition to being awaited for its exit status.
pub struct Pausable {
    child: Child,
    pid: u32,
}

impl Pausable {
    /// Spawn `cmd`, keeping a handle to signal it while it runs.
    pub fn spawn(mut cmd: Command) -> Result<Self, ShellError> {
        cmd.kill_on_drop(true);
        let child = cmd.spawn().map_err(|source| ShellError::Spawn {
            description: "transcode".to_string(),
            source,
        })?;
        let pid = child.id().unwrap_or(0);
        Ok(Self { child, pid })
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Suspend the child without it observing anything (`SIGSTOP`).
    pub fn pause(&self) -> Result<(), ShellError> {
        self.signal(Signal::SIGSTOP)
    }

    /// Resume a previously-paused child (`SIGCONT`).
    pub fn resume(&self) -> Result<(), ShellError> {
        self.signal(Signal::SIGCONT)
    }

    /// Ask the child to exit gracefully (`SIGTERM`).
    pub fn terminate(&self) -> Result<(), ShellError> {
        self.signal(Signal::SIGTERM)
    }

    /// Forcibly end the child (`SIGKILL`). Escalation after `terminate`
    /// has had a grace period to take effect.
    pub fn kill_signal(&self) -> Result<(), ShellError> {
        self.signal(Signal::SIGKILL)
    }

    fn signal(&self, signal: Signal) -> Result<(), ShellError> {
        let raw = i32::try_from(self.pid).unwrap_or(0);
        kill(Pid::from_raw(raw), signal).map_err(|source| ShellError::Signal {
            pid: self.pid,
            source,
        })
    }

    /// Wait for the child to exit. Cancellation-safe: dropping the future
    /// does not kill the child (only dropping `self` does, via
    /// `kill_on_drop`).
    pub async fn wait(&mut self) -> Result<ExitStatus, ShellError> {
        self.child.wait().await.map_err(|source| ShellError::Spawn {
            description: "transcode".to_string(),
            source,
        })
    }
}

#[cfg(test)]
#[path = "pausable_tests.rs"]
mod tests;
