// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Periodically probes a configured set of usernames for liveness and
//! spawns a detached Recorder for each newly-live user, subject to
//! available slots.

use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;
use tracing::{info, warn};
use twr_adapters::ProbeTool;
use twr_core::paths;
use twr_core::schema::PollerStatus;
use twr_core::time_fmt;
use twr_storage::{acquire_user_lock, HeartbeatWriter, SlotRegistry};

use crate::error::PollerError;
use crate::wait_or_shutdown;

/// Everything the Poller Daemon needs for one cycle. Constructed once at
/// startup by the `poller run` command.
pub struct Poller {
    users_file: PathBuf,
    active_users_dir: PathBuf,
    slots_dir: PathBuf,
    record_limit: usize,
    status_path: PathBuf,
    probe: ProbeTool,
    probe_timeout: Duration,
    probe_concurrency: usize,
    interval: Duration,
    recorder_binary: OsString,
    recorder_args_prefix: Vec<OsString>,
    recorder_log_dir: PathBuf,
}

impl Poller {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        users_file: PathBuf,
        active_users_dir: PathBuf,
        slots_dir: PathBuf,
        record_limit: usize,
        status_path: PathBuf,
        probe: ProbeTool,
        probe_timeout: Duration,
        probe_concurrency: usize,
        interval: Duration,
        recorder_binary: OsString,
        recorder_args_prefix: Vec<OsString>,
        recorder_log_dir: PathBuf,
    ) -> Self {
        Self {
            users_file,
            active_users_dir,
            slots_dir,
            record_limit,
            status_path,
            probe,
            probe_timeout,
            probe_concurrency,
            interval,
            recorder_binary,
            recorder_args_prefix,
            recorder_log_dir,
        }
    }

    /// Cycle until `shutdown` flips to `true`. Unlike the Encode Daemon,
    /// shutdown never touches spawned Recorders — their lifecycle is
    /// independent of the poller that started them.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<(), PollerError> {
        let mut cycle_count = 0u64;
        loop {
            if *shutdown.borrow() {
                break;
            }
            cycle_count += 1;
            if let Err(e) = self.cycle(cycle_count).await {
                warn!(error = %e, "poller cycle failed");
            }
            if wait_or_shutdown(self.interval, &mut shutdown).await {
                break;
            }
        }
        let _ = std::fs::remove_file(&self.status_path);
        Ok(())
    }

    async fn cycle(&self, cycle_count: u64) -> Result<(), PollerError> {
        let usernames = self.read_users_file()?;
        let candidates: Vec<String> = usernames.into_iter().filter(|u| self.is_user_free(u)).collect();

        let registry = SlotRegistry::new(self.slots_dir.clone(), self.record_limit);
        let used = registry.enumerate().map_err(PollerError::Slot)?.len();
        let free = self.record_limit.saturating_sub(used);

        let live_now = self.probe_all(&candidates).await;
        let spawned_now: Vec<String> = live_now.iter().take(free).cloned().collect();

        if free == 0 && !live_now.is_empty() {
            info!(live = live_now.len(), "no free slots; probed for status only, not spawning");
        }

        for username in &spawned_now {
            self.spawn_recorder(username);
        }

        let last_poll = time_fmt::now_rfc3339();
        let next_poll = (chrono::Utc::now()
            + chrono::Duration::from_std(self.interval).unwrap_or_else(|_| chrono::Duration::seconds(60)))
        .to_rfc3339();

        let heartbeat = HeartbeatWriter::new(self.status_path.clone());
        heartbeat
            .write(&PollerStatus {
                pid: std::process::id(),
                last_poll,
                next_poll,
                cycle_count,
                live_now,
                spawned_now,
            })
            .map_err(PollerError::Slot)?;

        Ok(())
    }

    fn read_users_file(&self) -> Result<Vec<String>, PollerError> {
        let text = match std::fs::read_to_string(&self.users_file) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(PollerError::Io {
                    path: self.users_file.clone(),
                    source,
                })
            }
        };
        Ok(parse_users_file(&text))
    }

    /// A user is "free" (a spawn candidate) iff no Recorder currently holds
    /// their per-user lock. Acquiring-then-immediately-dropping the lock is
    /// a cheap non-blocking liveness probe of the lock itself.
    fn is_user_free(&self, username: &str) -> bool {
        acquire_user_lock(&self.active_users_dir, username).is_ok()
    }

    async fn probe_all(&self, candidates: &[String]) -> Vec<String> {
        let semaphore = Arc::new(Semaphore::new(self.probe_concurrency.max(1)));
        let mut set = JoinSet::new();
        for (index, username) in candidates.iter().cloned().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            let probe = self.probe.clone();
            let timeout = self.probe_timeout;
            set.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                let live = match probe.probe(&username, timeout).await {
                    Ok(Some(_url)) => true,
                    Ok(None) => false,
                    Err(e) => {
                        warn!(username = %username, error = %e, "probe failed, treating as not live");
                        false
                    }
                };
                (index, username, live)
            });
        }

        let mut results: Vec<Option<(String, bool)>> = vec![None; candidates.len()];
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((index, username, live)) => results[index] = Some((username, live)),
                Err(e) => warn!(error = %e, "probe task panicked"),
            }
        }

        results
            .into_iter()
            .flatten()
            .filter(|(_, live)| *live)
            .map(|(username, _)| username)
            .collect()
    }

    fn spawn_recorder(&self, username: &str) {
        let mut args = self.recorder_args_prefix.clone();
        args.push(OsString::from("record"));
        args.push(OsString::from(username));
        let log_path = paths::recorder_log_path(&self.recorder_log_dir, username);
        info!(username, "spawning detached recorder");
        twr_shell::spawn_detached(self.recorder_binary.clone(), args, log_path);
    }
}

fn parse_users_file(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
#[path = "poller_tests.rs"]
mod tests;
