// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Drains the encode job queue in FIFO order, deferring to active
//! recordings by cooperatively pausing the in-flight transcode whenever the
//! Slot Registry reports a live owner.

use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{info, warn};
use twr_adapters::TranscodeTool;
use twr_core::config::PartialEncodeDaemon;
use twr_core::schema::{EncodeJob, EncodeParams, EncoderState, EncoderStatus, FpsValue};
use twr_core::time_fmt;
use twr_shell::{Pausable, ShellError};
use twr_storage::{EncodeQueue, HeartbeatWriter, InflightJob, SlotRegistry};

use crate::error::EncodeDaemonError;
use crate::wait_or_shutdown;

/// Everything the Encode Daemon needs to drain the queue. Constructed once
/// at startup with paths and config already resolved by the caller (the
/// `encode-daemon run` command).
pub struct EncodeDaemon {
    queue_dir: PathBuf,
    slots_dir: PathBuf,
    record_limit: usize,
    status_path: PathBuf,
    transcode: TranscodeTool,
    param_overrides: PartialEncodeDaemon,
    delete_input_on_success: bool,
    idle_poll: Duration,
    pause_poll: Duration,
    shutdown_grace: Duration,
}

impl EncodeDaemon {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        queue_dir: PathBuf,
        slots_dir: PathBuf,
        record_limit: usize,
        status_path: PathBuf,
        transcode: TranscodeTool,
        param_overrides: PartialEncodeDaemon,
        delete_input_on_success: bool,
    ) -> Self {
        Self {
            queue_dir,
            slots_dir,
            record_limit,
            status_path,
            transcode,
            param_overrides,
            delete_input_on_success,
            idle_poll: Duration::from_secs(5),
            pause_poll: Duration::from_secs(2),
            shutdown_grace: Duration::from_secs(10),
        }
    }

    /// Override the default idle/pause/grace intervals. Only used by tests,
    /// which would otherwise take the full 5s/2s/10s defaults to observe a
    /// transition.
    #[cfg(test)]
    pub fn with_intervals(mut self, idle_poll: Duration, pause_poll: Duration, shutdown_grace: Duration) -> Self {
        self.idle_poll = idle_poll;
        self.pause_poll = pause_poll;
        self.shutdown_grace = shutdown_grace;
        self
    }

    /// Drain the queue until `shutdown` flips to `true`. Recovers any job
    /// left in `inflight/` by a crashed prior run before entering the loop.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<(), EncodeDaemonError> {
        let queue = EncodeQueue::new(&self.queue_dir).map_err(EncodeDaemonError::Queue)?;
        let registry = SlotRegistry::new(self.slots_dir.clone(), self.record_limit);
        let heartbeat = HeartbeatWriter::new(self.status_path.clone());

        let recovered = queue.recover_inflight().map_err(EncodeDaemonError::Queue)?;
        if recovered > 0 {
            info!(recovered, "recovered jobs left inflight by a crashed encoder");
        }

        loop {
            if *shutdown.borrow() {
                break;
            }

            if registry.any_active().map_err(EncodeDaemonError::Slot)? {
                self.write_status(&heartbeat, EncoderState::Idle, None)?;
                if wait_or_shutdown(self.idle_poll, &mut shutdown).await {
                    break;
                }
                continue;
            }

            let Some(inflight) = queue.dequeue().map_err(EncodeDaemonError::Queue)? else {
                self.write_status(&heartbeat, EncoderState::Idle, None)?;
                if wait_or_shutdown(self.idle_poll, &mut shutdown).await {
                    break;
                }
                continue;
            };

            let job_id = inflight.job().id.clone();
            self.write_status(&heartbeat, EncoderState::Running, Some(job_id.clone()))?;
            self.run_job(inflight, &queue, &registry, &heartbeat, &mut shutdown).await?;
        }

        let _ = std::fs::remove_file(&self.status_path);
        Ok(())
    }

    async fn run_job(
        &self,
        inflight: InflightJob,
        queue: &EncodeQueue,
        registry: &SlotRegistry,
        heartbeat: &HeartbeatWriter,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<(), EncodeDaemonError> {
        let job = inflight.job().clone();
        let params = self.effective_params(&job.params);
        let output = self.compressed_path(&job);

        let mut handle = match self.transcode.spawn(&job.input_path, &output, &params) {
            Ok(handle) => handle,
            Err(e) => {
                warn!(job = %job.id, error = %e, "failed to spawn transcode tool");
                queue
                    .mark_failed(inflight, &e.to_string())
                    .map_err(EncodeDaemonError::Queue)?;
                return Ok(());
            }
        };

        let status = self
            .drive_job(&mut handle, &job.id, registry, heartbeat, shutdown)
            .await;

        match status {
            Ok(exit) if exit.success() => {
                info!(job = %job.id, "transcode complete");
                queue.mark_done(inflight).map_err(EncodeDaemonError::Queue)?;
                if self.delete_input_on_success {
                    let _ = std::fs::remove_file(&job.input_path);
                }
            }
            Ok(exit) => {
                warn!(job = %job.id, status = %exit, "transcode exited nonzero");
                queue
                    .mark_failed(inflight, &format!("transcode exited with {exit}"))
                    .map_err(EncodeDaemonError::Queue)?;
            }
            Err(e) => {
                warn!(job = %job.id, error = %e, "transcode failed");
                queue
                    .mark_failed(inflight, &e.to_string())
                    .map_err(EncodeDaemonError::Queue)?;
            }
        }
        Ok(())
    }

    /// Await the transcoder while polling `any_active()` on the side,
    /// suspending/resuming it on idle/active transitions, and honoring
    /// shutdown by terminating (with a kill escalation after the grace
    /// period).
    async fn drive_job(
        &self,
        handle: &mut Pausable,
        job_id: &str,
        registry: &SlotRegistry,
        heartbeat: &HeartbeatWriter,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<ExitStatus, ShellError> {
        let mut paused = false;
        let mut pause_tick = tokio::time::interval(self.pause_poll);
        pause_tick.tick().await; // first tick fires immediately; discard it

        loop {
            tokio::select! {
                result = handle.wait() => return result,
                _ = pause_tick.tick() => {
                    let active = match registry.any_active() {
                        Ok(active) => active,
                        Err(e) => {
                            warn!(error = %e, "failed to poll slot registry during transcode");
                            continue;
                        }
                    };
                    if active && !paused {
                        if handle.pause().is_ok() {
                            paused = true;
                            let _ = self.write_status(heartbeat, EncoderState::Paused, Some(job_id.to_string()));
                        }
                    } else if !active && paused {
                        if handle.resume().is_ok() {
                            paused = false;
                            let _ = self.write_status(heartbeat, EncoderState::Running, Some(job_id.to_string()));
                        }
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || !*shutdown.borrow() {
                        continue;
                    }
                    return self.shutdown_child(handle).await;
                }
            }
        }
    }

    async fn shutdown_child(&self, handle: &mut Pausable) -> Result<ExitStatus, ShellError> {
        // Resume first: a signal sent to a SIGSTOP'd process is queued, not
        // acted on, until it's running again.
        let _ = handle.resume();
        let _ = handle.terminate();
        match tokio::time::timeout(self.shutdown_grace, handle.wait()).await {
            Ok(result) => result,
            Err(_elapsed) => {
                warn!(pid = handle.pid(), "transcode child outlived shutdown grace period, killing");
                let _ = handle.kill_signal();
                handle.wait().await
            }
        }
    }

    fn write_status(
        &self,
        heartbeat: &HeartbeatWriter,
        state: EncoderState,
        current_job: Option<String>,
    ) -> Result<(), EncodeDaemonError> {
        heartbeat
            .write(&EncoderStatus {
                pid: std::process::id(),
                state,
                current_job,
                last_tick: time_fmt::now_rfc3339(),
            })
            .map_err(EncodeDaemonError::Slot)
    }

    /// Overlay the daemon's own config (CLI > env > config file, already
    /// folded into `param_overrides` by `Config::load_with_overrides`) onto
    /// the job's snapshotted parameters. A field left unset by the operator
    /// falls through to whatever the Recorder snapshotted at enqueue time.
    fn effective_params(&self, job_params: &EncodeParams) -> EncodeParams {
        let o = &self.param_overrides;
        EncodeParams {
            height: o.height.unwrap_or(job_params.height),
            fps: o
                .fps
                .as_deref()
                .map(FpsValue::parse)
                .unwrap_or_else(|| job_params.fps.clone()),
            crf: o.crf.unwrap_or(job_params.crf),
            preset: o.preset.clone().unwrap_or_else(|| job_params.preset.clone()),
            threads: o.threads.unwrap_or(job_params.threads),
            loglevel: o.loglevel.clone().unwrap_or_else(|| job_params.loglevel.clone()),
            audio_bitrate_kbps: o.audio_bitrate_kbps.unwrap_or(job_params.audio_bitrate_kbps),
        }
    }

    fn compressed_path(&self, job: &EncodeJob) -> PathBuf {
        let dir = job
            .input_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        dir.join(format!("{}-compressed.mp4", job.base_name))
    }
}

#[cfg(test)]
#[path = "encode_daemon_tests.rs"]
mod tests;
