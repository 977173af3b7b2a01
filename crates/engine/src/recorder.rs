// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Drives one recording end to end for a single username: per-user lock,
//! slot, capture loop, merge, optional remux, finalize, enqueue.
//!
//! Sequential by design (see `§5` of the coordination design this mirrors):
//! capture, merge, and remux never overlap within one recorder. The only
//! concurrency is the capture loop's own retry-window deadline, tracked
//! against an injectable [`Clock`] so tests don't need to sleep for real.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{info, info_span, warn, Instrument};
use twr_adapters::{CaptureOutcome, CaptureTool, MuxTool};
use twr_core::schema::{EncodeJob, EncodeParams};
use twr_core::{time_fmt, Clock};
use twr_storage::{acquire_user_lock, EncodeQueue, SlotRegistry};

use crate::error::RecorderError;

/// Everything the recorder needs to know about one run, independent of
/// wherever the enclosing process sourced it from (CLI flags, config file).
#[derive(Debug, Clone)]
pub struct RecorderConfig {
    pub username: String,
    pub quality: String,
    pub fail_fast: bool,
    pub retry_delay: Duration,
    pub retry_window: Duration,
    pub record_dir: PathBuf,
    pub active_users_dir: PathBuf,
    pub slots_dir: PathBuf,
    pub record_limit: usize,
    pub disk_free_min_bytes: u64,
    pub enable_remux: bool,
    pub delete_ts_after_remux: bool,
    pub queue_dir: PathBuf,
    pub encode_params: EncodeParams,
    /// Whether a finalized recording is enqueued for transcoding at all.
    /// Turning this off (the `encode-mode off` CLI switch) leaves the
    /// finalized artifact in `record_dir` untouched by the Encode Daemon.
    pub auto_enqueue: bool,
}

/// What the recorder produced, or that it found nothing to record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecorderOutcome {
    Recorded { base_name: String, job_id: Option<String> },
    NotLive,
}

pub struct Recorder<C: Clock> {
    config: RecorderConfig,
    capture: CaptureTool,
    mux: MuxTool,
    clock: C,
}

impl<C: Clock> Recorder<C> {
    pub fn new(config: RecorderConfig, capture: CaptureTool, mux: MuxTool, clock: C) -> Self {
        Self {
            config,
            capture,
            mux,
            clock,
        }
    }

    pub async fn run(&self) -> Result<RecorderOutcome, RecorderError> {
        self.check_disk_space()?;

        let _user_lock = self
            .lock_user()
            .instrument(info_span!("lock_user", user = %self.config.username))
            .await?;

        let slot_guard = self
            .acquire_slot()
            .instrument(info_span!("acquire_slot", user = %self.config.username))
            .await?;

        let base_name = format!(
            "{}-{}",
            self.config.username,
            chrono::Utc::now().format("%Y%m%dT%H%M%SZ")
        );
        let temp_dir = twr_core::paths::record_temp_dir(&self.config.record_dir);
        std::fs::create_dir_all(&temp_dir).map_err(|source| RecorderError::Io {
            path: temp_dir.clone(),
            source,
        })?;

        let parts = self
            .capture_loop(&base_name, &temp_dir)
            .instrument(info_span!("capture_loop", user = %self.config.username))
            .await?;

        let Some(parts) = parts else {
            // Drop the slot guard explicitly: nothing was recorded, so
            // there is no merge/release-before-remux ordering to honor.
            drop(slot_guard);
            return Ok(RecorderOutcome::NotLive);
        };

        let ts_path = temp_dir.join(format!("{base_name}.ts"));
        self.merge(&parts, &ts_path)
            .instrument(info_span!("merge", user = %self.config.username))
            .await?;

        // Release before remux, per design: maximize capture concurrency.
        drop(slot_guard);

        let artifact = self
            .remux(&base_name, &ts_path, &temp_dir)
            .instrument(info_span!("remux", user = %self.config.username))
            .await?;

        let final_path = self.finalize(&artifact)?;

        let job_id = if self.config.auto_enqueue {
            Some(
                self.enqueue(&base_name, &final_path)
                    .instrument(info_span!("enqueue", user = %self.config.username))
                    .await?,
            )
        } else {
            None
        };

        Ok(RecorderOutcome::Recorded { base_name, job_id })
    }

    fn check_disk_space(&self) -> Result<(), RecorderError> {
        std::fs::create_dir_all(&self.config.record_dir).map_err(|source| RecorderError::Io {
            path: self.config.record_dir.clone(),
            source,
        })?;
        let available =
            fs2::available_space(&self.config.record_dir).map_err(|source| RecorderError::Io {
                path: self.config.record_dir.clone(),
                source,
            })?;
        if available < self.config.disk_free_min_bytes {
            return Err(RecorderError::DiskLow {
                available,
                minimum: self.config.disk_free_min_bytes,
                path: self.config.record_dir.clone(),
            });
        }
        Ok(())
    }

    async fn lock_user(&self) -> Result<twr_storage::UserLockGuard, RecorderError> {
        acquire_user_lock(&self.config.active_users_dir, &self.config.username)
            .map_err(RecorderError::UserBusy)
    }

    async fn acquire_slot(&self) -> Result<twr_storage::SlotGuard, RecorderError> {
        let registry = SlotRegistry::new(self.config.slots_dir.clone(), self.config.record_limit);
        registry
            .acquire(&self.config.username, self.config.fail_fast, Duration::from_secs(2))
            .await
            .map_err(|e| match e {
                twr_storage::SlotError::Busy => RecorderError::Busy(e),
                other => RecorderError::Slot(other),
            })
    }

    /// Returns `Ok(None)` when the stream was never live (no segment ever
    /// produced before the retry window elapsed); `Ok(Some(parts))`
    /// otherwise, even if the stream ultimately ended via repeated
    /// failures rather than a clean exit.
    async fn capture_loop(
        &self,
        base_name: &str,
        temp_dir: &Path,
    ) -> Result<Option<Vec<PathBuf>>, RecorderError> {
        let mut parts = Vec::new();
        let mut part_index: u32 = 0;
        let mut window_start = self.clock.now();

        loop {
            part_index += 1;
            let part_path = temp_dir.join(format!("{base_name}.part{part_index:03}"));

            let call_start = self.clock.now();
            let outcome = self
                .capture
                .capture_segment(
                    &self.config.username,
                    &self.config.quality,
                    &part_path,
                    twr_shell::runner::CAPTURE_SEGMENT_TIMEOUT,
                )
                .await
                .map_err(RecorderError::Tool)?;
            let call_elapsed = self.clock.now().duration_since(call_start);

            let produced = part_path.exists()
                && std::fs::metadata(&part_path).map(|m| m.len() > 0).unwrap_or(false);

            match outcome {
                CaptureOutcome::Ended => {
                    if produced {
                        parts.push(part_path);
                    }
                    break;
                }
                CaptureOutcome::Failed => {
                    if produced {
                        parts.push(part_path);
                    } else {
                        let _ = std::fs::remove_file(&part_path);
                    }

                    // A segment merely landing isn't enough: the retry
                    // chain only resets once a capture has actually run
                    // successfully for a full retry_window, proving the
                    // stream is healthy rather than crashing right after
                    // writing a few bytes.
                    if call_elapsed >= self.config.retry_window {
                        window_start = self.clock.now();
                    }

                    if self.clock.now().duration_since(window_start) >= self.config.retry_window {
                        warn!(user = %self.config.username, "retry window elapsed without a successful capture");
                        break;
                    }
                    tokio::time::sleep(self.config.retry_delay).await;
                }
            }
        }

        if parts.is_empty() {
            info!(user = %self.config.username, "stream not live");
            Ok(None)
        } else {
            Ok(Some(parts))
        }
    }

    async fn merge(&self, parts: &[PathBuf], ts_path: &Path) -> Result<(), RecorderError> {
        self.mux
            .merge_parts(parts, ts_path, twr_shell::runner::MERGE_TIMEOUT)
            .await
            .map_err(|e| {
                // Parts are intentionally left in place on merge failure
                // (see design: surfaced for manual recovery).
                RecorderError::Tool(e)
            })?;
        for part in parts {
            let _ = std::fs::remove_file(part);
        }
        Ok(())
    }

    async fn remux(
        &self,
        base_name: &str,
        ts_path: &Path,
        temp_dir: &Path,
    ) -> Result<PathBuf, RecorderError> {
        if !self.config.enable_remux {
            return Ok(ts_path.to_path_buf());
        }

        let mp4_path = temp_dir.join(format!("{base_name}.mp4"));
        match self
            .mux
            .remux_to_mp4(ts_path, &mp4_path, twr_shell::runner::REMUX_TIMEOUT)
            .await
        {
            Ok(()) => {
                if self.config.delete_ts_after_remux {
                    let _ = std::fs::remove_file(ts_path);
                }
                Ok(mp4_path)
            }
            Err(e) => {
                warn!(user = %self.config.username, error = %e, "remux failed, keeping .ts");
                Ok(ts_path.to_path_buf())
            }
        }
    }

    fn finalize(&self, artifact: &Path) -> Result<PathBuf, RecorderError> {
        let file_name = artifact.file_name().ok_or_else(|| RecorderError::Io {
            path: artifact.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "artifact path has no file name"),
        })?;
        let dest = self.config.record_dir.join(file_name);
        std::fs::rename(artifact, &dest).map_err(|source| RecorderError::Io {
            path: dest.clone(),
            source,
        })?;
        Ok(dest)
    }

    async fn enqueue(&self, base_name: &str, input_path: &Path) -> Result<String, RecorderError> {
        let queue = EncodeQueue::new(&self.config.queue_dir).map_err(RecorderError::Enqueue)?;

        let job = EncodeJob {
            id: nanoid::nanoid!(),
            input_path: input_path.to_path_buf(),
            base_name: base_name.to_string(),
            username: self.config.username.clone(),
            params: self.config.encode_params.clone(),
            enqueued_at: time_fmt::now_rfc3339(),
        };
        let id = job.id.clone();
        queue.enqueue(&job).map_err(RecorderError::Enqueue)?;
        Ok(id)
    }
}

#[cfg(test)]
#[path = "recorder_tests.rs"]
mod tests;
