// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! FIFO on-disk job queue: `<tmp>/<id>.tmp` → rename into `jobs/` → rename
//! into `inflight/` while processing → deleted on success or renamed to
//! `failed/` on failure.
//!
//! File names encode a monotonically assignable order (nanosecond epoch
//! timestamp plus a random suffix); readers take the lexicographically
//! smallest valid file as the next job.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use twr_core::paths::QueueLayout;
use twr_core::EncodeJob;

use crate::error::QueueError;

pub struct EncodeQueue {
    layout: QueueLayout,
}

/// A job that has been dequeued and renamed into `inflight/`, pending a
/// call to [`EncodeQueue::mark_done`] or [`EncodeQueue::mark_failed`].
pub struct InflightJob {
    pub job: EncodeJob,
    path: PathBuf,
}

impl InflightJob {
    pub fn job(&self) -> &EncodeJob {
        &self.job
    }
}

impl EncodeQueue {
    pub fn new(queue_dir: &std::path::Path) -> Result<Self, QueueError> {
        let layout = QueueLayout::new(queue_dir);
        layout.ensure_exists().map_err(|source| QueueError::Io {
            path: queue_dir.to_path_buf(),
            source,
        })?;
        Ok(Self { layout })
    }

    /// Write `job` atomically (temp-then-rename) into the queue directory.
    pub fn enqueue(&self, job: &EncodeJob) -> Result<(), QueueError> {
        let file_name = format!("{}-{}.json", order_prefix(), nanoid::nanoid!(8));
        let tmp_path = self.layout.tmp_dir.join(&file_name);
        let final_path = self.layout.jobs_dir.join(&file_name);

        let json = serde_json::to_vec_pretty(job).map_err(|source| QueueError::InvalidJob {
            path: final_path.clone(),
            source,
        })?;
        std::fs::write(&tmp_path, &json).map_err(|source| QueueError::Io {
            path: tmp_path.clone(),
            source,
        })?;
        std::fs::rename(&tmp_path, &final_path).map_err(|source| QueueError::Io {
            path: final_path,
            source,
        })
    }

    /// Take the lexicographically smallest valid job file, rename it into
    /// `inflight/`, and parse it. Returns `None` when the queue is empty.
    pub fn dequeue(&self) -> Result<Option<InflightJob>, QueueError> {
        let mut entries: Vec<PathBuf> = std::fs::read_dir(&self.layout.jobs_dir)
            .map_err(|source| QueueError::Io {
                path: self.layout.jobs_dir.clone(),
                source,
            })?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("json"))
            .collect();
        entries.sort();

        for path in entries {
            let Some(file_name) = path.file_name() else {
                continue;
            };
            let inflight_path = self.layout.inflight_dir.join(file_name);
            if std::fs::rename(&path, &inflight_path).is_err() {
                // Another consumer raced us to this file; try the next one.
                continue;
            }

            let text = std::fs::read_to_string(&inflight_path).map_err(|source| QueueError::Io {
                path: inflight_path.clone(),
                source,
            })?;
            let job: EncodeJob =
                serde_json::from_str(&text).map_err(|source| QueueError::InvalidJob {
                    path: inflight_path.clone(),
                    source,
                })?;

            return Ok(Some(InflightJob {
                job,
                path: inflight_path,
            }));
        }
        Ok(None)
    }

    /// Successful transcode: delete the inflight job file.
    pub fn mark_done(&self, inflight: InflightJob) -> Result<(), QueueError> {
        std::fs::remove_file(&inflight.path).map_err(|source| QueueError::Io {
            path: inflight.path,
            source,
        })
    }

    /// Failed transcode: rename `<id>.json` to `<id>.failed` under
    /// `failed/`, and write `reason` alongside as `<id>.failed.reason`. Not
    /// re-enqueued automatically; requires operator action.
    pub fn mark_failed(&self, inflight: InflightJob, reason: &str) -> Result<(), QueueError> {
        let Some(stem) = inflight.path.file_stem().map(|s| s.to_string_lossy().into_owned())
        else {
            return std::fs::remove_file(&inflight.path).map_err(|source| QueueError::Io {
                path: inflight.path,
                source,
            });
        };
        let failed_path = self.layout.failed_dir.join(format!("{stem}.failed"));
        std::fs::rename(&inflight.path, &failed_path).map_err(|source| QueueError::Io {
            path: failed_path.clone(),
            source,
        })?;
        let reason_path = self.layout.failed_dir.join(format!("{stem}.failed.reason"));
        std::fs::write(&reason_path, reason).map_err(|source| QueueError::Io {
            path: reason_path,
            source,
        })
    }

    /// Recovery: any file left in `inflight/` is the mark of a crashed
    /// encoder. Move it back into `jobs/` so the next run picks it back up.
    /// Per the spec, a half-finished *encode* is not resumed — this only
    /// re-admits the job file itself to the FIFO queue; the transcode
    /// restarts from scratch.
    pub fn recover_inflight(&self) -> Result<usize, QueueError> {
        let mut recovered = 0;
        let entries = std::fs::read_dir(&self.layout.inflight_dir).map_err(|source| {
            QueueError::Io {
                path: self.layout.inflight_dir.clone(),
                source,
            }
        })?;
        for entry in entries.filter_map(|e| e.ok()) {
            let path = entry.path();
            let Some(file_name) = path.file_name() else {
                continue;
            };
            let restored_path = self.layout.jobs_dir.join(file_name);
            std::fs::rename(&path, &restored_path).map_err(|source| QueueError::Io {
                path: restored_path,
                source,
            })?;
            recovered += 1;
        }
        Ok(recovered)
    }
}

fn order_prefix() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    format!("{nanos:020}")
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;

#[cfg(test)]
#[path = "queue_proptest.rs"]
mod proptests;
