// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filesystem-backed, advisory-locked named slot allocator.
//!
//! Each slot is a lock file `slotK` plus a sibling `slotK.owner` JSON
//! record. The lock is the authoritative presence signal; the owner record
//! is observational metadata that may lag a crashed writer, so every reader
//! treats an owner record as valid only if its PID is still alive.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::Duration;

use fs2::FileExt;
use twr_core::fsutil::{atomic_write_json, pid_is_alive};
use twr_core::time_fmt::now_rfc3339;
use twr_core::OwnerRecord;

use crate::error::SlotError;

/// Allocates up to `max_slots` named slots under `slots_dir`.
pub struct SlotRegistry {
    slots_dir: PathBuf,
    max_slots: usize,
}

/// A held slot. Releasing deletes the owner record before releasing the
/// advisory lock — if the process dies between those two steps, a
/// subsequent sweep removes the stale owner.
pub struct SlotGuard {
    file: Option<File>,
    owner_path: PathBuf,
    slot_index: usize,
}

impl SlotGuard {
    pub fn slot_index(&self) -> usize {
        self.slot_index
    }
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.owner_path);
        if let Some(file) = self.file.take() {
            let _ = FileExt::unlock(&file);
        }
    }
}

impl SlotRegistry {
    pub fn new(slots_dir: PathBuf, max_slots: usize) -> Self {
        Self { slots_dir, max_slots }
    }

    fn slot_path(&self, index: usize) -> PathBuf {
        self.slots_dir.join(format!("slot{index}"))
    }

    fn owner_path(&self, index: usize) -> PathBuf {
        self.slots_dir.join(format!("slot{index}.owner"))
    }

    fn ensure_dir(&self) -> Result<(), SlotError> {
        std::fs::create_dir_all(&self.slots_dir).map_err(|source| SlotError::Io {
            path: self.slots_dir.clone(),
            source,
        })
    }

    /// Attempt to acquire a slot once, scanning `slot1..=slotN` in order.
    fn try_acquire_once(&self, username: &str) -> Result<Option<SlotGuard>, SlotError> {
        self.ensure_dir()?;
        for index in 1..=self.max_slots {
            let slot_path = self.slot_path(index);
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(false)
                .open(&slot_path)
                .map_err(|source| SlotError::Io {
                    path: slot_path.clone(),
                    source,
                })?;

            if FileExt::try_lock_exclusive(&file).is_err() {
                continue;
            }

            let owner = OwnerRecord {
                pid: std::process::id(),
                username: username.to_string(),
                started_at: now_rfc3339(),
            };
            let owner_path = self.owner_path(index);
            if let Err(e) = atomic_write_json(&owner_path, &owner) {
                let _ = FileExt::unlock(&file);
                return Err(SlotError::Io {
                    path: owner_path,
                    source: e,
                });
            }

            return Ok(Some(SlotGuard {
                file: Some(file),
                owner_path,
                slot_index: index,
            }));
        }
        Ok(None)
    }

    /// Acquire one of `max_slots` slots. When `fail_fast` is set, returns
    /// [`SlotError::Busy`] immediately if none are free; otherwise waits,
    /// rescanning every `retry_interval`, until one frees.
    pub async fn acquire(
        &self,
        username: &str,
        fail_fast: bool,
        retry_interval: Duration,
    ) -> Result<SlotGuard, SlotError> {
        loop {
            if let Some(guard) = self.try_acquire_once(username)? {
                return Ok(guard);
            }
            if fail_fast {
                return Err(SlotError::Busy);
            }
            tokio::time::sleep(retry_interval).await;
        }
    }

    /// Explicitly release a held slot. Equivalent to dropping the guard, but
    /// surfaces I/O errors instead of swallowing them.
    pub fn release(&self, mut guard: SlotGuard) -> Result<(), SlotError> {
        std::fs::remove_file(&guard.owner_path).or_else(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Ok(())
            } else {
                Err(SlotError::Io {
                    path: guard.owner_path.clone(),
                    source: e,
                })
            }
        })?;
        if let Some(file) = guard.file.take() {
            FileExt::unlock(&file).map_err(|source| SlotError::Io {
                path: self.slots_dir.clone(),
                source,
            })?;
        }
        Ok(())
    }

    /// Read every `slotK.owner` record, discarding (and deleting) any whose
    /// PID is no longer alive.
    pub fn enumerate(&self) -> Result<Vec<OwnerRecord>, SlotError> {
        self.ensure_dir()?;
        let mut live = Vec::new();
        for index in 1..=self.max_slots {
            let owner_path = self.owner_path(index);
            let Ok(text) = std::fs::read_to_string(&owner_path) else {
                continue;
            };
            let record: OwnerRecord = match serde_json::from_str(&text) {
                Ok(r) => r,
                Err(_) => {
                    // A torn write from a crash mid-rename should never be
                    // observable (writes are atomic), but guard anyway by
                    // treating an unparseable record as stale.
                    let _ = std::fs::remove_file(&owner_path);
                    continue;
                }
            };
            if pid_is_alive(record.pid) {
                live.push(record);
            } else {
                let _ = std::fs::remove_file(&owner_path);
            }
        }
        Ok(live)
    }

    /// True iff any live recording currently holds a slot.
    pub fn any_active(&self) -> Result<bool, SlotError> {
        Ok(!self.enumerate()?.is_empty())
    }

    /// Force a stale-owner sweep. Idempotent — `enumerate` already sweeps as
    /// a side effect, so this is just a named entrypoint for callers (the
    /// `doctor`/`clean` commands) that want to sweep without caring about
    /// the live set itself.
    pub fn sweep(&self) -> Result<(), SlotError> {
        self.enumerate()?;
        Ok(())
    }

    /// Like [`Self::sweep`], but returns how many stale owner records were
    /// removed, for operator-facing commands (`clean`, `doctor`) to report.
    pub fn sweep_and_count(&self) -> Result<usize, SlotError> {
        self.ensure_dir()?;
        let mut swept = 0;
        for index in 1..=self.max_slots {
            let owner_path = self.owner_path(index);
            let Ok(text) = std::fs::read_to_string(&owner_path) else {
                continue;
            };
            let stale = match serde_json::from_str::<OwnerRecord>(&text) {
                Ok(record) => !pid_is_alive(record.pid),
                Err(_) => true,
            };
            if stale {
                let _ = std::fs::remove_file(&owner_path);
                swept += 1;
            }
        }
        Ok(swept)
    }
}

#[cfg(test)]
#[path = "slot_registry_tests.rs"]
mod tests;

#[cfg(test)]
#[path = "slot_registry_proptest.rs"]
mod proptests;
