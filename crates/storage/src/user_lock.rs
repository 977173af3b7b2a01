// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-user advisory lock: at most one Recorder per username at any time.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::error::UserLockError;

/// Held per-user lock. Releasing is implicit on drop (process exit also
/// releases it, since the lock is tied to the open file descriptor).
pub struct UserLockGuard {
    file: File,
    path: PathBuf,
}

impl Drop for UserLockGuard {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

/// Attempt to acquire the per-user lock at `lock_dir/<username>.lock`.
/// Returns [`UserLockError::UserBusy`] if another Recorder already holds it.
pub fn acquire_user_lock(lock_dir: &Path, username: &str) -> Result<UserLockGuard, UserLockError> {
    std::fs::create_dir_all(lock_dir).map_err(|source| UserLockError::Io {
        path: lock_dir.to_path_buf(),
        source,
    })?;
    let path = lock_dir.join(format!("{username}.lock"));
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&path)
        .map_err(|source| UserLockError::Io {
            path: path.clone(),
            source,
        })?;

    FileExt::try_lock_exclusive(&file).map_err(|_| UserLockError::UserBusy)?;

    Ok(UserLockGuard { file, path })
}
