// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Exclusive advisory lock enforcing at most one running instance of a
//! daemon role (Encode Daemon, Poller Daemon) per lock path.

use std::fs::{File, OpenOptions};
use std::io::Read;
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::error::SingletonError;

/// Held singleton lock. Dropping releases it, matching process exit.
pub struct SingletonGuard {
    file: File,
    path: PathBuf,
}

impl Drop for SingletonGuard {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Acquire the singleton lock at `path`, writing this process's pid into it
/// on success. If another instance already holds it, reads back whatever
/// pid is recorded (best-effort) and returns [`SingletonError::AlreadyRunning`].
pub fn acquire_singleton(path: &Path) -> Result<SingletonGuard, SingletonError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| SingletonError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .map_err(|source| SingletonError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    if FileExt::try_lock_exclusive(&file).is_err() {
        let pid = read_pid(path);
        return Err(SingletonError::AlreadyRunning { pid });
    }

    use std::io::{Seek, SeekFrom, Write};
    let mut file = file;
    file.set_len(0).map_err(|source| SingletonError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    file.seek(SeekFrom::Start(0)).map_err(|source| SingletonError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    write!(file, "{}", std::process::id()).map_err(|source| SingletonError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(SingletonGuard {
        file,
        path: path.to_path_buf(),
    })
}

fn read_pid(path: &Path) -> Option<u32> {
    let mut contents = String::new();
    File::open(path).ok()?.read_to_string(&mut contents).ok()?;
    contents.trim().parse().ok()
}
