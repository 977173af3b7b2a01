//! Shared scaffolding for the `tests/specs/` tree: an isolated, tempdir-backed
//! project plus a small chainable wrapper over `assert_cmd` so spec files read
//! as `project.twr().args(&[...]).passes().stdout_has("...")`.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use assert_cmd::assert::Assert;
use assert_cmd::Command;

/// A throwaway home for one test: its own record/queue/logs dirs and its own
/// `XDG_RUNTIME_DIR`, so concurrently-run tests never share slot registries,
/// user locks, or daemon singleton locks.
pub struct Project {
    dir: tempfile::TempDir,
}

impl Project {
    pub fn empty() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir_all(dir.path().join("runtime")).expect("mkdir runtime");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn record_dir(&self) -> PathBuf {
        self.path().join("recordings")
    }

    pub fn queue_dir(&self) -> PathBuf {
        self.path().join("queue")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.path().join("logs")
    }

    pub fn runtime_dir(&self) -> PathBuf {
        self.path().join("runtime")
    }

    pub fn users_file(&self) -> PathBuf {
        self.path().join("users.txt")
    }

    /// Write a file relative to the project root, creating parent dirs.
    pub fn file(&self, relative: &str, contents: impl AsRef<[u8]>) -> PathBuf {
        let path = self.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("mkdir parent");
        }
        std::fs::write(&path, contents).expect("write fixture file");
        path
    }

    /// A `twr` invocation scoped to this project: its own runtime dir (so
    /// the Slot Registry and per-user locks don't leak across tests) and its
    /// own `paths.*`, with the retry loop sped up so a "not live" capture
    /// resolves near-instantly instead of waiting out the real default
    /// retry window.
    pub fn twr(&self) -> TwrCommand {
        let mut cmd = Command::cargo_bin("twr").expect("locate twr binary");
        cmd.env_clear()
            .env("PATH", std::env::var("PATH").unwrap_or_default())
            .env("HOME", self.path())
            .env("XDG_RUNTIME_DIR", self.runtime_dir())
            .env("TWR_PATHS_RECORD_DIR", self.record_dir())
            .env("TWR_PATHS_QUEUE_DIR", self.queue_dir())
            .env("TWR_PATHS_LOGS_DIR", self.logs_dir())
            .env("TWR_POLLER_USERS_FILE", self.users_file())
            .env("TWR_STORAGE_DISK_FREE_MIN_BYTES", "0")
            .env("TWR_RECORD_RETRY_DELAY_SECS", "0")
            .env("TWR_RECORD_RETRY_WINDOW_SECS", "0")
            .current_dir(self.path())
            .timeout(std::time::Duration::from_secs(20));
        TwrCommand { cmd }
    }
}

/// Chainable wrapper over `assert_cmd::Command`: every builder method
/// consumes and returns `Self` so call sites read top to bottom.
pub struct TwrCommand {
    cmd: Command,
}

impl TwrCommand {
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.cmd.args(args);
        self
    }

    pub fn env(mut self, key: &str, value: impl AsRef<OsStr>) -> Self {
        self.cmd.env(key, value);
        self
    }

    pub fn passes(mut self) -> Out {
        Out(self.cmd.assert().success())
    }

    pub fn fails(mut self) -> Out {
        Out(self.cmd.assert().failure())
    }

    pub fn code_is(mut self, code: i32) -> Out {
        Out(self.cmd.assert().code(code))
    }
}

/// A finished assertion, with string-matching helpers layered on top of
/// `assert_cmd`'s own `success()`/`failure()`/`code()`.
pub struct Out(Assert);

impl Out {
    pub fn stdout_has(self, needle: &str) -> Self {
        let text = String::from_utf8_lossy(&self.0.get_output().stdout).into_owned();
        assert!(text.contains(needle), "stdout did not contain {needle:?}:\n{text}");
        self
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        let text = String::from_utf8_lossy(&self.0.get_output().stderr).into_owned();
        assert!(text.contains(needle), "stderr did not contain {needle:?}:\n{text}");
        self
    }
}
