// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Layered configuration: CLI flags > environment variables > config file >
//! built-in defaults.
//!
//! Every layer is represented as a [`PartialConfig`] (every field an
//! `Option`); [`Config::load`] folds the four layers together, first
//! `Some` wins, then fills anything still missing from [`Config::default`].

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::error::{ErrorKind, HasKind};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("could not determine home/state directory")]
    NoStateDir,
}

impl HasKind for ConfigError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Config
    }
}

/// Fully resolved configuration. Every field has a concrete value, after
/// layering CLI > env > file > defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub paths: PathsConfig,
    pub limits: LimitsConfig,
    pub storage: StorageConfig,
    pub record: RecordConfig,
    pub encode_daemon: EncodeDaemonConfig,
    pub poller: PollerConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PathsConfig {
    pub queue_dir: PathBuf,
    pub logs_dir: PathBuf,
    pub record_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitsConfig {
    pub record_limit: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StorageConfig {
    pub disk_free_min_bytes: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordConfig {
    pub quality: String,
    pub retry_delay_secs: u64,
    pub retry_window_secs: u64,
    pub loglevel: String,
    pub enable_remux: bool,
    pub delete_ts_after_remux: bool,
    pub delete_input_on_success: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EncodeDaemonConfig {
    pub preset: String,
    pub crf: u32,
    pub threads: u32,
    pub height: u32,
    pub fps: String,
    pub loglevel: String,
    pub audio_bitrate_kbps: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PollerConfig {
    pub users_file: PathBuf,
    pub interval_secs: u64,
    pub quality: String,
    pub download_cmd: String,
    pub timeout_secs: u64,
    pub probe_concurrency: usize,
}

/// Every field optional: one layer's worth of overrides. `merge` folds a
/// higher-precedence layer onto a lower-precedence one, left-biased (first
/// `Some` wins).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PartialConfig {
    pub paths: PartialPaths,
    pub limits: PartialLimits,
    pub storage: PartialStorage,
    pub record: PartialRecord,
    pub encode_daemon: PartialEncodeDaemon,
    pub poller: PartialPoller,
}

macro_rules! partial_struct {
    ($name:ident { $($field:ident: $ty:ty),* $(,)? }) => {
        #[derive(Debug, Clone, Default, Deserialize)]
        #[serde(default)]
        pub struct $name {
            $(pub $field: Option<$ty>),*
        }

        impl $name {
            fn merge(self, lower: Self) -> Self {
                Self {
                    $($field: self.$field.or(lower.$field)),*
                }
            }
        }
    };
}

partial_struct!(PartialPaths {
    queue_dir: PathBuf,
    logs_dir: PathBuf,
    record_dir: PathBuf,
});

partial_struct!(PartialLimits {
    record_limit: usize,
});

partial_struct!(PartialStorage {
    disk_free_min_bytes: u64,
});

partial_struct!(PartialRecord {
    quality: String,
    retry_delay_secs: u64,
    retry_window_secs: u64,
    loglevel: String,
    enable_remux: bool,
    delete_ts_after_remux: bool,
    delete_input_on_success: bool,
});

partial_struct!(PartialEncodeDaemon {
    preset: String,
    crf: u32,
    threads: u32,
    height: u32,
    fps: String,
    loglevel: String,
    audio_bitrate_kbps: u32,
});

partial_struct!(PartialPoller {
    users_file: PathBuf,
    interval_secs: u64,
    quality: String,
    download_cmd: String,
    timeout_secs: u64,
    probe_concurrency: usize,
});

impl PartialConfig {
    pub fn merge(self, lower: Self) -> Self {
        Self {
            paths: self.paths.merge(lower.paths),
            limits: self.limits.merge(lower.limits),
            storage: self.storage.merge(lower.storage),
            record: self.record.merge(lower.record),
            encode_daemon: self.encode_daemon.merge(lower.encode_daemon),
            poller: self.poller.merge(lower.poller),
        }
    }

    /// Build overrides from uppercased `TWR_*` environment variables.
    /// Only variables that are actually set are populated — everything else
    /// stays `None` and falls through to the config file / defaults.
    pub fn from_env() -> Self {
        let mut p = Self::default();
        p.paths.queue_dir = env_path("TWR_PATHS_QUEUE_DIR");
        p.paths.logs_dir = env_path("TWR_PATHS_LOGS_DIR");
        p.paths.record_dir = env_path("TWR_PATHS_RECORD_DIR");
        p.limits.record_limit = env_parsed("TWR_LIMITS_RECORD_LIMIT");
        p.storage.disk_free_min_bytes = env_parsed("TWR_STORAGE_DISK_FREE_MIN_BYTES");
        p.record.quality = env_string("TWR_RECORD_QUALITY");
        p.record.retry_delay_secs = env_parsed("TWR_RECORD_RETRY_DELAY_SECS");
        p.record.retry_window_secs = env_parsed("TWR_RECORD_RETRY_WINDOW_SECS");
        p.record.loglevel = env_string("TWR_RECORD_LOGLEVEL");
        p.record.enable_remux = env_parsed("TWR_RECORD_ENABLE_REMUX");
        p.record.delete_ts_after_remux = env_parsed("TWR_RECORD_DELETE_TS_AFTER_REMUX");
        p.record.delete_input_on_success = env_parsed("TWR_RECORD_DELETE_INPUT_ON_SUCCESS");
        p.encode_daemon.preset = env_string("TWR_ENCODE_DAEMON_PRESET");
        p.encode_daemon.crf = env_parsed("TWR_ENCODE_DAEMON_CRF");
        p.encode_daemon.threads = env_parsed("TWR_ENCODE_DAEMON_THREADS");
        p.encode_daemon.height = env_parsed("TWR_ENCODE_DAEMON_HEIGHT");
        p.encode_daemon.fps = env_string("TWR_ENCODE_DAEMON_FPS");
        p.encode_daemon.loglevel = env_string("TWR_ENCODE_DAEMON_LOGLEVEL");
        p.encode_daemon.audio_bitrate_kbps = env_parsed("TWR_ENCODE_DAEMON_AUDIO_BITRATE_KBPS");
        p.poller.users_file = env_path("TWR_POLLER_USERS_FILE");
        p.poller.interval_secs = env_parsed("TWR_POLLER_INTERVAL_SECS");
        p.poller.quality = env_string("TWR_POLLER_QUALITY");
        p.poller.download_cmd = env_string("TWR_POLLER_DOWNLOAD_CMD");
        p.poller.timeout_secs = env_parsed("TWR_POLLER_TIMEOUT_SECS");
        p.poller.probe_concurrency = env_parsed("TWR_POLLER_PROBE_CONCURRENCY");
        p
    }

    /// Parse a TOML config file into overrides. A missing file is not an
    /// error — callers pass an empty `PartialConfig` in that case.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var(key).ok().map(PathBuf::from)
}

fn env_parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

impl Config {
    /// Layer `cli` (highest precedence) over environment, an optional config
    /// file, and built-in defaults (lowest precedence), producing a fully
    /// resolved `Config`.
    pub fn load(cli: PartialConfig, config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let (_, config) = Self::load_with_overrides(cli, config_file)?;
        Ok(config)
    }

    /// Like [`Config::load`], but also returns the CLI/env/file layers
    /// merged *without* built-in defaults folded in.
    ///
    /// The Encode Daemon needs this distinction: a job's snapshotted encode
    /// parameters should be overridden by whatever the running daemon was
    /// explicitly told (CLI flag, env var, or config file key), but must
    /// *not* be clobbered by a built-in default the operator never asked
    /// for (see `paths.queue_dir`, `limits.record_limit` etc. — job
    /// parameters follow CLI > env > config > job snapshot > built-ins,
    /// whereas every other `Config` consumer wants built-ins folded in).
    pub fn load_with_overrides(
        cli: PartialConfig,
        config_file: Option<&Path>,
    ) -> Result<(PartialConfig, Self), ConfigError> {
        let overrides = Self::overrides_only(cli, config_file)?;
        let config = overrides.clone().merge(Self::default_partial()?).into_config();
        Ok((overrides, config))
    }

    fn overrides_only(cli: PartialConfig, config_file: Option<&Path>) -> Result<PartialConfig, ConfigError> {
        let from_file = match config_file {
            Some(path) if path.exists() => PartialConfig::from_file(path)?,
            _ => PartialConfig::default(),
        };
        Ok(cli.merge(PartialConfig::from_env()).merge(from_file))
    }

    fn default_partial() -> Result<PartialConfig, ConfigError> {
        let state_dir = default_state_dir()?;
        let record_dir = default_record_dir()?;
        Ok(PartialConfig {
            paths: PartialPaths {
                queue_dir: Some(state_dir.join("encode-queue")),
                logs_dir: Some(state_dir.join("logs")),
                record_dir: Some(record_dir),
            },
            limits: PartialLimits {
                record_limit: Some(2),
            },
            storage: PartialStorage {
                disk_free_min_bytes: Some(5 * 1024 * 1024 * 1024),
            },
            record: PartialRecord {
                quality: Some("best".into()),
                retry_delay_secs: Some(5),
                retry_window_secs: Some(30),
                loglevel: Some("warning".into()),
                enable_remux: Some(true),
                delete_ts_after_remux: Some(true),
                delete_input_on_success: Some(false),
            },
            encode_daemon: PartialEncodeDaemon {
                preset: Some("medium".into()),
                crf: Some(23),
                threads: Some(0),
                height: Some(1080),
                fps: Some("auto".into()),
                loglevel: Some("warning".into()),
                audio_bitrate_kbps: Some(160),
            },
            poller: PartialPoller {
                users_file: Some(state_dir.join("users.txt")),
                interval_secs: Some(60),
                quality: Some("best".into()),
                download_cmd: Some("twr".into()),
                timeout_secs: Some(15),
                probe_concurrency: Some(4),
            },
        })
    }
}

impl PartialConfig {
    /// Convert into a fully resolved `Config`. Every field is expected to be
    /// `Some` by the time this is called — [`Config::load`] always folds in
    /// [`Config::default_partial`] as the lowest layer, so unwraps here can
    /// never observe a missing value short of a bug in that folding.
    fn into_config(self) -> Config {
        Config {
            paths: PathsConfig {
                queue_dir: self.paths.queue_dir.unwrap_or_else(|| "queue".into()),
                logs_dir: self.paths.logs_dir.unwrap_or_else(|| "logs".into()),
                record_dir: self.paths.record_dir.unwrap_or_else(|| "recordings".into()),
            },
            limits: LimitsConfig {
                record_limit: self.limits.record_limit.unwrap_or(2),
            },
            storage: StorageConfig {
                disk_free_min_bytes: self
                    .storage
                    .disk_free_min_bytes
                    .unwrap_or(5 * 1024 * 1024 * 1024),
            },
            record: RecordConfig {
                quality: self.record.quality.unwrap_or_else(|| "best".into()),
                retry_delay_secs: self.record.retry_delay_secs.unwrap_or(5),
                retry_window_secs: self.record.retry_window_secs.unwrap_or(30),
                loglevel: self.record.loglevel.unwrap_or_else(|| "warning".into()),
                enable_remux: self.record.enable_remux.unwrap_or(true),
                delete_ts_after_remux: self.record.delete_ts_after_remux.unwrap_or(true),
                delete_input_on_success: self.record.delete_input_on_success.unwrap_or(false),
            },
            encode_daemon: EncodeDaemonConfig {
                preset: self.encode_daemon.preset.unwrap_or_else(|| "medium".into()),
                crf: self.encode_daemon.crf.unwrap_or(23),
                threads: self.encode_daemon.threads.unwrap_or(0),
                height: self.encode_daemon.height.unwrap_or(1080),
                fps: self.encode_daemon.fps.unwrap_or_else(|| "auto".into()),
                loglevel: self
                    .encode_daemon
                    .loglevel
                    .unwrap_or_else(|| "warning".into()),
                audio_bitrate_kbps: self.encode_daemon.audio_bitrate_kbps.unwrap_or(160),
            },
            poller: PollerConfig {
                users_file: self.poller.users_file.unwrap_or_else(|| "users.txt".into()),
                interval_secs: self.poller.interval_secs.unwrap_or(60),
                quality: self.poller.quality.unwrap_or_else(|| "best".into()),
                download_cmd: self.poller.download_cmd.unwrap_or_else(|| "twr".into()),
                timeout_secs: self.poller.timeout_secs.unwrap_or(15),
                probe_concurrency: self.poller.probe_concurrency.unwrap_or(4),
            },
        }
    }
}

fn default_state_dir() -> Result<PathBuf, ConfigError> {
    dirs::state_dir()
        .or_else(dirs::data_local_dir)
        .map(|d| d.join("twr"))
        .ok_or(ConfigError::NoStateDir)
}

fn default_record_dir() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|d| d.join("recordings"))
        .ok_or(ConfigError::NoStateDir)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
