// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! On-disk JSON schemas shared by every component: slot owner records,
//! encode job files, and daemon status heartbeats.

use serde::{Deserialize, Serialize};

/// Sidecar record written next to a held slot lock file.
///
/// The lock itself is the authoritative presence signal; this record is
/// observational metadata that may lag a crashed writer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerRecord {
    pub pid: u32,
    pub username: String,
    pub started_at: String,
}

/// Desired output frame rate: passthrough, a fixed number, or a rational
/// `num/den` string as accepted by the external transcode tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FpsValue {
    Auto(AutoMarker),
    Number(f64),
    Ratio(String),
}

impl FpsValue {
    /// Parse a config/CLI string value into an [`FpsValue`]: `"auto"`, a bare
    /// number (`"29.97"`), or a rational (`"30000/1001"`).
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("auto") {
            FpsValue::Auto(AutoMarker)
        } else if let Ok(n) = s.parse::<f64>() {
            FpsValue::Number(n)
        } else {
            FpsValue::Ratio(s.to_string())
        }
    }
}

/// Serializes/deserializes as the literal string `"auto"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoMarker;

impl Serialize for AutoMarker {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str("auto")
    }
}

impl<'de> Deserialize<'de> for AutoMarker {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        if s == "auto" {
            Ok(AutoMarker)
        } else {
            Err(serde::de::Error::custom(format!(
                "expected \"auto\", got {s:?}"
            )))
        }
    }
}

/// Encode parameters, snapshotted at enqueue time but overridable by the
/// running daemon's own layered config (CLI > env > config file > this
/// snapshot > built-in defaults).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodeParams {
    pub height: u32,
    pub fps: FpsValue,
    pub crf: u32,
    pub preset: String,
    pub threads: u32,
    pub loglevel: String,
    pub audio_bitrate_kbps: u32,
}

/// An encode job file, written atomically (temp-then-rename) to the queue
/// directory by a Recorder and consumed by the Encode Daemon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodeJob {
    pub id: String,
    pub input_path: std::path::PathBuf,
    pub base_name: String,
    pub username: String,
    pub params: EncodeParams,
    pub enqueued_at: String,
}

/// Encode Daemon's cooperative pause/resume state, as reported in its status
/// heartbeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncoderState {
    Idle,
    Paused,
    Running,
}

/// Status heartbeat written atomically by the Encode Daemon on every cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncoderStatus {
    pub pid: u32,
    pub state: EncoderState,
    pub current_job: Option<String>,
    pub last_tick: String,
}

/// Status heartbeat written atomically by the Poller Daemon on every cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollerStatus {
    pub pid: u32,
    pub last_poll: String,
    pub next_poll: String,
    pub cycle_count: u64,
    pub live_now: Vec<String>,
    pub spawned_now: Vec<String>,
}
