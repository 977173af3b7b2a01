// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test-only builders and proptest strategies for other crates' tests.
//! Gated behind the `test-support` feature so it never ships in a release
//! build.

use proptest::prelude::*;

use crate::schema::{EncodeJob, EncodeParams, FpsValue, AutoMarker};
use crate::time_fmt::now_rfc3339;

/// Build a minimal but valid `EncodeJob` for the given username, with a
/// unique id derived from `nanoid`.
pub fn fake_encode_job(username: &str, input_path: &str) -> EncodeJob {
    EncodeJob {
        id: nanoid::nanoid!(),
        input_path: input_path.into(),
        base_name: format!("{username}-fixture"),
        username: username.to_string(),
        params: fake_encode_params(),
        enqueued_at: now_rfc3339(),
    }
}

pub fn fake_encode_params() -> EncodeParams {
    EncodeParams {
        height: 1080,
        fps: FpsValue::Auto(AutoMarker),
        crf: 23,
        preset: "medium".into(),
        threads: 4,
        loglevel: "warning".into(),
        audio_bitrate_kbps: 160,
    }
}

/// A proptest strategy over filename-safe usernames, for slot/queue
/// invariant properties.
pub fn username_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z0-9_-]{0,15}"
}
