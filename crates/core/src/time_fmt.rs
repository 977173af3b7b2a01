// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! RFC3339 timestamp helpers shared by every owner/job/heartbeat record.

use chrono::{DateTime, Utc};

/// Current wall-clock time as RFC3339 (used for fields that are stamped at
/// the moment of a filesystem write, not derived from an injected [`crate::Clock`]).
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

/// Parse an RFC3339 timestamp, used when checking owner-record age during a sweep.
pub fn parse_rfc3339(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc))
}
