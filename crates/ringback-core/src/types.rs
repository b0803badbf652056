// SPDX-FileCopyrightText: 2026 Ringback Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the ringback workspace.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// A call currently being tracked. Transient: exists only between the
/// ring signal and the end-of-call signal, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallEvent {
    /// The caller's phone number as reported by the signal source.
    pub phone_number: String,
    /// When the ring signal arrived.
    pub ring_start: DateTime<Utc>,
}

/// Lifecycle status of a [`MissedCallRecord`].
///
/// `Pending` is the only mutable state. `Sent`, `Skipped`, and `Failed`
/// are terminal: once a record reaches one of them it is never touched again.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordStatus {
    Pending,
    Sent,
    Skipped,
    Failed,
}

impl RecordStatus {
    /// Whether this status permits no further mutation.
    pub fn is_terminal(self) -> bool {
        !matches!(self, RecordStatus::Pending)
    }
}

/// A missed call awaiting insertion. The dedup key is `(phone_number, call_time)`.
#[derive(Debug, Clone)]
pub struct NewMissedCall {
    pub phone_number: String,
    pub call_time: DateTime<Utc>,
    /// When the record becomes eligible to fire: `call_time + delay`.
    pub scheduled_time: DateTime<Utc>,
    /// The notification body, captured now. Later template edits do not
    /// affect records already created.
    pub message_text: String,
}

impl NewMissedCall {
    /// Build a new record for a call missed at `call_time`, scheduled
    /// `delay_minutes` later.
    pub fn new(
        phone_number: &str,
        call_time: DateTime<Utc>,
        delay_minutes: u32,
        message_text: &str,
    ) -> Self {
        Self {
            phone_number: phone_number.to_string(),
            call_time,
            scheduled_time: call_time + Duration::minutes(i64::from(delay_minutes)),
            message_text: message_text.to_string(),
        }
    }
}

/// The persistent unit of work: one missed call, its schedule, and its
/// delivery lifecycle.
#[derive(Debug, Clone, Serialize)]
pub struct MissedCallRecord {
    pub id: i64,
    pub phone_number: String,
    pub call_time: DateTime<Utc>,
    pub scheduled_time: DateTime<Utc>,
    pub status: RecordStatus,
    pub attempt_count: u32,
    pub message_text: String,
    pub provider_message_id: Option<String>,
    pub sent_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Result of a single outbound send attempt.
///
/// The channel makes exactly one attempt per call and never retries on its
/// own; retry policy belongs to the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// The provider accepted the message.
    Success { provider_message_id: Option<String> },
    /// Network error, timeout, non-2xx response, or application-level
    /// failure. Eligible for retry.
    Transient { reason: String },
    /// The record can never be sent (missing phone number or body).
    Permanent { reason: String },
}

/// Render a timestamp in the canonical persisted form: RFC 3339 with
/// millisecond precision in UTC. Fixed-width, so lexicographic order in
/// SQL matches chronological order.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a timestamp persisted by [`format_timestamp`].
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s).map(|d| d.with_timezone(&Utc))
}
