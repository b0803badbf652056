// SPDX-FileCopyrightText: 2026 Ringback Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resolution of a single due record.
//!
//! One fire makes at most one send attempt and leaves the record either
//! terminal (SENT, SKIPPED, FAILED) or rescheduled for retry. Every status
//! transition goes through the optimistic `PENDING` guard in storage, so a
//! concurrent fire of the same record resolves it exactly once.

use chrono::{DateTime, Duration, Local, Utc};
use ringback_core::types::DispatchOutcome;
use ringback_core::{DeliveryChannel, RingbackError};
use ringback_storage::queries::missed_calls;
use ringback_storage::Database;
use tracing::{debug, info, warn};

use crate::policy::{Decision, PolicySnapshot};

/// How a fire resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireResult {
    /// The gateway accepted the message; record is SENT.
    Sent,
    /// The policy gate refused; record is SKIPPED.
    Skipped,
    /// Permanent failure or retry budget exhausted; record is FAILED.
    Failed,
    /// Transient failure with budget left; record stays PENDING, rescheduled.
    Retrying { attempt: u32 },
    /// Another fire resolved the record first, or it was already terminal.
    AlreadyResolved,
    /// No record with this ID exists.
    NotFound,
}

/// Fire one record: re-fetch, gate, attempt, classify.
///
/// `now` is the fire instant, used for the policy clock, the sent
/// timestamp, and the retry schedule. `retry_delay_minutes` is the fixed
/// backoff between attempts.
pub async fn fire_record(
    db: &Database,
    channel: &dyn DeliveryChannel,
    policy: &PolicySnapshot,
    id: i64,
    now: DateTime<Utc>,
    max_attempts: u32,
    retry_delay_minutes: u32,
) -> Result<FireResult, RingbackError> {
    // Always re-fetch: the scheduled snapshot that queued this fire may be
    // stale by the time it runs.
    let Some(record) = missed_calls::get(db, id).await? else {
        debug!(record_id = id, "fire for missing record");
        return Ok(FireResult::NotFound);
    };
    if record.status.is_terminal() {
        debug!(record_id = id, status = %record.status, "record already resolved");
        return Ok(FireResult::AlreadyResolved);
    }

    // Policy is evaluated now, not when the record was created.
    if let Decision::Skip(reason) = policy.evaluate(now.with_timezone(&Local)) {
        info!(record_id = id, reason = %reason, "send refused by policy");
        return if missed_calls::mark_skipped(db, id, &reason.to_string()).await? {
            Ok(FireResult::Skipped)
        } else {
            Ok(FireResult::AlreadyResolved)
        };
    }

    let outcome = match channel.send(&record).await {
        Ok(outcome) => outcome,
        // An unclassified channel fault counts as a transient attempt.
        Err(e) => DispatchOutcome::Transient {
            reason: e.to_string(),
        },
    };

    match outcome {
        DispatchOutcome::Success {
            provider_message_id,
        } => {
            info!(record_id = id, channel = channel.name(), "notification sent");
            if missed_calls::mark_sent(db, id, now, provider_message_id).await? {
                Ok(FireResult::Sent)
            } else {
                Ok(FireResult::AlreadyResolved)
            }
        }
        DispatchOutcome::Permanent { reason } => {
            warn!(record_id = id, reason = %reason, "permanent delivery failure");
            if missed_calls::mark_failed(db, id, record.attempt_count + 1, &reason).await? {
                Ok(FireResult::Failed)
            } else {
                Ok(FireResult::AlreadyResolved)
            }
        }
        DispatchOutcome::Transient { reason } => {
            let attempt = record.attempt_count + 1;
            if attempt >= max_attempts {
                warn!(
                    record_id = id,
                    attempt, max_attempts,
                    reason = %reason,
                    "retry budget exhausted"
                );
                let final_reason = format!("max attempts reached: {reason}");
                if missed_calls::mark_failed(db, id, attempt, &final_reason).await? {
                    Ok(FireResult::Failed)
                } else {
                    Ok(FireResult::AlreadyResolved)
                }
            } else {
                let next = now + Duration::minutes(i64::from(retry_delay_minutes));
                info!(
                    record_id = id,
                    attempt,
                    next_attempt = %next,
                    reason = %reason,
                    "transient delivery failure, will retry"
                );
                if missed_calls::record_attempt(db, id, attempt, next, &reason).await? {
                    Ok(FireResult::Retrying { attempt })
                } else {
                    Ok(FireResult::AlreadyResolved)
                }
            }
        }
    }
}
