// SPDX-FileCopyrightText: 2026 Ringback Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Intake: turn a missed call event into a pending record.
//!
//! Intake never consults the policy gate. A missed call is recorded even
//! while the responder is disabled or outside business hours; the gate
//! decides at fire time, when the config in force actually matters.

use chrono::Duration;
use ringback_config::model::ResponderConfig;
use ringback_core::types::{CallEvent, NewMissedCall};
use ringback_core::RingbackError;
use ringback_storage::queries::missed_calls;
use ringback_storage::Database;
use tracing::{debug, info};

/// Record a missed call for deferred response.
///
/// Returns the new record's ID, or `None` when nothing was created: either
/// the `(phone_number, call_time)` pair already exists, or the per-phone
/// cooldown suppressed it.
pub async fn record_missed_call(
    db: &Database,
    config: &ResponderConfig,
    event: &CallEvent,
) -> Result<Option<i64>, RingbackError> {
    if config.per_phone_cooldown_minutes > 0 {
        let since =
            event.ring_start - Duration::minutes(i64::from(config.per_phone_cooldown_minutes));
        let recent = missed_calls::count_for_phone_since(db, &event.phone_number, since).await?;
        if recent > 0 {
            debug!(
                phone_number = %event.phone_number,
                cooldown_minutes = config.per_phone_cooldown_minutes,
                "missed call suppressed by cooldown"
            );
            return Ok(None);
        }
    }

    let call = NewMissedCall::new(
        &event.phone_number,
        event.ring_start,
        config.delay_minutes,
        &config.message_template,
    );

    match missed_calls::insert(db, &call).await? {
        Some(id) => {
            info!(
                record_id = id,
                phone_number = %event.phone_number,
                scheduled_time = %call.scheduled_time,
                "missed call recorded"
            );
            Ok(Some(id))
        }
        None => {
            debug!(
                phone_number = %event.phone_number,
                call_time = %event.ring_start,
                "duplicate missed call ignored"
            );
            Ok(None)
        }
    }
}
