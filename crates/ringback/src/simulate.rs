// SPDX-FileCopyrightText: 2026 Ringback Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `simulate` subcommand: synthetic missed call for smoke testing.

use ringback_config::model::RingbackConfig;
use ringback_core::RingbackError;
use ringback_responder::record_missed_call;
use ringback_storage::Database;
use ringback_tracker::CallTracker;

/// Drive a ring-then-end sequence through the real intake path, exactly as
/// a live signal source would.
pub async fn run(config: &RingbackConfig, phone: &str) -> Result<(), RingbackError> {
    let tracker = CallTracker::new();
    tracker.on_incoming_call(phone);
    let Some(event) = tracker.on_call_ended() else {
        return Err(RingbackError::InvalidRecord(format!(
            "caller id {phone:?} was not accepted by the tracker"
        )));
    };

    let db =
        Database::open_with_wal(&config.storage.database_path, config.storage.wal_mode).await?;

    match record_missed_call(&db, &config.responder, &event).await? {
        Some(id) => println!(
            "recorded missed call #{id} from {} (fires in {} min)",
            event.phone_number, config.responder.delay_minutes
        ),
        None => println!(
            "missed call from {} suppressed (duplicate or cooldown)",
            event.phone_number
        ),
    }

    db.close().await?;
    Ok(())
}
