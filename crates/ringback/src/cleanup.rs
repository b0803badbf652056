// SPDX-FileCopyrightText: 2026 Ringback Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `cleanup` subcommand: retention housekeeping.

use chrono::{Duration, Utc};
use ringback_config::model::RingbackConfig;
use ringback_core::RingbackError;
use ringback_storage::queries::missed_calls;
use ringback_storage::Database;

/// Delete resolved records older than `days`. Pending records are kept
/// regardless of age so a long outage never loses queued work.
pub async fn run(config: &RingbackConfig, days: u32) -> Result<(), RingbackError> {
    let db =
        Database::open_with_wal(&config.storage.database_path, config.storage.wal_mode).await?;

    let cutoff = Utc::now() - Duration::days(i64::from(days));
    let deleted = missed_calls::purge_older_than(&db, cutoff).await?;
    println!("deleted {deleted} resolved records older than {days} days");

    db.close().await?;
    Ok(())
}
