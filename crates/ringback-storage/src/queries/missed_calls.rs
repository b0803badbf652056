// SPDX-FileCopyrightText: 2026 Ringback Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! CRUD operations for missed call records.
//!
//! Every status transition out of `PENDING` carries a `WHERE status = 'PENDING'`
//! guard, so a record that has already reached a terminal state is never
//! overwritten. Callers learn whether their transition won via the returned bool.

use chrono::{DateTime, Utc};
use ringback_core::types::{format_timestamp, parse_timestamp};
use ringback_core::RingbackError;
use rusqlite::{params, OptionalExtension};

use crate::database::{map_tr_err, Database};
use crate::models::{MissedCallRecord, NewMissedCall, RecordStatus};

const RECORD_COLUMNS: &str = "id, phone_number, call_time, scheduled_time, status, \
     attempt_count, message_text, provider_message_id, sent_at, error_message, created_at";

fn get_timestamp(row: &rusqlite::Row<'_>, idx: usize) -> Result<DateTime<Utc>, rusqlite::Error> {
    let text: String = row.get(idx)?;
    parse_timestamp(&text).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn get_opt_timestamp(
    row: &rusqlite::Row<'_>,
    idx: usize,
) -> Result<Option<DateTime<Utc>>, rusqlite::Error> {
    let text: Option<String> = row.get(idx)?;
    text.map(|t| {
        parse_timestamp(&t).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                idx,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })
    })
    .transpose()
}

fn get_status(row: &rusqlite::Row<'_>, idx: usize) -> Result<RecordStatus, rusqlite::Error> {
    let text: String = row.get(idx)?;
    text.parse().map_err(|e: strum::ParseError| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn row_to_record(row: &rusqlite::Row<'_>) -> Result<MissedCallRecord, rusqlite::Error> {
    Ok(MissedCallRecord {
        id: row.get(0)?,
        phone_number: row.get(1)?,
        call_time: get_timestamp(row, 2)?,
        scheduled_time: get_timestamp(row, 3)?,
        status: get_status(row, 4)?,
        attempt_count: row.get(5)?,
        message_text: row.get(6)?,
        provider_message_id: row.get(7)?,
        sent_at: get_opt_timestamp(row, 8)?,
        error_message: row.get(9)?,
        created_at: get_timestamp(row, 10)?,
    })
}

/// Insert a new missed call record in `PENDING` status.
///
/// Returns the new record's ID, or `None` if a record with the same
/// `(phone_number, call_time)` already exists (INSERT OR IGNORE).
pub async fn insert(db: &Database, call: &NewMissedCall) -> Result<Option<i64>, RingbackError> {
    let phone = call.phone_number.clone();
    let call_time = format_timestamp(call.call_time);
    let scheduled = format_timestamp(call.scheduled_time);
    let message = call.message_text.clone();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "INSERT OR IGNORE INTO missed_calls
                     (phone_number, call_time, scheduled_time, message_text)
                 VALUES (?1, ?2, ?3, ?4)",
                params![phone, call_time, scheduled, message],
            )?;
            if changed == 0 {
                Ok(None)
            } else {
                Ok(Some(conn.last_insert_rowid()))
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Fetch a record by ID.
pub async fn get(db: &Database, id: i64) -> Result<Option<MissedCallRecord>, RingbackError> {
    db.connection()
        .call(move |conn| {
            let record = conn
                .query_row(
                    &format!("SELECT {RECORD_COLUMNS} FROM missed_calls WHERE id = ?1"),
                    params![id],
                    row_to_record,
                )
                .optional()?;
            Ok(record)
        })
        .await
        .map_err(map_tr_err)
}

/// Fetch a record by its dedup key.
pub async fn find_by_phone_and_time(
    db: &Database,
    phone_number: &str,
    call_time: DateTime<Utc>,
) -> Result<Option<MissedCallRecord>, RingbackError> {
    let phone = phone_number.to_string();
    let call_time = format_timestamp(call_time);
    db.connection()
        .call(move |conn| {
            let record = conn
                .query_row(
                    &format!(
                        "SELECT {RECORD_COLUMNS} FROM missed_calls
                         WHERE phone_number = ?1 AND call_time = ?2"
                    ),
                    params![phone, call_time],
                    row_to_record,
                )
                .optional()?;
            Ok(record)
        })
        .await
        .map_err(map_tr_err)
}

/// List `PENDING` records whose scheduled time has passed, oldest first.
///
/// This is the restart-recovery sweep: after a crash, every record that was
/// due while the process was down comes back from here.
pub async fn list_due(
    db: &Database,
    now: DateTime<Utc>,
    limit: u32,
) -> Result<Vec<MissedCallRecord>, RingbackError> {
    let now = format_timestamp(now);
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {RECORD_COLUMNS} FROM missed_calls
                 WHERE status = 'PENDING' AND scheduled_time <= ?1
                 ORDER BY scheduled_time ASC
                 LIMIT ?2"
            ))?;
            let rows = stmt.query_map(params![now, limit], row_to_record)?;
            let mut records = Vec::new();
            for row in rows {
                records.push(row?);
            }
            Ok(records)
        })
        .await
        .map_err(map_tr_err)
}

/// Transition a record to `SENT`. Returns `false` if the record was not
/// found or had already left `PENDING`.
pub async fn mark_sent(
    db: &Database,
    id: i64,
    sent_at: DateTime<Utc>,
    provider_message_id: Option<String>,
) -> Result<bool, RingbackError> {
    let sent_at = format_timestamp(sent_at);
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE missed_calls
                 SET status = 'SENT', sent_at = ?1, provider_message_id = ?2,
                     error_message = NULL
                 WHERE id = ?3 AND status = 'PENDING'",
                params![sent_at, provider_message_id, id],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Transition a record to `SKIPPED`, recording why the policy gate refused it.
pub async fn mark_skipped(db: &Database, id: i64, reason: &str) -> Result<bool, RingbackError> {
    let reason = reason.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE missed_calls
                 SET status = 'SKIPPED', error_message = ?1
                 WHERE id = ?2 AND status = 'PENDING'",
                params![reason, id],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Transition a record to `FAILED` with its final attempt count and error.
pub async fn mark_failed(
    db: &Database,
    id: i64,
    attempt_count: u32,
    reason: &str,
) -> Result<bool, RingbackError> {
    let reason = reason.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE missed_calls
                 SET status = 'FAILED', attempt_count = ?1, error_message = ?2
                 WHERE id = ?3 AND status = 'PENDING'",
                params![attempt_count, reason, id],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Record a failed attempt and push the record's scheduled time out for retry.
///
/// The record stays `PENDING` so the next due sweep picks it up again.
pub async fn record_attempt(
    db: &Database,
    id: i64,
    attempt_count: u32,
    next_scheduled: DateTime<Utc>,
    reason: &str,
) -> Result<bool, RingbackError> {
    let next_scheduled = format_timestamp(next_scheduled);
    let reason = reason.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE missed_calls
                 SET attempt_count = ?1, scheduled_time = ?2, error_message = ?3
                 WHERE id = ?4 AND status = 'PENDING'",
                params![attempt_count, next_scheduled, reason, id],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Count records grouped by status.
pub async fn count_by_status(db: &Database) -> Result<Vec<(RecordStatus, u64)>, RingbackError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT status, COUNT(*) FROM missed_calls GROUP BY status ORDER BY status",
            )?;
            let rows = stmt.query_map([], |row| {
                let status = get_status(row, 0)?;
                let count: u64 = row.get(1)?;
                Ok((status, count))
            })?;
            let mut counts = Vec::new();
            for row in rows {
                counts.push(row?);
            }
            Ok(counts)
        })
        .await
        .map_err(map_tr_err)
}

/// The most recent records by call time, newest first.
pub async fn recent(db: &Database, limit: u32) -> Result<Vec<MissedCallRecord>, RingbackError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {RECORD_COLUMNS} FROM missed_calls
                 ORDER BY call_time DESC
                 LIMIT ?1"
            ))?;
            let rows = stmt.query_map(params![limit], row_to_record)?;
            let mut records = Vec::new();
            for row in rows {
                records.push(row?);
            }
            Ok(records)
        })
        .await
        .map_err(map_tr_err)
}

/// Count records for a phone number with `call_time` at or after `since`.
///
/// Used by the per-phone cooldown check at intake.
pub async fn count_for_phone_since(
    db: &Database,
    phone_number: &str,
    since: DateTime<Utc>,
) -> Result<u64, RingbackError> {
    let phone = phone_number.to_string();
    let since = format_timestamp(since);
    db.connection()
        .call(move |conn| {
            let count = conn.query_row(
                "SELECT COUNT(*) FROM missed_calls
                 WHERE phone_number = ?1 AND call_time >= ?2",
                params![phone, since],
                |row| row.get(0),
            )?;
            Ok(count)
        })
        .await
        .map_err(map_tr_err)
}

/// Delete terminal records created before `cutoff`. Pending records are
/// never purged. Returns the number of rows deleted.
pub async fn purge_older_than(db: &Database, cutoff: DateTime<Utc>) -> Result<u64, RingbackError> {
    let cutoff = format_timestamp(cutoff);
    db.connection()
        .call(move |conn| {
            let deleted = conn.execute(
                "DELETE FROM missed_calls
                 WHERE created_at < ?1 AND status != 'PENDING'",
                params![cutoff],
            )?;
            Ok(deleted as u64)
        })
        .await
        .map_err(map_tr_err)
}
