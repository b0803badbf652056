// SPDX-FileCopyrightText: 2026 Ringback Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `status` subcommand: record counts and recent missed calls.

use ringback_config::model::RingbackConfig;
use ringback_core::types::format_timestamp;
use ringback_core::RingbackError;
use ringback_storage::queries::missed_calls;
use ringback_storage::Database;

pub async fn run(config: &RingbackConfig, json: bool, recent: u32) -> Result<(), RingbackError> {
    let db =
        Database::open_with_wal(&config.storage.database_path, config.storage.wal_mode).await?;

    let counts = missed_calls::count_by_status(&db).await?;
    let records = missed_calls::recent(&db, recent).await?;

    if json {
        let counts: serde_json::Map<String, serde_json::Value> = counts
            .iter()
            .map(|(status, n)| (status.to_string(), serde_json::json!(n)))
            .collect();
        let out = serde_json::json!({
            "counts": counts,
            "recent": records,
        });
        let rendered = serde_json::to_string_pretty(&out)
            .map_err(|e| RingbackError::Internal(format!("failed to render status JSON: {e}")))?;
        println!("{rendered}");
    } else {
        if counts.is_empty() {
            println!("no missed calls recorded");
        } else {
            println!("records by status:");
            for (status, n) in &counts {
                println!("  {status:<8} {n}");
            }
        }
        if !records.is_empty() {
            println!("\nmost recent:");
            for r in &records {
                println!(
                    "  #{:<5} {:<16} {:<8} call={} attempts={}{}",
                    r.id,
                    r.phone_number,
                    r.status,
                    format_timestamp(r.call_time),
                    r.attempt_count,
                    r.error_message
                        .as_deref()
                        .map(|e| format!(" ({e})"))
                        .unwrap_or_default(),
                );
            }
        }
    }

    db.close().await?;
    Ok(())
}
