// SPDX-FileCopyrightText: 2026 Ringback Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Periodic due-record sweep.
//!
//! The scheduler polls storage for `PENDING` records whose scheduled time
//! has passed and fires each one. Because due-ness lives entirely in the
//! database, the first sweep after a restart automatically recovers every
//! record that came due while the process was down. No in-memory timer
//! state survives, and none is needed.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use ringback_core::{DeliveryChannel, RingbackError};
use ringback_storage::queries::missed_calls;
use ringback_storage::Database;
use tracing::{debug, error, info};

use crate::fire::{fire_record, FireResult};
use crate::policy::PolicyHandle;

/// Counters from one sweep.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepStats {
    pub processed: usize,
    pub sent: usize,
    pub skipped: usize,
    pub failed: usize,
    pub retrying: usize,
}

/// Periodic dispatcher for due records.
pub struct Scheduler {
    db: Arc<Database>,
    channel: Arc<dyn DeliveryChannel>,
    policy: Arc<PolicyHandle>,
    max_attempts: u32,
    retry_delay_minutes: u32,
    poll_interval: Duration,
    batch_limit: u32,
}

impl Scheduler {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        db: Arc<Database>,
        channel: Arc<dyn DeliveryChannel>,
        policy: Arc<PolicyHandle>,
        max_attempts: u32,
        retry_delay_minutes: u32,
        poll_interval: Duration,
        batch_limit: u32,
    ) -> Self {
        Self {
            db,
            channel,
            policy,
            max_attempts,
            retry_delay_minutes,
            poll_interval,
            batch_limit,
        }
    }

    /// One pass over the due records.
    ///
    /// A failed fire is logged and does not stop the rest of the batch.
    pub async fn sweep_once(&self) -> Result<SweepStats, RingbackError> {
        let now = Utc::now();
        let due = missed_calls::list_due(&self.db, now, self.batch_limit).await?;
        if due.is_empty() {
            return Ok(SweepStats::default());
        }
        debug!(count = due.len(), "processing due records");

        let mut stats = SweepStats::default();
        for record in due {
            // Fresh policy per record: a config swap mid-sweep applies to
            // the records fired after it.
            let policy = self.policy.load();
            match fire_record(
                &self.db,
                self.channel.as_ref(),
                &policy,
                record.id,
                Utc::now(),
                self.max_attempts,
                self.retry_delay_minutes,
            )
            .await
            {
                Ok(result) => {
                    stats.processed += 1;
                    match result {
                        FireResult::Sent => stats.sent += 1,
                        FireResult::Skipped => stats.skipped += 1,
                        FireResult::Failed => stats.failed += 1,
                        FireResult::Retrying { .. } => stats.retrying += 1,
                        FireResult::AlreadyResolved | FireResult::NotFound => {}
                    }
                }
                Err(e) => {
                    error!(record_id = record.id, error = %e, "fire failed, leaving record pending");
                }
            }
        }

        if stats.processed > 0 {
            info!(
                processed = stats.processed,
                sent = stats.sent,
                skipped = stats.skipped,
                failed = stats.failed,
                retrying = stats.retrying,
                "sweep complete"
            );
        }
        Ok(stats)
    }

    /// Run sweeps forever at the configured poll interval.
    ///
    /// Sweep errors (e.g. a storage hiccup) are logged and the loop keeps
    /// going; the records stay pending and the next sweep retries them.
    pub async fn run(&self) {
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        info!(
            poll_interval_secs = self.poll_interval.as_secs(),
            batch_limit = self.batch_limit,
            "scheduler started"
        );
        loop {
            ticker.tick().await;
            if let Err(e) = self.sweep_once().await {
                error!(error = %e, "sweep failed");
            }
        }
    }
}
