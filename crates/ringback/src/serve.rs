// SPDX-FileCopyrightText: 2026 Ringback Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `serve` subcommand: run the responder daemon.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ringback_config::model::RingbackConfig;
use ringback_core::types::{DispatchOutcome, MissedCallRecord};
use ringback_core::{DeliveryChannel, RingbackError};
use ringback_delivery::HttpDeliveryChannel;
use ringback_responder::{PolicyHandle, PolicySnapshot, Scheduler};
use ringback_storage::Database;
use tracing::info;

/// Stand-in channel used while no gateway is configured.
///
/// Config validation guarantees a gateway when the responder is enabled, so
/// this channel only exists for a disabled responder, where every fire is
/// skipped by the policy gate before it reaches the channel. If a fire does
/// reach it, the record stays pending and retries once a gateway exists.
struct UnconfiguredChannel;

#[async_trait]
impl DeliveryChannel for UnconfiguredChannel {
    fn name(&self) -> &str {
        "unconfigured"
    }

    async fn send(&self, _record: &MissedCallRecord) -> Result<DispatchOutcome, RingbackError> {
        Ok(DispatchOutcome::Transient {
            reason: "delivery gateway not configured".to_string(),
        })
    }
}

pub async fn run(config: RingbackConfig) -> Result<(), RingbackError> {
    let db = Arc::new(
        Database::open_with_wal(&config.storage.database_path, config.storage.wal_mode).await?,
    );

    let policy = Arc::new(PolicyHandle::new(PolicySnapshot::from_config(
        &config.responder,
        &config.business_hours,
    )));

    let channel: Arc<dyn DeliveryChannel> = if config.delivery.base_url.trim().is_empty() {
        Arc::new(UnconfiguredChannel)
    } else {
        Arc::new(HttpDeliveryChannel::new(
            &config.delivery,
            config.responder.delay_minutes,
        )?)
    };

    let scheduler = Scheduler::new(
        db,
        channel,
        policy,
        config.responder.max_attempts,
        config.responder.delay_minutes,
        Duration::from_secs(config.scheduler.poll_interval_secs),
        config.scheduler.batch_limit,
    );

    info!(
        responder_enabled = config.responder.enabled,
        "ringback daemon starting"
    );

    // The first scheduler tick fires immediately, which doubles as the
    // restart recovery sweep over everything that came due while down.
    tokio::select! {
        _ = scheduler.run() => {}
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
        }
    }

    Ok(())
}
