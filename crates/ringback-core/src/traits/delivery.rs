// SPDX-FileCopyrightText: 2026 Ringback Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delivery channel trait for outbound notification backends.

use async_trait::async_trait;

use crate::error::RingbackError;
use crate::types::{DispatchOutcome, MissedCallRecord};

/// Adapter for an outbound notification backend (HTTP gateway, SMS
/// provider, etc.).
///
/// Implementations make exactly one delivery attempt per `send` call and
/// classify the result; they never retry internally. Classification rules:
/// transport errors, timeouts, and application-level rejections are
/// [`DispatchOutcome::Transient`]; a record missing its phone number or
/// body is [`DispatchOutcome::Permanent`]. Returning `Err` is reserved for
/// faults the channel cannot classify -- the scheduler treats those as
/// transient so the record stays retryable.
#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Make one delivery attempt for the record.
    async fn send(&self, record: &MissedCallRecord) -> Result<DispatchOutcome, RingbackError>;
}
