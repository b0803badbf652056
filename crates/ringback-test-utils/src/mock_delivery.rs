// SPDX-FileCopyrightText: 2026 Ringback Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scriptable in-memory delivery channel for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use ringback_core::types::{DispatchOutcome, MissedCallRecord};
use ringback_core::{DeliveryChannel, RingbackError};

/// A [`DeliveryChannel`] whose outcomes are scripted up front.
///
/// Each `send` pops the next scripted outcome; when the script runs dry it
/// answers with success. Every record passed to `send` is captured for
/// later assertions.
#[derive(Default)]
pub struct MockDelivery {
    script: Mutex<VecDeque<ScriptedResponse>>,
    sent: Mutex<Vec<MissedCallRecord>>,
}

enum ScriptedResponse {
    Outcome(DispatchOutcome),
    Error(String),
}

impl MockDelivery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an outcome for a future `send` call.
    pub fn push_outcome(&self, outcome: DispatchOutcome) {
        self.lock_script().push_back(ScriptedResponse::Outcome(outcome));
    }

    /// Queue a hard `Err` for a future `send` call, simulating a fault the
    /// channel could not classify.
    pub fn push_error(&self, message: &str) {
        self.lock_script()
            .push_back(ScriptedResponse::Error(message.to_string()));
    }

    /// Records passed to `send` so far, in order.
    pub fn sent(&self) -> Vec<MissedCallRecord> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Number of `send` calls so far.
    pub fn send_count(&self) -> usize {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn lock_script(&self) -> std::sync::MutexGuard<'_, VecDeque<ScriptedResponse>> {
        self.script.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl DeliveryChannel for MockDelivery {
    fn name(&self) -> &str {
        "mock"
    }

    async fn send(&self, record: &MissedCallRecord) -> Result<DispatchOutcome, RingbackError> {
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(record.clone());

        match self.lock_script().pop_front() {
            Some(ScriptedResponse::Outcome(outcome)) => Ok(outcome),
            Some(ScriptedResponse::Error(message)) => Err(RingbackError::Delivery {
                message,
                source: None,
            }),
            None => Ok(DispatchOutcome::Success {
                provider_message_id: None,
            }),
        }
    }
}
