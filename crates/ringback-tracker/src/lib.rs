// SPDX-FileCopyrightText: 2026 Ringback Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Call-state tracking for missed call detection.
//!
//! A [`CallTracker`] consumes the three raw telephony signals (incoming ring,
//! answer, call ended) and decides whether a call was missed. A call is missed
//! when it rang, was never answered, and then ended. Everything here is
//! in-memory and transient; persistence starts only once a missed call is
//! confirmed.

use std::sync::Mutex;

use chrono::Utc;
use ringback_core::types::CallEvent;
use tracing::{debug, warn};

/// Internal tracker state. One call at a time: a second ring before the
/// first call ends replaces it (last-write-wins).
#[derive(Debug)]
enum TrackerState {
    /// No call in flight.
    Idle,
    /// A call is ringing or active.
    Ringing {
        phone_number: String,
        ring_start: chrono::DateTime<Utc>,
        answered: bool,
    },
}

/// Tracks the lifecycle of the current call and reports missed calls.
///
/// Thread-safe: signal callbacks may arrive from any thread. The mutex is
/// held only for the duration of a single state transition.
pub struct CallTracker {
    inner: Mutex<TrackerState>,
}

impl CallTracker {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(TrackerState::Idle),
        }
    }

    /// An incoming call started ringing.
    ///
    /// An empty or whitespace-only number is ignored: withheld caller IDs
    /// cannot be responded to. If a call was already in flight its state is
    /// discarded and the new call takes over.
    pub fn on_incoming_call(&self, phone_number: &str) {
        let phone_number = phone_number.trim();
        if phone_number.is_empty() {
            debug!("ignoring ring with empty caller id");
            return;
        }

        let mut state = self.lock();
        if let TrackerState::Ringing {
            phone_number: prev, ..
        } = &*state
        {
            warn!(
                previous = %prev,
                incoming = %phone_number,
                "new ring while a call was in flight, replacing"
            );
        }
        *state = TrackerState::Ringing {
            phone_number: phone_number.to_string(),
            ring_start: Utc::now(),
            answered: false,
        };
    }

    /// The current call was picked up. A later end signal will not count
    /// this call as missed.
    pub fn on_call_answered(&self) {
        let mut state = self.lock();
        match &mut *state {
            TrackerState::Ringing { answered, .. } => *answered = true,
            TrackerState::Idle => debug!("answer signal with no call in flight"),
        }
    }

    /// The current call ended. Returns the missed call event if the call
    /// rang and was never answered, `None` otherwise. Always resets to idle.
    pub fn on_call_ended(&self) -> Option<CallEvent> {
        let mut state = self.lock();
        match std::mem::replace(&mut *state, TrackerState::Idle) {
            TrackerState::Ringing {
                phone_number,
                ring_start,
                answered: false,
            } => {
                debug!(phone_number = %phone_number, "missed call detected");
                Some(CallEvent {
                    phone_number,
                    ring_start,
                })
            }
            TrackerState::Ringing { answered: true, .. } => None,
            TrackerState::Idle => {
                debug!("end signal with no call in flight");
                None
            }
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, TrackerState> {
        // A poisoned tracker mutex means a panic mid-transition; the state
        // is a plain enum so it is still coherent.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for CallTracker {
    fn default() -> Self {
        Self::new()
    }
}
