// SPDX-FileCopyrightText: 2026 Ringback Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fire-time policy gate.
//!
//! A [`PolicySnapshot`] is an immutable view of the sending rules. The live
//! snapshot hangs off a [`PolicyHandle`] (arc-swap), so config reloads swap
//! it atomically without blocking in-flight fires.

use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::{DateTime, Local, Timelike};
use ringback_config::model::{BusinessHoursConfig, ResponderConfig};

/// Local-time sending window, `[start_hour, end_hour)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusinessHours {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl BusinessHours {
    fn contains(&self, hour: u32) -> bool {
        (self.start_hour..self.end_hour).contains(&hour)
    }
}

/// Why the policy gate refused a send. The text form is persisted in the
/// record's error_message column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The responder master switch is off.
    Disabled,
    /// The fire landed outside the business hours window.
    OutsideHours,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Disabled => write!(f, "disabled"),
            SkipReason::OutsideHours => write!(f, "outside-hours"),
        }
    }
}

/// The policy gate's verdict for one fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Send,
    Skip(SkipReason),
}

/// Immutable snapshot of the sending rules at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicySnapshot {
    pub enabled: bool,
    pub business_hours: Option<BusinessHours>,
}

impl PolicySnapshot {
    pub fn from_config(responder: &ResponderConfig, hours: &BusinessHoursConfig) -> Self {
        Self {
            enabled: responder.enabled,
            business_hours: hours.enabled.then_some(BusinessHours {
                start_hour: hours.start_hour,
                end_hour: hours.end_hour,
            }),
        }
    }

    /// Evaluate the gate against a wall-clock instant.
    ///
    /// The enabled switch is checked first: a disabled responder skips even
    /// inside business hours, and the persisted reason says so.
    pub fn evaluate(&self, now: DateTime<Local>) -> Decision {
        if !self.enabled {
            return Decision::Skip(SkipReason::Disabled);
        }
        if let Some(hours) = &self.business_hours {
            if !hours.contains(now.hour()) {
                return Decision::Skip(SkipReason::OutsideHours);
            }
        }
        Decision::Send
    }
}

/// Hot-swappable handle to the live policy snapshot.
pub struct PolicyHandle {
    inner: ArcSwap<PolicySnapshot>,
}

impl PolicyHandle {
    pub fn new(snapshot: PolicySnapshot) -> Self {
        Self {
            inner: ArcSwap::from_pointee(snapshot),
        }
    }

    /// The current snapshot. Cheap; safe to call per fire.
    pub fn load(&self) -> Arc<PolicySnapshot> {
        self.inner.load_full()
    }

    /// Atomically replace the live snapshot.
    pub fn store(&self, snapshot: PolicySnapshot) {
        self.inner.store(Arc::new(snapshot));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn local_at_hour(hour: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 2, hour, 30, 0).unwrap()
    }

    fn enabled_with_hours(start: u32, end: u32) -> PolicySnapshot {
        PolicySnapshot {
            enabled: true,
            business_hours: Some(BusinessHours {
                start_hour: start,
                end_hour: end,
            }),
        }
    }

    #[test]
    fn disabled_always_skips() {
        let policy = PolicySnapshot {
            enabled: false,
            business_hours: None,
        };
        assert_eq!(
            policy.evaluate(local_at_hour(10)),
            Decision::Skip(SkipReason::Disabled)
        );
    }

    #[test]
    fn disabled_wins_over_business_hours() {
        let policy = PolicySnapshot {
            enabled: false,
            business_hours: Some(BusinessHours {
                start_hour: 9,
                end_hour: 18,
            }),
        };
        // Inside the window, but the switch is off: the reason is "disabled".
        assert_eq!(
            policy.evaluate(local_at_hour(10)),
            Decision::Skip(SkipReason::Disabled)
        );
    }

    #[test]
    fn enabled_without_window_always_sends() {
        let policy = PolicySnapshot {
            enabled: true,
            business_hours: None,
        };
        assert_eq!(policy.evaluate(local_at_hour(3)), Decision::Send);
    }

    #[test]
    fn window_boundaries_are_start_inclusive_end_exclusive() {
        let policy = enabled_with_hours(9, 18);
        assert_eq!(
            policy.evaluate(local_at_hour(8)),
            Decision::Skip(SkipReason::OutsideHours)
        );
        assert_eq!(policy.evaluate(local_at_hour(9)), Decision::Send);
        assert_eq!(policy.evaluate(local_at_hour(17)), Decision::Send);
        assert_eq!(
            policy.evaluate(local_at_hour(18)),
            Decision::Skip(SkipReason::OutsideHours)
        );
    }

    #[test]
    fn skip_reasons_render_for_persistence() {
        assert_eq!(SkipReason::Disabled.to_string(), "disabled");
        assert_eq!(SkipReason::OutsideHours.to_string(), "outside-hours");
    }

    #[test]
    fn handle_swaps_snapshot_atomically() {
        let handle = PolicyHandle::new(PolicySnapshot {
            enabled: false,
            business_hours: None,
        });
        assert!(!handle.load().enabled);

        handle.store(PolicySnapshot {
            enabled: true,
            business_hours: None,
        });
        assert!(handle.load().enabled);
    }

    #[test]
    fn from_config_omits_disabled_window() {
        let responder = ResponderConfig {
            enabled: true,
            ..ResponderConfig::default()
        };
        let hours = BusinessHoursConfig {
            enabled: false,
            start_hour: 9,
            end_hour: 18,
        };
        let snapshot = PolicySnapshot::from_config(&responder, &hours);
        assert!(snapshot.enabled);
        assert!(snapshot.business_hours.is_none());
    }
}
