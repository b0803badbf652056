// SPDX-FileCopyrightText: 2026 Ringback Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Policy gating and deferred dispatch for missed call responses.
//!
//! Ties the pieces together: [`intake`] turns a missed call event into a
//! pending record, [`sweep`] finds due records, and [`fire`] resolves each
//! one through the policy gate and the delivery channel. Policy is evaluated
//! at fire time, never at intake, so a config change between the call and
//! the scheduled send always wins.

pub mod fire;
pub mod intake;
pub mod policy;
pub mod sweep;

pub use fire::{fire_record, FireResult};
pub use intake::record_missed_call;
pub use policy::{Decision, PolicyHandle, PolicySnapshot, SkipReason};
pub use sweep::{Scheduler, SweepStats};
