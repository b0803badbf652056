// SPDX-FileCopyrightText: 2026 Ringback Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the ringback missed-call auto-responder.
//!
//! This crate provides the error taxonomy, the domain types shared across
//! the workspace (missed-call records, dispatch outcomes), and the
//! [`DeliveryChannel`] trait that outbound delivery adapters implement.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::RingbackError;
pub use traits::DeliveryChannel;
pub use types::{CallEvent, DispatchOutcome, MissedCallRecord, NewMissedCall, RecordStatus};
