// SPDX-FileCopyrightText: 2026 Ringback Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the scheduler and its collaborators.

pub mod delivery;

pub use delivery::DeliveryChannel;
