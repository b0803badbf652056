// SPDX-FileCopyrightText: 2026 Ringback Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared test doubles for the ringback workspace.

pub mod mock_delivery;

pub use mock_delivery::MockDelivery;
