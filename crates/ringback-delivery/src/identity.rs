// SPDX-FileCopyrightText: 2026 Ringback Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stable device identity for the delivery backend.

use sha2::{Digest, Sha256};

/// Derive the device tag sent with every delivery request.
///
/// SHA-256 of the configured seed, hex-encoded and truncated to 16
/// characters. Stable across restarts for the same seed, and never
/// exposes the seed itself to the backend.
pub fn device_tag(seed: &str) -> String {
    let digest = Sha256::digest(seed.as_bytes());
    hex::encode(digest)[..16].to_string()
}
