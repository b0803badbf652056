// SPDX-FileCopyrightText: 2026 Ringback Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./ringback.toml` > `~/.config/ringback/ringback.toml`
//! > `/etc/ringback/ringback.toml` with environment variable overrides via the
//! `RINGBACK_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::RingbackConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/ringback/ringback.toml` (system-wide)
/// 3. `~/.config/ringback/ringback.toml` (user XDG config)
/// 4. `./ringback.toml` (local directory)
/// 5. `RINGBACK_*` environment variables
pub fn load_config() -> Result<RingbackConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RingbackConfig::default()))
        .merge(Toml::file("/etc/ringback/ringback.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("ringback/ringback.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("ringback.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env vars).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<RingbackConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RingbackConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<RingbackConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RingbackConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names. For example,
/// `RINGBACK_RESPONDER_DELAY_MINUTES` must map to `responder.delay_minutes`,
/// not `responder.delay.minutes`.
fn env_provider() -> Env {
    Env::prefixed("RINGBACK_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: RINGBACK_RESPONDER_DELAY_MINUTES -> "responder_delay_minutes"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("service_", "service.", 1)
            .replacen("responder_", "responder.", 1)
            .replacen("business_hours_", "business_hours.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("delivery_", "delivery.", 1)
            .replacen("scheduler_", "scheduler.", 1);
        mapped.into()
    })
}
