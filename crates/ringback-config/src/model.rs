// SPDX-FileCopyrightText: 2026 Ringback Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the ringback auto-responder.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level ringback configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RingbackConfig {
    /// Process-level settings (logging).
    #[serde(default)]
    pub service: ServiceConfig,

    /// Auto-responder behavior: enablement, message template, delay, retry cap.
    #[serde(default)]
    pub responder: ResponderConfig,

    /// Optional time-of-day sending window.
    #[serde(default)]
    pub business_hours: BusinessHoursConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Outbound delivery gateway settings.
    #[serde(default)]
    pub delivery: DeliveryConfig,

    /// Deferred-dispatch scheduler settings.
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

/// Process-level service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Auto-responder behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ResponderConfig {
    /// Master switch. When false, pending fires resolve as SKIPPED at
    /// fire time rather than being cancelled up front.
    #[serde(default)]
    pub enabled: bool,

    /// Notification body captured into each record at creation time.
    #[serde(default = "default_message_template")]
    pub message_template: String,

    /// Minutes between the missed call and the scheduled send.
    #[serde(default = "default_delay_minutes")]
    pub delay_minutes: u32,

    /// Total send attempts before a record is forced to FAILED.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Suppress a second record for the same phone number within this many
    /// minutes of an earlier one. 0 disables the cooldown.
    #[serde(default)]
    pub per_phone_cooldown_minutes: u32,
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            message_template: default_message_template(),
            delay_minutes: default_delay_minutes(),
            max_attempts: default_max_attempts(),
            per_phone_cooldown_minutes: 0,
        }
    }
}

fn default_message_template() -> String {
    "Hello! We missed your call. We're sorry we couldn't pick up. \
     Reply CALLBACK or visit our website and we'll get back to you shortly. \
     Reply STOP to opt out."
        .to_string()
}

fn default_delay_minutes() -> u32 {
    5
}

fn default_max_attempts() -> u32 {
    3
}

/// Time-of-day sending window configuration.
///
/// When enabled, fires outside `[start_hour, end_hour)` local time resolve
/// as SKIPPED.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BusinessHoursConfig {
    #[serde(default)]
    pub enabled: bool,

    /// First local hour (inclusive) in which sends are allowed.
    #[serde(default = "default_start_hour")]
    pub start_hour: u32,

    /// First local hour (exclusive) in which sends are no longer allowed.
    #[serde(default = "default_end_hour")]
    pub end_hour: u32,
}

impl Default for BusinessHoursConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            start_hour: default_start_hour(),
            end_hour: default_end_hour(),
        }
    }
}

fn default_start_hour() -> u32 {
    9
}

fn default_end_hour() -> u32 {
    18
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("ringback").join("ringback.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("ringback.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Outbound delivery gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DeliveryConfig {
    /// Base URL of the notification gateway. Required when the responder
    /// is enabled.
    #[serde(default)]
    pub base_url: String,

    /// Bearer token for the gateway. `None` sends unauthenticated requests.
    #[serde(default)]
    pub api_token: Option<String>,

    /// Seed for the privacy-hashed device tag carried in outbound payloads.
    /// Required when the responder is enabled; only its SHA-256 leaves the
    /// process.
    #[serde(default)]
    pub device_seed: Option<String>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_token: None,
            device_seed: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

/// Deferred-dispatch scheduler configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SchedulerConfig {
    /// Seconds between due-record sweeps.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Maximum records processed per sweep.
    #[serde(default = "default_batch_limit")]
    pub batch_limit: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            batch_limit: default_batch_limit(),
        }
    }
}

fn default_poll_interval_secs() -> u64 {
    30
}

fn default_batch_limit() -> u32 {
    50
}
