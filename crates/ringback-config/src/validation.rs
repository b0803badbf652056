// SPDX-FileCopyrightText: 2026 Ringback Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as hour ranges, positive intervals, and the fields a
//! live responder requires.

use crate::diagnostic::ConfigError;
use crate::model::RingbackConfig;

const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &RingbackConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !VALID_LOG_LEVELS.contains(&config.service.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "service.log_level must be one of {}, got `{}`",
                VALID_LOG_LEVELS.join(", "),
                config.service.log_level
            ),
        });
    }

    if config.responder.max_attempts < 1 {
        errors.push(ConfigError::Validation {
            message: format!(
                "responder.max_attempts must be at least 1, got {}",
                config.responder.max_attempts
            ),
        });
    }

    if config.responder.message_template.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "responder.message_template must not be empty".to_string(),
        });
    }

    // Hour window checks apply even when the window is disabled: a bad value
    // should fail at startup, not when someone flips business_hours.enabled.
    if config.business_hours.start_hour > 23 {
        errors.push(ConfigError::Validation {
            message: format!(
                "business_hours.start_hour must be 0..=23, got {}",
                config.business_hours.start_hour
            ),
        });
    }

    if config.business_hours.end_hour > 24 {
        errors.push(ConfigError::Validation {
            message: format!(
                "business_hours.end_hour must be 0..=24, got {}",
                config.business_hours.end_hour
            ),
        });
    }

    if config.business_hours.start_hour >= config.business_hours.end_hour {
        errors.push(ConfigError::Validation {
            message: format!(
                "business_hours.start_hour ({}) must be earlier than end_hour ({})",
                config.business_hours.start_hour, config.business_hours.end_hour
            ),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.delivery.timeout_secs < 1 {
        errors.push(ConfigError::Validation {
            message: format!(
                "delivery.timeout_secs must be at least 1, got {}",
                config.delivery.timeout_secs
            ),
        });
    }

    if config.scheduler.poll_interval_secs < 1 {
        errors.push(ConfigError::Validation {
            message: format!(
                "scheduler.poll_interval_secs must be at least 1, got {}",
                config.scheduler.poll_interval_secs
            ),
        });
    }

    if config.scheduler.batch_limit < 1 {
        errors.push(ConfigError::Validation {
            message: format!(
                "scheduler.batch_limit must be at least 1, got {}",
                config.scheduler.batch_limit
            ),
        });
    }

    // A live responder needs somewhere to send and an identity to send as.
    if config.responder.enabled {
        if config.delivery.base_url.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: "delivery.base_url is required when responder.enabled = true"
                    .to_string(),
            });
        }
        if config
            .delivery
            .device_seed
            .as_deref()
            .is_none_or(|s| s.trim().is_empty())
        {
            errors.push(ConfigError::Validation {
                message: "delivery.device_seed is required when responder.enabled = true"
                    .to_string(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
