// SPDX-FileCopyrightText: 2026 Ringback Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the ringback auto-responder.

use thiserror::Error;

/// The primary error type used across all ringback crates.
///
/// Storage errors are infrastructure failures: callers must treat them as
/// retryable and must never fold them into a record's terminal status.
#[derive(Debug, Error)]
pub enum RingbackError {
    /// Configuration errors (invalid TOML, missing required fields, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, migration).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Delivery channel errors (connection failure, malformed response).
    #[error("delivery error: {message}")]
    Delivery {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A record is malformed and can never be dispatched (terminal).
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
