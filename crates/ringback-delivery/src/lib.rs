// SPDX-FileCopyrightText: 2026 Ringback Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP delivery channel for missed call notifications.
//!
//! Implements [`DeliveryChannel`] against the ringback gateway API: one POST
//! per attempt, with the response classified into success, transient failure,
//! or permanent failure. Retry policy lives in the scheduler, not here.

pub mod identity;
pub mod phone;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use ringback_config::model::DeliveryConfig;
use ringback_core::types::{format_timestamp, DispatchOutcome, MissedCallRecord};
use ringback_core::{DeliveryChannel, RingbackError};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Request body for the gateway's missed-call endpoint.
#[derive(Debug, Serialize)]
struct DeliveryRequest<'a> {
    device_id: &'a str,
    phone_number: &'a str,
    call_time: String,
    message_text: &'a str,
    delay_minutes: u32,
}

/// The gateway's uniform response envelope.
#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    success: bool,
    #[serde(default)]
    data: Option<ApiData>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiData {
    #[serde(default)]
    message_id: Option<String>,
}

/// Delivery channel that POSTs each missed call to the gateway backend.
#[derive(Debug, Clone)]
pub struct HttpDeliveryChannel {
    client: reqwest::Client,
    endpoint: String,
    device_id: String,
    delay_minutes: u32,
}

impl HttpDeliveryChannel {
    /// Build a channel from the delivery config section.
    ///
    /// `delay_minutes` is reported to the backend for bookkeeping; it does
    /// not affect when the request fires.
    pub fn new(config: &DeliveryConfig, delay_minutes: u32) -> Result<Self, RingbackError> {
        if config.base_url.trim().is_empty() {
            return Err(RingbackError::Config(
                "delivery.base_url is required for the HTTP channel".into(),
            ));
        }
        let seed = config.device_seed.as_deref().ok_or_else(|| {
            RingbackError::Config("delivery.device_seed is required for the HTTP channel".into())
        })?;

        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("application/json"));
        if let Some(token) = &config.api_token {
            let value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|e| {
                RingbackError::Config(format!("invalid delivery.api_token header value: {e}"))
            })?;
            headers.insert("authorization", value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RingbackError::Delivery {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            endpoint: format!(
                "{}/api/v1/missed_calls",
                config.base_url.trim_end_matches('/')
            ),
            device_id: identity::device_tag(seed),
            delay_minutes,
        })
    }

    /// The device tag this channel identifies itself with.
    pub fn device_id(&self) -> &str {
        &self.device_id
    }
}

#[async_trait]
impl DeliveryChannel for HttpDeliveryChannel {
    fn name(&self) -> &str {
        "http"
    }

    async fn send(&self, record: &MissedCallRecord) -> Result<DispatchOutcome, RingbackError> {
        // Unsendable records are permanent failures, decided before any I/O.
        let Some(phone_number) = phone::normalize(&record.phone_number) else {
            return Ok(DispatchOutcome::Permanent {
                reason: format!("invalid phone number: {:?}", record.phone_number),
            });
        };
        if record.message_text.trim().is_empty() {
            return Ok(DispatchOutcome::Permanent {
                reason: "empty message text".to_string(),
            });
        }

        let body = DeliveryRequest {
            device_id: &self.device_id,
            phone_number: &phone_number,
            call_time: format_timestamp(record.call_time),
            message_text: &record.message_text,
            delay_minutes: self.delay_minutes,
        };

        debug!(record_id = record.id, phone = %phone_number, "dispatching");

        let response = match self.client.post(&self.endpoint).json(&body).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(record_id = record.id, error = %e, "request failed");
                return Ok(DispatchOutcome::Transient {
                    reason: format!("request failed: {e}"),
                });
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(record_id = record.id, status = %status, "gateway rejected request");
            return Ok(DispatchOutcome::Transient {
                reason: format!("gateway returned {status}: {body}"),
            });
        }

        let envelope: ApiEnvelope = match response.json().await {
            Ok(e) => e,
            Err(e) => {
                return Ok(DispatchOutcome::Transient {
                    reason: format!("unreadable gateway response: {e}"),
                });
            }
        };

        if envelope.success {
            Ok(DispatchOutcome::Success {
                provider_message_id: envelope.data.and_then(|d| d.message_id),
            })
        } else {
            Ok(DispatchOutcome::Transient {
                reason: envelope
                    .error
                    .unwrap_or_else(|| "gateway reported failure without detail".to_string()),
            })
        }
    }
}
