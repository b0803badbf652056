// SPDX-FileCopyrightText: 2026 Ringback Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the HTTP delivery channel against a mock gateway.

use chrono::{TimeZone, Utc};
use ringback_config::model::DeliveryConfig;
use ringback_core::types::{DispatchOutcome, MissedCallRecord, RecordStatus};
use ringback_core::DeliveryChannel;
use ringback_delivery::HttpDeliveryChannel;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(base_url: &str) -> DeliveryConfig {
    DeliveryConfig {
        base_url: base_url.to_string(),
        api_token: Some("test-token".to_string()),
        device_seed: Some("test-device".to_string()),
        timeout_secs: 5,
    }
}

fn test_record(phone_number: &str) -> MissedCallRecord {
    let call_time = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
    MissedCallRecord {
        id: 1,
        phone_number: phone_number.to_string(),
        call_time,
        scheduled_time: call_time + chrono::Duration::minutes(5),
        status: RecordStatus::Pending,
        attempt_count: 0,
        message_text: "We missed your call".to_string(),
        provider_message_id: None,
        sent_at: None,
        error_message: None,
        created_at: call_time,
    }
}

#[tokio::test]
async fn successful_send_returns_provider_message_id() {
    let server = MockServer::start().await;
    let channel = HttpDeliveryChannel::new(&test_config(&server.uri()), 5).unwrap();

    Mock::given(method("POST"))
        .and(path("/api/v1/missed_calls"))
        .and(header("authorization", "Bearer test-token"))
        .and(body_partial_json(json!({
            "device_id": channel.device_id(),
            "phone_number": "5551234567",
            "message_text": "We missed your call",
            "delay_minutes": 5,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "message_id": "msg-42" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = channel.send(&test_record("5551234567")).await.unwrap();
    assert_eq!(
        outcome,
        DispatchOutcome::Success {
            provider_message_id: Some("msg-42".to_string())
        }
    );
}

#[tokio::test]
async fn phone_number_is_normalized_before_sending() {
    let server = MockServer::start().await;
    let channel = HttpDeliveryChannel::new(&test_config(&server.uri()), 5).unwrap();

    Mock::given(method("POST"))
        .and(path("/api/v1/missed_calls"))
        .and(body_partial_json(json!({ "phone_number": "15551234567" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = channel.send(&test_record("+1 (555) 123-4567")).await.unwrap();
    assert!(matches!(outcome, DispatchOutcome::Success { .. }));
}

#[tokio::test]
async fn server_error_is_transient() {
    let server = MockServer::start().await;
    let channel = HttpDeliveryChannel::new(&test_config(&server.uri()), 5).unwrap();

    Mock::given(method("POST"))
        .and(path("/api/v1/missed_calls"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = channel.send(&test_record("5551234567")).await.unwrap();
    assert!(matches!(outcome, DispatchOutcome::Transient { .. }));
}

#[tokio::test]
async fn application_level_failure_is_transient() {
    let server = MockServer::start().await;
    let channel = HttpDeliveryChannel::new(&test_config(&server.uri()), 5).unwrap();

    Mock::given(method("POST"))
        .and(path("/api/v1/missed_calls"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": "rate limit exceeded"
        })))
        .mount(&server)
        .await;

    let outcome = channel.send(&test_record("5551234567")).await.unwrap();
    match outcome {
        DispatchOutcome::Transient { reason } => assert_eq!(reason, "rate limit exceeded"),
        other => panic!("expected transient outcome, got {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_gateway_is_transient() {
    // Port 9 (discard) is a safe dead endpoint.
    let config = test_config("http://127.0.0.1:9");
    let channel = HttpDeliveryChannel::new(&config, 5).unwrap();

    let outcome = channel.send(&test_record("5551234567")).await.unwrap();
    assert!(matches!(outcome, DispatchOutcome::Transient { .. }));
}

#[tokio::test]
async fn invalid_phone_is_permanent_without_any_request() {
    let server = MockServer::start().await;
    let channel = HttpDeliveryChannel::new(&test_config(&server.uri()), 5).unwrap();

    // No mock mounted: a request would 404 and show up as Transient.
    let outcome = channel.send(&test_record("n/a")).await.unwrap();
    assert!(matches!(outcome, DispatchOutcome::Permanent { .. }));
}

#[tokio::test]
async fn empty_message_is_permanent() {
    let server = MockServer::start().await;
    let channel = HttpDeliveryChannel::new(&test_config(&server.uri()), 5).unwrap();

    let mut record = test_record("5551234567");
    record.message_text = "   ".to_string();
    let outcome = channel.send(&record).await.unwrap();
    assert!(matches!(outcome, DispatchOutcome::Permanent { .. }));
}

#[tokio::test]
async fn missing_base_url_fails_construction() {
    let mut config = test_config("");
    config.base_url = String::new();
    assert!(HttpDeliveryChannel::new(&config, 5).is_err());
}

#[tokio::test]
async fn missing_device_seed_fails_construction() {
    let mut config = test_config("http://localhost");
    config.device_seed = None;
    assert!(HttpDeliveryChannel::new(&config, 5).is_err());
}
