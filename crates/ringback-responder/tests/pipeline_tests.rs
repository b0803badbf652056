// SPDX-FileCopyrightText: 2026 Ringback Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end pipeline tests: intake -> sweep -> fire against real SQLite
//! storage and a scripted delivery channel.

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use ringback_config::model::ResponderConfig;
use ringback_core::types::{CallEvent, DispatchOutcome, RecordStatus};
use ringback_core::DeliveryChannel;
use ringback_responder::{
    fire_record, record_missed_call, FireResult, PolicyHandle, PolicySnapshot, Scheduler,
};
use ringback_storage::queries::missed_calls;
use ringback_storage::Database;
use ringback_test_utils::MockDelivery;

async fn setup_db() -> (Arc<Database>, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("test.db");
    let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
    (Arc::new(db), dir)
}

fn past_event(phone_number: &str) -> CallEvent {
    CallEvent {
        phone_number: phone_number.to_string(),
        ring_start: Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap(),
    }
}

fn responder_config() -> ResponderConfig {
    ResponderConfig {
        enabled: true,
        delay_minutes: 5,
        max_attempts: 3,
        ..ResponderConfig::default()
    }
}

fn allow_all_policy() -> PolicySnapshot {
    PolicySnapshot {
        enabled: true,
        business_hours: None,
    }
}

fn scheduler(db: Arc<Database>, mock: Arc<MockDelivery>, policy: Arc<PolicyHandle>) -> Scheduler {
    let channel: Arc<dyn DeliveryChannel> = mock;
    Scheduler::new(db, channel, policy, 3, 5, Duration::from_secs(30), 50)
}

#[tokio::test]
async fn missed_call_flows_to_sent() {
    let (db, _dir) = setup_db().await;
    let mock = Arc::new(MockDelivery::new());
    let policy = Arc::new(PolicyHandle::new(allow_all_policy()));

    let id = record_missed_call(&db, &responder_config(), &past_event("5551234567"))
        .await
        .unwrap()
        .unwrap();

    // The call is well in the past, so it is due immediately.
    let sched = scheduler(db.clone(), mock.clone(), policy);
    let stats = sched.sweep_once().await.unwrap();
    assert_eq!(stats.processed, 1);
    assert_eq!(stats.sent, 1);

    let record = missed_calls::get(&db, id).await.unwrap().unwrap();
    assert_eq!(record.status, RecordStatus::Sent);
    assert!(record.sent_at.is_some());
    assert_eq!(mock.send_count(), 1);
    assert_eq!(mock.sent()[0].phone_number, "5551234567");
}

#[tokio::test]
async fn sent_record_is_not_fired_again() {
    let (db, _dir) = setup_db().await;
    let mock = Arc::new(MockDelivery::new());
    let policy = Arc::new(PolicyHandle::new(allow_all_policy()));

    record_missed_call(&db, &responder_config(), &past_event("5551234567"))
        .await
        .unwrap()
        .unwrap();

    let sched = scheduler(db.clone(), mock.clone(), policy);
    sched.sweep_once().await.unwrap();
    let stats = sched.sweep_once().await.unwrap();

    assert_eq!(stats.processed, 0);
    assert_eq!(mock.send_count(), 1);
}

#[tokio::test]
async fn disabled_responder_skips_at_fire_time() {
    let (db, _dir) = setup_db().await;
    let mock = Arc::new(MockDelivery::new());

    // Recorded while enabled...
    let id = record_missed_call(&db, &responder_config(), &past_event("5551234567"))
        .await
        .unwrap()
        .unwrap();

    // ...but the responder is off by the time the fire runs.
    let policy = PolicySnapshot {
        enabled: false,
        business_hours: None,
    };
    let result = fire_record(&db, mock.as_ref(), &policy, id, Utc::now(), 3, 5)
        .await
        .unwrap();
    assert_eq!(result, FireResult::Skipped);

    let record = missed_calls::get(&db, id).await.unwrap().unwrap();
    assert_eq!(record.status, RecordStatus::Skipped);
    assert_eq!(record.error_message.as_deref(), Some("disabled"));
    // The channel was never consulted.
    assert_eq!(mock.send_count(), 0);
}

#[tokio::test]
async fn policy_swap_applies_to_next_sweep() {
    let (db, _dir) = setup_db().await;
    let mock = Arc::new(MockDelivery::new());
    let policy = Arc::new(PolicyHandle::new(allow_all_policy()));

    record_missed_call(&db, &responder_config(), &past_event("5551234567"))
        .await
        .unwrap()
        .unwrap();

    policy.store(PolicySnapshot {
        enabled: false,
        business_hours: None,
    });

    let sched = scheduler(db.clone(), mock.clone(), policy);
    let stats = sched.sweep_once().await.unwrap();
    assert_eq!(stats.skipped, 1);
    assert_eq!(mock.send_count(), 0);
}

#[tokio::test]
async fn transient_failure_reschedules_with_attempt_count() {
    let (db, _dir) = setup_db().await;
    let mock = Arc::new(MockDelivery::new());
    mock.push_outcome(DispatchOutcome::Transient {
        reason: "gateway returned 503".to_string(),
    });

    let id = record_missed_call(&db, &responder_config(), &past_event("5551234567"))
        .await
        .unwrap()
        .unwrap();

    let now = Utc::now();
    let result = fire_record(&db, mock.as_ref(), &allow_all_policy(), id, now, 3, 5)
        .await
        .unwrap();
    assert_eq!(result, FireResult::Retrying { attempt: 1 });

    let record = missed_calls::get(&db, id).await.unwrap().unwrap();
    assert_eq!(record.status, RecordStatus::Pending);
    assert_eq!(record.attempt_count, 1);
    assert!(record.scheduled_time > now);
    assert_eq!(record.error_message.as_deref(), Some("gateway returned 503"));
}

#[tokio::test]
async fn success_after_transient_failure_keeps_attempt_count() {
    let (db, _dir) = setup_db().await;
    let mock = Arc::new(MockDelivery::new());
    mock.push_outcome(DispatchOutcome::Transient {
        reason: "gateway returned 502".to_string(),
    });
    // Script runs dry after the first attempt, so the retry succeeds.

    let id = record_missed_call(&db, &responder_config(), &past_event("5551234567"))
        .await
        .unwrap()
        .unwrap();

    let policy = allow_all_policy();
    let r1 = fire_record(&db, mock.as_ref(), &policy, id, Utc::now(), 3, 5)
        .await
        .unwrap();
    assert_eq!(r1, FireResult::Retrying { attempt: 1 });

    let r2 = fire_record(&db, mock.as_ref(), &policy, id, Utc::now(), 3, 5)
        .await
        .unwrap();
    assert_eq!(r2, FireResult::Sent);

    // A successful send leaves the failure tally alone.
    let record = missed_calls::get(&db, id).await.unwrap().unwrap();
    assert_eq!(record.status, RecordStatus::Sent);
    assert_eq!(record.attempt_count, 1);
    assert!(record.sent_at.is_some());
    assert_eq!(mock.send_count(), 2);
}

#[tokio::test]
async fn fire_of_resolved_record_is_already_resolved() {
    let (db, _dir) = setup_db().await;
    let mock = Arc::new(MockDelivery::new());

    let id = record_missed_call(&db, &responder_config(), &past_event("5551234567"))
        .await
        .unwrap()
        .unwrap();

    let policy = allow_all_policy();
    let first = fire_record(&db, mock.as_ref(), &policy, id, Utc::now(), 3, 5)
        .await
        .unwrap();
    assert_eq!(first, FireResult::Sent);

    // Firing a record that already reached a terminal status is a no-op,
    // decided before the channel is consulted.
    let again = fire_record(&db, mock.as_ref(), &policy, id, Utc::now(), 3, 5)
        .await
        .unwrap();
    assert_eq!(again, FireResult::AlreadyResolved);
    assert_eq!(mock.send_count(), 1);

    let record = missed_calls::get(&db, id).await.unwrap().unwrap();
    assert_eq!(record.status, RecordStatus::Sent);
}

#[tokio::test]
async fn retry_budget_exhaustion_fails_record() {
    let (db, _dir) = setup_db().await;
    let mock = Arc::new(MockDelivery::new());
    for _ in 0..3 {
        mock.push_outcome(DispatchOutcome::Transient {
            reason: "timeout".to_string(),
        });
    }

    let id = record_missed_call(&db, &responder_config(), &past_event("5551234567"))
        .await
        .unwrap()
        .unwrap();

    let policy = allow_all_policy();
    let r1 = fire_record(&db, mock.as_ref(), &policy, id, Utc::now(), 3, 5)
        .await
        .unwrap();
    let r2 = fire_record(&db, mock.as_ref(), &policy, id, Utc::now(), 3, 5)
        .await
        .unwrap();
    let r3 = fire_record(&db, mock.as_ref(), &policy, id, Utc::now(), 3, 5)
        .await
        .unwrap();

    assert_eq!(r1, FireResult::Retrying { attempt: 1 });
    assert_eq!(r2, FireResult::Retrying { attempt: 2 });
    assert_eq!(r3, FireResult::Failed);

    let record = missed_calls::get(&db, id).await.unwrap().unwrap();
    assert_eq!(record.status, RecordStatus::Failed);
    assert_eq!(record.attempt_count, 3);
    assert!(record
        .error_message
        .as_deref()
        .unwrap()
        .contains("max attempts reached"));
    assert_eq!(mock.send_count(), 3);
}

#[tokio::test]
async fn permanent_failure_fails_immediately() {
    let (db, _dir) = setup_db().await;
    let mock = Arc::new(MockDelivery::new());
    mock.push_outcome(DispatchOutcome::Permanent {
        reason: "invalid phone number".to_string(),
    });

    let id = record_missed_call(&db, &responder_config(), &past_event("5551234567"))
        .await
        .unwrap()
        .unwrap();

    let result = fire_record(&db, mock.as_ref(), &allow_all_policy(), id, Utc::now(), 3, 5)
        .await
        .unwrap();
    assert_eq!(result, FireResult::Failed);

    let record = missed_calls::get(&db, id).await.unwrap().unwrap();
    assert_eq!(record.status, RecordStatus::Failed);
    assert_eq!(record.attempt_count, 1);
    assert_eq!(mock.send_count(), 1);
}

#[tokio::test]
async fn channel_error_counts_as_transient_attempt() {
    let (db, _dir) = setup_db().await;
    let mock = Arc::new(MockDelivery::new());
    mock.push_error("channel wiring broke");

    let id = record_missed_call(&db, &responder_config(), &past_event("5551234567"))
        .await
        .unwrap()
        .unwrap();

    let result = fire_record(&db, mock.as_ref(), &allow_all_policy(), id, Utc::now(), 3, 5)
        .await
        .unwrap();
    assert_eq!(result, FireResult::Retrying { attempt: 1 });

    let record = missed_calls::get(&db, id).await.unwrap().unwrap();
    assert_eq!(record.status, RecordStatus::Pending);
    assert_eq!(record.attempt_count, 1);
}

#[tokio::test]
async fn fire_of_missing_record_is_not_found() {
    let (db, _dir) = setup_db().await;
    let mock = MockDelivery::new();

    let result = fire_record(&db, &mock, &allow_all_policy(), 999, Utc::now(), 3, 5)
        .await
        .unwrap();
    assert_eq!(result, FireResult::NotFound);
}

#[tokio::test]
async fn duplicate_event_is_not_recorded_twice() {
    let (db, _dir) = setup_db().await;

    let config = responder_config();
    let event = past_event("5551234567");
    assert!(record_missed_call(&db, &config, &event)
        .await
        .unwrap()
        .is_some());
    assert!(record_missed_call(&db, &config, &event)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn cooldown_suppresses_rapid_repeat_caller() {
    let (db, _dir) = setup_db().await;

    let config = ResponderConfig {
        per_phone_cooldown_minutes: 60,
        ..responder_config()
    };

    let first = past_event("5551234567");
    let second = CallEvent {
        phone_number: "5551234567".to_string(),
        ring_start: first.ring_start + chrono::Duration::minutes(10),
    };

    assert!(record_missed_call(&db, &config, &first)
        .await
        .unwrap()
        .is_some());
    assert!(record_missed_call(&db, &config, &second)
        .await
        .unwrap()
        .is_none());

    // A different caller is unaffected.
    assert!(record_missed_call(&db, &config, &past_event("9998887777"))
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn sweep_recovers_backlog_after_restart() {
    let (db, _dir) = setup_db().await;
    let mock = Arc::new(MockDelivery::new());
    let policy = Arc::new(PolicyHandle::new(allow_all_policy()));

    // Three calls missed "before the restart", all overdue.
    let config = responder_config();
    for i in 0..3 {
        let event = CallEvent {
            phone_number: format!("555000000{i}"),
            ring_start: Utc.with_ymd_and_hms(2026, 3, 1, 9, i, 0).unwrap(),
        };
        record_missed_call(&db, &config, &event).await.unwrap();
    }

    // First sweep of a fresh process drains the whole backlog, oldest first.
    let sched = scheduler(db.clone(), mock.clone(), policy);
    let stats = sched.sweep_once().await.unwrap();
    assert_eq!(stats.processed, 3);
    assert_eq!(stats.sent, 3);

    let sent = mock.sent();
    assert_eq!(sent[0].phone_number, "5550000000");
    assert_eq!(sent[1].phone_number, "5550000001");
    assert_eq!(sent[2].phone_number, "5550000002");
}

#[tokio::test]
async fn future_records_are_left_alone() {
    let (db, _dir) = setup_db().await;
    let mock = Arc::new(MockDelivery::new());
    let policy = Arc::new(PolicyHandle::new(allow_all_policy()));

    let config = responder_config();
    let event = CallEvent {
        phone_number: "5551234567".to_string(),
        ring_start: Utc::now(),
    };
    record_missed_call(&db, &config, &event).await.unwrap();

    // Scheduled five minutes from now: nothing to do yet.
    let sched = scheduler(db.clone(), mock.clone(), policy);
    let stats = sched.sweep_once().await.unwrap();
    assert_eq!(stats.processed, 0);
    assert_eq!(mock.send_count(), 0);
}
