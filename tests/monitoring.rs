//! Monitoring load end to end against the fake backend.

mod helpers;

use helpers::{ADMIN_ID, FakeBackend, Scenario};
use schoolboard::monitor::{MonitorOptions, MonitoringData, get_monitoring_data};
use schoolboard::students::StudentCache;
use serde_json::json;
use std::sync::Arc;

async fn load(scenario: Scenario, options: MonitorOptions) -> (FakeBackend, MonitoringData) {
    let backend = FakeBackend::start(scenario).await;
    let api = Arc::new(backend.client());
    let students = StudentCache::new(api.clone());
    let data = get_monitoring_data(api.as_ref(), &students, options).await;
    (backend, data)
}

#[tokio::test]
async fn failed_admin_lookup_returns_error_payload() {
    let (backend, data) = load(
        Scenario {
            users_fail: true,
            ..Default::default()
        },
        MonitorOptions::default(),
    )
    .await;

    assert_eq!(
        serde_json::to_value(&data).unwrap(),
        json!({
            "financeAdmin": null,
            "auditLogs": [],
            "sessions": [],
            "activities": [],
            "error": "No finance admin found"
        })
    );
    assert_eq!(backend.counters.hits("/audit/logs"), 0);
}

#[tokio::test]
async fn no_admin_with_mock_fallback_serves_demo_data() {
    let (_backend, data) = load(
        Scenario {
            no_admin: true,
            ..Default::default()
        },
        MonitorOptions {
            mock_fallback: true,
            ..Default::default()
        },
    )
    .await;

    assert_eq!(data.error, None);
    assert_eq!(data, MonitoringData::mock());
}

#[tokio::test]
async fn full_load_builds_activity_feed() {
    let (backend, data) = load(Scenario::default(), MonitorOptions {
        audit_log_limit: 25,
        mock_fallback: false,
    })
    .await;

    assert_eq!(data.error, None);
    assert_eq!(data.finance_admin.as_ref().map(|a| a.id.as_str()), Some(ADMIN_ID));
    assert_eq!(data.audit_logs.len(), 5);
    assert_eq!(data.sessions.len(), 1);

    let query = backend.counters.last_query.get("/audit/logs").unwrap().clone();
    assert_eq!(query.get("userId").map(String::as_str), Some(ADMIN_ID));
    assert_eq!(query.get("limit").map(String::as_str), Some("25"));
    let role = backend.counters.last_query.get("/users").unwrap().clone();
    assert_eq!(role.get("role").map(String::as_str), Some("finance_admin"));

    // Three distinct students across five logs, each fetched once.
    assert_eq!(backend.counters.student_hits(), 3);

    let actions: Vec<&str> = data.activities.iter().map(|a| a.action.as_str()).collect();
    assert_eq!(
        actions,
        vec![
            "Payment Recorded",
            "Fee Assigned",
            "Fee Waived",
            "Report Exported",
            "Login"
        ]
    );

    let payment = &data.activities[0];
    assert_eq!(
        payment.description,
        "Student: Chidi Anagonye (chidi) • 🔄 Payment Status: paid"
    );

    let fee = &data.activities[1];
    assert_eq!(
        fee.description,
        "Student: Chidi Anagonye (chidi) • Fee ID: FEE-1 • Amount: $12000.00"
    );

    let waived = &data.activities[2];
    assert_eq!(
        waived.student.as_ref().map(|s| s.name.as_str()),
        Some("Student bbbb0002")
    );

    let report = &data.activities[3];
    assert!(!report.success);
    assert_eq!(report.description, "Student: Tahani (tahani)");

    let login = &data.activities[4];
    assert_eq!(login.description, "Signed in from the bursary office");
    assert_eq!(login.student, None);
}

#[tokio::test]
async fn audit_log_failure_is_reported() {
    let (backend, data) = load(
        Scenario {
            audit_logs_fail: true,
            ..Default::default()
        },
        MonitorOptions::default(),
    )
    .await;

    assert_eq!(data.error.as_deref(), Some("Failed to load audit logs"));
    assert!(data.finance_admin.is_some());
    assert!(data.activities.is_empty());
    assert_eq!(backend.counters.student_hits(), 0);
}

#[tokio::test]
async fn unreadable_sessions_degrade_to_empty() {
    let (_backend, data) = load(
        Scenario {
            sessions_fail: true,
            ..Default::default()
        },
        MonitorOptions::default(),
    )
    .await;

    assert_eq!(data.error, None);
    assert!(data.sessions.is_empty());
    assert_eq!(data.activities.len(), 5);
}
