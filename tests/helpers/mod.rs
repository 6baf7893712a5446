//! In-process fake of the school backend for integration tests.
//!
//! Serves the same envelope shapes the real backend uses and counts every
//! request per path so tests can assert on network behavior.
#![allow(dead_code)]

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::{Router, body::Bytes};
use dashmap::DashMap;
use schoolboard::api::SchoolApi;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::future::IntoFuture;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::net::TcpListener;
use url::Url;

pub const ADMIN_ID: &str = "65f0c0ffee0000000000fa01";

/// Knobs for how the fake backend misbehaves.
#[derive(Debug, Clone, Default)]
pub struct Scenario {
    pub no_admin: bool,
    pub users_fail: bool,
    pub audit_logs_fail: bool,
    pub sessions_fail: bool,
    pub no_current_semester: bool,
    /// The first lookup of each student answers 503; later ones succeed.
    pub flaky_students: bool,
    /// Delay before answering a student lookup.
    pub student_delay: Duration,
    /// Audit logs returned for the admin. Defaults to [`default_audit_logs`].
    pub audit_logs: Option<Value>,
}

#[derive(Default)]
pub struct Counters {
    pub total: AtomicUsize,
    per_path: DashMap<String, usize>,
    pub last_query: DashMap<String, HashMap<String, String>>,
    pub last_body: DashMap<String, Value>,
}

impl Counters {
    fn hit(&self, path: &str) {
        self.total.fetch_add(1, Ordering::SeqCst);
        *self.per_path.entry(path.to_owned()).or_insert(0) += 1;
    }

    pub fn hits(&self, path: &str) -> usize {
        self.per_path.get(path).map(|n| *n).unwrap_or(0)
    }

    /// Requests made to any `/students/{id}` path.
    pub fn student_hits(&self) -> usize {
        self.per_path
            .iter()
            .filter(|entry| entry.key().starts_with("/students/"))
            .map(|entry| *entry.value())
            .sum()
    }
}

#[derive(Clone)]
struct Fake {
    scenario: Arc<Scenario>,
    counters: Arc<Counters>,
}

pub struct FakeBackend {
    pub base_url: Url,
    pub counters: Arc<Counters>,
}

impl FakeBackend {
    pub async fn start(scenario: Scenario) -> Self {
        let counters = Arc::new(Counters::default());
        let fake = Fake {
            scenario: Arc::new(scenario),
            counters: counters.clone(),
        };

        let router = Router::new()
            .route("/api/users", get(users))
            .route("/api/students/{id}", get(student))
            .route("/api/audit/logs", get(audit_logs))
            .route("/api/sessions", get(sessions))
            .route("/api/results", get(list_results).post(create_result))
            .route("/api/semesters", get(list_semesters))
            .route("/api/semesters/current", get(current_semester))
            .route("/api/semesters/start-new", post(start_semester))
            .route("/api/semesters/close-current", post(close_semester))
            .with_state(fake);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(axum::serve(listener, router).into_future());

        Self {
            base_url: format!("http://{addr}/api/").parse().unwrap(),
            counters,
        }
    }

    pub fn client(&self) -> SchoolApi {
        SchoolApi::new(
            self.base_url.clone(),
            Some("test-token".to_owned()),
            Duration::from_secs(5),
            1000,
        )
        .unwrap()
    }
}

/// Audit logs referencing students A, B, A, C, where B is unknown to the directory.
pub fn default_audit_logs() -> Value {
    json!([
        {
            "action": "FEE_ASSIGNED",
            "details": "{\"studentId\":\"stu-aaaaaaaa0001\",\"feeId\":\"FEE-1\",\"assignedAmount\":12000}",
            "timestamp": "2025-03-03T10:00:00.000Z",
            "success": true
        },
        {
            "action": "FEE_WAIVED",
            "details": {"student": "missing-bbbbbbbb0002", "reason": "hardship"},
            "timestamp": "2025-03-02T10:00:00.000Z"
        },
        {
            "action": "PAYMENT_RECORDED",
            "details": {"student_id": "stu-aaaaaaaa0001", "paymentStatus": "paid"},
            "timestamp": "2025-03-04T10:00:00.000Z"
        },
        {
            "action": "REPORT_EXPORTED",
            "details": {"studentId": "stu-cccccccc0003"},
            "timestamp": "2025-03-01T10:00:00.000Z",
            "success": false
        },
        {
            "action": "LOGIN",
            "details": "Signed in from the bursary office",
            "timestamp": "2025-03-01T07:59:00.000Z"
        }
    ])
}

fn data(value: Value) -> Response {
    Json(json!({ "data": value })).into_response()
}

async fn users(
    State(fake): State<Fake>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    fake.counters.hit("/users");
    fake.counters.last_query.insert("/users".into(), query);
    if fake.scenario.users_fail {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    if fake.scenario.no_admin {
        return data(json!([]));
    }
    data(json!([{
        "_id": ADMIN_ID,
        "username": "bursar",
        "name": "Amaka",
        "surname": "Okafor",
        "email": "bursar@school.test",
        "role": "finance_admin"
    }]))
}

async fn student(State(fake): State<Fake>, Path(id): Path<String>) -> Response {
    let path = format!("/students/{id}");
    fake.counters.hit(&path);
    if !fake.scenario.student_delay.is_zero() {
        tokio::time::sleep(fake.scenario.student_delay).await;
    }
    if fake.scenario.flaky_students && fake.counters.hits(&path) == 1 {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }
    match id.as_str() {
        "stu-aaaaaaaa0001" => Json(json!({
            "data": {"data": {"username": "chidi", "name": "Chidi", "surname": "Anagonye"}}
        }))
        .into_response(),
        "stu-cccccccc0003" => data(json!({"username": "tahani", "name": "Tahani"})),
        "stu-empty" => data(Value::Null),
        "stu-blank" => data(json!({"data": {}})),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn audit_logs(
    State(fake): State<Fake>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    fake.counters.hit("/audit/logs");
    fake.counters.last_query.insert("/audit/logs".into(), query);
    if fake.scenario.audit_logs_fail {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }
    data(
        fake.scenario
            .audit_logs
            .clone()
            .unwrap_or_else(default_audit_logs),
    )
}

async fn sessions(State(fake): State<Fake>) -> Response {
    fake.counters.hit("/sessions");
    if fake.scenario.sessions_fail {
        return (StatusCode::OK, "<html>not json</html>").into_response();
    }
    data(json!([{
        "createdAt": "2025-03-01T07:59:00.000Z",
        "ipAddress": "10.20.0.4",
        "userAgent": "Mozilla/5.0 (Windows NT 10.0) Chrome/122.0 Safari/537.36"
    }]))
}

async fn list_results(
    State(fake): State<Fake>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    fake.counters.hit("/results");
    fake.counters.last_query.insert("/results".into(), query);
    data(json!([{
        "semester": "First",
        "academicYear": "2024/2025",
        "gpa": 3.5,
        "overallPercentage": 84.0,
        "resultCount": 1,
        "subjects": [{
            "subject": null,
            "letterGrade": "B+",
            "averageScore": 84.0,
            "results": [{
                "_id": "r-1",
                "assessmentTitle": "Midterm",
                "examType": "midterm",
                "date": "2024-11-04",
                "score": 42,
                "totalMarks": 50
            }]
        }]
    }]))
}

async fn create_result(State(fake): State<Fake>, body: Bytes) -> Response {
    fake.counters.hit("POST /results");
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    fake.counters.last_body.insert("/results".into(), body.clone());
    let mut created = body;
    if let Some(obj) = created.as_object_mut() {
        obj.insert("_id".into(), json!("r-new"));
    }
    (StatusCode::CREATED, Json(json!({ "data": created }))).into_response()
}

fn semester(name: &str, current: bool) -> Value {
    let status = if current { "active" } else { "closed" };
    json!({
        "_id": format!("sem-{name}"),
        "name": name,
        "academicYear": "2024/2025",
        "status": status,
        "isCurrent": current
    })
}

async fn list_semesters(State(fake): State<Fake>) -> Response {
    fake.counters.hit("/semesters");
    data(json!([semester("First", false), semester("Second", true)]))
}

async fn current_semester(State(fake): State<Fake>) -> Response {
    fake.counters.hit("/semesters/current");
    if fake.scenario.no_current_semester {
        return (StatusCode::NOT_FOUND, Json(json!({"message": "none"}))).into_response();
    }
    data(semester("Second", true))
}

async fn start_semester(State(fake): State<Fake>, Json(body): Json<Value>) -> Response {
    fake.counters.hit("/semesters/start-new");
    fake.counters.last_body.insert("/semesters/start-new".into(), body.clone());
    let name = body["semester"].as_str().unwrap_or("Unnamed").to_owned();
    (StatusCode::CREATED, data_value(semester(&name, true))).into_response()
}

fn data_value(value: Value) -> Json<Value> {
    Json(json!({ "data": value }))
}

async fn close_semester(State(fake): State<Fake>) -> Response {
    fake.counters.hit("/semesters/close-current");
    (StatusCode::OK, "").into_response()
}
