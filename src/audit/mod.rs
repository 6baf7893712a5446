//! Audit log entries and their free-form `details` payloads.
//!
//! The backend stores `details` either as a JSON object or as a string that
//! may or may not contain JSON. [`AuditDetails`] classifies the payload once
//! at deserialization time so the rest of the crate never re-parses it.

pub mod format;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use ts_rs::TS;

pub use format::{format_audit_details, format_audit_details_str};

/// Keys that may carry a student reference, in probe order.
pub const STUDENT_ID_KEYS: [&str; 3] = ["studentId", "student", "student_id"];

/// A `details` payload after boundary validation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum AuditDetails {
    /// A JSON object, either sent as one or decoded from a string.
    Parsed(Map<String, Value>),
    /// Text that is not a JSON object.
    Raw(String),
    /// Null, missing, or blank.
    #[default]
    Empty,
}

impl AuditDetails {
    /// Classify a details string the same way the wire format is classified.
    pub fn from_text(text: &str) -> Self {
        if text.trim().is_empty() {
            return Self::Empty;
        }
        match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(map)) => Self::Parsed(map),
            _ => Self::Raw(text.to_owned()),
        }
    }

    pub fn as_object(&self) -> Option<&Map<String, Value>> {
        match self {
            Self::Parsed(map) => Some(map),
            _ => None,
        }
    }
}

impl From<Value> for AuditDetails {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Empty,
            Value::Object(map) => Self::Parsed(map),
            Value::String(text) => Self::from_text(&text),
            other => Self::Raw(other.to_string()),
        }
    }
}

impl From<AuditDetails> for Value {
    fn from(details: AuditDetails) -> Self {
        match details {
            AuditDetails::Parsed(map) => Value::Object(map),
            AuditDetails::Raw(text) => Value::String(text),
            AuditDetails::Empty => Value::Null,
        }
    }
}

/// A recorded system event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AuditLogEntry {
    pub action: String,
    #[serde(default)]
    #[ts(type = "string | Record<string, unknown> | null")]
    pub details: AuditDetails,
    /// ISO-8601 timestamp exactly as received.
    #[serde(default)]
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub success: Option<bool>,
}

impl AuditLogEntry {
    pub fn parsed_timestamp(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub fn student_id(&self) -> Option<String> {
        extract_student_id(&self.details)
    }
}

/// Find the student referenced by a details payload.
///
/// Probes [`STUDENT_ID_KEYS`] in order and returns the first usable value.
/// Non-object payloads (including unparseable strings) yield `None`.
pub fn extract_student_id(details: &AuditDetails) -> Option<String> {
    details.as_object().and_then(student_id_in)
}

pub(crate) fn student_id_in(map: &Map<String, Value>) -> Option<String> {
    STUDENT_ID_KEYS
        .iter()
        .find_map(|key| map.get(*key).and_then(student_id_value))
}

/// Accept non-empty strings, non-zero numbers, and populated references
/// (objects with an `_id` or `id`). Everything else is treated as absent.
fn student_id_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64().is_some_and(|f| f != 0.0) => Some(n.to_string()),
        Value::Object(obj) => ["_id", "id"]
            .iter()
            .filter_map(|k| obj.get(*k))
            .find_map(|v| match v {
                Value::String(s) if !s.is_empty() => Some(s.clone()),
                _ => None,
            }),
        _ => None,
    }
}
