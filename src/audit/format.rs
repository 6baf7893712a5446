//! Human-readable rendering of audit `details` payloads.
//!
//! Never fails: unknown shapes degrade to the raw text or a placeholder.

use super::{AuditDetails, STUDENT_ID_KEYS, student_id_in};
use crate::students::StudentLookup;
use crate::utils::humanize_identifier;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Map, Value};

pub const NO_DETAILS: &str = "No details available";
pub const SEPARATOR: &str = " • ";

/// Keys with dedicated rendering, consumed before the generic pass.
const KNOWN_KEYS: [&str; 6] = [
    "feeId",
    "assignedAmount",
    "dueDate",
    "ipAddress",
    "userAgent",
    "timestamp",
];

/// Render a details payload as one line of labelled fragments.
pub fn format_audit_details(details: &AuditDetails, students: &dyn StudentLookup) -> String {
    match details {
        AuditDetails::Empty => NO_DETAILS.to_owned(),
        AuditDetails::Raw(text) => text.clone(),
        AuditDetails::Parsed(map) => {
            let fragments = fragments(map, students);
            if fragments.is_empty() {
                NO_DETAILS.to_owned()
            } else {
                fragments.join(SEPARATOR)
            }
        }
    }
}

/// Convenience for callers holding the raw details text.
pub fn format_audit_details_str(details: &str, students: &dyn StudentLookup) -> String {
    format_audit_details(&AuditDetails::from_text(details), students)
}

fn fragments(map: &Map<String, Value>, students: &dyn StudentLookup) -> Vec<String> {
    let mut out = Vec::new();

    if let Some(id) = student_id_in(map) {
        out.push(match students.get(&id) {
            Some(info) => format!("Student: {} ({})", info.name, info.username),
            None => format!("Student ID: {id}"),
        });
    }

    let field = |key: &str| map.get(key).filter(|v| !v.is_null());

    if let Some(fee) = field("feeId") {
        out.push(format!("Fee ID: {}", plain(fee)));
    }
    if let Some(amount) = field("assignedAmount") {
        out.push(format!("Amount: {}", money(amount)));
    }
    if let Some(due) = field("dueDate") {
        out.push(format!("Due: {}", calendar_date(due)));
    }
    if let Some(ip) = field("ipAddress") {
        out.push(format!("IP: {}", plain(ip)));
    }
    if let Some(agent) = field("userAgent") {
        out.push(format!("Browser: {}", browser_name(&plain(agent))));
    }
    if let Some(ts) = field("timestamp") {
        out.push(format!("Time: {}", timestamp(ts)));
    }

    for (key, value) in map {
        if value.is_null()
            || KNOWN_KEYS.contains(&key.as_str())
            || STUDENT_ID_KEYS.contains(&key.as_str())
        {
            continue;
        }
        out.push(format!(
            "{} {}: {}",
            key_icon(key),
            humanize_identifier(key),
            plain(value)
        ));
    }

    out
}

/// Category icon chosen by substring of the key name.
fn key_icon(key: &str) -> &'static str {
    let key = key.to_ascii_lowercase();
    if key.contains("status") {
        "🔄"
    } else if key.contains("type") {
        "🏷️"
    } else if key.contains("name") {
        "👤"
    } else {
        "📝"
    }
}

/// Best-effort browser family from a user-agent string.
pub fn browser_name(user_agent: &str) -> &'static str {
    // Order matters: Edge and Opera UAs also contain "Chrome" and "Safari".
    if user_agent.contains("Edg") {
        "Edge"
    } else if user_agent.contains("OPR") || user_agent.contains("Opera") {
        "Opera"
    } else if user_agent.contains("Firefox") {
        "Firefox"
    } else if user_agent.contains("Chrome") {
        "Chrome"
    } else if user_agent.contains("Safari") {
        "Safari"
    } else {
        "Unknown"
    }
}

fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn money(value: &Value) -> String {
    let amount = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match amount.filter(|a| a.is_finite()) {
        Some(a) => format!("${a:.2}"),
        None => plain(value),
    }
}

fn calendar_date(value: &Value) -> String {
    let text = plain(value);
    let date = DateTime::parse_from_rfc3339(&text)
        .map(|dt| dt.date_naive())
        .or_else(|_| NaiveDate::parse_from_str(&text, "%Y-%m-%d"));
    match date {
        Ok(date) => date.format("%b %-d, %Y").to_string(),
        Err(_) => text,
    }
}

fn timestamp(value: &Value) -> String {
    let text = plain(value);
    match DateTime::parse_from_rfc3339(&text) {
        Ok(dt) => dt
            .with_timezone(&Utc)
            .format("%Y-%m-%d %H:%M:%S UTC")
            .to_string(),
        Err(_) => text,
    }
}
