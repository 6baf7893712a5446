//! Response decoding with readable diagnostics.
//!
//! Bodies are decoded in two steps: syntax first (so errors can point at a
//! line and column of the raw text), then the typed shape via
//! `serde_path_to_error` (so errors name the offending field path).

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;

/// How many `data` wrappers the backend may put around a payload.
const MAX_ENVELOPE_DEPTH: usize = 2;

/// Why a response body could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonDiagnostic {
    /// JSON path of the failing value (empty for syntax errors).
    pub path: String,
    pub message: String,
    /// Pointer into the raw body for syntax errors: `(line, column, snippet)`.
    pub location: Option<(usize, usize, String)>,
}

impl fmt::Display for JsonDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.path.is_empty() && self.path != "." {
            write!(f, "at path '{}': ", self.path)?;
        }
        f.write_str(&self.message)?;
        if let Some((line, column, snippet)) = &self.location {
            write!(f, " (line {line} col {column})\n{snippet}")?;
        }
        Ok(())
    }
}

impl std::error::Error for JsonDiagnostic {}

/// Decode `body` into `T`, stripping backend `data` envelopes first.
pub fn decode_enveloped<T: DeserializeOwned>(body: &str) -> Result<T, JsonDiagnostic> {
    let raw: Value = serde_json::from_str(body).map_err(|e| syntax_diagnostic(body, &e))?;
    decode_value(unwrap_envelope(raw))
}

/// Decode an already-parsed value, reporting the failing path.
pub fn decode_value<T: DeserializeOwned>(value: Value) -> Result<T, JsonDiagnostic> {
    serde_path_to_error::deserialize(value).map_err(|err| {
        let path = err.path().to_string();
        JsonDiagnostic {
            path,
            message: describe_mismatch(&err.into_inner().to_string()),
            location: None,
        }
    })
}

/// Strip up to [`MAX_ENVELOPE_DEPTH`] layers of `{"data": ...}`.
///
/// Only objects whose `data` member is present are unwrapped, so payloads
/// that merely contain other keys pass through untouched.
pub fn unwrap_envelope(mut value: Value) -> Value {
    for _ in 0..MAX_ENVELOPE_DEPTH {
        match value {
            Value::Object(mut map) if map.contains_key("data") => {
                value = map.remove("data").unwrap_or(Value::Null);
            }
            other => return other,
        }
    }
    value
}

fn syntax_diagnostic(body: &str, err: &serde_json::Error) -> JsonDiagnostic {
    let (line, column) = (err.line(), err.column());
    let message = err.to_string();
    let message = message
        .strip_suffix(&format!(" at line {line} column {column}"))
        .unwrap_or(&message)
        .to_owned();

    JsonDiagnostic {
        path: String::new(),
        message,
        location: Some((line, column, snippet_at(body, line, column, 24))),
    }
}

/// Rewrite serde's `invalid type: X, expected Y` into `expected Y, got X`.
fn describe_mismatch(message: &str) -> String {
    const INVALID: &str = "invalid type: ";
    const EXPECTED: &str = ", expected ";

    message
        .find(INVALID)
        .map(|start| &message[start + INVALID.len()..])
        .and_then(|rest| {
            let split = rest.find(EXPECTED)?;
            Some(format!(
                "expected {}, got {}",
                rest[split + EXPECTED.len()..].trim(),
                &rest[..split]
            ))
        })
        .unwrap_or_else(|| message.to_owned())
}

/// A window of `width` bytes around `column` on `line`, with a caret under the error.
fn snippet_at(body: &str, line: usize, column: usize, width: usize) -> String {
    let text = body.lines().nth(line.saturating_sub(1)).unwrap_or("");
    if text.is_empty() {
        return "(empty line)".to_owned();
    }

    let mut error_idx = column.saturating_sub(1).min(text.len());
    while !text.is_char_boundary(error_idx) {
        error_idx -= 1;
    }
    let mut start = error_idx.saturating_sub(width / 2);
    let mut end = (error_idx + width / 2).min(text.len());
    while !text.is_char_boundary(start) {
        start -= 1;
    }
    while !text.is_char_boundary(end) {
        end += 1;
    }

    let caret = " ".repeat(text[start..error_idx].chars().count()) + "^";
    format!("...{}...\n   {caret}", &text[start..end])
}
