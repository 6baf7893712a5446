//! Result submission: validation and grade preview for new result records.
//!
//! The backend re-aggregates semesters from raw results, so the only thing
//! computed locally is the preview shown next to the entry form.

use crate::grading::{LetterGrade, calc_letter_grade, percentage};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A raw result as submitted to `POST /results`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewResult {
    pub assessment_title: String,
    pub class: String,
    pub subject: String,
    pub student: String,
    pub exam_type: String,
    pub grading_period: String,
    /// `YYYY-MM-DD`.
    pub date: String,
    pub score: f64,
    pub total_marks: f64,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct FieldError {
    #[ts(type = "string")]
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid result: {}", summarize(.errors))]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Percentage and grade a result would receive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct GradePreview {
    pub percentage: f64,
    pub letter_grade: LetterGrade,
}

impl NewResult {
    /// Check every field, collecting all problems rather than stopping at the first.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = Vec::new();
        let mut fail = |field: &'static str, message: &str| {
            errors.push(FieldError {
                field,
                message: message.to_owned(),
            })
        };

        let required = [
            ("assessmentTitle", &self.assessment_title),
            ("class", &self.class),
            ("subject", &self.subject),
            ("student", &self.student),
            ("examType", &self.exam_type),
            ("gradingPeriod", &self.grading_period),
            ("status", &self.status),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                fail(field, "is required");
            }
        }

        if NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").is_err() {
            fail("date", "must be a date in YYYY-MM-DD format");
        }

        if !self.total_marks.is_finite() || self.total_marks <= 0.0 {
            fail("totalMarks", "must be greater than 0");
        }
        if !self.score.is_finite() || self.score < 0.0 {
            fail("score", "must be 0 or more");
        } else if self.total_marks.is_finite() && self.score > self.total_marks {
            fail("score", "cannot exceed total marks");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { errors })
        }
    }

    /// Grade preview, or `None` while the marks are not usable.
    pub fn preview(&self) -> Option<GradePreview> {
        let pct = percentage(self.score, self.total_marks)?;
        Some(GradePreview {
            percentage: (pct * 100.0).round() / 100.0,
            letter_grade: calc_letter_grade(pct),
        })
    }
}
