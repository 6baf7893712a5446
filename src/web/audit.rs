//! Audit detail preview.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::response::Json;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::audit::{AuditDetails, extract_student_id, format_audit_details};
use crate::state::AppState;
use crate::students::StudentInfo;
use crate::web::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct FormatParams {
    #[serde(default)]
    pub details: String,
}

#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct FormattedDetails {
    pub description: String,
    pub student_id: Option<String>,
    pub student: Option<StudentInfo>,
}

/// `GET /api/audit/format?details=`
///
/// Renders a raw details payload the way the activity feed would, resolving
/// the referenced student first.
pub(super) async fn format_details(
    State(state): State<AppState>,
    params: Result<Query<FormatParams>, QueryRejection>,
) -> Result<Json<FormattedDetails>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let details = AuditDetails::from_text(&params.details);

    let students = state.student_cache();
    let student_id = extract_student_id(&details);
    let student = match &student_id {
        Some(id) => Some(students.resolve(id).await),
        None => None,
    };

    Ok(Json(FormattedDetails {
        description: format_audit_details(&details, &students),
        student_id,
        student,
    }))
}
