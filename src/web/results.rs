//! Result listing and submission.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Serialize;
use tracing::info;
use ts_rs::TS;

use crate::api::models::{ResultQuery, ResultRecord, Semester};
use crate::results::{GradePreview, NewResult};
use crate::state::AppState;
use crate::web::error::{ApiError, upstream_error};

#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreatedResult {
    pub result: ResultRecord,
    pub preview: Option<GradePreview>,
}

/// `GET /api/results?semester=&academicYear=`
pub(super) async fn list_results(
    State(state): State<AppState>,
    query: Result<Query<ResultQuery>, QueryRejection>,
) -> Result<Json<Vec<Semester>>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let mut semesters = state
        .api
        .list_results(&query)
        .await
        .map_err(|e| upstream_error("list results", e))?;
    semesters.iter_mut().for_each(Semester::fill_display_fields);
    Ok(Json(semesters))
}

/// `POST /api/results`
///
/// Rejects invalid submissions with 422 before anything reaches the backend.
pub(super) async fn create_result(
    State(state): State<AppState>,
    body: Result<Json<NewResult>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedResult>), ApiError> {
    let Json(result) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;
    result.validate()?;

    let preview = result.preview();
    let mut created = state
        .api
        .create_result(&result)
        .await
        .map_err(|e| upstream_error("create result", e))?;
    created.fill_grade();

    info!(
        student = %result.student,
        subject = %result.subject,
        grade = ?preview.map(|p| p.letter_grade),
        "Result submitted"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreatedResult {
            result: created,
            preview,
        }),
    ))
}
