//! Semester lifecycle endpoints. Thin pass-throughs to the backend.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::Json;
use tracing::info;

use crate::api::models::{SemesterInfo, StartSemester};
use crate::state::AppState;
use crate::web::error::{ApiError, upstream_error};

pub(super) async fn list_semesters(
    State(state): State<AppState>,
) -> Result<Json<Vec<SemesterInfo>>, ApiError> {
    let semesters = state
        .api
        .list_semesters()
        .await
        .map_err(|e| upstream_error("list semesters", e))?;
    Ok(Json(semesters))
}

/// `GET /api/semesters/current`. 404 when no semester is open.
pub(super) async fn current_semester(
    State(state): State<AppState>,
) -> Result<Json<SemesterInfo>, ApiError> {
    state
        .api
        .current_semester()
        .await
        .map_err(|e| upstream_error("load current semester", e))?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("no current semester"))
}

pub(super) async fn start_new_semester(
    State(state): State<AppState>,
    body: Result<Json<StartSemester>, JsonRejection>,
) -> Result<(StatusCode, Json<SemesterInfo>), ApiError> {
    let Json(request) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;
    if request.semester.trim().is_empty() || request.academic_year.trim().is_empty() {
        return Err(ApiError::bad_request(
            "semester and academicYear are required",
        ));
    }

    let started = state
        .api
        .start_new_semester(&request)
        .await
        .map_err(|e| upstream_error("start semester", e))?;
    info!(semester = %started.semester, year = %started.academic_year, "Semester started");
    Ok((StatusCode::CREATED, Json(started)))
}

/// `POST /api/semesters/close-current`. Returns the closed semester when the
/// backend reports one.
pub(super) async fn close_current_semester(
    State(state): State<AppState>,
) -> Result<Json<Option<SemesterInfo>>, ApiError> {
    let closed = state
        .api
        .close_current_semester()
        .await
        .map_err(|e| upstream_error("close semester", e))?;
    info!(semester = ?closed.as_ref().map(|s| &s.semester), "Current semester closed");
    Ok(Json(closed))
}
