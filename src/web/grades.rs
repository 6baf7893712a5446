//! Letter-grade lookup.

use axum::extract::Query;
use axum::extract::rejection::QueryRejection;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::grading::{LetterGrade, calc_letter_grade};
use crate::web::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct GradeParams {
    pub percentage: f64,
}

#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct GradeResponse {
    pub percentage: f64,
    pub letter_grade: LetterGrade,
    pub passing: bool,
}

/// `GET /api/grade?percentage=`
pub(super) async fn grade(
    params: Result<Query<GradeParams>, QueryRejection>,
) -> Result<Json<GradeResponse>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::bad_request(e.body_text()))?;
    if !params.percentage.is_finite() {
        return Err(ApiError::bad_request("percentage must be a finite number"));
    }

    let letter_grade = calc_letter_grade(params.percentage);
    Ok(Json(GradeResponse {
        percentage: params.percentage,
        letter_grade,
        passing: letter_grade.is_passing(),
    }))
}
