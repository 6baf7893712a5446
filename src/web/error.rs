//! Standardized API error responses.

use crate::api::SchoolApiError;
use crate::results::{FieldError, ValidationError};
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use ts_rs::TS;

/// Machine-readable error code included in every error body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum ApiErrorCode {
    BadRequest,
    NotFound,
    ValidationFailed,
    UpstreamError,
}

impl ApiErrorCode {
    fn status(self) -> StatusCode {
        match self {
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::ValidationFailed => StatusCode::UNPROCESSABLE_ENTITY,
            Self::UpstreamError => StatusCode::BAD_GATEWAY,
        }
    }
}

#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldError>,
}

impl ApiError {
    pub fn new(code: ApiErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::BadRequest, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::NotFound, message)
    }

    pub fn status(&self) -> StatusCode {
        self.code.status()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self {
            code: ApiErrorCode::ValidationFailed,
            message: err.to_string(),
            fields: err.errors,
        }
    }
}

/// Map a backend failure, logging it with the operation that failed.
pub fn upstream_error(context: &str, err: SchoolApiError) -> ApiError {
    match err {
        SchoolApiError::NotFound(what) => {
            tracing::debug!(context, what = %what, "Backend resource not found");
            ApiError::not_found(format!("{what} not found"))
        }
        other => {
            tracing::error!(context, error = ?other, "Backend request failed");
            ApiError::new(
                ApiErrorCode::UpstreamError,
                format!("Failed to {context}"),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_mapping() {
        let err = upstream_error("list semesters", SchoolApiError::NotFound("/semesters".into()));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err = upstream_error(
            "list semesters",
            SchoolApiError::Status {
                status: 503,
                url: "http://backend/semesters".into(),
            },
        );
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.message, "Failed to list semesters");
    }

    #[test]
    fn test_validation_body() {
        let err = ApiError::from(ValidationError {
            errors: vec![FieldError {
                field: "score",
                message: "must be 0 or more".into(),
            }],
        });
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = serde_json::to_value(&err).unwrap();
        assert_eq!(body["code"], "VALIDATION_FAILED");
        assert_eq!(body["fields"][0]["field"], "score");
    }
}
