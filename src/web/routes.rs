//! Web API router construction.

use axum::{
    Router,
    routing::{get, post},
};
use std::time::Duration;

use crate::state::AppState;
use crate::web::middleware::request_id::RequestIdLayer;
use crate::web::{audit, grades, monitoring, results, semesters, status};
use tower_http::{compression::CompressionLayer, timeout::TimeoutLayer};

/// Upper bound for a single API request, including backend fan-out.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Creates the web server router
pub fn create_router(app_state: AppState) -> Router {
    let api_router = Router::new()
        .route("/health", get(status::health))
        .route("/grade", get(grades::grade))
        .route("/monitoring", get(monitoring::monitoring))
        .route(
            "/results",
            get(results::list_results).post(results::create_result),
        )
        .route("/semesters", get(semesters::list_semesters))
        .route("/semesters/current", get(semesters::current_semester))
        .route("/semesters/start-new", post(semesters::start_new_semester))
        .route(
            "/semesters/close-current",
            post(semesters::close_current_semester),
        )
        .route("/audit/format", get(audit::format_details))
        .with_state(app_state);

    Router::new().nest("/api", api_router).layer((
        // Outermost: per-request ID span + severity-proportional response logging.
        RequestIdLayer,
        CompressionLayer::new()
            .zstd(true)
            .br(true)
            .gzip(true)
            .quality(tower_http::CompressionLevel::Fastest),
        TimeoutLayer::new(REQUEST_TIMEOUT),
    ))
}
