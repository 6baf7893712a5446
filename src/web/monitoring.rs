use axum::extract::State;
use axum::response::Json;

use crate::monitor::{MonitoringData, get_monitoring_data};
use crate::state::AppState;

/// `GET /api/monitoring`
///
/// Always answers 200; load failures are carried in the `error` field.
/// Students are resolved through a cache owned by this request alone.
pub(super) async fn monitoring(State(state): State<AppState>) -> Json<MonitoringData> {
    let students = state.student_cache();
    let data = get_monitoring_data(state.api.as_ref(), &students, state.monitor).await;
    Json(data)
}
