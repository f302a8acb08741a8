use axum::{extract::State, response::Json as JsonResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::server::AppState;

#[derive(Serialize, Deserialize)]
pub struct HealthCheckResponse {
    pub status: String,
    pub status_code: u16,
    pub timestamp: DateTime<Utc>,
    pub uptime_secs: i64,
    pub capture_active: bool,
}

pub(crate) async fn health_check(
    State(state): State<Arc<AppState>>,
) -> JsonResponse<HealthCheckResponse> {
    let now = Utc::now();
    JsonResponse(HealthCheckResponse {
        status: "healthy".to_string(),
        status_code: 200,
        timestamp: now,
        uptime_secs: (now - state.app_start_time).num_seconds(),
        capture_active: state.capture.is_active(),
    })
}
