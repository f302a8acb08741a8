use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json as JsonResponse,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::error;

use lookback_db::CaptureRecord;

use crate::server::AppState;

#[derive(Serialize, Deserialize)]
pub struct TimestampsResponse {
    pub timestamps: Vec<DateTime<Utc>>,
}

pub(crate) async fn get_record(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> Result<JsonResponse<CaptureRecord>, (StatusCode, JsonResponse<Value>)> {
    match state.db.find_record(id).await {
        Ok(Some(record)) => Ok(JsonResponse(record)),
        // Absence is an empty state for the caller, not a fault.
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            JsonResponse(json!({"error": format!("record not found: {}", id)})),
        )),
        Err(e) => {
            error!("failed to fetch record {}: {}", id, e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                JsonResponse(json!({"error": format!("failed to fetch record: {}", e)})),
            ))
        }
    }
}

pub(crate) async fn list_timestamps(
    State(state): State<Arc<AppState>>,
) -> Result<JsonResponse<TimestampsResponse>, (StatusCode, JsonResponse<Value>)> {
    let timestamps = state.db.list_timestamps().await.map_err(|e| {
        error!("failed to list timestamps: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            JsonResponse(json!({"error": format!("failed to list timestamps: {}", e)})),
        )
    })?;
    Ok(JsonResponse(TimestampsResponse { timestamps }))
}
