use axum::{extract::State, response::Json as JsonResponse};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::server::AppState;

#[derive(Serialize, Deserialize)]
pub struct CaptureStatusResponse {
    pub active: bool,
}

pub(crate) async fn capture_status(
    State(state): State<Arc<AppState>>,
) -> JsonResponse<CaptureStatusResponse> {
    JsonResponse(CaptureStatusResponse {
        active: state.capture.is_active(),
    })
}

pub(crate) async fn toggle_capture(
    State(state): State<Arc<AppState>>,
) -> JsonResponse<CaptureStatusResponse> {
    let active = state.capture.toggle();
    info!("capture toggled: active={}", active);
    JsonResponse(CaptureStatusResponse { active })
}
