use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json as JsonResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info};

use lookback_core::{parse_query, DEFAULT_LIMIT, DEFAULT_PAGE};
use lookback_db::CaptureRecord;

use crate::planner::search_records;
use crate::server::AppState;

/// Raw query parameters. `page`/`limit` come in as strings so a non-numeric
/// value is a validation failure we report ourselves instead of a framework
/// rejection.
#[derive(Deserialize)]
pub(crate) struct SearchParams {
    #[serde(default)]
    q: Option<String>,
    #[serde(default)]
    page: Option<String>,
    #[serde(default)]
    limit: Option<String>,
}

/// Stable external shape: `entries` / `hasMore` / `currentDate`.
#[derive(Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub entries: Vec<CaptureRecord>,
    pub has_more: bool,
    pub current_date: String,
}

fn positive_u32(
    raw: Option<&str>,
    name: &str,
    default: u32,
) -> Result<u32, (StatusCode, JsonResponse<Value>)> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.parse::<u32>() {
        Ok(value) if value >= 1 => Ok(value),
        _ => Err((
            StatusCode::BAD_REQUEST,
            JsonResponse(json!({
                "error": format!("invalid {}: expected a positive integer, got {:?}", name, raw)
            })),
        )),
    }
}

pub(crate) async fn search(
    Query(params): Query<SearchParams>,
    State(state): State<Arc<AppState>>,
) -> Result<JsonResponse<SearchResponse>, (StatusCode, JsonResponse<Value>)> {
    // Bad pagination is rejected before any retrieval is attempted.
    let page = positive_u32(params.page.as_deref(), "page", DEFAULT_PAGE)?;
    let limit = positive_u32(params.limit.as_deref(), "limit", DEFAULT_LIMIT)?;

    let raw = params.q.as_deref().unwrap_or("");
    let mut filters = parse_query(raw);
    filters.page = page;
    filters.limit = limit;

    info!(
        "received search request: q={:?}, page={}, limit={}",
        raw, page, limit
    );

    let result = search_records(&state.db, &filters).await.map_err(|e| {
        error!("failed to search records: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            JsonResponse(json!({"error": format!("failed to search records: {}", e)})),
        )
    })?;

    info!(
        "search completed: {} entries, has_more={}",
        result.entries.len(),
        result.has_more
    );

    Ok(JsonResponse(SearchResponse {
        entries: result.entries,
        has_more: result.has_more,
        current_date: result.current_date,
    }))
}
