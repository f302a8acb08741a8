use std::{net::SocketAddr, sync::Arc};

use axum::{
    routing::{get, post},
    serve, Router,
};
use chrono::{DateTime, Utc};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, TraceLayer},
};
use tracing::info;

use lookback_db::DatabaseManager;

use crate::capture::CaptureFlag;
use crate::routes;

pub struct AppState {
    pub db: Arc<DatabaseManager>,
    pub capture: CaptureFlag,
    pub app_start_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: Arc<DatabaseManager>, capture: CaptureFlag) -> Self {
        AppState {
            db,
            capture,
            app_start_time: Utc::now(),
        }
    }
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/search", get(routes::search::search))
        .route("/records/:id", get(routes::records::get_record))
        .route("/timestamps", get(routes::records::list_timestamps))
        .route("/capture/status", get(routes::capture::capture_status))
        .route("/capture/toggle", post(routes::capture::toggle_capture))
        .route("/health", get(routes::health::health_check))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
}

pub async fn run(
    addr: SocketAddr,
    db: Arc<DatabaseManager>,
    capture: CaptureFlag,
) -> std::io::Result<()> {
    let state = Arc::new(AppState::new(db, capture));
    let router = create_router(state);
    let listener = TcpListener::bind(addr).await?;
    info!("server listening on {}", addr);
    serve(listener, router).await
}
