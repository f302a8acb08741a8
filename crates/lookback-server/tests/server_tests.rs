use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use lookback_core::parse_query;
use lookback_db::DatabaseManager;
use lookback_server::{create_router, search_records, AppState, CaptureFlag};

async fn test_db() -> (tempfile::TempDir, Arc<DatabaseManager>) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.db");
    let db = DatabaseManager::new(path.to_str().unwrap()).await.unwrap();
    (dir, Arc::new(db))
}

async fn insert(
    db: &DatabaseManager,
    timestamp: DateTime<Utc>,
    title: Option<&str>,
    browser_url: Option<&str>,
    text: Option<&str>,
) {
    sqlx::query(
        "INSERT INTO captures (timestamp, title, app_name, window_name, browser_url, text, image_path) \
         VALUES (?1, ?2, 'TestApp', NULL, ?3, ?4, 'shot.webp')",
    )
    .bind(timestamp)
    .bind(title)
    .bind(browser_url)
    .bind(text)
    .execute(&db.pool)
    .await
    .unwrap();
}

fn local_utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
    Local
        .with_ymd_and_hms(y, mo, d, h, mi, s)
        .single()
        .unwrap()
        .with_timezone(&Utc)
}

fn app(db: Arc<DatabaseManager>) -> Router {
    create_router(Arc::new(AppState::new(db, CaptureFlag::default())))
}

async fn request_json(app: &Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn thirteen_records_paginate_with_one_extra_fetch() {
    let (_dir, db) = test_db().await;
    let base = Utc::now() - Duration::hours(1);
    for i in 0..13 {
        insert(&db, base + Duration::seconds(i), None, None, Some("note")).await;
    }

    let mut filters = parse_query("note");
    filters.limit = 12;
    filters.page = 1;
    let first = search_records(&db, &filters).await.unwrap();
    assert_eq!(first.entries.len(), 12);
    assert!(first.has_more);

    filters.page = 2;
    let second = search_records(&db, &filters).await.unwrap();
    assert_eq!(second.entries.len(), 1);
    assert!(!second.has_more);

    // no overlap and nothing lost across the page boundary
    assert!(first.entries.iter().all(|e| e.id != second.entries[0].id));
}

#[tokio::test]
async fn pages_are_ordered_newest_first() {
    let (_dir, db) = test_db().await;
    let base = Utc::now() - Duration::hours(2);
    for i in [5, 1, 4, 2, 3] {
        insert(&db, base + Duration::minutes(i), None, None, Some("entry")).await;
    }

    let filters = parse_query("entry");
    let page = search_records(&db, &filters).await.unwrap();
    assert!(page
        .entries
        .windows(2)
        .all(|pair| pair[0].timestamp >= pair[1].timestamp));
}

#[tokio::test]
async fn filters_are_conjunctive() {
    let (_dir, db) = test_db().await;
    let now = Utc::now();
    insert(&db, now, Some("spec review"), Some("github.com/x"), Some("notes")).await;
    insert(&db, now - Duration::seconds(1), Some("spec review"), None, Some("notes")).await;
    insert(&db, now - Duration::seconds(2), None, Some("github.com/y"), Some("notes")).await;

    let filters = parse_query("notes title:spec url:github");
    let page = search_records(&db, &filters).await.unwrap();
    assert_eq!(page.entries.len(), 1);
    assert_eq!(page.entries[0].browser_url.as_deref(), Some("github.com/x"));
}

#[tokio::test]
async fn date_filter_keeps_only_that_day_and_echoes_it() {
    let (_dir, db) = test_db().await;
    insert(&db, Utc::now(), None, None, Some("fresh")).await;
    insert(&db, Utc::now() - Duration::days(30), None, None, Some("stale")).await;

    let filters = parse_query("date:today");
    let page = search_records(&db, &filters).await.unwrap();
    assert_eq!(page.entries.len(), 1);
    assert_eq!(page.entries[0].text.as_deref(), Some("fresh"));
    assert_eq!(
        page.current_date,
        Local::now().date_naive().format("%Y-%m-%d").to_string()
    );
}

#[tokio::test]
async fn malformed_date_filter_is_ignored() {
    let (_dir, db) = test_db().await;
    insert(&db, Utc::now(), None, None, Some("alpha")).await;
    insert(&db, Utc::now() - Duration::days(10), None, None, Some("beta")).await;

    let filters = parse_query("date:garbage-value");
    let page = search_records(&db, &filters).await.unwrap();
    assert_eq!(page.entries.len(), 2);
    // an ignored date filter falls back to today's date in the echo
    assert_eq!(
        page.current_date,
        Local::now().date_naive().format("%Y-%m-%d").to_string()
    );
}

#[tokio::test]
async fn time_range_filter_matches_clock_time_across_days() {
    let (_dir, db) = test_db().await;
    // same afternoon window on two different days, plus one morning row
    insert(&db, local_utc(2024, 5, 10, 15, 30, 0), None, None, Some("friday pm")).await;
    insert(&db, local_utc(2024, 5, 11, 16, 0, 0), None, None, Some("saturday pm")).await;
    insert(&db, local_utc(2024, 5, 11, 9, 0, 0), None, None, Some("saturday am")).await;
    let app = app(db);

    let (status, body) = request_json(&app, "GET", "/search?q=time:15:00-17:00").await;
    assert_eq!(status, StatusCode::OK);
    let texts: Vec<&str> = body["entries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["text"].as_str().unwrap())
        .collect();
    assert_eq!(texts, vec!["saturday pm", "friday pm"]);
}

#[tokio::test]
async fn search_endpoint_returns_stable_shape() {
    let (_dir, db) = test_db().await;
    insert(&db, Utc::now(), Some("meeting notes"), None, None).await;
    let app = app(db);

    let (status, body) = request_json(&app, "GET", "/search?q=meeting%20notes").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entries"].as_array().unwrap().len(), 1);
    assert_eq!(body["hasMore"], Value::Bool(false));
    assert!(body["currentDate"].is_string());
}

#[tokio::test]
async fn bad_pagination_is_rejected_before_retrieval() {
    let (_dir, db) = test_db().await;
    let app = app(db);

    for uri in ["/search?page=abc", "/search?limit=0", "/search?page=-1"] {
        let (status, body) = request_json(&app, "GET", uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "uri {uri}");
        assert!(body["error"].is_string(), "uri {uri}");
    }
}

#[tokio::test]
async fn missing_record_is_not_found_not_a_fault() {
    let (_dir, db) = test_db().await;
    insert(&db, Utc::now(), Some("only"), None, None).await;
    let app = app(db);

    let (status, body) = request_json(&app, "GET", "/records/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], Value::String("only".into()));

    let (status, body) = request_json(&app, "GET", "/records/4242").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn timestamps_endpoint_lists_newest_first() {
    let (_dir, db) = test_db().await;
    let base = Utc::now() - Duration::hours(1);
    for i in [2, 0, 1] {
        insert(&db, base + Duration::minutes(i), None, None, None).await;
    }
    let app = app(db);

    let (status, body) = request_json(&app, "GET", "/timestamps").await;
    assert_eq!(status, StatusCode::OK);
    let timestamps: Vec<DateTime<Utc>> =
        serde_json::from_value(body["timestamps"].clone()).unwrap();
    assert_eq!(timestamps.len(), 3);
    assert!(timestamps.windows(2).all(|pair| pair[0] >= pair[1]));
}

#[tokio::test]
async fn capture_toggle_alternates_and_reports_new_state() {
    let (_dir, db) = test_db().await;
    let app = app(db);

    let (status, body) = request_json(&app, "GET", "/capture/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["active"], Value::Bool(true));

    let (_, body) = request_json(&app, "POST", "/capture/toggle").await;
    assert_eq!(body["active"], Value::Bool(false));

    let (_, body) = request_json(&app, "POST", "/capture/toggle").await;
    assert_eq!(body["active"], Value::Bool(true));

    let (_, body) = request_json(&app, "GET", "/capture/status").await;
    assert_eq!(body["active"], Value::Bool(true));
}
