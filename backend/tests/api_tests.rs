//! End-to-end tests for the HTTP API.
//!
//! Every test builds its own router over a fresh `MemoryStore`, so no
//! redis server or provider credentials are needed.
//!
//! Run with: `cargo test -p orbit-backend --test api_tests`

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{TimeZone, Utc};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use orbit_backend::{
    ai::{AiDispatcher, AiEngine, OfflineEngine},
    build_router,
    config::{AiConfig, AiMode},
    store::MemoryStore,
    AppState,
};

const MAX_BODY: usize = 1024 * 1024;

struct NoCapabilities;

#[async_trait]
impl AiEngine for NoCapabilities {
    fn name(&self) -> &'static str {
        "none"
    }
}

fn app_with(ai: AiDispatcher) -> Router {
    let state = AppState::new(Arc::new(MemoryStore::new()), ai);
    build_router(state, "does-not-exist", MAX_BODY)
}

fn offline_app() -> Router {
    let engine = Arc::new(OfflineEngine::new());
    app_with(AiDispatcher::new(AiMode::Offline, engine.clone(), engine))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    read(response).await
}

async fn read(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

fn multipart_request(field: &str, bytes: &[u8]) -> Request<Body> {
    let boundary = "orbit-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"face.png\"\r\nContent-Type: image/png\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri("/api/ai/analyze-image")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn strings(value: &Value) -> Vec<String> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect()
}

// =============================================================================
// TASKS
// =============================================================================

#[tokio::test]
async fn task_lifecycle() {
    let app = offline_app();

    let (status, first) = send(
        &app,
        Method::POST,
        "/api/tasks",
        Some(json!({ "title": "Book dentist", "category": "Errands", "priority": "high" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["status"], "active");
    assert_eq!(first["frequency"], "once");

    tokio::time::sleep(Duration::from_millis(5)).await;
    let (_, second) = send(
        &app,
        Method::POST,
        "/api/tasks",
        Some(json!({ "title": "Weekly review", "frequency": "weekly", "dueDate": "2026-11-02" })),
    )
    .await;
    assert_eq!(second["category"], "Personal");

    let (status, list) = send(&app, Method::GET, "/api/tasks", None).await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Weekly review", "Book dentist"]);

    let id = first["id"].as_str().unwrap();
    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/api/tasks/{id}"),
        Some(json!({ "status": "completed", "notes": "booked for Friday" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "completed");
    assert_eq!(updated["title"], "Book dentist");
    assert_eq!(updated["notes"], "booked for Friday");

    let (status, fetched) = send(&app, Method::GET, &format!("/api/tasks/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, updated);

    let (status, deleted) = send(&app, Method::DELETE, &format!("/api/tasks/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted, json!({ "id": id, "message": "Task deleted" }));

    let (status, body) = send(&app, Method::GET, &format!("/api/tasks/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Task not found");
}

#[tokio::test]
async fn null_clears_due_date_and_notes() {
    let app = offline_app();
    let (_, task) = send(
        &app,
        Method::POST,
        "/api/tasks",
        Some(json!({ "title": "Call mum", "dueDate": "2026-11-02T18:00", "notes": "after work" })),
    )
    .await;
    let id = task["id"].as_str().unwrap();
    assert!(task["dueDate"].is_string());

    let (status, kept) = send(
        &app,
        Method::PUT,
        &format!("/api/tasks/{id}"),
        Some(json!({ "title": "Call mum" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(kept["dueDate"], task["dueDate"]);
    assert_eq!(kept["notes"], "after work");

    let (status, cleared) = send(
        &app,
        Method::PUT,
        &format!("/api/tasks/{id}"),
        Some(json!({ "title": "Call mum", "dueDate": null, "notes": null })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(cleared.get("dueDate").is_none());
    assert!(cleared.get("notes").is_none());
}

#[tokio::test]
async fn invalid_tasks_are_client_errors() {
    let app = offline_app();

    let (status, body) = send(&app, Method::POST, "/api/tasks", Some(json!({ "title": "  " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("title"));

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/tasks",
        Some(json!({ "title": "Revise", "category": "Study" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("Study"));

    let (status, body) = send(&app, Method::POST, "/api/tasks", Some(json!({ "priority": "low" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("title"));

    let (status, body) = send(&app, Method::GET, "/api/tasks/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());

    let missing = uuid::Uuid::new_v4();
    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/tasks/{missing}"),
        Some(json!({ "priority": "low" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, &format!("/api/tasks/{missing}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// MOODS
// =============================================================================

#[tokio::test]
async fn mood_history_is_newest_first_and_bounded() {
    let app = offline_app();

    let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    for hour in 1..=55 {
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/moods",
            Some(json!({
                "mood": "calm",
                "emoji": "🙂",
                "timestamp": (start + chrono::Duration::hours(hour)).to_rfc3339(),
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, moods) = send(&app, Method::GET, "/api/moods", None).await;
    assert_eq!(status, StatusCode::OK);
    let moods = moods.as_array().unwrap();
    assert_eq!(moods.len(), 50);

    let stamps: Vec<&str> = moods.iter().map(|m| m["timestamp"].as_str().unwrap()).collect();
    let mut sorted = stamps.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(stamps, sorted);
    assert!(stamps[0].starts_with("2026-01-03T07:00:00"));

    let (status, cleared) = send(&app, Method::DELETE, "/api/moods", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cleared["message"], "Mood history cleared");
    assert_eq!(cleared["deleted"], 55);

    let (_, moods) = send(&app, Method::GET, "/api/moods", None).await;
    assert_eq!(moods, json!([]));
}

#[tokio::test]
async fn mood_requires_mood_and_emoji() {
    let app = offline_app();
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/moods",
        Some(json!({ "mood": "happy", "emoji": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, Method::POST, "/api/moods", Some(json!({ "mood": "happy" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("emoji"));

    let (status, created) = send(
        &app,
        Method::POST,
        "/api/moods",
        Some(json!({ "mood": "happy", "emoji": "😊", "notes": "sunny" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["notes"], "sunny");
    assert!(created["timestamp"].is_string());
}

// =============================================================================
// ANALYTICS
// =============================================================================

#[tokio::test]
async fn analytics_summary_counts_tasks() {
    let app = offline_app();

    let (_, body) = send(&app, Method::GET, "/api/analytics/summary", None).await;
    assert_eq!(
        body,
        json!({ "total": 0, "completed": 0, "active": 0, "completionRate": 0 })
    );

    send(&app, Method::POST, "/api/tasks", Some(json!({ "title": "a" }))).await;
    send(
        &app,
        Method::POST,
        "/api/tasks",
        Some(json!({ "title": "b", "status": "completed" })),
    )
    .await;

    let (_, body) = send(&app, Method::GET, "/api/analytics/summary", None).await;
    assert_eq!(
        body,
        json!({ "total": 2, "completed": 1, "active": 1, "completionRate": 50 })
    );
}

// =============================================================================
// AI
// =============================================================================

#[tokio::test]
async fn offline_ai_endpoints() {
    let app = offline_app();

    let (status, suggestions) = send(&app, Method::GET, "/api/ai/suggestions", None).await;
    assert_eq!(status, StatusCode::OK);
    let suggestions = suggestions.as_array().unwrap();
    assert_eq!(suggestions.len(), 4);
    for s in suggestions {
        assert!(!s["title"].as_str().unwrap().is_empty());
        assert!(["Work", "Personal", "Wellness", "Errands"].contains(&s["category"].as_str().unwrap()));
        assert!(["low", "medium", "high"].contains(&s["priority"].as_str().unwrap()));
    }

    let (_, upper) = send(&app, Method::POST, "/api/ai/mood-advice", Some(json!({ "mood": "HAPPY" }))).await;
    let (_, lower) = send(&app, Method::POST, "/api/ai/mood-advice", Some(json!({ "mood": "happy" }))).await;
    assert_eq!(upper, lower);
    assert_eq!(strings(&upper).len(), 3);

    let (_, unknown) = send(&app, Method::POST, "/api/ai/mood-advice", Some(json!({ "mood": "meh" }))).await;
    let (_, calm) = send(&app, Method::POST, "/api/ai/mood-advice", Some(json!({ "mood": "calm" }))).await;
    assert_eq!(unknown, calm);

    let (_, tips) = send(&app, Method::GET, "/api/ai/tips", None).await;
    assert_eq!(strings(&tips).len(), 4);

    let (status, classified) = send(
        &app,
        Method::POST,
        "/api/ai/classify",
        Some(json!({ "text": "pick up dry cleaning" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(classified["title"], "pick up dry cleaning");

    let (status, _) = send(&app, Method::POST, "/api/ai/classify", Some(json!({ "text": "" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn summary_covers_active_tasks_only() {
    let app = offline_app();
    send(&app, Method::POST, "/api/tasks", Some(json!({ "title": "Done already", "status": "completed" }))).await;
    send(&app, Method::POST, "/api/tasks", Some(json!({ "title": "Call plumber" }))).await;

    let (status, body) = send(&app, Method::GET, "/api/ai/summary", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"], "You have 1 tasks. Focus on \"Call plumber\".");
}

#[tokio::test]
async fn analyze_image_needs_an_upload() {
    let app = offline_app();

    let response = app
        .clone()
        .oneshot(multipart_request("avatar", b"\x89PNG"))
        .await
        .unwrap();
    let (status, body) = read(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No image uploaded");

    let response = app
        .clone()
        .oneshot(multipart_request("image", b"\x89PNG\r\n\x1a\n"))
        .await
        .unwrap();
    let (status, body) = read(response).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["mood"].is_string());
    let confidence = body["confidence"].as_f64().unwrap();
    assert!((0.74..=0.96).contains(&confidence));
}

#[tokio::test]
async fn unreachable_provider_falls_back_to_offline() {
    let mut config = AiConfig {
        mode: AiMode::OpenAi,
        request_timeout: Some(Duration::from_secs(5)),
        ..AiConfig::default()
    };
    config.openai.base_url = "http://127.0.0.1:1".to_string();
    let app = app_with(AiDispatcher::from_config(&config));

    let (status, advice) = send(
        &app,
        Method::POST,
        "/api/ai/mood-advice",
        Some(json!({ "mood": "stressed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        strings(&advice),
        vec![
            "Breathe 4-7-8 for 3 rounds.",
            "Take a brief walk.",
            "Break tasks into 3 small steps.",
        ]
    );

    // OpenAI has no vision support and says so instead of guessing a mood.
    let response = app
        .clone()
        .oneshot(multipart_request("image", b"\xff\xd8\xff"))
        .await
        .unwrap();
    let (status, body) = read(response).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["error"].as_str().unwrap().contains("not supported"));
    assert!(body.get("mood").is_none());
}

#[tokio::test]
async fn exhausted_fallback_yields_empty_results() {
    let app = app_with(AiDispatcher::new(
        AiMode::Gemini,
        Arc::new(NoCapabilities),
        Arc::new(NoCapabilities),
    ));

    let (status, body) = send(&app, Method::GET, "/api/ai/suggestions", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (_, body) = send(&app, Method::GET, "/api/ai/tips", None).await;
    assert_eq!(body, json!([]));

    let (status, body) = send(&app, Method::POST, "/api/ai/classify", Some(json!({ "text": "x" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null);

    let (_, body) = send(&app, Method::GET, "/api/ai/summary", None).await;
    assert_eq!(body, Value::Null);
}

#[tokio::test]
async fn unknown_paths_fall_through_to_static_files() {
    let app = offline_app();
    let (status, _) = send(&app, Method::GET, "/calendar.html", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
