//! Router tests driven through `tower::ServiceExt::oneshot`.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use studyplan_core::Database;
use studyplan_server::{build_router, AppState};
use tower::ServiceExt;

fn app() -> Router {
    build_router(AppState::new(Database::open_in_memory().unwrap()))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(
            String::from_utf8_lossy(&bytes).into_owned(),
        ))
    };
    (status, value)
}

#[tokio::test]
async fn health_is_outside_api_prefix() {
    let app = app();
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("ok".into()));
}

#[tokio::test]
async fn start_then_stop_session() {
    let app = app();
    let (status, started) = send(
        &app,
        "POST",
        "/api/sessions/start",
        Some(json!({ "subject_id": 1, "topic_id": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(started["type"], "pomodoro");
    assert!(started["end_time"].is_null());
    assert!(started["duration_minutes"].is_null());
    assert!(started["user_id"].is_null());
    let id = started["id"].as_i64().unwrap();

    let (status, stopped) = send(
        &app,
        "POST",
        "/api/sessions/stop",
        Some(json!({ "session_id": id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stopped["id"], id);
    assert_eq!(stopped["duration_minutes"], 0);
    let start = stopped["start_time"].as_str().unwrap();
    let end = stopped["end_time"].as_str().unwrap();
    assert!(end >= start);
}

#[tokio::test]
async fn stop_requires_existing_session_id() {
    let app = app();
    let (status, body) = send(&app, "POST", "/api/sessions/stop", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("session_id"));

    let (status, body) = send(
        &app,
        "POST",
        "/api/sessions/stop",
        Some(json!({ "session_id": 404 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "session 404 not found");
}

#[tokio::test]
async fn list_and_stats_apply_filters() {
    let app = app();
    for subject in [1, 1, 2] {
        send(
            &app,
            "POST",
            "/api/sessions/start",
            Some(json!({ "subject_id": subject })),
        )
        .await;
    }
    send(&app, "POST", "/api/sessions/stop", Some(json!({ "session_id": 1 }))).await;

    let (status, all) = send(&app, "GET", "/api/sessions", None).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<i64> = all
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![3, 2, 1]);

    let (_, subject_one) = send(&app, "GET", "/api/sessions?subject_id=1", None).await;
    assert_eq!(subject_one.as_array().unwrap().len(), 2);

    let (_, before_everything) = send(
        &app,
        "GET",
        "/api/sessions?subject_id=1&to=2000-01-01T00:00:00.000Z",
        None,
    )
    .await;
    assert!(before_everything.as_array().unwrap().is_empty());

    let (status, stats) = send(&app, "GET", "/api/sessions/stats?subject_id=1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total_sessions"], 2);
    assert_eq!(stats["open_sessions"], 1);
    assert_eq!(stats["closed_sessions"], 1);
    assert_eq!(stats["total_minutes"], 0);
}

#[tokio::test]
async fn subject_and_topic_lifecycle() {
    let app = app();
    let (status, subject) = send(
        &app,
        "POST",
        "/api/subjects",
        Some(json!({ "name": "Chemistry", "color": "#33aa33" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(subject["priority"], 1);
    let subject_id = subject["id"].as_i64().unwrap();

    let (status, topic) = send(
        &app,
        "POST",
        &format!("/api/subjects/{subject_id}/topics"),
        Some(json!({ "title": "Stoichiometry" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(topic["estimated_minutes"], 30);
    assert_eq!(topic["completed"], false);
    let topic_id = topic["id"].as_i64().unwrap();

    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/api/topics/{topic_id}"),
        Some(json!({ "completed": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["completed"], true);
    assert_eq!(updated["title"], "Stoichiometry");

    let (_, topics) = send(&app, "GET", &format!("/api/subjects/{subject_id}/topics"), None).await;
    assert_eq!(topics.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, "DELETE", &format!("/api/subjects/{subject_id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "DELETE", &format!("/api/topics/{topic_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "GET", &format!("/api/subjects/{subject_id}/topics"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn catalog_validation_errors() {
    let app = app();
    let (status, body) = send(&app, "POST", "/api/subjects", Some(json!({ "name": "  " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("name"));

    let (status, _) = send(
        &app,
        "POST",
        "/api/subjects/77/topics",
        Some(json!({ "title": "Nowhere" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, subject) = send(&app, "POST", "/api/subjects", Some(json!({ "name": "Art" }))).await;
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/subjects/{}/topics", subject["id"]),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "PUT", "/api/topics/5", Some(json!({ "title": "x" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn blank_query_parameters_place_no_constraint() {
    let app = app();
    let (_, started) = send(
        &app,
        "POST",
        "/api/sessions/start",
        Some(json!({ "subject_id": 5 })),
    )
    .await;

    let (status, sessions) = send(
        &app,
        "GET",
        "/api/sessions?subject_id=&topic_id=&from=&to=",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sessions.as_array().unwrap().len(), 1);
    assert_eq!(sessions[0]["id"], started["id"]);

    let (status, stats) = send(&app, "GET", "/api/sessions/stats?subject_id=&topic_id=", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total_sessions"], 1);

    let (status, body) = send(&app, "GET", "/api/sessions?subject_id=math", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn malformed_requests_answer_with_json_errors() {
    let app = app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/sessions/stop")
        .header("content-type", "application/json")
        .body(Body::from("{\"session_id\": "))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].is_string());

    let (status, body) = send(
        &app,
        "POST",
        "/api/sessions/stop",
        Some(json!({ "session_id": "seven" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = send(&app, "DELETE", "/api/topics/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}
