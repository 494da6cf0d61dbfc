//! Integration tests for the HTTP API
//!
//! Tests endpoints against a shared router state

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use liveguard::core::{create_router, create_router_with_state, spawn_ticker, AppState, SessionConfig};
use liveguard::types::{StepStatus, VerificationStep};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

fn create_test_router() -> Router {
    create_router(SessionConfig::default())
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn new_session(app: &Router, body: &str) -> String {
    let (status, json) = send(app, "POST", "/session/new", Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    json["session_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_router();
    let (status, json) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["sessions_active"], 0);
    assert_eq!(json["media_streams"], 0);
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_create_session() {
    let app = create_test_router();
    let (status, json) = send(&app, "POST", "/session/new", Some("{}")).await;

    assert_eq!(status, StatusCode::OK);
    let id = json["session_id"].as_str().unwrap();
    assert_eq!(json["websocket_url"], format!("/ws/{}", id));

    let (status, json) = send(&app, "GET", &format!("/session/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["step"], "idle");
    assert_eq!(json["percentage"], 0);
    assert_eq!(json["statuses"]["gesture"], "pending");
}

#[tokio::test]
async fn test_session_not_found() {
    let app = create_test_router();

    let (status, _) = send(&app, "GET", "/session/nonexistent", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "POST", "/session/nonexistent/event", Some(r#"{"type":"start"}"#)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_full_session_flow() {
    let app = create_router(SessionConfig {
        debounce: Duration::from_millis(0),
        ..SessionConfig::default()
    });
    let id = new_session(&app, "{}").await;
    let uri = format!("/session/{}/event", id);

    let (status, json) = send(&app, "POST", &uri, Some(r#"{"type":"start"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["step"], "gesture");
    assert_eq!(json["gesture_prompt"], "Show 2 fingers");
    assert_eq!(json["media_active"], true);

    for event in [
        r#"{"type":"gesture_pass","duration_ms":450}"#,
        r#"{"type":"latency_detect","matched":true}"#,
        r#"{"type":"audio_human"}"#,
        r#"{"type":"behavioral_flag_changed","flag":"urgency","value":true}"#,
    ] {
        let (status, _) = send(&app, "POST", &uri, Some(event)).await;
        assert_eq!(status, StatusCode::OK, "{}", event);
    }

    // Zero debounce: the next request ticks the session into the knowledge step
    let (status, json) = send(&app, "POST", &uri, Some(r#"{"type":"knowledge_result","result":"correct"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["step"], "complete");
    // 90 - 2.5 = 87.5 of 90
    assert_eq!(json["percentage"], 97);
    assert_eq!(json["verdict"], "TRUSTED");
    assert_eq!(json["statuses"]["knowledge"], "completed");
}

#[tokio::test]
async fn test_out_of_order_event_conflicts() {
    let app = create_test_router();
    let id = new_session(&app, "{}").await;
    let uri = format!("/session/{}/event", id);

    send(&app, "POST", &uri, Some(r#"{"type":"start"}"#)).await;
    let (status, json) = send(&app, "POST", &uri, Some(r#"{"type":"audio_synthetic"}"#)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(json["error"].as_str().unwrap().contains("audio_synthetic"));

    let (status, _) = send(&app, "POST", &uri, Some(r#"{"type":"start"}"#)).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_media_denied_is_unavailable() {
    let app = create_test_router();
    let id = new_session(&app, r#"{"deny_media": true}"#).await;

    let (status, json) = send(&app, "POST", &format!("/session/{}/event", id), Some(r#"{"type":"start"}"#)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(json["error"].as_str().unwrap().contains("NotAllowedError"));

    let (_, json) = send(&app, "GET", &format!("/session/{}", id), None).await;
    assert_eq!(json["step"], "idle");
    assert_eq!(json["status"]["severity"], "error");
}

#[tokio::test]
async fn test_reset_event() {
    let state = Arc::new(AppState::new(SessionConfig::default()));
    let app = create_router_with_state(state.clone());
    let id = new_session(&app, "{}").await;
    let uri = format!("/session/{}/event", id);

    send(&app, "POST", &uri, Some(r#"{"type":"start"}"#)).await;
    send(&app, "POST", &uri, Some(r#"{"type":"gesture_fail"}"#)).await;
    let (status, json) = send(&app, "POST", &uri, Some(r#"{"type":"reset"}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["step"], "idle");
    assert_eq!(json["percentage"], 0);
    assert_eq!(json["media_active"], false);
    assert_eq!(state.sessions.read().await.len(), 1);

    let (_, json) = send(&app, "GET", "/health", None).await;
    assert_eq!(json["media_streams"], 0);
}

#[tokio::test]
async fn test_ticker_broadcasts_debounced_advance() {
    let state = Arc::new(AppState::new(SessionConfig {
        debounce: Duration::from_millis(200),
        ..SessionConfig::default()
    }));
    let app = create_router_with_state(state.clone());
    let _ticker = spawn_ticker(state.clone(), Duration::from_millis(50));
    let id = new_session(&app, "{}").await;
    let uri = format!("/session/{}/event", id);

    for event in [
        r#"{"type":"start"}"#,
        r#"{"type":"gesture_pass","duration_ms":450}"#,
        r#"{"type":"latency_detect","matched":true}"#,
        r#"{"type":"audio_human"}"#,
    ] {
        let (status, _) = send(&app, "POST", &uri, Some(event)).await;
        assert_eq!(status, StatusCode::OK, "{}", event);
    }

    let mut rx = state.sessions.read().await[&id].update_tx.subscribe();
    let (status, json) = send(
        &app,
        "POST",
        &uri,
        Some(r#"{"type":"behavioral_flag_changed","flag":"avoiding","value":true}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["step"], "behavioral");
    assert_eq!(json["advance_pending"], true);

    // No further requests: only the background ticker can close the step
    let advanced = tokio::time::timeout(Duration::from_secs(3), async {
        loop {
            let update = rx.recv().await.unwrap();
            if update.step == VerificationStep::Knowledge {
                return update;
            }
        }
    })
    .await
    .expect("debounced advance was not broadcast");

    assert!(!advanced.advance_pending);
    assert_eq!(advanced.statuses.behavioral, StepStatus::Completed);
    assert_eq!(state.sessions.read().await[&id].session.step(), VerificationStep::Knowledge);
}
