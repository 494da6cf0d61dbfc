//! HTTP + WebSocket API for Liveguard
//!
//! Endpoints:
//! - POST /session/new - Create new session
//! - GET /session/{id} - Get session output
//! - POST /session/{id}/event - Apply an operator event
//! - WS /ws/{id} - Live updates
//! - GET /health - Health check

use axum::{
    extract::{Path, State, WebSocketUpgrade, ws::{Message, WebSocket}},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info};

use crate::core::{SessionConfig, SimulatedCapture, VerificationSession};
use crate::types::{MediaError, SessionError, SessionOutput, VerificationEvent};

/// How often pending behavioral advances are polled
pub const TICK_INTERVAL_MS: u64 = 100;

/// Hosted session
#[derive(Debug)]
pub struct HostedSession {
    pub session: VerificationSession,
    pub update_tx: broadcast::Sender<SessionOutput>,
}

impl HostedSession {
    /// Fire a due behavioral advance and notify subscribers
    fn tick(&mut self) {
        if let Some(output) = self.session.tick() {
            let _ = self.update_tx.send(output);
        }
    }
}

/// App state
pub struct AppState {
    pub sessions: RwLock<HashMap<String, HostedSession>>,
    pub config: SessionConfig,
    next_id: AtomicU64,
}

impl AppState {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            config,
            next_id: AtomicU64::new(1),
        }
    }
}

/// Create new session request
#[derive(Debug, Default, Deserialize)]
pub struct NewSessionRequest {
    /// Simulate a camera/microphone denial for this session
    #[serde(default)]
    pub deny_media: bool,
}

/// Create new session response
#[derive(Debug, Serialize)]
pub struct NewSessionResponse {
    pub session_id: String,
    pub websocket_url: String,
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub sessions_active: usize,
    pub media_streams: usize,
}

/// Error body for rejected events
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(ErrorResponse { error: message.into() }))
}

impl From<SessionError> for (StatusCode, Json<ErrorResponse>) {
    fn from(err: SessionError) -> Self {
        let status = match err {
            SessionError::MediaAccess(_) => StatusCode::SERVICE_UNAVAILABLE,
            SessionError::InvalidEvent { .. } | SessionError::AlreadyStarted(_) => StatusCode::CONFLICT,
        };
        api_error(status, err.to_string())
    }
}

/// Create the API router
pub fn create_router(config: SessionConfig) -> Router {
    create_router_with_state(Arc::new(AppState::new(config)))
}

/// Create the API router over existing state
pub fn create_router_with_state(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/session/new", post(create_session))
        .route("/session/:id", get(get_session))
        .route("/session/:id/event", post(post_event))
        .route("/ws/:id", get(websocket_handler))
        .with_state(state)
}

/// Health check endpoint
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let sessions = state.sessions.read().await;
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
        sessions_active: sessions.len(),
        media_streams: sessions.values().map(|h| h.session.open_streams()).sum(),
    })
}

/// Create new session
async fn create_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewSessionRequest>,
) -> Json<NewSessionResponse> {
    let session_id = generate_session_id(&state.next_id);
    let (tx, _) = broadcast::channel(100);

    let capture = if req.deny_media {
        SimulatedCapture::denied(MediaError::Denied("NotAllowedError".to_string()))
    } else {
        SimulatedCapture::granted()
    };

    let hosted = HostedSession {
        session: VerificationSession::with_capture(state.config.clone(), Box::new(capture)),
        update_tx: tx,
    };

    let mut sessions = state.sessions.write().await;
    sessions.insert(session_id.clone(), hosted);
    info!(session_id = %session_id, deny_media = req.deny_media, "session created");

    Json(NewSessionResponse {
        session_id: session_id.clone(),
        websocket_url: format!("/ws/{}", session_id),
    })
}

/// Get session output
async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionOutput>, ApiError> {
    let mut sessions = state.sessions.write().await;
    let hosted = sessions
        .get_mut(&id)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, format!("session {} not found", id)))?;

    hosted.tick();
    Ok(Json(hosted.session.output()))
}

/// Apply an event to a session
async fn post_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(event): Json<VerificationEvent>,
) -> Result<Json<SessionOutput>, ApiError> {
    let mut sessions = state.sessions.write().await;
    let hosted = sessions
        .get_mut(&id)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, format!("session {} not found", id)))?;

    hosted.tick();
    debug!(session_id = %id, event = event.name(), "applying event");
    let output = hosted.session.apply(event)?;
    let _ = hosted.update_tx.send(output.clone());

    Ok(Json(output))
}

/// WebSocket handler for live updates
async fn websocket_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, StatusCode> {
    let sessions = state.sessions.read().await;
    let hosted = sessions.get(&id).ok_or(StatusCode::NOT_FOUND)?;
    let rx = hosted.update_tx.subscribe();
    drop(sessions);

    Ok(ws.on_upgrade(move |socket| async move {
        handle_websocket(socket, rx).await;
    }))
}

/// Handle WebSocket connection
async fn handle_websocket(mut socket: WebSocket, mut rx: broadcast::Receiver<SessionOutput>) {
    while let Ok(update) = rx.recv().await {
        let json = serde_json::to_string(&update).unwrap_or_default();
        if socket.send(Message::Text(json)).await.is_err() {
            break;
        }
    }
}

/// Poll every session so debounced advances fire without client input
pub fn spawn_ticker(state: Arc<AppState>, period: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            let mut sessions = state.sessions.write().await;
            for hosted in sessions.values_mut() {
                hosted.tick();
            }
        }
    })
}

/// Generate session ID
fn generate_session_id(counter: &AtomicU64) -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default();
    let seq = counter.fetch_add(1, Ordering::Relaxed);
    format!("session_{:x}_{}", nanos, seq)
}

/// Run the API server
pub async fn run_server(addr: &str, config: SessionConfig) -> Result<(), Box<dyn std::error::Error>> {
    let state = Arc::new(AppState::new(config));
    let _ticker = spawn_ticker(state.clone(), Duration::from_millis(TICK_INTERVAL_MS));
    let router = create_router_with_state(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "api listening");
    println!("Liveguard API running on {}", addr);
    println!("  POST /session/new       - Create session");
    println!("  GET  /session/:id       - Get status");
    println!("  POST /session/:id/event - Apply event");
    println!("  WS   /ws/:id            - Live updates");
    println!("  GET  /health            - Health check");
    axum::serve(listener, router).await?;
    Ok(())
}
