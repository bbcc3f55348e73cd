//! Router and plain HTTP handlers.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::websocket::media_stream_handler;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/media-stream", get(media_stream_handler))
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/api/sessions", get(list_sessions))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

#[derive(Serialize)]
struct ReadyResponse {
    status: &'static str,
    active_calls: usize,
}

async fn ready(State(state): State<AppState>) -> Json<ReadyResponse> {
    Json(ReadyResponse {
        status: "ready",
        active_calls: state.registry.len(),
    })
}

#[derive(Serialize)]
struct SessionSummary {
    stream_sid: String,
    session_id: String,
    state: String,
}

async fn list_sessions(State(state): State<AppState>) -> Json<Vec<SessionSummary>> {
    let sessions = state
        .registry
        .snapshot()
        .into_iter()
        .map(|(stream_sid, session_id, call_state)| SessionSummary {
            stream_sid,
            session_id,
            state: format!("{call_state:?}"),
        })
        .collect();
    Json(sessions)
}
