use std::sync::atomic::Ordering;

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::state::AppState;

/// Structured health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub connections: usize,
    pub lobbies: LobbyInfo,
}

#[derive(Serialize)]
pub struct LobbyInfo {
    pub active: usize,
    pub players: usize,
}

/// Structured health check endpoint. Returns server status, the WebSocket
/// connection count, and lobby info as JSON.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let connections = state.ws_connection_count.load(Ordering::Relaxed);
    let (active, players) = state.lobbies.stats().await;

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        connections,
        lobbies: LobbyInfo { active, players },
    })
}

/// Readiness check — verifies essential subsystems are initialized.
pub async fn readiness_check(State(state): State<AppState>) -> &'static str {
    if state.lobbies.word_count() == 0 {
        return "not ready: empty word list";
    }
    "ready"
}
