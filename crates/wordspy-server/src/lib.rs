pub mod config;
pub mod error;
pub mod health;
pub mod registry;
pub mod state;
pub mod ws;

use axum::Router;
use tower_http::services::ServeDir;

use wordspy_core::words::WordList;

use config::ServerConfig;
use state::AppState;

/// Build the Axum router and application state from a config and word list.
pub fn build_app(config: ServerConfig, words: WordList) -> (Router<()>, AppState) {
    let web_root = config.web_root.clone();
    let state = AppState::new(config, words);

    let app = Router::new()
        .route("/ws", axum::routing::get(ws::ws_handler))
        .route("/healthz", axum::routing::get(health::health_check))
        .route("/readyz", axum::routing::get(health::readiness_check))
        .fallback_service(ServeDir::new(&web_root))
        .with_state(state.clone());

    (app, state)
}
