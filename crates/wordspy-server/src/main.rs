use std::net::SocketAddr;
use std::path::Path;

use tracing_subscriber::EnvFilter;

use wordspy_core::words::WordList;
use wordspy_server::build_app;
use wordspy_server::config::ServerConfig;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = ServerConfig::load();
    config.validate();

    let words = match config.word_list {
        Some(ref path) => match WordList::load(Path::new(path)) {
            Ok(words) => words,
            Err(e) => {
                tracing::error!(path = %path, error = %e, "Failed to load word list");
                std::process::exit(1);
            },
        },
        None => WordList::default(),
    };
    tracing::info!(words = words.len(), "Word list ready");

    let listen_addr = config.listen_addr.clone();
    let (app, _state) = build_app(config, words);

    let listener = match tokio::net::TcpListener::bind(&listen_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(addr = %listen_addr, error = %e, "Failed to bind");
            std::process::exit(1);
        },
    };

    tracing::info!(addr = %listen_addr, "Wordspy server listening");
    if let Err(e) = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    {
        tracing::error!(error = %e, "Server exited with error");
    }
}
