use axum::{Router, routing::get, routing::post};
use tokio::net::TcpListener;
use tower_http::decompression::RequestDecompressionLayer;
use tracing::info;

use super::{
    services::{clear_logs, extract_files, health, logs, metadata, proxy},
    state::AppState,
};
use crate::config::Config;

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/metadata", post(metadata))
        .route("/api/extract-files", post(extract_files))
        .route("/api/proxy", get(proxy))
        .route("/api/logs", get(logs))
        .route("/api/clear-logs", post(clear_logs))
        .route("/health", get(health))
        .with_state(state)
        // gzip request bodies are inflated before the JSON handlers see them
        .layer(RequestDecompressionLayer::new())
}

pub async fn run(config: Config) -> Result<(), AnyError> {
    let address = config.server.bind_addr;
    let state = AppState::new(config).map_err(|e| format!("Failed to build HTTP client: {e}"))?;
    let app = router(state);

    let listener = TcpListener::bind(address).await?;
    info!(%address, "sharebox listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        let mut sigterm = signal(SignalKind::terminate()).expect("failed to install signal handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
