//! Liveness HTTP endpoint for external uptime monitors.
//!
//! Serves a static body only; it shares no state with the update loop.

use std::net::SocketAddr;

use anyhow::Context;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Build the liveness router.
pub fn router() -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
}

/// Serve the liveness endpoint until `cancel` fires.
pub async fn run_liveness_server(
    host: &str,
    port: u16,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .context("invalid liveness bind address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind liveness endpoint on {addr}"))?;

    info!("Liveness endpoint listening on http://{addr}/");

    axum::serve(listener, router())
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
        .context("liveness server error")
}

/// GET / — static body for uptime pingers.
async fn root_handler() -> &'static str {
    "Bot is running!"
}

/// GET /health — simple HTTP health check.
async fn health_handler() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
