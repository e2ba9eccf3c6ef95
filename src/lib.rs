pub mod auth;
pub mod backend;
pub mod cache;
pub mod cart;
pub mod config;
pub mod context;
pub mod error;
pub mod gateway;
pub mod health;
pub mod logging;
pub mod metrics;
pub mod model;
pub mod registry;
pub mod server;
pub mod state;
pub mod translate;
pub mod validation;

pub use config::{CliArgs, GatewayConfig};
pub use error::{ErrorCode, ErrorSource, NormalizedError, Severity};
pub use gateway::{Gateway, GatewayReply};
pub use logging::{LoggingConfig, init_logging};
pub use model::{CanonicalRequest, CanonicalResponse};
pub use state::AppState;

use anyhow::Result;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use std::sync::Arc;
use tokio::net::TcpListener;

/// Assemble the HTTP surface: the canonical endpoint plus operational routes.
/// The payload cap is enforced at the framing layer too, so oversized bodies
/// never reach the core.
pub fn router(state: Arc<AppState>) -> Router {
    let max_body = state.config().max_payload_bytes;
    Router::new()
        .route("/graphql", post(server::graphql_handler))
        .route("/health", get(health::liveness_handler))
        .route("/ready", get(health::readiness_handler))
        .route("/metrics", get(metrics_handler))
        .layer(DefaultBodyLimit::max(max_body))
        .with_state(state)
}

async fn metrics_handler() -> (axum::http::StatusCode, String) {
    let metrics_text = metrics::METRICS.encode();
    (axum::http::StatusCode::OK, metrics_text)
}

pub async fn run_server(config: GatewayConfig) -> Result<()> {
    let config = Arc::new(config);
    let state = Arc::new(AppState::new(config.clone())?);

    tracing::info!(
        backend = %config.backend_url,
        store = %config.store_code,
        "starting storefront gateway",
    );

    let app = router(state);
    let listener = TcpListener::bind(config.http_bind_address).await?;
    let actual_addr = listener.local_addr()?;
    tracing::info!(bind = %actual_addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown signal received");
        })
        .await?;
    Ok(())
}
