//! Liveness and readiness handlers.

use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ReadinessStatus {
    pub status: &'static str,
    pub backend_url: String,
}

/// Process is up.
pub async fn liveness_handler() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Configuration resolved and the pipeline is wired; the backend itself is
/// not probed here; a dead backend surfaces per-request as normalized
/// upstream errors, not as gateway unreadiness.
pub async fn readiness_handler(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<ReadinessStatus>) {
    let config = state.config();
    (
        StatusCode::OK,
        Json(ReadinessStatus {
            status: "ready",
            backend_url: config.backend_url.clone(),
        }),
    )
}
