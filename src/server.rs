//! Thin HTTP entrypoint: framing only.
//!
//! Parses the JSON body, lowers headers and cookies into plain maps, rejects
//! non-JSON content types, and writes the envelope the orchestrator chose.
//! No translation or validation logic lives here.

use crate::error::{ErrorCode, NormalizedError};
use crate::model::CanonicalResponse;
use crate::state::AppState;
use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

pub const CORRELATION_HEADER: &str = "x-correlation-id";

/// POST /graphql
pub async fn graphql_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header_map = lower_headers(&headers);
    let correlation_id = header_map
        .get(CORRELATION_HEADER)
        .cloned()
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    if !is_json_content_type(&header_map) {
        let error = NormalizedError::gateway(ErrorCode::ValidationError)
            .message("Content-Type must be application/json")
            .http_status(415);
        return envelope(415, &correlation_id, CanonicalResponse::from_error(error));
    }

    let cookies = parse_cookies(header_map.get("cookie").map(String::as_str).unwrap_or(""));
    let reply = state.gateway().handle(&body, &header_map, &cookies).await;
    envelope(reply.status, &reply.correlation_id, reply.response)
}

fn envelope(status: u16, correlation_id: &str, response: CanonicalResponse) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::OK);
    (
        status,
        [("X-Correlation-ID", correlation_id.to_string())],
        Json(response),
    )
        .into_response()
}

fn is_json_content_type(headers: &HashMap<String, String>) -> bool {
    headers
        .get("content-type")
        .map(|v| v.trim().to_ascii_lowercase().starts_with("application/json"))
        .unwrap_or(false)
}

fn lower_headers(headers: &HeaderMap) -> HashMap<String, String> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
        })
        .collect()
}

fn parse_cookies(raw: &str) -> HashMap<String, String> {
    raw.split(';')
        .filter_map(|pair| {
            let (name, value) = pair.split_once('=')?;
            let name = name.trim();
            (!name.is_empty()).then(|| (name.to_string(), value.trim().to_string()))
        })
        .collect()
}
