#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;
use storefront_gateway::backend::{BackendRequest, BackendResponse, GraphqlBackend};
use storefront_gateway::config::GatewayConfig;
use storefront_gateway::context::RequestContext;
use storefront_gateway::state::AppState;

/// Scripted backend for pipeline tests: queued responses are returned in
/// order, then the repeat template (when set) forever after. Every request
/// is recorded.
pub struct MockBackend {
    queued: Mutex<VecDeque<BackendResponse>>,
    repeat: Option<BackendResponse>,
    pub requests: Mutex<Vec<BackendRequest>>,
}

impl MockBackend {
    pub fn with_responses(responses: Vec<BackendResponse>) -> Self {
        Self {
            queued: Mutex::new(responses.into()),
            repeat: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// The same response for every call.
    pub fn always(response: BackendResponse) -> Self {
        Self {
            queued: Mutex::new(VecDeque::new()),
            repeat: Some(response),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_data(data: Value) -> Self {
        Self::always(BackendResponse {
            data: Some(data),
            errors: Vec::new(),
        })
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn request_at(&self, index: usize) -> BackendRequest {
        self.requests.lock()[index].clone()
    }
}

#[async_trait]
impl GraphqlBackend for MockBackend {
    async fn execute(&self, request: &BackendRequest, _ctx: &RequestContext) -> BackendResponse {
        self.requests.lock().push(request.clone());
        if let Some(response) = self.queued.lock().pop_front() {
            return response;
        }
        self.repeat.clone().unwrap_or_default()
    }
}

pub fn test_config() -> GatewayConfig {
    GatewayConfig {
        backend_url: "http://backend.test/graphql".to_string(),
        store_code: "default".to_string(),
        locale: "en_US".to_string(),
        currency: "USD".to_string(),
        backend_timeout: std::time::Duration::from_secs(5),
        retry_max_attempts: 3,
        max_payload_bytes: 1024 * 1024,
        max_query_depth: 10,
        product_cache_ttl: std::time::Duration::ZERO,
        category_cache_ttl: std::time::Duration::ZERO,
        rate_limits: Default::default(),
        http_bind_address: "127.0.0.1:0".parse().expect("bind addr"),
    }
}

pub fn app_with_backend(backend: Arc<MockBackend>) -> AppState {
    AppState::with_backend(Arc::new(test_config()), backend)
}

pub fn graphql_body(query: &str) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({ "query": query })).expect("body serializes")
}
