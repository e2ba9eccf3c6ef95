//! Prometheus metrics for gateway observability.
//!
//! A single process-wide registry exposed on `/metrics`; request-scoped state
//! stays out of here, only counters and histograms.

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use prometheus_client::encoding::{EncodeLabelSet, text::encode};
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::histogram::{Histogram, exponential_buckets};
use prometheus_client::registry::Registry;
use std::sync::Arc;

pub static METRICS: Lazy<Arc<MetricsCollector>> = Lazy::new(|| Arc::new(MetricsCollector::new()));

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct RequestLabels {
    /// Canonical operation name, or "unknown" before resolution
    pub operation: String,
    /// "ok" or "error"
    pub status: String,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct OperationLabels {
    pub operation: String,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct ErrorLabels {
    pub operation: String,
    /// Canonical error code
    pub code: String,
}

pub struct MetricsCollector {
    registry: RwLock<Registry>,

    /// Canonical requests by operation and outcome
    pub requests_total: Family<RequestLabels, Counter>,
    /// End-to-end request latency by operation
    pub request_duration_seconds: Family<OperationLabels, Histogram>,
    /// Normalized errors attached to responses
    pub errors_total: Family<ErrorLabels, Counter>,
    /// Wire calls issued to the backend
    pub backend_calls_total: Counter,
    /// Backend calls re-issued after a retryable error
    pub backend_retries_total: Counter,
    /// Category product listings that needed the anchored fallback
    pub category_fallback_total: Counter,
    /// Guest→customer cart merges attempted
    pub cart_merges_total: Counter,
    pub cache_hits_total: Counter,
    pub cache_misses_total: Counter,
}

impl MetricsCollector {
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let requests_total = Family::<RequestLabels, Counter>::default();
        registry.register(
            "gateway_requests_total",
            "Total canonical requests",
            requests_total.clone(),
        );

        let request_duration_seconds =
            Family::<OperationLabels, Histogram>::new_with_constructor(|| {
                Histogram::new(exponential_buckets(0.01, 2.5, 10))
            });
        registry.register(
            "gateway_request_duration_seconds",
            "Request latency histogram in seconds",
            request_duration_seconds.clone(),
        );

        let errors_total = Family::<ErrorLabels, Counter>::default();
        registry.register(
            "gateway_errors_total",
            "Normalized errors by operation and code",
            errors_total.clone(),
        );

        let backend_calls_total = Counter::default();
        registry.register(
            "gateway_backend_calls_total",
            "GraphQL calls issued to the backend",
            backend_calls_total.clone(),
        );

        let backend_retries_total = Counter::default();
        registry.register(
            "gateway_backend_retries_total",
            "Backend calls re-issued after retryable errors",
            backend_retries_total.clone(),
        );

        let category_fallback_total = Counter::default();
        registry.register(
            "gateway_category_fallback_total",
            "Category listings answered via the anchored-category fallback",
            category_fallback_total.clone(),
        );

        let cart_merges_total = Counter::default();
        registry.register(
            "gateway_cart_merges_total",
            "Guest cart merges attempted",
            cart_merges_total.clone(),
        );

        let cache_hits_total = Counter::default();
        registry.register(
            "gateway_cache_hits_total",
            "Response cache hits",
            cache_hits_total.clone(),
        );

        let cache_misses_total = Counter::default();
        registry.register(
            "gateway_cache_misses_total",
            "Response cache misses",
            cache_misses_total.clone(),
        );

        Self {
            registry: RwLock::new(registry),
            requests_total,
            request_duration_seconds,
            errors_total,
            backend_calls_total,
            backend_retries_total,
            category_fallback_total,
            cart_merges_total,
            cache_hits_total,
            cache_misses_total,
        }
    }

    pub fn record_request(&self, operation: &str, ok: bool, duration_secs: f64) {
        self.requests_total
            .get_or_create(&RequestLabels {
                operation: operation.to_string(),
                status: if ok { "ok" } else { "error" }.to_string(),
            })
            .inc();
        self.request_duration_seconds
            .get_or_create(&OperationLabels {
                operation: operation.to_string(),
            })
            .observe(duration_secs);
    }

    pub fn record_error(&self, operation: &str, code: &str) {
        self.errors_total
            .get_or_create(&ErrorLabels {
                operation: operation.to_string(),
                code: code.to_string(),
            })
            .inc();
    }

    /// Encode the registry in Prometheus text exposition format.
    pub fn encode(&self) -> String {
        let mut output = String::new();
        if let Err(error) = encode(&mut output, &self.registry.read()) {
            tracing::error!("failed to encode metrics: {}", error);
        }
        output
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}
