//! Backend GraphQL client: bounded-timeout execution plus a retrying variant.
//!
//! Every failure mode leaves this module already normalized. Callers only
//! ever see [`BackendResponse`] carrying canonical errors, never a raw
//! transport or GraphQL error.

use crate::auth::build_backend_auth_headers;
use crate::context::RequestContext;
use crate::error::{
    ErrorCode, NormalizedError, normalize_backend_graphql_error, normalize_backend_http_status,
};
use crate::metrics::METRICS;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, warn};

/// A GraphQL document in the backend's vocabulary. Built exclusively by
/// translators; never exposed to clients.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendRequest {
    pub query: String,
    pub variables: Map<String, Value>,
    pub operation_name: Option<String>,
}

impl BackendRequest {
    pub fn is_mutation(&self) -> bool {
        self.query.trim_start().starts_with("mutation")
    }
}

/// Backend execution result with all failures normalized.
#[derive(Debug, Clone, Default)]
pub struct BackendResponse {
    pub data: Option<Value>,
    pub errors: Vec<NormalizedError>,
}

impl BackendResponse {
    pub fn from_error(error: NormalizedError) -> Self {
        Self {
            data: None,
            errors: vec![error],
        }
    }

    pub fn has_retryable_error(&self) -> bool {
        self.errors.iter().any(|e| e.retryable)
    }
}

/// Seam between the orchestrator and the wire. The HTTP implementation below
/// is the production one; tests substitute their own.
#[async_trait]
pub trait GraphqlBackend: Send + Sync {
    async fn execute(&self, request: &BackendRequest, ctx: &RequestContext) -> BackendResponse;
}

/// Retry schedule for backend calls: capped exponential backoff.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(10_000),
        }
    }
}

impl RetryPolicy {
    /// Delay before re-issuing after `attempt` (1-based) has failed:
    /// `min(base * 2^(attempt-1), max)`.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let multiplier = 2u64.saturating_pow(attempt.saturating_sub(1));
        let delay_ms = (self.base_delay.as_millis() as u64).saturating_mul(multiplier);
        Duration::from_millis(delay_ms.min(self.max_delay.as_millis() as u64))
    }
}

/// Execute with retries while the latest error set contains a retryable
/// entry. A non-retryable error or exhaustion of attempts returns the last
/// response as-is.
///
/// Mutations retry under the same policy as queries, relying on backend-side
/// idempotency; every replay of a mutation is logged at warn level.
pub async fn execute_with_retry(
    backend: &dyn GraphqlBackend,
    request: &BackendRequest,
    ctx: &RequestContext,
    policy: &RetryPolicy,
) -> BackendResponse {
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        let response = backend.execute(request, ctx).await;
        if response.errors.is_empty() || !response.has_retryable_error() || attempt >= max_attempts
        {
            return response;
        }

        let delay = policy.backoff_delay(attempt);
        METRICS.backend_retries_total.inc();
        if request.is_mutation() {
            warn!(
                correlation_id = %ctx.correlation_id,
                attempt,
                delay_ms = delay.as_millis() as u64,
                "re-issuing mutation after retryable backend error"
            );
        } else {
            debug!(
                correlation_id = %ctx.correlation_id,
                attempt,
                delay_ms = delay.as_millis() as u64,
                "retrying backend call"
            );
        }
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}

#[derive(Debug, Deserialize)]
struct WireGraphqlError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    path: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct WireGraphqlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Option<Vec<WireGraphqlError>>,
}

/// Production backend client over HTTP POST.
pub struct HttpBackend {
    client: reqwest::Client,
    url: reqwest::Url,
}

impl HttpBackend {
    pub fn new(url: &str, timeout: Duration) -> anyhow::Result<Self> {
        use anyhow::Context as _;
        let url = reqwest::Url::parse(url).context("invalid backend URL")?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build backend HTTP client")?;
        Ok(Self { client, url })
    }

    fn normalize_transport_error(error: &reqwest::Error) -> NormalizedError {
        let code = if error.is_timeout() {
            ErrorCode::Timeout
        } else if error.is_connect() {
            ErrorCode::ServiceUnavailable
        } else {
            ErrorCode::NetworkError
        };
        NormalizedError::backend(code).detail("transport_error", error.to_string())
    }
}

#[async_trait]
impl GraphqlBackend for HttpBackend {
    async fn execute(&self, request: &BackendRequest, ctx: &RequestContext) -> BackendResponse {
        let mut body = Map::new();
        body.insert("query".to_string(), Value::String(request.query.clone()));
        if !request.variables.is_empty() {
            body.insert(
                "variables".to_string(),
                Value::Object(request.variables.clone()),
            );
        }
        if let Some(name) = &request.operation_name {
            body.insert("operationName".to_string(), Value::String(name.clone()));
        }

        let mut call = self
            .client
            .post(self.url.clone())
            .header("Store", &ctx.store_code)
            .header("X-Locale", &ctx.locale)
            .header("X-Currency", &ctx.currency)
            .header("X-Correlation-ID", &ctx.correlation_id)
            .json(&Value::Object(body));
        for (name, value) in build_backend_auth_headers(ctx) {
            call = call.header(name, value);
        }

        METRICS.backend_calls_total.inc();
        let response = match call.send().await {
            Ok(response) => response,
            Err(error) => {
                return BackendResponse::from_error(Self::normalize_transport_error(&error));
            }
        };

        let status = response.status();
        if !status.is_success() {
            return BackendResponse::from_error(normalize_backend_http_status(status.as_u16()));
        }

        let parsed: WireGraphqlResponse = match response.json().await {
            Ok(parsed) => parsed,
            Err(error) => {
                return BackendResponse::from_error(
                    NormalizedError::backend(ErrorCode::UnknownError)
                        .detail("parse_error", error.to_string()),
                );
            }
        };

        let errors = parsed
            .errors
            .unwrap_or_default()
            .into_iter()
            .map(|e| {
                let path = e.path.map(|segments| {
                    segments
                        .into_iter()
                        .map(|s| match s {
                            Value::String(s) => s,
                            other => other.to_string(),
                        })
                        .collect()
                });
                normalize_backend_graphql_error(&e.message, path)
            })
            .collect();

        BackendResponse {
            data: parsed.data,
            errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_schedule_is_capped_exponential() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_delay(1), Duration::from_millis(1000));
        assert_eq!(policy.backoff_delay(2), Duration::from_millis(2000));
        assert_eq!(policy.backoff_delay(3), Duration::from_millis(4000));
        assert_eq!(policy.backoff_delay(5), Duration::from_millis(10_000));
        assert_eq!(policy.backoff_delay(30), Duration::from_millis(10_000));
    }

    #[test]
    fn mutation_detection() {
        let request = BackendRequest {
            query: "  mutation M { placeOrder { order { id } } }".to_string(),
            variables: Map::new(),
            operation_name: None,
        };
        assert!(request.is_mutation());
        let request = BackendRequest {
            query: "query Q { cart { id } }".to_string(),
            variables: Map::new(),
            operation_name: None,
        };
        assert!(!request.is_mutation());
    }

    #[test]
    fn retryable_detection() {
        let mut response = BackendResponse::from_error(NormalizedError::backend(
            ErrorCode::ValidationError,
        ));
        assert!(!response.has_retryable_error());
        response
            .errors
            .push(NormalizedError::backend(ErrorCode::Timeout));
        assert!(response.has_retryable_error());
    }

    #[test]
    fn rejects_invalid_backend_url() {
        assert!(HttpBackend::new("not a url", Duration::from_secs(1)).is_err());
        assert!(HttpBackend::new("https://backend.example/graphql", Duration::from_secs(1)).is_ok());
    }
}
