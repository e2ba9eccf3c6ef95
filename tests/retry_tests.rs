mod support;

use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use storefront_gateway::backend::{
    BackendRequest, BackendResponse, RetryPolicy, execute_with_retry,
};
use storefront_gateway::context::{RequestContext, StoreDefaults};
use storefront_gateway::error::{ErrorCode, NormalizedError};
use support::MockBackend;

fn ctx() -> RequestContext {
    RequestContext::from_transport(&HashMap::new(), &HashMap::new(), &StoreDefaults::default())
}

fn query_request() -> BackendRequest {
    BackendRequest {
        query: "query Q { cart { id } }".to_string(),
        variables: serde_json::Map::new(),
        operation_name: Some("Q".to_string()),
    }
}

fn timeout_response() -> BackendResponse {
    BackendResponse::from_error(NormalizedError::backend(ErrorCode::Timeout))
}

// Paused-clock tests: tokio::time::sleep advances virtual time instantly, so
// the asserted elapsed times are the backoff schedule itself.

#[tokio::test(start_paused = true)]
async fn permanently_retryable_failure_backs_off_1s_then_2s() {
    let backend = Arc::new(MockBackend::always(timeout_response()));
    let policy = RetryPolicy::default();

    let started = tokio::time::Instant::now();
    let response = execute_with_retry(backend.as_ref(), &query_request(), &ctx(), &policy).await;
    let elapsed = started.elapsed();

    assert_eq!(backend.call_count(), 3);
    // waits: 1000ms after attempt 1, 2000ms after attempt 2
    assert!(elapsed >= std::time::Duration::from_millis(3000));
    assert!(elapsed < std::time::Duration::from_millis(3500));
    // last error set still marked retryable
    assert!(response.has_retryable_error());
    assert_eq!(response.errors[0].code, ErrorCode::Timeout);
}

#[tokio::test(start_paused = true)]
async fn non_retryable_error_short_circuits_after_one_attempt() {
    let backend = Arc::new(MockBackend::always(BackendResponse::from_error(
        NormalizedError::backend(ErrorCode::ValidationError),
    )));
    let policy = RetryPolicy::default();

    let started = tokio::time::Instant::now();
    let response = execute_with_retry(backend.as_ref(), &query_request(), &ctx(), &policy).await;

    assert_eq!(backend.call_count(), 1);
    assert_eq!(started.elapsed(), std::time::Duration::ZERO);
    assert!(!response.has_retryable_error());
}

#[tokio::test(start_paused = true)]
async fn success_on_first_attempt_never_sleeps() {
    let backend = Arc::new(MockBackend::with_data(json!({"cart": {"id": "c"}})));
    let policy = RetryPolicy::default();

    let started = tokio::time::Instant::now();
    let response = execute_with_retry(backend.as_ref(), &query_request(), &ctx(), &policy).await;

    assert_eq!(backend.call_count(), 1);
    assert_eq!(started.elapsed(), std::time::Duration::ZERO);
    assert!(response.errors.is_empty());
}

#[tokio::test(start_paused = true)]
async fn transient_failure_recovers_midway() {
    let backend = Arc::new(MockBackend::with_responses(vec![
        timeout_response(),
        BackendResponse {
            data: Some(json!({"cart": {"id": "c"}})),
            errors: vec![],
        },
    ]));
    let policy = RetryPolicy::default();

    let response = execute_with_retry(backend.as_ref(), &query_request(), &ctx(), &policy).await;

    assert_eq!(backend.call_count(), 2);
    assert!(response.errors.is_empty());
    assert_eq!(response.data.unwrap()["cart"]["id"], "c");
}

#[tokio::test(start_paused = true)]
async fn mutations_retry_under_the_same_policy() {
    let backend = Arc::new(MockBackend::always(timeout_response()));
    let policy = RetryPolicy {
        max_attempts: 2,
        ..Default::default()
    };
    let request = BackendRequest {
        query: "mutation M { placeOrder { order { id } } }".to_string(),
        variables: serde_json::Map::new(),
        operation_name: Some("M".to_string()),
    };

    execute_with_retry(backend.as_ref(), &request, &ctx(), &policy).await;
    assert_eq!(backend.call_count(), 2);
}
