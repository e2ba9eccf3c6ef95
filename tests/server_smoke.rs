mod support;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use storefront_gateway::router;
use support::{MockBackend, app_with_backend};
use tower::ServiceExt;

fn app() -> axum::Router {
    let backend = Arc::new(MockBackend::with_data(json!({
        "categoryList": [{"id": 2, "name": "Root", "url_key": "root"}]
    })));
    router(Arc::new(app_with_backend(backend)))
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn graphql_round_trip_sets_correlation_header() {
    let request = Request::builder()
        .method("POST")
        .uri("/graphql")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-correlation-id", "smoke-1")
        .body(Body::from(
            json!({"query": "query GetCategories { categories { id } }"}).to_string(),
        ))
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("x-correlation-id").unwrap(),
        "smoke-1"
    );
    let body = body_json(response).await;
    assert_eq!(body["data"]["categories"][0]["slug"], "root");
}

#[tokio::test]
async fn non_json_content_type_is_rejected_before_the_core() {
    let request = Request::builder()
        .method("POST")
        .uri("/graphql")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from("query GetCategories { categories { id } }"))
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let body = body_json(response).await;
    assert_eq!(body["errors"][0]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn validation_failures_map_to_their_own_status() {
    let request = Request::builder()
        .method("POST")
        .uri("/graphql")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({"query": "query Nope { nope }"}).to_string(),
        ))
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["errors"][0]["code"], "OPERATION_NOT_ALLOWED");
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn cookie_tokens_reach_the_pipeline() {
    let backend = Arc::new(MockBackend::with_data(json!({
        "customer": {"firstname": "Ada", "lastname": "L", "email": "a@example.test"}
    })));
    let app = router(Arc::new(app_with_backend(backend)));

    let request = Request::builder()
        .method("POST")
        .uri("/graphql")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::COOKIE, "customer-token=tok-9")
        .body(Body::from(
            json!({"query": "query GetCustomer { customer { email } }"}).to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn health_and_metrics_endpoints_respond() {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");

    let response = app()
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app()
        .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
