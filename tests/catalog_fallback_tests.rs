mod support;

use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use storefront_gateway::backend::BackendResponse;
use support::{MockBackend, app_with_backend};

fn no_headers() -> HashMap<String, String> {
    HashMap::new()
}

fn products_by_category_body() -> Vec<u8> {
    serde_json::to_vec(&json!({
        "query": "query ProductsByCategory($categoryId: String!) { productsByCategory { items { sku } } }",
        "variables": {"categoryId": "5"}
    }))
    .unwrap()
}

#[tokio::test]
async fn empty_anchored_listing_triggers_exactly_one_fallback() {
    let backend = Arc::new(MockBackend::with_responses(vec![
        BackendResponse {
            data: Some(json!({
                "categoryList": [{"id": 5, "children": [{"id": 6}, {"id": 7}]}],
                "products": {"items": [], "total_count": 0,
                             "page_info": {"current_page": 1, "page_size": 20, "total_pages": 0}}
            })),
            errors: vec![],
        },
        BackendResponse {
            data: Some(json!({
                "products": {
                    "items": [{"sku": "KID-1", "name": "Kids Tee", "type_id": "simple"}],
                    "total_count": 1,
                    "page_info": {"current_page": 1, "page_size": 20, "total_pages": 1}
                }
            })),
            errors: vec![],
        },
    ]));
    let app = app_with_backend(backend.clone());

    let reply = app
        .gateway()
        .handle(&products_by_category_body(), &no_headers(), &no_headers())
        .await;

    assert_eq!(reply.status, 200);
    assert_eq!(backend.call_count(), 2, "exactly one fallback query");

    let fallback = backend.request_at(1);
    assert!(fallback.query.contains(r#"category_id: {in: ["5", "6", "7"]}"#));

    // the fallback's items win in the normalized result
    let data = reply.response.data.unwrap();
    assert_eq!(data["productsByCategory"]["items"][0]["sku"], "KID-1");
    assert!(reply.response.errors.is_empty());
}

#[tokio::test]
async fn direct_listing_with_items_triggers_zero_fallbacks() {
    let backend = Arc::new(MockBackend::with_responses(vec![BackendResponse {
        data: Some(json!({
            "categoryList": [{"id": 5, "children": [{"id": 6}]}],
            "products": {
                "items": [{"sku": "DIRECT-1", "name": "Direct", "type_id": "simple"}],
                "total_count": 1,
                "page_info": {"current_page": 1, "page_size": 20, "total_pages": 1}
            }
        })),
        errors: vec![],
    }]));
    let app = app_with_backend(backend.clone());

    let reply = app
        .gateway()
        .handle(&products_by_category_body(), &no_headers(), &no_headers())
        .await;

    assert_eq!(reply.status, 200);
    assert_eq!(backend.call_count(), 1, "fallback must not be the default path");
    let data = reply.response.data.unwrap();
    assert_eq!(data["productsByCategory"]["items"][0]["sku"], "DIRECT-1");
}

#[tokio::test]
async fn childless_empty_category_stays_empty_without_fallback() {
    let backend = Arc::new(MockBackend::with_responses(vec![BackendResponse {
        data: Some(json!({
            "categoryList": [{"id": 5, "children": []}],
            "products": {"items": [], "total_count": 0,
                         "page_info": {"current_page": 1, "page_size": 20, "total_pages": 0}}
        })),
        errors: vec![],
    }]));
    let app = app_with_backend(backend.clone());

    let reply = app
        .gateway()
        .handle(&products_by_category_body(), &no_headers(), &no_headers())
        .await;

    assert_eq!(backend.call_count(), 1);
    let data = reply.response.data.unwrap();
    assert_eq!(data["productsByCategory"]["page_info"]["total_count"], 0);
    assert!(
        data["productsByCategory"]["items"]
            .as_array()
            .unwrap()
            .is_empty()
    );
}
