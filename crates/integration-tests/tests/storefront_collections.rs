//! Integration tests for collection listings (filters pushed to Shopify,
//! cursor pagination).

use std::time::Duration;

use collection_view_core::{PageState, PaginationMode, SortKey, UrlCodec};
use collection_view_integration_tests::{
    GRAPHQL_PATH, TestContext, collection_response, page_info, product_node,
};
use reqwest::StatusCode;
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, ResponseTemplate};

fn visible_ids(body: &Value) -> Vec<&str> {
    body["view"]["visible_products"]
        .as_array()
        .map(|products| products.iter().filter_map(|p| p["id"].as_str()).collect())
        .unwrap_or_default()
}

#[tokio::test]
async fn test_filters_and_sort_are_pushed_upstream() {
    let ctx = TestContext::start(2).await;
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(body_partial_json(json!({
            "variables": {
                "handle": "summer",
                "first": 2,
                "sortKey": "PRICE",
                "reverse": false,
                "filters": [
                    {"price": {"max": 50.0}},
                    {"variantOption": {"name": "Color", "value": "Red"}},
                    {"productVendor": "Acme"}
                ]
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(collection_response(
            "summer",
            vec![
                product_node("p1", "Tee", "20.00", "Red", true),
                product_node("p2", "Cap", "25.00", "Red", true),
            ],
            page_info(Some("after-p2"), None),
        )))
        .expect(1)
        .mount(&ctx.shopify)
        .await;

    let (status, body) = ctx
        .get("/collections/summer?vendor=Acme&maxPrice=50&filter.Color=Red&sort=price-asc")
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(visible_ids(&body), vec!["p1", "p2"]);
    assert_eq!(
        body["query"],
        "sort=price-asc&filter.Color=Red&vendor=Acme&maxPrice=50"
    );
    assert_eq!(body["view"]["status"], "ready");
    assert_eq!(body["view"]["active_sort"], "price-asc");
    assert_eq!(body["stale"], false);

    // The next link round-trips through the codec to the cursor position.
    let next = body["next"].as_str().unwrap_or_default();
    let state = UrlCodec::new(PaginationMode::Cursor).decode_str(next);
    assert_eq!(state.page, PageState::after("after-p2"));
    assert_eq!(state.sort, SortKey::PriceAsc);
}

#[tokio::test]
async fn test_cursor_navigation_both_ways() {
    let ctx = TestContext::start(2).await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"variables": {"after": "c2"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(collection_response(
            "summer",
            vec![product_node("p3", "Hat", "15.00", "Blue", true)],
            page_info(None, Some("c3")),
        )))
        .mount(&ctx.shopify)
        .await;

    let (status, body) = ctx.get("/collections/summer?cursor=c2").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["query"], "cursor=c2");
    assert_eq!(body["next"], Value::Null);
    assert_eq!(body["previous"], "before=c3");
    assert_eq!(body["view"]["pagination"]["has_previous"], true);
}

#[tokio::test]
async fn test_empty_collection_and_no_matches() {
    let ctx = TestContext::start(2).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(collection_response(
            "summer",
            vec![],
            page_info(None, None),
        )))
        .mount(&ctx.shopify)
        .await;

    let (_, body) = ctx.get("/collections/summer").await;
    assert_eq!(body["view"]["status"], "empty_collection");

    let (_, body) = ctx.get("/collections/summer?tag=sale").await;
    assert_eq!(body["view"]["status"], "no_matches");
    assert_eq!(body["view"]["facets"]["tags"][0]["value"], "sale");
    assert_eq!(body["view"]["facets"]["tags"][0]["selected"], true);
}

#[tokio::test]
async fn test_missing_collection_is_not_found() {
    let ctx = TestContext::start(2).await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": {"collection": null}})),
        )
        .mount(&ctx.shopify)
        .await;

    let (status, body) = ctx.get("/collections/nope").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not found: collection nope");
}

#[tokio::test]
async fn test_shopify_error_is_bad_gateway() {
    let ctx = TestContext::start(2).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": null,
            "errors": [{"message": "Internal error. Looks like something went wrong on our end."}]
        })))
        .mount(&ctx.shopify)
        .await;

    let (status, body) = ctx.get("/collections/summer").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "External service error");
}

#[tokio::test]
async fn test_stale_page_served_when_shopify_fails() {
    let ctx = TestContext::start_with_ttl(2, Duration::from_millis(1)).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(collection_response(
            "summer",
            vec![product_node("p1", "Tee", "20.00", "Red", true)],
            page_info(None, None),
        )))
        .up_to_n_times(1)
        .mount(&ctx.shopify)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&ctx.shopify)
        .await;

    let (status, body) = ctx.get("/collections/summer").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stale"], false);

    // Let the response cache expire so the next request goes upstream.
    tokio::time::sleep(Duration::from_millis(50)).await;

    let response = ctx
        .client
        .get(format!("{}/collections/summer", ctx.base_url))
        .send()
        .await
        .unwrap_or_else(|e| panic!("request failed: {e}"));
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["cache-control"], "no-store");
    let body: Value = response.json().await.unwrap_or(Value::Null);
    assert_eq!(body["stale"], true);
    assert_eq!(visible_ids(&body), vec!["p1"]);
}
