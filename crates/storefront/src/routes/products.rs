//! Product listing handler.
//!
//! The catalog is fetched once (and cached), then filtered, sorted and cut
//! into offset pages locally.

use axum::extract::{RawQuery, State};
use collection_view_core::{SourceMode, UrlCodec, ViewEngine};
use tracing::instrument;

use super::ViewResponse;
use crate::error::Result;
use crate::state::AppState;

/// One page of the catalog.
#[instrument(skip(state, query))]
pub async fn index(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<ViewResponse> {
    let source = SourceMode::ClientSide;
    let codec = UrlCodec::new(source.pagination_mode());
    let view_state = codec.decode_str(query.as_deref().unwrap_or_default());

    let catalog = state.config().catalog;
    let fetched = state.catalog().catalog(catalog.fetch_limit).await?;

    let engine = ViewEngine::new(source, catalog.page_size);
    Ok(ViewResponse::derive(&engine, &codec, &view_state, &fetched))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::routes::app;
    use crate::routes::tests::{get_json, test_state};

    fn node(id: &str, price: &str, color: &str) -> Value {
        json!({
            "id": id,
            "handle": id,
            "title": id.to_uppercase(),
            "vendor": "Acme",
            "tags": [],
            "availableForSale": true,
            "createdAt": null,
            "priceRange": {
                "minVariantPrice": {"amount": price, "currencyCode": "USD"},
                "maxVariantPrice": {"amount": price, "currencyCode": "USD"}
            },
            "options": [{"name": "Color", "optionValues": [{"name": color}]}],
            "variants": {"nodes": [{
                "id": format!("{id}-v1"),
                "title": color,
                "availableForSale": true,
                "selectedOptions": [{"name": "Color", "value": color}],
                "price": {"amount": price, "currencyCode": "USD"}
            }]}
        })
    }

    async fn shopify() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"products": {
                    "pageInfo": {
                        "hasNextPage": false,
                        "hasPreviousPage": false,
                        "startCursor": null,
                        "endCursor": null
                    },
                    "nodes": [
                        node("a", "30.00", "Red"),
                        node("b", "10.00", "Blue"),
                        node("c", "20.00", "Red"),
                        node("d", "40.00", "Red")
                    ]
                }}
            })))
            .mount(&server)
            .await;
        server
    }

    fn ids(body: &Value) -> Vec<&str> {
        body["view"]["visible_products"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["id"].as_str().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_filters_sorts_and_pages_locally() {
        let server = shopify().await;
        let app = app(test_state(server.uri(), 2));

        let (status, _, body) =
            get_json(app, "/products?filter.Color=Red&sort=price-asc").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(ids(&body), vec!["c", "a"]);
        assert_eq!(body["view"]["pagination"]["total_items"], 3);
        assert_eq!(body["view"]["pagination"]["total_pages"], 2);
        assert_eq!(body["next"], "sort=price-asc&filter.Color=Red&page=2");
        assert_eq!(body["previous"], Value::Null);
        assert_eq!(body["stale"], false);
    }

    #[tokio::test]
    async fn test_out_of_range_page_is_clamped() {
        let server = shopify().await;
        let app = app(test_state(server.uri(), 2));

        let (_, _, body) = get_json(app, "/products?page=9").await;

        assert_eq!(body["view"]["pagination"]["page"], 2);
        assert_eq!(body["query"], "page=2");
        assert_eq!(body["previous"], "");
        assert_eq!(body["next"], Value::Null);
    }

    #[tokio::test]
    async fn test_no_matches() {
        let server = shopify().await;
        let app = app(test_state(server.uri(), 2));

        let (status, _, body) = get_json(app, "/products?vendor=Nobody").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["view"]["status"], "no_matches");
        assert!(ids(&body).is_empty());
    }

    #[tokio::test]
    async fn test_upstream_failure_is_bad_gateway() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        let app = app(test_state(server.uri(), 2));

        let (status, _, body) = get_json(app, "/products").await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "External service error");
    }
}
