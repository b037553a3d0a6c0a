//! Integration tests for Collection View.
//!
//! Each test boots the storefront router on an ephemeral port and points it
//! at a `wiremock` server standing in for the Shopify Storefront API.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p collection-view-integration-tests
//! ```

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroUsize;
use std::time::Duration;

use collection_view_storefront::config::{CatalogConfig, ShopifyStorefrontConfig, StorefrontConfig};
use collection_view_storefront::routes;
use collection_view_storefront::state::AppState;
use secrecy::SecretString;
use serde_json::{Value, json};
use wiremock::MockServer;

/// Path of the mocked GraphQL endpoint.
pub const GRAPHQL_PATH: &str = "/api/2026-01/graphql.json";

/// A running storefront wired to a mock Shopify.
pub struct TestContext {
    pub client: reqwest::Client,
    pub base_url: String,
    pub shopify: MockServer,
}

impl TestContext {
    /// Start a mock Shopify and a storefront serving `page_size` products per page.
    pub async fn start(page_size: usize) -> Self {
        Self::start_with_ttl(page_size, Duration::from_secs(60)).await
    }

    /// Like [`Self::start`], with Storefront API responses cached for `cache_ttl`.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start_with_ttl(page_size: usize, cache_ttl: Duration) -> Self {
        let shopify = MockServer::start().await;

        let config = StorefrontConfig {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0,
            shopify: ShopifyStorefrontConfig {
                store: "test-store.myshopify.com".to_string(),
                api_version: "2026-01".to_string(),
                storefront_private_token: SecretString::from("9f8c2b7e4a1d6035bf7e2c9a8d4f1b6e"),
                endpoint_override: Some(format!("{}{GRAPHQL_PATH}", shopify.uri())),
            },
            catalog: CatalogConfig {
                page_size: NonZeroUsize::new(page_size).unwrap_or(NonZeroUsize::MIN),
                fetch_limit: 100,
                cache_ttl,
            },
            sentry_dsn: None,
            sentry_environment: None,
        };

        let listener = tokio::net::TcpListener::bind(SocketAddr::new(config.host, 0))
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no address");
        let app = routes::app(AppState::new(config));
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self {
            client: reqwest::Client::new(),
            base_url: format!("http://{addr}"),
            shopify,
        }
    }

    /// GET a path and decode the JSON body.
    ///
    /// # Panics
    ///
    /// Panics if the request fails.
    pub async fn get(&self, path_and_query: &str) -> (reqwest::StatusCode, Value) {
        let response = self
            .client
            .get(format!("{}{path_and_query}", self.base_url))
            .send()
            .await
            .expect("Request to storefront failed");
        let status = response.status();
        let body = response.json().await.unwrap_or(Value::Null);
        (status, body)
    }
}

/// A `ProductNode` as the Storefront API returns it.
#[must_use]
pub fn product_node(id: &str, title: &str, price: &str, color: &str, available: bool) -> Value {
    json!({
        "id": id,
        "handle": id,
        "title": title,
        "vendor": "Acme",
        "tags": [],
        "availableForSale": available,
        "createdAt": "2024-03-01T00:00:00Z",
        "priceRange": {
            "minVariantPrice": {"amount": price, "currencyCode": "USD"},
            "maxVariantPrice": {"amount": price, "currencyCode": "USD"}
        },
        "options": [{"name": "Color", "optionValues": [{"name": color}]}],
        "variants": {"nodes": [{
            "id": format!("{id}-v1"),
            "title": color,
            "availableForSale": available,
            "selectedOptions": [{"name": "Color", "value": color}],
            "price": {"amount": price, "currencyCode": "USD"}
        }]}
    })
}

/// A `pageInfo` object.
#[must_use]
pub fn page_info(next: Option<&str>, previous: Option<&str>) -> Value {
    json!({
        "hasNextPage": next.is_some(),
        "hasPreviousPage": previous.is_some(),
        "startCursor": previous,
        "endCursor": next
    })
}

/// Response body for the collection query.
#[must_use]
pub fn collection_response(handle: &str, nodes: Vec<Value>, page_info: Value) -> Value {
    json!({
        "data": {"collection": {
            "handle": handle,
            "title": handle.to_uppercase(),
            "products": {"pageInfo": page_info, "nodes": nodes}
        }}
    })
}

/// Response body for the catalog query.
#[must_use]
pub fn catalog_response(nodes: Vec<Value>) -> Value {
    json!({
        "data": {"products": {"pageInfo": page_info(None, None), "nodes": nodes}}
    })
}
