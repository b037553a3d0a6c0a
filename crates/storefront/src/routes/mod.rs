//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Health check
//! GET  /products               - Client-side listing over the catalog (offset pages)
//! GET  /collections/{handle}   - Collection listing filtered by Shopify (cursor pages)
//! *                            - JSON 404
//! ```
//!
//! Listing routes take the view state from the query string and answer with
//! the derived view plus the canonical, next and previous query strings.

pub mod collections;
pub mod products;

use axum::{
    Router,
    extract::Request,
    http::{HeaderValue, Uri, header},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
};
use collection_view_core::{
    CollectionView, PageState, Pagination, UrlCodec, ViewEngine, ViewState,
};
use serde::Serialize;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

use crate::error::AppError;
use crate::middleware::request_id_middleware;
use crate::services::Fetched;
use crate::state::AppState;

/// Listing responses may be cached briefly by browsers and CDNs.
const LISTING_CACHE_CONTROL: &str = "public, max-age=60";

/// Body of a listing response.
#[derive(Debug, Serialize)]
pub struct ViewResponse {
    pub view: CollectionView,
    /// Canonical query string for this view.
    pub query: String,
    /// Query string of the next page.
    pub next: Option<String>,
    /// Query string of the previous page.
    pub previous: Option<String>,
    /// Whether the products came from the fallback copy.
    pub stale: bool,
}

impl ViewResponse {
    /// Derive the view for `state` from fetched products.
    #[must_use]
    pub fn derive(
        engine: &ViewEngine,
        codec: &UrlCodec,
        state: &ViewState,
        fetched: &Fetched,
    ) -> Self {
        let view = engine.derive(state, &fetched.page);

        // The offset window clamps out-of-range pages.
        let settled = match &view.pagination {
            Pagination::Offset { page, .. } => state.clone().with_page(PageState::offset(*page)),
            Pagination::Cursor(_) => state.clone(),
        };
        let link = |page: PageState| codec.encode_to_string(&settled.clone().with_page(page));

        Self {
            query: codec.encode_to_string(&settled),
            next: view.pagination.next_page().map(link),
            previous: view.pagination.previous_page().map(link),
            stale: fetched.stale,
            view,
        }
    }
}

impl IntoResponse for ViewResponse {
    fn into_response(self) -> Response {
        let stale = self.stale;
        let mut response = axum::Json(self).into_response();
        if stale {
            response
                .headers_mut()
                .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
        }
        response
    }
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// JSON 404 for paths no route matches.
pub async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}

/// Build the storefront router with its middleware stack.
///
/// Sentry layers are added by the binary, outside of this router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/products", get(products::index))
        .route("/collections/{handle}", get(collections::show))
        .fallback(not_found)
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CACHE_CONTROL,
            HeaderValue::from_static(LISTING_CACHE_CONTROL),
        ))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};
    use std::num::NonZeroUsize;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::StatusCode;
    use secrecy::SecretString;
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::config::{CatalogConfig, ShopifyStorefrontConfig, StorefrontConfig};

    pub fn test_state(endpoint: String, page_size: usize) -> AppState {
        AppState::new(StorefrontConfig {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3000,
            shopify: ShopifyStorefrontConfig {
                store: "test-store.myshopify.com".to_string(),
                api_version: "2026-01".to_string(),
                storefront_private_token: SecretString::from("9f8c2b7e4a1d6035bf7e2c9a8d4f1b6e"),
                endpoint_override: Some(endpoint),
            },
            catalog: CatalogConfig {
                page_size: NonZeroUsize::new(page_size).unwrap(),
                fetch_limit: 50,
                cache_ttl: Duration::from_secs(60),
            },
            sentry_dsn: None,
            sentry_environment: None,
        })
    }

    pub async fn get_json(app: Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, Value) {
        let response = app
            .oneshot(axum::http::Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, headers, json)
    }

    #[tokio::test]
    async fn test_health() {
        // Nothing listens on this endpoint; /health never calls Shopify.
        let app = app(test_state("http://127.0.0.1:9/graphql.json".to_string(), 12));
        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        assert_eq!(response.headers()[header::CACHE_CONTROL], LISTING_CACHE_CONTROL);
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let app = app(test_state("http://127.0.0.1:9/graphql.json".to_string(), 12));
        let (status, _, body) = get_json(app, "/nope?page=2").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Not found: /nope");
    }
}
