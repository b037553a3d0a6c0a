//! Storefront API client.
//!
//! Posts GraphQL documents with `reqwest` and caches listing pages and the
//! bulk catalog with `moka`.

use std::sync::Arc;
use std::time::Duration;

use collection_view_core::{Catalog, PageInfo, PageState, ProductPage, ViewState};
use moka::future::Cache;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use super::ShopifyError;
use super::cache::{CacheValue, catalog_key, collection_key};
use super::conversions::convert_products;
use super::filters::{collection_sort, product_filters};
use super::queries;
use super::types::{
    CatalogProductsData, CatalogProductsVariables, CollectionProductsData,
    CollectionProductsVariables, GraphQlRequest, GraphQlResponse,
};
use crate::config::ShopifyStorefrontConfig;

/// Largest page the Storefront API serves.
const MAX_PAGE_SIZE: u32 = 250;

/// Client for the Shopify Storefront API.
///
/// Cheap to clone; clones share the HTTP connection pool and the cache.
#[derive(Clone)]
pub struct StorefrontClient {
    inner: Arc<StorefrontClientInner>,
}

struct StorefrontClientInner {
    client: reqwest::Client,
    endpoint: String,
    access_token: SecretString,
    cache: Cache<String, CacheValue>,
}

impl StorefrontClient {
    /// Create a new Storefront API client whose responses live for `ttl`.
    #[must_use]
    pub fn new(config: &ShopifyStorefrontConfig, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(ttl)
            .build();

        Self {
            inner: Arc::new(StorefrontClientInner {
                client: reqwest::Client::new(),
                endpoint: config.endpoint(),
                access_token: config.storefront_private_token.clone(),
                cache,
            }),
        }
    }

    /// Execute a GraphQL document.
    async fn execute<V, T>(&self, query: &str, variables: V) -> Result<T, ShopifyError>
    where
        V: Serialize + Send,
        T: DeserializeOwned,
    {
        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            // Private access tokens use a different header than public tokens
            .header(
                "Shopify-Storefront-Private-Token",
                self.inner.access_token.expose_secret(),
            )
            .json(&GraphQlRequest { query, variables })
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ShopifyError::RateLimited(retry_after));
        }

        // Body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "Shopify API returned non-success status"
            );
            return Err(ShopifyError::message(format!(
                "HTTP {status}: {}",
                response_text.chars().take(200).collect::<String>()
            )));
        }

        let response: GraphQlResponse<T> = match serde_json::from_str(&response_text) {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %response_text.chars().take(500).collect::<String>(),
                    "Failed to parse Shopify GraphQL response"
                );
                return Err(ShopifyError::Parse(e));
            }
        };

        if !response.errors.is_empty() {
            debug!(errors = ?response.errors, "GraphQL errors in response");
            return Err(ShopifyError::GraphQL(response.errors));
        }

        response.data.ok_or_else(|| {
            tracing::error!("Shopify GraphQL response has no data and no errors");
            ShopifyError::message("No data in response")
        })
    }

    /// One page of a collection with filters and sort applied by Shopify.
    ///
    /// `first` is the page size. A `before` cursor fetches the page that
    /// ends at it.
    ///
    /// # Errors
    ///
    /// Returns [`ShopifyError::NotFound`] if the collection does not exist,
    /// or an error if the API request fails.
    #[instrument(skip(self, state), fields(handle = %handle, sort = %state.sort))]
    pub async fn collection_products(
        &self,
        handle: &str,
        state: &ViewState,
        first: u32,
    ) -> Result<ProductPage, ShopifyError> {
        let first = first.clamp(1, MAX_PAGE_SIZE);
        let cache_key = collection_key(handle, state, first);

        if let Some(CacheValue::Page(page)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for collection page");
            return Ok(page);
        }

        let (after, before) = match &state.page {
            PageState::Cursor { after, before } => (after.as_deref(), before.as_deref()),
            PageState::Offset { .. } => (None, None),
        };
        let (sort_key, reverse) = collection_sort(state.sort);
        let variables = CollectionProductsVariables {
            handle,
            first: before.is_none().then_some(first),
            last: before.is_some().then_some(first),
            after: after.filter(|_| before.is_none()),
            before,
            sort_key,
            reverse,
            filters: product_filters(&state.filters),
        };

        let data: CollectionProductsData = self
            .execute(&queries::collection_products(), variables)
            .await?;
        let collection = data
            .collection
            .ok_or_else(|| ShopifyError::NotFound(format!("collection {handle}")))?;

        debug!(
            collection = %collection.title,
            count = collection.products.nodes.len(),
            "Fetched collection page"
        );

        let page = ProductPage {
            products: Catalog::new(convert_products(collection.products.nodes, None)),
            page_info: Some(PageInfo::from(collection.products.page_info)),
        };

        self.inner
            .cache
            .insert(cache_key, CacheValue::Page(page.clone()))
            .await;

        Ok(page)
    }

    /// Up to `limit` products in best-selling order, ranked by position.
    ///
    /// # Errors
    ///
    /// Returns an error if any API request fails.
    #[instrument(skip(self))]
    pub async fn catalog(&self, limit: u32) -> Result<Catalog, ShopifyError> {
        let cache_key = catalog_key(limit);

        if let Some(CacheValue::Catalog(catalog)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for catalog");
            return Ok(catalog);
        }

        let mut products = Vec::new();
        let mut after: Option<String> = None;

        loop {
            let fetched = u32::try_from(products.len()).unwrap_or(u32::MAX);
            let remaining = limit.saturating_sub(fetched);
            if remaining == 0 {
                break;
            }

            let variables = CatalogProductsVariables {
                first: remaining.min(MAX_PAGE_SIZE),
                after: after.as_deref(),
            };
            let data: CatalogProductsData = self
                .execute(&queries::catalog_products(), variables)
                .await?;

            let page_info = data.products.page_info;
            // Ranks are 1-based: the best seller is rank 1.
            products.extend(convert_products(
                data.products.nodes,
                Some(fetched.saturating_add(1)),
            ));

            match page_info.end_cursor {
                Some(cursor) if page_info.has_next_page => after = Some(cursor),
                _ => break,
            }
        }

        debug!(count = products.len(), "Fetched catalog");

        let catalog = Catalog::new(products);
        self.inner
            .cache
            .insert(cache_key, CacheValue::Catalog(catalog.clone()))
            .await;

        Ok(catalog)
    }
}
