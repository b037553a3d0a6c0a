//! Product fetching with a last-known-good fallback.
//!
//! Listing pages go to Shopify on every cache miss. When a fetch fails for a
//! transient reason the last successful response for the same URL is served
//! instead, flagged as stale, so a listing keeps rendering through upstream
//! hiccups.

use std::future::Future;

use collection_view_core::{Catalog, ProductPage, ViewState};
use moka::future::Cache;
use tracing::{instrument, warn};

use crate::shopify::{ShopifyError, StorefrontClient, catalog_key, collection_key};

/// Where listing products come from.
pub trait ProductSource: Send + Sync {
    /// One page of a collection, filtered and sorted upstream.
    fn collection_page(
        &self,
        handle: &str,
        state: &ViewState,
        first: u32,
    ) -> impl Future<Output = Result<ProductPage, ShopifyError>> + Send;

    /// Up to `limit` products for client-side listings.
    fn catalog(&self, limit: u32) -> impl Future<Output = Result<Catalog, ShopifyError>> + Send;
}

impl ProductSource for StorefrontClient {
    async fn collection_page(
        &self,
        handle: &str,
        state: &ViewState,
        first: u32,
    ) -> Result<ProductPage, ShopifyError> {
        self.collection_products(handle, state, first).await
    }

    async fn catalog(&self, limit: u32) -> Result<Catalog, ShopifyError> {
        Self::catalog(self, limit).await
    }
}

/// Products plus whether they came from the fallback copy.
#[derive(Debug, Clone)]
pub struct Fetched {
    pub page: ProductPage,
    pub stale: bool,
}

/// Fetches listing products, falling back to the last good response.
pub struct CatalogService<S = StorefrontClient> {
    source: S,
    last_good: Cache<String, ProductPage>,
}

impl<S: ProductSource> CatalogService<S> {
    /// Wrap a product source.
    pub fn new(source: S) -> Self {
        Self {
            source,
            last_good: Cache::builder().max_capacity(1000).build(),
        }
    }

    /// The wrapped source.
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// One page of a collection.
    ///
    /// # Errors
    ///
    /// Returns the upstream error if the fetch fails and no earlier response
    /// for the same page exists, or if the collection does not exist.
    #[instrument(skip(self, state), fields(handle = %handle))]
    pub async fn collection(
        &self,
        handle: &str,
        state: &ViewState,
        first: u32,
    ) -> Result<Fetched, ShopifyError> {
        let key = collection_key(handle, state, first);
        let result = self.source.collection_page(handle, state, first).await;
        self.settle(key, result).await
    }

    /// The client-side catalog as one unpaginated page.
    ///
    /// # Errors
    ///
    /// Returns the upstream error if the fetch fails and no earlier catalog
    /// exists.
    #[instrument(skip(self))]
    pub async fn catalog(&self, limit: u32) -> Result<Fetched, ShopifyError> {
        let key = catalog_key(limit);
        let result = self
            .source
            .catalog(limit)
            .await
            .map(ProductPage::unpaginated);
        self.settle(key, result).await
    }

    async fn settle(
        &self,
        key: String,
        result: Result<ProductPage, ShopifyError>,
    ) -> Result<Fetched, ShopifyError> {
        match result {
            Ok(page) => {
                self.last_good.insert(key, page.clone()).await;
                Ok(Fetched { page, stale: false })
            }
            Err(ShopifyError::NotFound(what)) => {
                self.last_good.invalidate(&key).await;
                Err(ShopifyError::NotFound(what))
            }
            Err(error) => match self.last_good.get(&key).await {
                Some(page) => {
                    warn!(error = %error, "Shopify fetch failed, serving last good response");
                    Ok(Fetched { page, stale: true })
                }
                None => Err(error),
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    use collection_view_core::{Money, PaginationMode, PriceRange, Product, ProductId};
    use rust_decimal::Decimal;

    pub fn product(id: &str, title: &str, price: i64) -> Product {
        Product {
            id: ProductId::new(id),
            handle: id.to_string(),
            title: title.to_string(),
            vendor: String::new(),
            tags: std::collections::BTreeSet::new(),
            price_range: PriceRange::single(Money::usd(Decimal::from(price))),
            available_for_sale: true,
            options: vec![],
            variants: vec![],
            created_at: None,
            sales_rank: None,
        }
    }

    /// A source serving fixed products that can be switched to failing.
    #[derive(Default)]
    pub struct FakeSource {
        pub products: Mutex<Vec<Product>>,
        pub failing: AtomicBool,
        pub missing: AtomicBool,
    }

    impl FakeSource {
        pub fn with(products: Vec<Product>) -> Self {
            Self {
                products: Mutex::new(products),
                ..Self::default()
            }
        }

        fn respond(&self) -> Result<Catalog, ShopifyError> {
            if self.missing.load(Ordering::SeqCst) {
                return Err(ShopifyError::NotFound("collection".to_string()));
            }
            if self.failing.load(Ordering::SeqCst) {
                return Err(ShopifyError::message("Throttled"));
            }
            Ok(Catalog::new(self.products.lock().unwrap().clone()))
        }
    }

    impl ProductSource for FakeSource {
        async fn collection_page(
            &self,
            _handle: &str,
            _state: &ViewState,
            _first: u32,
        ) -> Result<ProductPage, ShopifyError> {
            self.respond().map(ProductPage::unpaginated)
        }

        async fn catalog(&self, _limit: u32) -> Result<Catalog, ShopifyError> {
            self.respond()
        }
    }

    #[tokio::test]
    async fn test_fresh_fetch_is_not_stale() {
        let service = CatalogService::new(FakeSource::with(vec![product("a", "A", 1)]));
        let fetched = service.catalog(10).await.unwrap();
        assert!(!fetched.stale);
        assert_eq!(fetched.page.products.len(), 1);
    }

    #[tokio::test]
    async fn test_failure_serves_last_good_copy() {
        let service = CatalogService::new(FakeSource::with(vec![product("a", "A", 1)]));
        service.catalog(10).await.unwrap();

        service.source().failing.store(true, Ordering::SeqCst);
        let fetched = service.catalog(10).await.unwrap();
        assert!(fetched.stale);
        assert_eq!(fetched.page.products[0].id.as_str(), "a");
    }

    #[tokio::test]
    async fn test_failure_without_copy_is_an_error() {
        let source = FakeSource::default();
        source.failing.store(true, Ordering::SeqCst);
        let service = CatalogService::new(source);
        assert!(service.catalog(10).await.is_err());
    }

    #[tokio::test]
    async fn test_fallback_is_per_page() {
        let service = CatalogService::new(FakeSource::with(vec![product("a", "A", 1)]));
        let state = ViewState::new(PaginationMode::Cursor);
        service.collection("summer", &state, 12).await.unwrap();

        service.source().failing.store(true, Ordering::SeqCst);
        assert!(service.collection("summer", &state, 12).await.unwrap().stale);
        assert!(service.collection("winter", &state, 12).await.is_err());
    }

    #[tokio::test]
    async fn test_not_found_is_never_masked() {
        let service = CatalogService::new(FakeSource::with(vec![product("a", "A", 1)]));
        let state = ViewState::new(PaginationMode::Cursor);
        service.collection("summer", &state, 12).await.unwrap();

        service.source().missing.store(true, Ordering::SeqCst);
        let err = service.collection("summer", &state, 12).await.unwrap_err();
        assert!(matches!(err, ShopifyError::NotFound(_)));

        service.source().missing.store(false, Ordering::SeqCst);
        service.source().failing.store(true, Ordering::SeqCst);
        assert!(service.collection("summer", &state, 12).await.is_err());
    }
}
