//! Cache types for Storefront API responses.

use collection_view_core::{Catalog, PaginationMode, ProductPage, UrlCodec, ViewState};

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    /// One page of a collection listing.
    Page(ProductPage),
    /// The bulk catalog used by client-side listings.
    Catalog(Catalog),
}

/// Key for a collection page. Equivalent URLs share an entry.
pub(crate) fn collection_key(handle: &str, state: &ViewState, first: u32) -> String {
    let query = UrlCodec::new(PaginationMode::Cursor).encode_to_string(state);
    format!("collection:{handle}:{first}:{query}")
}

pub(crate) fn catalog_key(limit: u32) -> String {
    format!("catalog:{limit}")
}
