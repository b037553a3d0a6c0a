//! Business logic services for the storefront.
//!
//! - `catalog` - Listing products from Shopify with a stale fallback

pub mod catalog;

pub use catalog::{CatalogService, Fetched, ProductSource};
