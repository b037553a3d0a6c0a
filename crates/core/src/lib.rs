//! Collection View Core - the view engine behind product listing pages.
//!
//! A listing's URL query string is its whole state. This crate maps that
//! query string to a [`ViewState`], derives the visible product slice from a
//! fetched product list, and maps shopper interactions back to the next URL:
//!
//! ```text
//! query string ─▶ UrlCodec ─▶ ViewState ─▶ filter ─▶ sort ─▶ paginate ─▶ CollectionView
//!      ▲                                                                       │
//!      └──────────── UrlCodec ◀── ViewController::dispatch(ViewAction) ◀───────┘
//! ```
//!
//! # Architecture
//!
//! The core crate is synchronous and pure - no I/O, no HTTP clients. Product
//! fetching belongs to the callers (`storefront`, `cli`).
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs and prices
//! - [`catalog`] - Products, variants and immutable catalog snapshots
//! - [`filter`] - Filter selections and the product predicate
//! - [`sort`] - Sort keys and comparators
//! - [`query`] - Ordered query-string parameters
//! - [`codec`] - `ViewState` ⇄ query parameters
//! - [`pagination`] - Offset and cursor windows
//! - [`facets`] - Per-dimension counts for filter widgets
//! - [`view`] - View derivation
//! - [`controller`] - Interaction state machine

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod codec;
pub mod controller;
pub mod facets;
pub mod filter;
pub mod pagination;
pub mod query;
pub mod sort;
pub mod types;
pub mod view;

pub use catalog::{
    Catalog, Product, ProductOption, ProductPage, ProductVariant, SelectedOption, resolve_variant,
};
pub use codec::UrlCodec;
pub use controller::{ControllerState, Navigation, ViewAction, ViewController};
pub use facets::Facets;
pub use filter::{Dimension, Dimensions, FilterState, PriceFilter, build_predicate, filter_products};
pub use pagination::{
    CursorWindow, OffsetWindow, PageInfo, PageState, PaginationMode, window,
};
pub use query::QueryParams;
pub use sort::{SortKey, SortKeyError, sort_products};
pub use types::*;
pub use view::{CollectionView, Pagination, SourceMode, ViewEngine, ViewState, ViewStatus};
