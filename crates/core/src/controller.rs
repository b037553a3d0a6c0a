//! Interaction state machine.
//!
//! ```text
//!   Idle ──dispatch──▶ Navigating { target } ──commit──▶ Idle
//!                           │   ▲
//!                           └───┘ dispatch (supersedes the target)
//! ```
//!
//! `dispatch` never touches products: it turns a shopper action into the
//! next URL. Whoever owns the page navigates there, fetches products if it
//! has to, and calls `commit` with the URL it ended up on.

use std::collections::{HashMap, VecDeque};
use std::num::NonZeroUsize;

use rust_decimal::Decimal;

use crate::catalog::{Catalog, ProductPage};
use crate::codec::UrlCodec;
use crate::filter::{Dimension, FilterState, PriceFilter};
use crate::pagination::PageState;
use crate::query::QueryParams;
use crate::sort::SortKey;
use crate::view::{CollectionView, SourceMode, ViewEngine, ViewState};

/// Where the controller is in its cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Navigating { target: ViewState },
}

/// A shopper interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewAction {
    ToggleOptionValue { name: String, value: String },
    ToggleVendor(String),
    ToggleTag(String),
    SetPriceRange {
        min: Option<Decimal>,
        max: Option<Decimal>,
    },
    SetInStockOnly(bool),
    SetSort(SortKey),
    GoToPage(PageState),
    NextPage,
    PreviousPage,
    /// Remove every selected value of one option.
    ClearOption(String),
    ClearDimension(Dimension),
    ClearAll,
}

/// Where to navigate after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub state: ViewState,
    pub query: QueryParams,
}

/// Most filter/sort selections remembered per catalog snapshot.
const MAX_CACHED_SELECTIONS: usize = 16;

/// Cached selections for one catalog snapshot, oldest evicted first.
#[derive(Debug, Default)]
struct SelectionCache {
    catalog: Catalog,
    entries: HashMap<String, Vec<usize>>,
    order: VecDeque<String>,
}

impl SelectionCache {
    fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            ..Self::default()
        }
    }

    fn get_or_insert_with(
        &mut self,
        key: String,
        select: impl FnOnce() -> Vec<usize>,
    ) -> &[usize] {
        if !self.entries.contains_key(&key) {
            if self.order.len() >= MAX_CACHED_SELECTIONS
                && let Some(oldest) = self.order.pop_front()
            {
                self.entries.remove(&oldest);
            }
            self.order.push_back(key.clone());
        }
        self.entries.entry(key).or_insert_with(select)
    }
}

/// Owns the current view and turns actions into navigations.
#[derive(Debug)]
pub struct ViewController {
    codec: UrlCodec,
    engine: ViewEngine,
    state: ViewState,
    phase: ControllerState,
    page: ProductPage,
    view: Option<CollectionView>,
    cache: SelectionCache,
}

impl ViewController {
    /// Create an idle controller with no products yet.
    #[must_use]
    pub fn new(source: SourceMode, page_size: NonZeroUsize) -> Self {
        let mode = source.pagination_mode();
        Self {
            codec: UrlCodec::new(mode),
            engine: ViewEngine::new(source, page_size),
            state: ViewState::new(mode),
            phase: ControllerState::Idle,
            page: ProductPage::default(),
            view: None,
            cache: SelectionCache::default(),
        }
    }

    #[must_use]
    pub const fn codec(&self) -> &UrlCodec {
        &self.codec
    }

    /// The committed view state.
    #[must_use]
    pub const fn state(&self) -> &ViewState {
        &self.state
    }

    #[must_use]
    pub const fn phase(&self) -> &ControllerState {
        &self.phase
    }

    /// The last committed view.
    #[must_use]
    pub const fn view(&self) -> Option<&CollectionView> {
        self.view.as_ref()
    }

    /// Number of memoized selections for the current catalog.
    #[must_use]
    pub fn cached_selections(&self) -> usize {
        self.cache.entries.len()
    }

    /// Apply an action and return where to navigate.
    ///
    /// Actions build on the pending target when a navigation is already in
    /// flight. Returns `None` when the action leads nowhere: it leaves the
    /// target unchanged, or it is `NextPage` on the last page, or it pages
    /// while a filter or sort change is still pending (the committed
    /// cursors and page counts describe the old result set).
    pub fn dispatch(&mut self, action: ViewAction) -> Option<Navigation> {
        let current = match &self.phase {
            ControllerState::Navigating { target } => target.clone(),
            ControllerState::Idle => self.state.clone(),
        };
        let before = self.codec.normalize(&current);

        let target = match action {
            ViewAction::ToggleOptionValue { name, value } => {
                let mut filters = current.filters.clone();
                filters.toggle_option_value(&name, &value);
                current.with_filters(filters)
            }
            ViewAction::ToggleVendor(vendor) => {
                let mut filters = current.filters.clone();
                filters.toggle_vendor(&vendor);
                current.with_filters(filters)
            }
            ViewAction::ToggleTag(tag) => {
                let mut filters = current.filters.clone();
                filters.toggle_tag(&tag);
                current.with_filters(filters)
            }
            ViewAction::SetPriceRange { min, max } => {
                let mut filters = current.filters.clone();
                filters.price = Some(PriceFilter::new(min, max));
                current.with_filters(filters)
            }
            ViewAction::SetInStockOnly(in_stock_only) => {
                let mut filters = current.filters.clone();
                filters.in_stock_only = in_stock_only;
                current.with_filters(filters)
            }
            ViewAction::SetSort(sort) => current.with_sort(sort),
            ViewAction::GoToPage(page) => current.with_page(page),
            ViewAction::NextPage => {
                if !self.shows_committed_results(&current) {
                    return None;
                }
                let page = self.view.as_ref()?.pagination.next_page()?;
                current.with_page(page)
            }
            ViewAction::PreviousPage => {
                if !self.shows_committed_results(&current) {
                    return None;
                }
                let page = self.view.as_ref()?.pagination.previous_page()?;
                current.with_page(page)
            }
            ViewAction::ClearOption(name) => {
                let filters = current.filters.without_option(&name);
                current.with_filters(filters)
            }
            ViewAction::ClearDimension(dimension) => {
                let filters = current.filters.without(dimension);
                current.with_filters(filters)
            }
            ViewAction::ClearAll => current.with_filters(FilterState::default()),
        };

        let target = self.codec.normalize(&target);
        if target == before {
            return None;
        }
        let query = self.codec.encode(&target);
        tracing::debug!(query = %query, "Navigating");

        self.phase = ControllerState::Navigating {
            target: target.clone(),
        };
        Some(Navigation {
            state: target,
            query,
        })
    }

    /// Settle on a URL and recompute the view.
    ///
    /// `page` is the freshly fetched product page, or `None` when the fetch
    /// failed or was unnecessary; the previous products are reused then.
    pub fn commit(&mut self, query: &QueryParams, page: Option<ProductPage>) -> &CollectionView {
        self.state = self.codec.decode(query);

        if let Some(page) = page {
            if !page.products.same_snapshot(&self.cache.catalog) {
                self.cache = SelectionCache::new(page.products.clone());
            }
            self.page = page;
        }

        let key = self.selection_key();
        let selection = self.cache.get_or_insert_with(key, || {
            self.engine
                .select(&self.page.products, &self.state.filters, self.state.sort)
        });

        let view = self
            .engine
            .derive_from_selection(&self.state, &self.page, selection);
        self.phase = ControllerState::Idle;
        self.view.insert(view)
    }

    /// Whether `state` selects the same products as the committed view.
    fn shows_committed_results(&self, state: &ViewState) -> bool {
        state.filters == self.state.filters && state.sort == self.state.sort
    }

    /// Canonical encoding of the filters and sort, without the page.
    fn selection_key(&self) -> String {
        let unpaged = ViewState {
            filters: self.state.filters.clone(),
            sort: self.state.sort,
            page: PageState::first(self.codec.mode()),
        };
        self.codec.encode_to_string(&unpaged)
    }
}
