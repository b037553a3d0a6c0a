//! View state and derivation of the visible product slice.

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::catalog::{Product, ProductPage};
use crate::facets::Facets;
use crate::filter::{Dimensions, FilterState};
use crate::pagination::{CursorWindow, PageState, PaginationMode, window};
use crate::sort::SortKey;

/// Everything the URL describes about a listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    pub filters: FilterState,
    pub sort: SortKey,
    pub page: PageState,
}

impl ViewState {
    /// The unfiltered first page for a pagination mode.
    #[must_use]
    pub fn new(mode: PaginationMode) -> Self {
        Self {
            filters: FilterState::default(),
            sort: SortKey::default(),
            page: PageState::first(mode),
        }
    }

    /// Canonical form of this state.
    #[must_use]
    pub fn normalized(self) -> Self {
        let page = match self.page {
            PageState::Offset { page } => PageState::offset(page),
            PageState::Cursor { after, before } => PageState::Cursor {
                after: after.filter(|c| !c.is_empty()),
                before: before.filter(|c| !c.is_empty()),
            },
        };
        Self {
            filters: self.filters.normalized(),
            sort: self.sort,
            page,
        }
    }

    /// Replace the filters. The page goes back to the first one if they
    /// changed.
    #[must_use]
    pub fn with_filters(self, filters: FilterState) -> Self {
        let filters = filters.normalized();
        if filters == self.filters.clone().normalized() {
            return Self { filters, ..self };
        }
        let page = PageState::first(self.page.mode());
        Self {
            filters,
            page,
            ..self
        }
    }

    /// Replace the sort. The page goes back to the first one if it changed.
    #[must_use]
    pub fn with_sort(self, sort: SortKey) -> Self {
        if sort == self.sort {
            return self;
        }
        let page = PageState::first(self.page.mode());
        Self { sort, page, ..self }
    }

    /// Move to another page, keeping filters and sort.
    #[must_use]
    pub fn with_page(self, page: PageState) -> Self {
        Self { page, ..self }
    }
}

/// Where filtering, sorting and pagination happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceMode {
    /// The whole list is local: every dimension is filtered here, sorted
    /// here and cut into offset pages.
    ClientSide,
    /// The data source already applied `applied` (and the sort, when
    /// `sorted`) and paginates with cursors.
    Upstream { applied: Dimensions, sorted: bool },
}

impl SourceMode {
    /// Pagination strategy implied by the mode.
    #[must_use]
    pub const fn pagination_mode(self) -> PaginationMode {
        match self {
            Self::ClientSide => PaginationMode::Offset,
            Self::Upstream { .. } => PaginationMode::Cursor,
        }
    }

    /// Filters that still have to run locally.
    #[must_use]
    pub fn residual(self, filters: &FilterState) -> FilterState {
        match self {
            Self::ClientSide => filters.clone(),
            Self::Upstream { applied, .. } => filters.residual(applied),
        }
    }

    /// Whether the local sort must run.
    #[must_use]
    pub const fn sorts_locally(self) -> bool {
        match self {
            Self::ClientSide => true,
            Self::Upstream { sorted, .. } => !sorted,
        }
    }
}

/// Outcome of a view derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewStatus {
    /// Products to show.
    Ready,
    /// Filters are active and nothing satisfies them.
    NoMatches,
    /// Nothing to show and nothing filtered.
    EmptyCollection,
}

/// Pagination controls for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Pagination {
    Offset {
        page: u32,
        total_pages: u32,
        total_items: usize,
        has_previous: bool,
        has_next: bool,
    },
    Cursor(CursorWindow),
}

impl Pagination {
    /// Position of the next page, if any.
    #[must_use]
    pub fn next_page(&self) -> Option<PageState> {
        match self {
            Self::Offset { page, has_next, .. } => has_next.then(|| PageState::offset(page + 1)),
            Self::Cursor(window) => window.next.clone(),
        }
    }

    /// Position of the previous page, if any.
    #[must_use]
    pub fn previous_page(&self) -> Option<PageState> {
        match self {
            Self::Offset {
                page, has_previous, ..
            } => has_previous.then(|| PageState::offset(page - 1)),
            Self::Cursor(window) => window.previous.clone(),
        }
    }
}

/// What the presentation layer renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionView {
    pub visible_products: Vec<Product>,
    pub active_filters: FilterState,
    pub active_sort: SortKey,
    pub pagination: Pagination,
    pub status: ViewStatus,
    pub facets: Facets,
}

/// Derives [`CollectionView`]s from a [`ViewState`] and fetched products.
#[derive(Debug, Clone, Copy)]
pub struct ViewEngine {
    source: SourceMode,
    page_size: NonZeroUsize,
}

impl ViewEngine {
    #[must_use]
    pub const fn new(source: SourceMode, page_size: NonZeroUsize) -> Self {
        Self { source, page_size }
    }

    #[must_use]
    pub const fn source(&self) -> SourceMode {
        self.source
    }

    #[must_use]
    pub const fn page_size(&self) -> NonZeroUsize {
        self.page_size
    }

    /// Indices of the products that pass the local filters, in display
    /// order. Pagination is not applied.
    #[must_use]
    pub fn select(&self, products: &[Product], filters: &FilterState, sort: SortKey) -> Vec<usize> {
        let residual = self.source.residual(filters);
        let mut matching: Vec<(usize, &Product)> = products
            .iter()
            .enumerate()
            .filter(|(_, p)| residual.matches(p))
            .collect();

        if self.source.sorts_locally() && sort != SortKey::Relevance {
            let compare = sort.comparator();
            matching.sort_by(|(_, a), (_, b)| compare(a, b));
        }

        matching.into_iter().map(|(index, _)| index).collect()
    }

    /// Filter, sort and paginate in one go.
    #[must_use]
    pub fn derive(&self, state: &ViewState, page: &ProductPage) -> CollectionView {
        let selection = self.select(&page.products, &state.filters, state.sort);
        self.derive_from_selection(state, page, &selection)
    }

    /// Build the view from a selection computed earlier by [`Self::select`].
    #[must_use]
    pub fn derive_from_selection(
        &self,
        state: &ViewState,
        page: &ProductPage,
        selection: &[usize],
    ) -> CollectionView {
        let products = &page.products;

        let (visible, pagination) = match self.source {
            SourceMode::ClientSide => {
                let requested = match state.page {
                    PageState::Offset { page } => page,
                    PageState::Cursor { .. } => 1,
                };
                let window = window(selection, requested, self.page_size);
                let pagination = Pagination::Offset {
                    page: window.page,
                    total_pages: window.total_pages,
                    total_items: window.total_items,
                    has_previous: window.has_previous,
                    has_next: window.has_next,
                };
                (window.items, pagination)
            }
            SourceMode::Upstream { .. } => {
                let info = page.page_info.clone().unwrap_or_default();
                (selection, Pagination::Cursor(CursorWindow::from(&info)))
            }
        };

        let visible_products: Vec<Product> = visible
            .iter()
            .filter_map(|&i| products.get(i))
            .cloned()
            .collect();

        let status = if !selection.is_empty() {
            ViewStatus::Ready
        } else if state.filters.is_empty() {
            ViewStatus::EmptyCollection
        } else {
            ViewStatus::NoMatches
        };

        tracing::debug!(
            fetched = products.len(),
            matched = selection.len(),
            visible = visible_products.len(),
            ?status,
            "Derived collection view"
        );

        CollectionView {
            visible_products,
            active_filters: state.filters.clone(),
            active_sort: state.sort,
            pagination,
            status,
            facets: Facets::collect(products, &state.filters),
        }
    }
}
