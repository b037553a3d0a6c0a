//! Page state and windowing.
//!
//! Two pagination strategies co-exist and are deliberately kept apart:
//!
//! - **Offset** pagination for lists filtered entirely in memory. Any page
//!   can be jumped to.
//! - **Cursor** pagination mirroring a GraphQL `pageInfo` when the data
//!   source filters and pages server-side. Only the neighbouring pages are
//!   reachable; there is no way to resume at an arbitrary offset.

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

/// Which pagination strategy a listing uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaginationMode {
    #[default]
    Offset,
    Cursor,
}

/// Position within a listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageState {
    /// 1-based page number.
    Offset { page: u32 },
    /// GraphQL connection cursors.
    Cursor {
        after: Option<String>,
        before: Option<String>,
    },
}

impl PageState {
    /// The first page for a pagination mode.
    #[must_use]
    pub const fn first(mode: PaginationMode) -> Self {
        match mode {
            PaginationMode::Offset => Self::Offset { page: 1 },
            PaginationMode::Cursor => Self::Cursor {
                after: None,
                before: None,
            },
        }
    }

    /// An offset page; values below 1 become 1.
    #[must_use]
    pub fn offset(page: u32) -> Self {
        Self::Offset { page: page.max(1) }
    }

    /// A cursor position after the given cursor.
    #[must_use]
    pub fn after(cursor: impl Into<String>) -> Self {
        Self::Cursor {
            after: Some(cursor.into()),
            before: None,
        }
    }

    /// A cursor position before the given cursor.
    #[must_use]
    pub fn before(cursor: impl Into<String>) -> Self {
        Self::Cursor {
            after: None,
            before: Some(cursor.into()),
        }
    }

    /// The strategy this state belongs to.
    #[must_use]
    pub const fn mode(&self) -> PaginationMode {
        match self {
            Self::Offset { .. } => PaginationMode::Offset,
            Self::Cursor { .. } => PaginationMode::Cursor,
        }
    }

    /// Whether this is the first page.
    #[must_use]
    pub const fn is_first(&self) -> bool {
        match self {
            Self::Offset { page } => *page <= 1,
            Self::Cursor { after, before } => after.is_none() && before.is_none(),
        }
    }
}

impl Default for PageState {
    fn default() -> Self {
        Self::first(PaginationMode::Offset)
    }
}

/// GraphQL connection page info.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    /// Whether there are more items after this page.
    pub has_next_page: bool,
    /// Whether there are items before this page.
    pub has_previous_page: bool,
    /// Cursor for the first item.
    pub start_cursor: Option<String>,
    /// Cursor for the last item.
    pub end_cursor: Option<String>,
}

/// One page of an in-memory list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetWindow<'a, T> {
    /// Items on the page.
    pub items: &'a [T],
    /// The page actually shown, after clamping.
    pub page: u32,
    /// Number of pages (at least 1).
    pub total_pages: u32,
    /// Number of items across all pages.
    pub total_items: usize,
    /// Whether a previous page exists.
    pub has_previous: bool,
    /// Whether a next page exists.
    pub has_next: bool,
}

/// Cut one page out of a list.
///
/// `page` is clamped into `[1, total_pages]` so stale bookmarks land on the
/// nearest real page instead of an empty one. An empty list has a single,
/// empty page.
#[must_use]
pub fn window<T>(items: &[T], page: u32, page_size: NonZeroUsize) -> OffsetWindow<'_, T> {
    let size = page_size.get();
    let total_items = items.len();
    let total_pages = u32::try_from(total_items.div_ceil(size).max(1)).unwrap_or(u32::MAX);
    let page = page.clamp(1, total_pages);

    let start = usize::try_from(page - 1)
        .unwrap_or(usize::MAX)
        .saturating_mul(size)
        .min(total_items);
    let end = start.saturating_add(size).min(total_items);

    OffsetWindow {
        items: items.get(start..end).unwrap_or_default(),
        page,
        total_pages,
        total_items,
        has_previous: page > 1,
        has_next: page < total_pages,
    }
}

/// Navigation affordances for a cursor-paginated page.
///
/// The page itself was already cut by the data source; this only exposes
/// where the neighbouring pages are.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CursorWindow {
    /// Whether a next page exists.
    pub has_next: bool,
    /// Whether a previous page exists.
    pub has_previous: bool,
    /// Position of the next page.
    pub next: Option<PageState>,
    /// Position of the previous page.
    pub previous: Option<PageState>,
}

impl From<&PageInfo> for CursorWindow {
    fn from(info: &PageInfo) -> Self {
        let next = info
            .end_cursor
            .as_deref()
            .filter(|_| info.has_next_page)
            .map(PageState::after);
        let previous = info
            .start_cursor
            .as_deref()
            .filter(|_| info.has_previous_page)
            .map(PageState::before);

        Self {
            has_next: next.is_some(),
            has_previous: previous.is_some(),
            next,
            previous,
        }
    }
}
