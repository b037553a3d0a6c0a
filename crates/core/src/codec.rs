//! Mapping between [`ViewState`] and URL query parameters.
//!
//! Encoding is canonical: parameters come out in a fixed order and defaults
//! are omitted, so two equal states always produce the same URL. Decoding is
//! permissive and never fails; anything it cannot make sense of is treated
//! as "no constraint".
//!
//! | param | meaning |
//! |---|---|
//! | `sort` | sort key, omitted for `relevance` |
//! | `filter.<Option>` | comma-joined option values |
//! | `vendor` / `tag` | comma-joined lists |
//! | `minPrice` / `maxPrice` | decimal bounds |
//! | `available` | `1` when only in-stock products are wanted |
//! | `page` | offset page, omitted for page 1 |
//! | `cursor` / `before` | opaque connection cursors |

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::filter::{FilterState, PriceFilter};
use crate::pagination::{PageState, PaginationMode};
use crate::query::{QueryParams, join_list, split_list};
use crate::sort::SortKey;
use crate::view::ViewState;

/// Query parameter names.
pub mod param {
    pub const SORT: &str = "sort";
    pub const PAGE: &str = "page";
    pub const CURSOR: &str = "cursor";
    pub const BEFORE: &str = "before";
    pub const MIN_PRICE: &str = "minPrice";
    pub const MAX_PRICE: &str = "maxPrice";
    pub const AVAILABLE: &str = "available";
    pub const VENDOR: &str = "vendor";
    pub const TAG: &str = "tag";
    /// Prefix of per-option parameters (`filter.Color`).
    pub const OPTION_PREFIX: &str = "filter.";
}

/// URL codec for one pagination mode.
///
/// A codec never reads or writes the other mode's parameters, so an offset
/// listing ignores a stray `cursor` and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UrlCodec {
    mode: PaginationMode,
}

impl UrlCodec {
    /// Create a codec for a pagination mode.
    #[must_use]
    pub const fn new(mode: PaginationMode) -> Self {
        Self { mode }
    }

    /// The pagination mode this codec reads and writes.
    #[must_use]
    pub const fn mode(&self) -> PaginationMode {
        self.mode
    }

    /// Encode a view state as canonical query parameters.
    #[must_use]
    pub fn encode(&self, state: &ViewState) -> QueryParams {
        let filters = state.filters.clone().normalized();
        let mut params = QueryParams::new();

        if state.sort != SortKey::Relevance {
            params.append(param::SORT, state.sort.as_str());
        }

        for (name, values) in &filters.option_values {
            params.append(
                format!("{}{name}", param::OPTION_PREFIX),
                join_list(values.iter().map(String::as_str)),
            );
        }
        if !filters.vendors.is_empty() {
            params.append(
                param::VENDOR,
                join_list(filters.vendors.iter().map(String::as_str)),
            );
        }
        if !filters.tags.is_empty() {
            params.append(param::TAG, join_list(filters.tags.iter().map(String::as_str)));
        }

        if let Some(price) = filters.price {
            if price.min > Decimal::ZERO {
                params.append(param::MIN_PRICE, price.min.normalize().to_string());
            }
            if let Some(max) = price.max {
                params.append(param::MAX_PRICE, max.normalize().to_string());
            }
        }
        if filters.in_stock_only {
            params.append(param::AVAILABLE, "1");
        }

        match (&state.page, self.mode) {
            (PageState::Offset { page }, PaginationMode::Offset) if *page > 1 => {
                params.append(param::PAGE, page.to_string());
            }
            (PageState::Cursor { after, before }, PaginationMode::Cursor) => {
                if let Some(after) = after.as_deref().filter(|c| !c.is_empty()) {
                    params.append(param::CURSOR, after);
                }
                if let Some(before) = before.as_deref().filter(|c| !c.is_empty()) {
                    params.append(param::BEFORE, before);
                }
            }
            _ => {}
        }

        params
    }

    /// Decode query parameters into a normalized view state.
    #[must_use]
    pub fn decode(&self, params: &QueryParams) -> ViewState {
        let mut filters = FilterState::default();

        for (key, value) in params.iter() {
            match key {
                param::VENDOR => filters.vendors.extend(split_list(value)),
                param::TAG => filters.tags.extend(split_list(value)),
                _ => {
                    if let Some(name) = key.strip_prefix(param::OPTION_PREFIX)
                        && !name.is_empty()
                    {
                        filters
                            .option_values
                            .entry(name.to_string())
                            .or_default()
                            .extend(split_list(value));
                    }
                }
            }
        }

        let min = params.get(param::MIN_PRICE).and_then(parse_price);
        let max = params.get(param::MAX_PRICE).and_then(parse_price);
        if min.is_some() || max.is_some() {
            filters.price = Some(PriceFilter::new(min, max));
        }

        filters.in_stock_only = params
            .get(param::AVAILABLE)
            .is_some_and(|v| matches!(v.trim(), "1" | "true"));

        let sort = params
            .get(param::SORT)
            .map(SortKey::parse)
            .unwrap_or_default();

        let page = match self.mode {
            PaginationMode::Offset => PageState::offset(
                params
                    .get(param::PAGE)
                    .and_then(parse_page)
                    .unwrap_or(1),
            ),
            PaginationMode::Cursor => PageState::Cursor {
                after: non_empty(params.get(param::CURSOR)),
                before: non_empty(params.get(param::BEFORE)),
            },
        };

        ViewState {
            filters: filters.normalized(),
            sort,
            page,
        }
    }

    /// Encode straight to a query string (no leading `?`).
    #[must_use]
    pub fn encode_to_string(&self, state: &ViewState) -> String {
        self.encode(state).to_query_string()
    }

    /// Decode a raw query string, with or without the leading `?`.
    #[must_use]
    pub fn decode_str(&self, query: &str) -> ViewState {
        self.decode(&QueryParams::parse(query))
    }

    /// Re-encode a query string in canonical form.
    #[must_use]
    pub fn canonicalize(&self, query: &str) -> String {
        self.encode_to_string(&self.decode_str(query))
    }

    /// Bring a state into the shape `decode` would produce for this mode.
    ///
    /// A page position belonging to the other pagination mode becomes the
    /// first page.
    #[must_use]
    pub fn normalize(&self, state: &ViewState) -> ViewState {
        let mut state = state.clone().normalized();
        if state.page.mode() != self.mode {
            state.page = PageState::first(self.mode);
        }
        state
    }
}

/// Parse a page number. Numbers past `u32::MAX` saturate so the windower
/// clamps them to the last page.
fn parse_page(raw: &str) -> Option<u32> {
    let digits = raw.trim();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(digits.parse::<u32>().unwrap_or(u32::MAX))
}

/// Parse a price bound; malformed or negative values are no bound.
fn parse_price(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw.trim())
        .ok()
        .filter(|d| !d.is_sign_negative())
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet};

    use super::*;

    fn offset() -> UrlCodec {
        UrlCodec::new(PaginationMode::Offset)
    }

    fn cursor() -> UrlCodec {
        UrlCodec::new(PaginationMode::Cursor)
    }

    fn set(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    fn busy_state() -> ViewState {
        let mut filters = FilterState {
            price: Some(PriceFilter::new(
                Some(Decimal::new(1050, 2)),
                Some(Decimal::from(40)),
            )),
            in_stock_only: true,
            vendors: set(&["Acme", "Smith, Jones & Co"]),
            tags: set(&["gift"]),
            ..FilterState::default()
        };
        filters.option_values = BTreeMap::from([
            ("Color".to_string(), set(&["Blue", "Red"])),
            ("Size".to_string(), set(&["M"])),
        ]);
        ViewState {
            filters,
            sort: SortKey::PriceDesc,
            page: PageState::offset(3),
        }
    }

    #[test]
    fn test_default_state_encodes_to_nothing() {
        assert!(offset().encode(&ViewState::default()).is_empty());
    }

    #[test]
    fn test_encode_parameter_order() {
        assert_eq!(
            offset().encode_to_string(&busy_state()),
            "sort=price-desc&filter.Color=Blue,Red&filter.Size=M\
             &vendor=Acme,Smith%5C,%20Jones%20%26%20Co&tag=gift\
             &minPrice=10.5&maxPrice=40&available=1&page=3"
        );
    }

    #[test]
    fn test_round_trip_law() {
        let codec = offset();
        let states = [
            ViewState::default(),
            busy_state(),
            ViewState {
                sort: SortKey::TitleAsc,
                ..ViewState::default()
            },
            ViewState {
                filters: FilterState {
                    price: Some(PriceFilter::new(None, Some(Decimal::ZERO))),
                    option_values: BTreeMap::from([("Size".to_string(), BTreeSet::new())]),
                    ..FilterState::default()
                },
                ..ViewState::default()
            },
        ];

        for state in states {
            assert_eq!(codec.decode(&codec.encode(&state)), state.normalized());
        }
    }

    #[test]
    fn test_round_trip_law_cursor_mode() {
        let codec = cursor();
        let state = ViewState {
            page: PageState::after("eyJsYXN0X2lkIjo0Mn0="),
            ..busy_state()
        };
        assert_eq!(codec.decode(&codec.encode(&state)), state.normalized());
    }

    #[test]
    fn test_decode_ignores_unknown_and_malformed() {
        let state = offset().decode_str("?utm_source=mail&minPrice=abc&maxPrice=-4&page=-2&sort=bogus");
        assert_eq!(state, ViewState::default());
    }

    #[test]
    fn test_decode_page_zero_is_first_page() {
        assert_eq!(offset().decode_str("page=0").page, PageState::offset(1));
        assert_eq!(offset().decode_str("page=two").page, PageState::offset(1));
    }

    #[test]
    fn test_decode_oversized_page_saturates() {
        assert_eq!(
            offset().decode_str("page=4294967296").page,
            PageState::offset(u32::MAX)
        );
        assert_eq!(
            offset().decode_str("page=123456789012345678901234567890").page,
            PageState::offset(u32::MAX)
        );
        assert_eq!(offset().decode_str("page=+7").page, PageState::offset(1));
    }

    #[test]
    fn test_decode_merges_lists_and_last_scalar_wins() {
        let state = offset().decode_str("vendor=Acme&vendor=Globex&filter.Color=Red&filter.Color=Blue&sort=newest&sort=price-asc");
        assert_eq!(state.filters.vendors, set(&["Acme", "Globex"]));
        assert_eq!(state.filters.option_values["Color"], set(&["Blue", "Red"]));
        assert_eq!(state.sort, SortKey::PriceAsc);
    }

    #[test]
    fn test_decode_available_true_spelling() {
        assert!(offset().decode_str("available=true").filters.in_stock_only);
        assert!(!offset().decode_str("available=0").filters.in_stock_only);
    }

    #[test]
    fn test_modes_ignore_each_other() {
        let query = "page=4&cursor=abc&before=";
        assert_eq!(offset().decode_str(query).page, PageState::offset(4));
        assert_eq!(cursor().decode_str(query).page, PageState::after("abc"));
    }

    #[test]
    fn test_encode_drops_page_of_other_mode() {
        let state = ViewState {
            page: PageState::offset(5),
            ..ViewState::default()
        };
        assert!(cursor().encode(&state).is_empty());
        assert_eq!(cursor().normalize(&state).page, PageState::first(PaginationMode::Cursor));
    }

    #[test]
    fn test_canonicalize_reorders_and_drops_defaults() {
        assert_eq!(
            offset().canonicalize("?page=1&available=1&sort=relevance&vendor=Acme&filter.Size="),
            "vendor=Acme&available=1"
        );
    }
}
