//! Sort keys and their comparators.
//!
//! Price, newest and ranked best-selling comparisons end in an `id`
//! tie-break so that the same request always yields the same order, page
//! after page. Identical titles, unranked products and `relevance` compare
//! equal and rely on [`sort_products`] being a stable sort, which keeps
//! them in source order.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::Product;

/// Error returned by the strict [`FromStr`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown sort key: {0}")]
pub struct SortKeyError(pub String);

/// Product list ordering.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Source order.
    #[default]
    Relevance,
    PriceAsc,
    PriceDesc,
    Newest,
    BestSelling,
    TitleAsc,
    TitleDesc,
}

impl SortKey {
    /// Every sort key, in menu order.
    pub const ALL: [Self; 7] = [
        Self::Relevance,
        Self::PriceAsc,
        Self::PriceDesc,
        Self::Newest,
        Self::BestSelling,
        Self::TitleAsc,
        Self::TitleDesc,
    ];

    /// Parse from a URL parameter value.
    ///
    /// Also accepts the Shopify theme spellings. Anything unrecognised
    /// falls back to [`SortKey::Relevance`].
    #[must_use]
    pub fn parse(s: &str) -> Self {
        s.parse().unwrap_or_else(|_| match s.trim() {
            "price-ascending" | "price_asc" => Self::PriceAsc,
            "price-descending" | "price_desc" => Self::PriceDesc,
            "created-descending" | "created" => Self::Newest,
            "best_selling" => Self::BestSelling,
            "title-ascending" | "title_asc" => Self::TitleAsc,
            "title-descending" | "title_desc" => Self::TitleDesc,
            other => {
                tracing::debug!(sort = other, "Unknown sort key, using relevance");
                Self::Relevance
            }
        })
    }

    /// Convert to URL parameter value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::PriceAsc => "price-asc",
            Self::PriceDesc => "price-desc",
            Self::Newest => "newest",
            Self::BestSelling => "best-selling",
            Self::TitleAsc => "title-asc",
            Self::TitleDesc => "title-desc",
        }
    }

    /// Comparator implementing this order.
    #[must_use]
    pub fn comparator(self) -> fn(&Product, &Product) -> Ordering {
        match self {
            Self::Relevance => |_: &Product, _: &Product| Ordering::Equal,
            Self::PriceAsc => |a: &Product, b: &Product| {
                a.price_range
                    .min()
                    .cmp(&b.price_range.min())
                    .then_with(|| by_id(a, b))
            },
            Self::PriceDesc => |a: &Product, b: &Product| {
                b.price_range
                    .min()
                    .cmp(&a.price_range.min())
                    .then_with(|| by_id(a, b))
            },
            Self::Newest => |a: &Product, b: &Product| match (a.created_at, b.created_at) {
                (Some(x), Some(y)) => y.cmp(&x).then_with(|| by_id(a, b)),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => by_id(a, b),
            },
            Self::BestSelling => |a: &Product, b: &Product| match (a.sales_rank, b.sales_rank) {
                (Some(x), Some(y)) => x.cmp(&y).then_with(|| by_id(a, b)),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            // Identical titles compare equal so the stable sort keeps input order.
            Self::TitleAsc => |a: &Product, b: &Product| compare_titles(&a.title, &b.title),
            Self::TitleDesc => |a: &Product, b: &Product| compare_titles(&b.title, &a.title),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = SortKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == trimmed)
            .or(match trimmed {
                "manual" => Some(Self::Relevance),
                _ => None,
            })
            .ok_or_else(|| SortKeyError(s.to_string()))
    }
}

fn by_id(a: &Product, b: &Product) -> Ordering {
    a.id.cmp(&b.id)
}

/// Compare titles the way a reader expects in a product grid.
///
/// Titles are transliterated to ASCII and case-folded first ("Éclair" sorts
/// with "eclair", not after "zucchini"); the raw title breaks ties so the
/// order stays total.
fn compare_titles(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.cmp(b))
}

fn collation_key(title: &str) -> String {
    unidecode::unidecode(title).to_lowercase()
}

/// Sort products in place with a stable sort.
pub fn sort_products(products: &mut [&Product], key: SortKey) {
    if key == SortKey::Relevance {
        return;
    }
    products.sort_by(|a, b| (key.comparator())(a, b));
}
