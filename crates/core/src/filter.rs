//! Filter selections and the product predicate built from them.
//!
//! # Semantics
//!
//! - Dimensions combine with AND: a product must satisfy every active one.
//! - Values inside a dimension combine with OR.
//! - An empty selection is the same as no selection.
//!
//! Option filters are matched against variants: a product satisfies
//! `Color ∈ {Red, Blue}` when at least one variant has `Color` set to `Red`
//! or `Blue`. A product none of whose variants carry the option does not
//! match.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::types::PriceRange;

/// Inclusive price bounds.
///
/// `min` defaults to zero and `max` to unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceFilter {
    /// Lower bound (inclusive).
    pub min: Decimal,
    /// Upper bound (inclusive); `None` is unbounded.
    pub max: Option<Decimal>,
}

impl PriceFilter {
    /// Build bounds from optional endpoints.
    #[must_use]
    pub fn new(min: Option<Decimal>, max: Option<Decimal>) -> Self {
        Self {
            min: min.unwrap_or(Decimal::ZERO),
            max,
        }
    }

    /// Whether these bounds constrain nothing.
    #[must_use]
    pub fn is_unbounded(&self) -> bool {
        self.min <= Decimal::ZERO && self.max.is_none()
    }

    /// Whether a price range overlaps these bounds.
    ///
    /// Touching endpoints count as overlap, so a 10–20 product matches a
    /// 20–30 filter.
    #[must_use]
    pub fn overlaps(&self, range: &PriceRange) -> bool {
        let below_max = self.max.is_none_or(|max| range.min() <= max);
        below_max && range.max() >= self.min
    }
}

/// One filter dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Price,
    Availability,
    OptionValues,
    Vendor,
    Tags,
}

impl Dimension {
    /// Every dimension, in evaluation order.
    pub const ALL: [Self; 5] = [
        Self::Price,
        Self::Availability,
        Self::OptionValues,
        Self::Vendor,
        Self::Tags,
    ];

    const fn bit(self) -> u8 {
        match self {
            Self::Price => 1,
            Self::Availability => 1 << 1,
            Self::OptionValues => 1 << 2,
            Self::Vendor => 1 << 3,
            Self::Tags => 1 << 4,
        }
    }
}

/// A set of filter dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Dimensions(u8);

impl Dimensions {
    /// No dimensions.
    pub const NONE: Self = Self(0);
    /// Every dimension.
    pub const ALL: Self = Self(0b1_1111);

    /// This set plus one dimension.
    #[must_use]
    pub const fn with(self, dimension: Dimension) -> Self {
        Self(self.0 | dimension.bit())
    }

    /// Whether the dimension is in the set.
    #[must_use]
    pub const fn contains(self, dimension: Dimension) -> bool {
        self.0 & dimension.bit() != 0
    }

    /// Whether the set is empty.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl FromIterator<Dimension> for Dimensions {
    fn from_iter<I: IntoIterator<Item = Dimension>>(iter: I) -> Self {
        iter.into_iter().fold(Self::NONE, Self::with)
    }
}

/// Active filter selections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    /// Price bounds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<PriceFilter>,
    /// Only show products that can be bought.
    #[serde(default)]
    pub in_stock_only: bool,
    /// Option name → accepted values.
    #[serde(default)]
    pub option_values: BTreeMap<String, BTreeSet<String>>,
    /// Accepted vendors.
    #[serde(default)]
    pub vendors: BTreeSet<String>,
    /// Accepted tags.
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

impl FilterState {
    /// Canonical form: empty selections and unbounded prices removed.
    ///
    /// Negative price bounds are treated as absent, the same way the URL
    /// decoder treats them.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if let Some(price) = self.price.as_mut() {
            price.min = price.min.max(Decimal::ZERO);
            price.max = price.max.filter(|max| !max.is_sign_negative());
        }
        if self.price.is_some_and(|p| p.is_unbounded()) {
            self.price = None;
        }

        self.option_values.retain(|name, values| {
            values.retain(|v| !v.is_empty());
            !name.is_empty() && !values.is_empty()
        });
        self.vendors.retain(|v| !v.is_empty());
        self.tags.retain(|t| !t.is_empty());
        self
    }

    /// Dimensions that currently constrain the result.
    #[must_use]
    pub fn active_dimensions(&self) -> Dimensions {
        Dimension::ALL
            .into_iter()
            .filter(|d| self.is_active(*d))
            .collect()
    }

    /// Whether a dimension constrains the result.
    #[must_use]
    pub fn is_active(&self, dimension: Dimension) -> bool {
        match dimension {
            Dimension::Price => self.price.is_some_and(|p| !p.is_unbounded()),
            Dimension::Availability => self.in_stock_only,
            Dimension::OptionValues => self.option_values.values().any(|v| !v.is_empty()),
            Dimension::Vendor => !self.vendors.is_empty(),
            Dimension::Tags => !self.tags.is_empty(),
        }
    }

    /// Whether nothing is filtered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active_dimensions().is_empty()
    }

    /// Copy of these filters with one dimension removed.
    #[must_use]
    pub fn without(&self, dimension: Dimension) -> Self {
        let mut next = self.clone();
        next.clear(dimension);
        next
    }

    /// Copy of these filters with one option name removed.
    #[must_use]
    pub fn without_option(&self, name: &str) -> Self {
        let mut next = self.clone();
        next.option_values.remove(name);
        next
    }

    /// Filters still to run locally after `applied` ran upstream.
    #[must_use]
    pub fn residual(&self, applied: Dimensions) -> Self {
        Dimension::ALL
            .into_iter()
            .filter(|d| applied.contains(*d))
            .fold(self.clone(), |acc, d| acc.without(d))
    }

    /// Remove every selection in a dimension.
    pub fn clear(&mut self, dimension: Dimension) {
        match dimension {
            Dimension::Price => self.price = None,
            Dimension::Availability => self.in_stock_only = false,
            Dimension::OptionValues => self.option_values.clear(),
            Dimension::Vendor => self.vendors.clear(),
            Dimension::Tags => self.tags.clear(),
        }
    }

    /// Add or remove one option value.
    pub fn toggle_option_value(&mut self, name: &str, value: &str) {
        let values = self.option_values.entry(name.to_string()).or_default();
        toggle(values, value);
        if values.is_empty() {
            self.option_values.remove(name);
        }
    }

    /// Add or remove one vendor.
    pub fn toggle_vendor(&mut self, vendor: &str) {
        toggle(&mut self.vendors, vendor);
    }

    /// Add or remove one tag.
    pub fn toggle_tag(&mut self, tag: &str) {
        toggle(&mut self.tags, tag);
    }

    /// Whether a product satisfies every active dimension.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(price) = self.price
            && !price.overlaps(&product.price_range)
        {
            return false;
        }

        if self.in_stock_only && !product.is_in_stock() {
            return false;
        }

        if !self.vendors.is_empty() && !self.vendors.contains(&product.vendor) {
            return false;
        }

        if !self.tags.is_empty() && self.tags.is_disjoint(&product.tags) {
            return false;
        }

        self.option_values
            .iter()
            .filter(|(_, wanted)| !wanted.is_empty())
            .all(|(name, wanted)| {
                product
                    .variants
                    .iter()
                    .filter_map(|v| v.option_value(name))
                    .any(|value| wanted.contains(value))
            })
    }
}

fn toggle(set: &mut BTreeSet<String>, value: &str) {
    if !set.remove(value) {
        set.insert(value.to_string());
    }
}

/// Build the predicate for a filter selection.
pub fn build_predicate(filters: &FilterState) -> impl Fn(&Product) -> bool + '_ {
    move |product| filters.matches(product)
}

/// Keep the products matching `filters`, preserving input order.
pub fn filter_products<'a, I>(products: I, filters: &FilterState) -> Vec<&'a Product>
where
    I: IntoIterator<Item = &'a Product>,
{
    let predicate = build_predicate(filters);
    products.into_iter().filter(|p| predicate(p)).collect()
}
