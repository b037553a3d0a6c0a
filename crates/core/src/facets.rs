//! Facet counts for filter widgets.
//!
//! Each dimension is counted over the products that match every *other*
//! active dimension. Selecting `Color=Red` therefore leaves the colour counts
//! unchanged (so the shopper can still widen the selection) while narrowing
//! the vendor and size counts.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use serde::Serialize;

use crate::catalog::Product;
use crate::filter::{Dimension, FilterState};

/// One selectable value and how many products carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetValue {
    pub value: String,
    pub count: usize,
    pub selected: bool,
}

/// Values of one product option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionFacet {
    pub name: String,
    pub values: Vec<FacetValue>,
}

/// In-stock / out-of-stock split.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AvailabilityFacet {
    pub in_stock: usize,
    pub out_of_stock: usize,
}

/// Lowest and highest price across the counted products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriceBounds {
    pub min: Decimal,
    pub max: Decimal,
}

/// Facet summary for a product list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Facets {
    pub vendors: Vec<FacetValue>,
    pub tags: Vec<FacetValue>,
    pub options: Vec<OptionFacet>,
    pub availability: AvailabilityFacet,
    pub price: Option<PriceBounds>,
}

impl Facets {
    /// Count facets over `products` under the current `filters`.
    #[must_use]
    pub fn collect(products: &[Product], filters: &FilterState) -> Self {
        let vendor_base = filters.without(Dimension::Vendor);
        let vendors = counted(
            products
                .iter()
                .filter(|p| vendor_base.matches(p) && !p.vendor.is_empty())
                .map(|p| p.vendor.as_str()),
            &filters.vendors,
        );

        let tag_base = filters.without(Dimension::Tags);
        let tags = counted(
            products
                .iter()
                .filter(|p| tag_base.matches(p))
                .flat_map(|p| p.tags.iter().map(String::as_str)),
            &filters.tags,
        );

        let options = option_names(products, filters)
            .into_iter()
            .map(|name| option_facet(products, filters, name))
            .collect();

        let stock_base = filters.without(Dimension::Availability);
        let availability = products
            .iter()
            .filter(|p| stock_base.matches(p))
            .fold(AvailabilityFacet::default(), |mut acc, p| {
                if p.is_in_stock() {
                    acc.in_stock += 1;
                } else {
                    acc.out_of_stock += 1;
                }
                acc
            });

        let price_base = filters.without(Dimension::Price);
        let price = products
            .iter()
            .filter(|p| price_base.matches(p))
            .map(|p| (p.price_range.min(), p.price_range.max()))
            .reduce(|(lo, hi), (min, max)| (lo.min(min), hi.max(max)))
            .map(|(min, max)| PriceBounds { min, max });

        Self {
            vendors,
            tags,
            options,
            availability,
            price,
        }
    }
}

/// Alphabetical value counts, keeping selected values even at zero.
fn counted<'a>(values: impl Iterator<Item = &'a str>, selected: &BTreeSet<String>) -> Vec<FacetValue> {
    let mut counts: BTreeMap<&str, usize> = selected.iter().map(|s| (s.as_str(), 0)).collect();
    for value in values {
        *counts.entry(value).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(value, count)| FacetValue {
            value: value.to_string(),
            count,
            selected: selected.contains(value),
        })
        .collect()
}

/// Option names in first-seen order, followed by selected names no product
/// carries.
fn option_names<'a>(products: &'a [Product], filters: &'a FilterState) -> Vec<&'a str> {
    let mut seen = BTreeSet::new();
    let declared = products
        .iter()
        .flat_map(|p| p.variants.iter())
        .flat_map(|v| v.selected_options.iter().map(|o| o.name.as_str()));
    let selected = filters.option_values.keys().map(String::as_str);

    declared
        .chain(selected)
        .filter(|name| seen.insert(*name))
        .collect()
}

fn option_facet(products: &[Product], filters: &FilterState, name: &str) -> OptionFacet {
    let base = filters.without_option(name);
    let selected = filters.option_values.get(name);

    // Value order follows first appearance, which keeps sizes as S, M, L.
    let mut values: Vec<FacetValue> = Vec::new();
    for product in products.iter().filter(|p| base.matches(p)) {
        for value in product.option_values(name) {
            match values.iter_mut().find(|f| f.value == value) {
                Some(facet) => facet.count += 1,
                None => values.push(FacetValue {
                    value: value.to_string(),
                    count: 1,
                    selected: selected.is_some_and(|s| s.contains(value)),
                }),
            }
        }
    }

    for value in selected.into_iter().flatten() {
        if !values.iter().any(|f| &f.value == value) {
            values.push(FacetValue {
                value: value.clone(),
                count: 0,
                selected: true,
            });
        }
    }

    OptionFacet {
        name: name.to_string(),
        values,
    }
}
