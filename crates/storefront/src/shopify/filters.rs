//! Pushing filter selections and sort order down to the Storefront API.
//!
//! Shopify ORs `ProductFilter` entries of the same kind and ANDs different
//! kinds, which is exactly the engine's rule, so every dimension can be
//! applied upstream.

use collection_view_core::{Dimensions, FilterState, SortKey, SourceMode};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

use super::types::ProductCollectionSortKey;

/// One `ProductFilter` input object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ProductFilterInput {
    Price(PriceRangeFilter),
    Available(bool),
    VariantOption(VariantOptionFilter),
    ProductVendor(String),
    Tag(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceRangeFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantOptionFilter {
    pub name: String,
    pub value: String,
}

/// Translate filter selections into `ProductFilter` inputs.
#[must_use]
pub fn product_filters(filters: &FilterState) -> Vec<ProductFilterInput> {
    let mut inputs = Vec::new();

    if let Some(price) = filters.price.as_ref().filter(|p| !p.is_unbounded()) {
        inputs.push(ProductFilterInput::Price(PriceRangeFilter {
            min: (price.min > Decimal::ZERO).then(|| price.min.to_f64()).flatten(),
            max: price.max.and_then(|max| max.to_f64()),
        }));
    }

    if filters.in_stock_only {
        inputs.push(ProductFilterInput::Available(true));
    }

    for (name, values) in &filters.option_values {
        inputs.extend(values.iter().map(|value| {
            ProductFilterInput::VariantOption(VariantOptionFilter {
                name: name.clone(),
                value: value.clone(),
            })
        }));
    }

    inputs.extend(
        filters
            .vendors
            .iter()
            .cloned()
            .map(ProductFilterInput::ProductVendor),
    );
    inputs.extend(filters.tags.iter().cloned().map(ProductFilterInput::Tag));

    inputs
}

/// `Collection.products` sort key and `reverse` flag for a sort key.
#[must_use]
pub const fn collection_sort(sort: SortKey) -> (ProductCollectionSortKey, bool) {
    match sort {
        SortKey::Relevance => (ProductCollectionSortKey::CollectionDefault, false),
        SortKey::PriceAsc => (ProductCollectionSortKey::Price, false),
        SortKey::PriceDesc => (ProductCollectionSortKey::Price, true),
        SortKey::Newest => (ProductCollectionSortKey::Created, true),
        SortKey::BestSelling => (ProductCollectionSortKey::BestSelling, false),
        SortKey::TitleAsc => (ProductCollectionSortKey::Title, false),
        SortKey::TitleDesc => (ProductCollectionSortKey::Title, true),
    }
}

/// Source mode for listings fetched through [`product_filters`] and
/// [`collection_sort`].
#[must_use]
pub const fn upstream_source() -> SourceMode {
    SourceMode::Upstream {
        applied: Dimensions::ALL,
        sorted: true,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use collection_view_core::PriceFilter;
    use serde_json::json;

    #[test]
    fn test_empty_filters_push_nothing() {
        assert!(product_filters(&FilterState::default()).is_empty());
    }

    #[test]
    fn test_filters_serialize_as_product_filter_objects() {
        let mut filters = FilterState {
            price: Some(PriceFilter::new(Some(Decimal::new(1050, 2)), None)),
            in_stock_only: true,
            ..FilterState::default()
        };
        filters.toggle_option_value("Color", "Red");
        filters.toggle_option_value("Color", "Blue");
        filters.toggle_vendor("Acme");
        filters.toggle_tag("summer");

        assert_eq!(
            serde_json::to_value(product_filters(&filters)).unwrap(),
            json!([
                {"price": {"min": 10.5}},
                {"available": true},
                {"variantOption": {"name": "Color", "value": "Blue"}},
                {"variantOption": {"name": "Color", "value": "Red"}},
                {"productVendor": "Acme"},
                {"tag": "summer"}
            ])
        );
    }

    #[test]
    fn test_price_with_only_max() {
        let filters = FilterState {
            price: Some(PriceFilter::new(None, Some(Decimal::from(50)))),
            ..FilterState::default()
        };
        assert_eq!(
            serde_json::to_value(product_filters(&filters)).unwrap(),
            json!([{"price": {"max": 50.0}}])
        );
    }

    #[test]
    fn test_collection_sort_mapping() {
        assert_eq!(
            collection_sort(SortKey::PriceDesc),
            (ProductCollectionSortKey::Price, true)
        );
        assert_eq!(
            collection_sort(SortKey::Newest),
            (ProductCollectionSortKey::Created, true)
        );
        assert_eq!(
            collection_sort(SortKey::Relevance),
            (ProductCollectionSortKey::CollectionDefault, false)
        );
    }

    #[test]
    fn test_upstream_source_applies_everything() {
        let source = upstream_source();
        assert!(!source.sorts_locally());
        let mut filters = FilterState::default();
        filters.toggle_tag("sale");
        assert!(source.residual(&filters).is_empty());
    }
}
