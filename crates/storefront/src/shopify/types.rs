//! Wire types for Storefront API requests and responses.
//!
//! These mirror the GraphQL selections in `queries` and are converted into
//! engine types before leaving the `shopify` module.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::GraphQLError;
use super::filters::ProductFilterInput;

// =============================================================================
// Envelope
// =============================================================================

/// A GraphQL POST body.
#[derive(Debug, Serialize)]
pub struct GraphQlRequest<'a, V> {
    pub query: &'a str,
    pub variables: V,
}

/// A GraphQL response envelope.
#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQLError>,
}

// =============================================================================
// Variables
// =============================================================================

/// Sort keys accepted by `Collection.products`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductCollectionSortKey {
    CollectionDefault,
    Price,
    Created,
    BestSelling,
    Title,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionProductsVariables<'a> {
    pub handle: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<&'a str>,
    pub sort_key: ProductCollectionSortKey,
    pub reverse: bool,
    pub filters: Vec<ProductFilterInput>,
}

#[derive(Debug, Serialize)]
pub struct CatalogProductsVariables<'a> {
    pub first: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<&'a str>,
}

// =============================================================================
// Response data
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct CollectionProductsData {
    pub collection: Option<CollectionNode>,
}

#[derive(Debug, Deserialize)]
pub struct CollectionNode {
    pub handle: String,
    pub title: String,
    pub products: ProductConnectionNode,
}

#[derive(Debug, Deserialize)]
pub struct CatalogProductsData {
    pub products: ProductConnectionNode,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductConnectionNode {
    pub page_info: PageInfoNode,
    pub nodes: Vec<ProductNode>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfoNode {
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub start_cursor: Option<String>,
    pub end_cursor: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoneyNode {
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub currency_code: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRangeNode {
    pub min_variant_price: MoneyNode,
    pub max_variant_price: MoneyNode,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OptionValueNode {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionNode {
    pub name: String,
    #[serde(default)]
    pub option_values: Vec<OptionValueNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelectedOptionNode {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantNode {
    pub id: String,
    pub title: String,
    pub available_for_sale: bool,
    #[serde(default)]
    pub selected_options: Vec<SelectedOptionNode>,
    pub price: MoneyNode,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VariantConnectionNode {
    #[serde(default)]
    pub nodes: Vec<VariantNode>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductNode {
    pub id: String,
    pub handle: String,
    pub title: String,
    #[serde(default)]
    pub vendor: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub available_for_sale: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub price_range: PriceRangeNode,
    #[serde(default)]
    pub options: Vec<OptionNode>,
    #[serde(default)]
    pub variants: VariantConnectionNode,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sort_key_wire_names() {
        assert_eq!(
            serde_json::to_value(ProductCollectionSortKey::CollectionDefault).unwrap(),
            json!("COLLECTION_DEFAULT")
        );
        assert_eq!(
            serde_json::to_value(ProductCollectionSortKey::BestSelling).unwrap(),
            json!("BEST_SELLING")
        );
    }

    #[test]
    fn test_collection_variables_skip_absent_cursors() {
        let variables = CollectionProductsVariables {
            handle: "summer",
            first: Some(12),
            last: None,
            after: None,
            before: None,
            sort_key: ProductCollectionSortKey::Price,
            reverse: true,
            filters: vec![],
        };
        assert_eq!(
            serde_json::to_value(&variables).unwrap(),
            json!({
                "handle": "summer",
                "first": 12,
                "sortKey": "PRICE",
                "reverse": true,
                "filters": []
            })
        );
    }

    #[test]
    fn test_product_node_defaults_missing_lists() {
        let node: ProductNode = serde_json::from_value(json!({
            "id": "gid://shopify/Product/1",
            "handle": "tee",
            "title": "Tee",
            "availableForSale": true,
            "createdAt": "2024-05-01T12:00:00Z",
            "priceRange": {
                "minVariantPrice": {"amount": "10.0", "currencyCode": "USD"},
                "maxVariantPrice": {"amount": "12.50", "currencyCode": "USD"}
            }
        }))
        .unwrap();
        assert!(node.tags.is_empty());
        assert!(node.variants.nodes.is_empty());
        assert_eq!(node.price_range.max_variant_price.amount, Decimal::new(1250, 2));
    }

    #[test]
    fn test_response_without_errors_field() {
        let response: GraphQlResponse<CatalogProductsData> = serde_json::from_value(json!({
            "data": {"products": {
                "pageInfo": {"hasNextPage": false, "hasPreviousPage": false,
                             "startCursor": null, "endCursor": null},
                "nodes": []
            }}
        }))
        .unwrap();
        assert!(response.errors.is_empty());
        assert!(response.data.unwrap().products.nodes.is_empty());
    }
}
