//! Wire type to engine type conversions.

use collection_view_core::{
    Money, PageInfo, PriceRange, Product, ProductId, ProductOption, ProductVariant,
    SelectedOption, VariantId,
};

use super::types::{MoneyNode, PageInfoNode, ProductNode, VariantNode};

impl From<MoneyNode> for Money {
    fn from(node: MoneyNode) -> Self {
        Self::new(node.amount, node.currency_code)
    }
}

impl From<PageInfoNode> for PageInfo {
    fn from(node: PageInfoNode) -> Self {
        Self {
            has_next_page: node.has_next_page,
            has_previous_page: node.has_previous_page,
            start_cursor: node.start_cursor,
            end_cursor: node.end_cursor,
        }
    }
}

impl From<VariantNode> for ProductVariant {
    fn from(node: VariantNode) -> Self {
        Self {
            id: VariantId::new(node.id),
            title: node.title,
            selected_options: node
                .selected_options
                .into_iter()
                .map(|o| SelectedOption::new(o.name, o.value))
                .collect(),
            price: node.price.into(),
            available_for_sale: node.available_for_sale,
        }
    }
}

impl From<ProductNode> for Product {
    fn from(node: ProductNode) -> Self {
        Self {
            id: ProductId::new(node.id),
            handle: node.handle,
            title: node.title,
            vendor: node.vendor,
            tags: node.tags.into_iter().collect(),
            price_range: PriceRange::new(
                node.price_range.min_variant_price.into(),
                node.price_range.max_variant_price.into(),
            ),
            available_for_sale: node.available_for_sale,
            options: node
                .options
                .into_iter()
                .map(|o| ProductOption {
                    name: o.name,
                    values: o.option_values.into_iter().map(|v| v.name).collect(),
                })
                .collect(),
            variants: node.variants.nodes.into_iter().map(Into::into).collect(),
            created_at: node.created_at,
            sales_rank: None,
        }
    }
}

/// Convert a page of nodes, ranking them by position when `rank_from` is set.
///
/// `rank_from` is the rank of the first node.
pub fn convert_products(nodes: Vec<ProductNode>, rank_from: Option<u32>) -> Vec<Product> {
    nodes
        .into_iter()
        .zip(0u32..)
        .map(|(node, offset)| {
            let mut product = Product::from(node);
            product.sales_rank = rank_from.map(|start| start.saturating_add(offset));
            product
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use serde_json::json;

    fn node(id: &str) -> ProductNode {
        serde_json::from_value(json!({
            "id": id,
            "handle": "linen-shirt",
            "title": "Linen Shirt",
            "vendor": "Acme",
            "tags": ["summer", "linen", "summer"],
            "availableForSale": true,
            "createdAt": null,
            "priceRange": {
                "minVariantPrice": {"amount": "40.00", "currencyCode": "EUR"},
                "maxVariantPrice": {"amount": "45.00", "currencyCode": "EUR"}
            },
            "options": [{"name": "Size", "optionValues": [{"name": "S"}, {"name": "M"}]}],
            "variants": {"nodes": [{
                "id": "gid://shopify/ProductVariant/9",
                "title": "S",
                "availableForSale": false,
                "selectedOptions": [{"name": "Size", "value": "S"}],
                "price": {"amount": "40.00", "currencyCode": "EUR"}
            }]}
        }))
        .unwrap()
    }

    #[test]
    fn test_product_conversion() {
        let product = Product::from(node("gid://shopify/Product/1"));
        assert_eq!(product.id.as_str(), "gid://shopify/Product/1");
        assert_eq!(product.tags.len(), 2);
        assert_eq!(product.price_range.min(), Decimal::new(4000, 2));
        assert_eq!(product.price_range.min_variant_price.currency_code, "EUR");
        assert_eq!(product.options[0].values, vec!["S", "M"]);
        assert_eq!(product.variants[0].option_value("Size"), Some("S"));
        assert!(!product.variants[0].available_for_sale);
        assert_eq!(product.sales_rank, None);
    }

    #[test]
    fn test_convert_products_assigns_ranks_by_position() {
        let products = convert_products(vec![node("a"), node("b")], Some(250));
        assert_eq!(products[0].sales_rank, Some(250));
        assert_eq!(products[1].sales_rank, Some(251));

        let unranked = convert_products(vec![node("a")], None);
        assert_eq!(unranked[0].sales_rank, None);
    }
}
