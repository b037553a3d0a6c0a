//! Product records as delivered by the data source.
//!
//! The engine only ever reads these. A [`Catalog`] is an immutable,
//! cheaply cloneable snapshot of one product set; its identity (the shared
//! allocation) is what cached selections are keyed against.

use std::collections::BTreeSet;
use std::ops::Deref;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pagination::PageInfo;
use crate::types::{Money, PriceRange, ProductId, VariantId};

/// Selected option on a product variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedOption {
    /// Option name (e.g., "Size", "Color").
    pub name: String,
    /// Selected value (e.g., "Large", "Blue").
    pub value: String,
}

impl SelectedOption {
    /// Create a selected option.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Product option definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductOption {
    /// Option name (e.g., "Size").
    pub name: String,
    /// Available values (e.g., `["Small", "Medium", "Large"]`).
    pub values: Vec<String>,
}

/// A product variant (specific combination of options).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductVariant {
    /// Variant ID.
    pub id: VariantId,
    /// Variant title (combination of option values).
    #[serde(default)]
    pub title: String,
    /// Selected options for this variant.
    #[serde(default)]
    pub selected_options: Vec<SelectedOption>,
    /// Current price.
    pub price: Money,
    /// Whether this variant is available for sale.
    pub available_for_sale: bool,
}

impl ProductVariant {
    /// Value this variant carries for the named option, if any.
    #[must_use]
    pub fn option_value(&self, name: &str) -> Option<&str> {
        self.selected_options
            .iter()
            .find(|o| o.name == name)
            .map(|o| o.value.as_str())
    }
}

/// A product in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product ID.
    pub id: ProductId,
    /// URL handle.
    #[serde(default)]
    pub handle: String,
    /// Product title.
    pub title: String,
    /// Vendor name.
    #[serde(default)]
    pub vendor: String,
    /// Product tags.
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Price range across variants.
    pub price_range: PriceRange,
    /// Whether the product as a whole is available.
    pub available_for_sale: bool,
    /// Product options.
    #[serde(default)]
    pub options: Vec<ProductOption>,
    /// Product variants.
    #[serde(default)]
    pub variants: Vec<ProductVariant>,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Position in the best-seller ranking; 1 is the best seller.
    #[serde(default)]
    pub sales_rank: Option<u32>,
}

impl Product {
    /// Whether the product or any of its variants can be bought.
    #[must_use]
    pub fn is_in_stock(&self) -> bool {
        self.available_for_sale || self.variants.iter().any(|v| v.available_for_sale)
    }

    /// Distinct values this product's variants carry for the named option.
    pub fn option_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        let mut seen = BTreeSet::new();
        self.variants
            .iter()
            .filter_map(move |v| v.option_value(name))
            .filter(move |value| seen.insert(*value))
    }
}

/// Find the variant whose selected options match every requested pair.
///
/// Options the caller does not mention are unconstrained, so an empty
/// selection resolves to the first variant.
#[must_use]
pub fn resolve_variant<'a>(
    variants: &'a [ProductVariant],
    selected: &[SelectedOption],
) -> Option<&'a ProductVariant> {
    variants.iter().find(|variant| {
        selected
            .iter()
            .all(|wanted| variant.option_value(&wanted.name) == Some(wanted.value.as_str()))
    })
}

/// Immutable snapshot of a product set.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Arc<[Product]>,
}

impl Catalog {
    /// Wrap a freshly fetched product list.
    #[must_use]
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products: products.into(),
        }
    }

    /// Whether both handles point at the same snapshot.
    #[must_use]
    pub fn same_snapshot(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.products, &other.products)
    }
}

impl Deref for Catalog {
    type Target = [Product];

    fn deref(&self) -> &Self::Target {
        &self.products
    }
}

impl From<Vec<Product>> for Catalog {
    fn from(products: Vec<Product>) -> Self {
        Self::new(products)
    }
}

/// One page of products as returned by a data source.
#[derive(Debug, Clone, Default)]
pub struct ProductPage {
    /// Products on this page.
    pub products: Catalog,
    /// Upstream pagination info, when the source paginates.
    pub page_info: Option<PageInfo>,
}

impl ProductPage {
    /// A page with no upstream pagination (the whole list).
    #[must_use]
    pub const fn unpaginated(products: Catalog) -> Self {
        Self {
            products,
            page_info: None,
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Product builders shared by the engine's unit tests.

    use rust_decimal::Decimal;

    use super::*;

    /// An in-stock product with a single price and no variants.
    pub fn product(id: &str, title: &str, price: i64) -> Product {
        let money = Money::usd(Decimal::from(price));
        Product {
            id: ProductId::new(id),
            handle: id.to_string(),
            title: title.to_string(),
            vendor: String::new(),
            tags: BTreeSet::new(),
            price_range: PriceRange::single(money),
            available_for_sale: true,
            options: Vec::new(),
            variants: Vec::new(),
            created_at: None,
            sales_rank: None,
        }
    }

    pub fn with_variant(mut product: Product, options: &[(&str, &str)], available: bool) -> Product {
        let index = product.variants.len();
        product.variants.push(ProductVariant {
            id: VariantId::new(format!("{}-v{index}", product.id)),
            title: options
                .iter()
                .map(|(_, v)| *v)
                .collect::<Vec<_>>()
                .join(" / "),
            selected_options: options
                .iter()
                .map(|(n, v)| SelectedOption::new(*n, *v))
                .collect(),
            price: product.price_range.min_variant_price.clone(),
            available_for_sale: available,
        });
        product
    }

    pub fn with_price_range(mut product: Product, min: i64, max: i64) -> Product {
        product.price_range = PriceRange::new(
            Money::usd(Decimal::from(min)),
            Money::usd(Decimal::from(max)),
        );
        product
    }

    pub fn with_vendor(mut product: Product, vendor: &str) -> Product {
        product.vendor = vendor.to_string();
        product
    }

    pub fn with_tags(mut product: Product, tags: &[&str]) -> Product {
        product.tags = tags.iter().map(|t| (*t).to_string()).collect();
        product
    }

    pub fn ids<'a>(products: impl IntoIterator<Item = &'a Product>) -> Vec<&'a str> {
        products.into_iter().map(|p| p.id.as_str()).collect()
    }
}
