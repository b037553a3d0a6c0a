//! Monetary amounts using decimal arithmetic.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A monetary amount with its ISO 4217 currency code.
///
/// Amounts serialize as decimal strings (`"19.99"`), matching the Shopify
/// `Decimal` scalar, so no precision is lost on the way in or out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    #[serde(default = "default_currency_code")]
    pub currency_code: String,
}

fn default_currency_code() -> String {
    "USD".to_string()
}

impl Money {
    /// Create a new amount.
    #[must_use]
    pub fn new(amount: Decimal, currency_code: impl Into<String>) -> Self {
        Self {
            amount,
            currency_code: currency_code.into(),
        }
    }

    /// Create an amount in US dollars.
    #[must_use]
    pub fn usd(amount: Decimal) -> Self {
        Self::new(amount, "USD")
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} {}", self.amount, self.currency_code)
    }
}

/// Lowest and highest variant price of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    /// Minimum price among all variants.
    pub min_variant_price: Money,
    /// Maximum price among all variants.
    pub max_variant_price: Money,
}

impl PriceRange {
    /// Create a price range from two amounts in the same currency.
    #[must_use]
    pub fn new(min: Money, max: Money) -> Self {
        Self {
            min_variant_price: min,
            max_variant_price: max,
        }
    }

    /// Range for a product whose variants all cost the same.
    #[must_use]
    pub fn single(price: Money) -> Self {
        Self::new(price.clone(), price)
    }

    /// Lowest amount in the range.
    #[must_use]
    pub const fn min(&self) -> Decimal {
        self.min_variant_price.amount
    }

    /// Highest amount in the range.
    #[must_use]
    pub const fn max(&self) -> Decimal {
        self.max_variant_price.amount
    }
}
