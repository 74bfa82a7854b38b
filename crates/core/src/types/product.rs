//! Product records as served by the catalog API.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;

/// A catalog product.
///
/// Mirrors the remote record; nothing here is validated locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// List price before discount.
    pub price: Decimal,
    #[serde(default)]
    pub discount_percentage: Decimal,
    #[serde(default)]
    pub rating: Decimal,
    #[serde(default)]
    pub stock: u32,
    /// Some catalog entries (groceries) have no brand.
    #[serde(default)]
    pub brand: Option<String>,
    pub category: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub images: Vec<String>,
}

impl Product {
    /// Discount percentage clamped to `0..=100`.
    #[must_use]
    pub fn discount_rate(&self) -> Decimal {
        self.discount_percentage
            .clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
    }

    /// Price after discount: `price × (1 − discount/100)`.
    #[must_use]
    pub fn effective_price(&self) -> Decimal {
        self.price - self.unit_discount()
    }

    /// Amount taken off one unit by the discount.
    #[must_use]
    pub fn unit_discount(&self) -> Decimal {
        self.price * self.discount_rate() / Decimal::ONE_HUNDRED
    }

    /// List price as a displayable [`Price`].
    #[must_use]
    pub const fn list_price(&self) -> Price {
        Price::usd(self.price)
    }

    /// Whether the product is discounted at all.
    #[must_use]
    pub fn is_discounted(&self) -> bool {
        self.discount_rate() > Decimal::ZERO
    }
}
