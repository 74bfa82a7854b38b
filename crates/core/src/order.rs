//! Simulated orders.
//!
//! Orders are synthesized locally when the checkout form is submitted. They
//! are never sent anywhere: the ID is random, not issued by a server, and
//! submitting twice produces two distinct orders.

use core::fmt;

use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::{Cart, CartItem};
use crate::checkout::{ShippingAddress, ValidatedCheckout};
use crate::types::Price;

const ORDER_ID_LEN: usize = 7;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Random, non-cryptographic order reference (7 base-36 characters).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    /// Draw a fresh ID from `rng`.
    pub fn generate<R: Rng>(rng: &mut R) -> Self {
        let id = (0..ORDER_ID_LEN)
            .map(|_| {
                let idx = rng.random_range(0..BASE36.len());
                char::from(BASE36.get(idx).copied().unwrap_or(b'0'))
            })
            .collect();
        Self(id)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    /// Upper-cased, the way confirmations show it.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_uppercase())
    }
}

/// Order lifecycle state. Simulated orders complete immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Completed,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => f.write_str("completed"),
        }
    }
}

/// How the order was "paid".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    CreditCard { last4: String },
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreditCard { last4 } if last4.is_empty() => f.write_str("Credit Card"),
            Self::CreditCard { last4 } => write!(f, "Credit Card ending in {last4}"),
        }
    }
}

/// A completed, simulated order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub items: Vec<CartItem>,
    /// Subtotal before discount.
    pub total: Decimal,
    pub discount: Decimal,
    /// `total − discount`.
    pub final_total: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub payment_method: PaymentMethod,
    pub shipping_address: ShippingAddress,
}

impl Order {
    /// Turn the cart into an order and empty it.
    ///
    /// Totals are taken from the cart as it stands at submission.
    pub fn place<R: Rng>(
        cart: &mut Cart,
        checkout: ValidatedCheckout,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Self {
        let totals = cart.totals();
        let items = cart.take_items();

        Self {
            id: OrderId::generate(rng),
            items,
            total: totals.subtotal,
            discount: totals.discount,
            final_total: totals.subtotal - totals.discount,
            status: OrderStatus::Completed,
            created_at: now,
            payment_method: PaymentMethod::CreditCard {
                last4: checkout.card_last4,
            },
            shipping_address: checkout.shipping,
        }
    }

    #[must_use]
    pub const fn total_price(&self) -> Price {
        Price::usd(self.total)
    }

    #[must_use]
    pub const fn discount_price(&self) -> Price {
        Price::usd(self.discount)
    }

    #[must_use]
    pub const fn final_price(&self) -> Price {
        Price::usd(self.final_total)
    }

    /// Units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |acc, item| acc.saturating_add(item.quantity))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::checkout::tests::valid_form;
    use crate::types::product::tests::product;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_order_id_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        let id = OrderId::generate(&mut rng);
        assert_eq!(id.as_str().len(), 7);
        assert!(
            id.as_str()
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase())
        );
        assert_eq!(id.to_string(), id.as_str().to_uppercase());
    }

    #[test]
    fn test_place_order_matches_cart_totals_and_clears_cart() {
        let mut cart = Cart::new();
        let mug = product(1, "Mug", "kitchen", dec("20"), dec("10"));
        cart.add(mug.clone());
        cart.add(mug);
        let before = cart.totals();

        let checkout = valid_form().validate().unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let order = Order::place(&mut cart, checkout, now(), &mut rng);

        assert!(cart.is_empty());
        assert_eq!(order.total, before.subtotal);
        assert_eq!(order.discount, before.discount);
        assert_eq!(order.final_total, order.total - order.discount);
        assert_eq!(order.final_total, dec("36"));
        assert_eq!(order.final_price().to_string(), "$36.00");
        assert_eq!(order.item_count(), 2);
        assert_eq!(order.status, OrderStatus::Completed);
        assert_eq!(order.created_at, now());
        assert_eq!(order.shipping_address.city, "Springfield");
        assert_eq!(
            order.payment_method.to_string(),
            "Credit Card ending in 4242"
        );
    }

    #[test]
    fn test_resubmission_produces_distinct_orders() {
        let mut rng = StdRng::seed_from_u64(99);
        let checkout = valid_form().validate().unwrap();

        let mut cart = Cart::new();
        cart.add(product(1, "Mug", "kitchen", dec("20"), dec("0")));
        let first = Order::place(&mut cart, checkout.clone(), now(), &mut rng);

        cart.add(product(1, "Mug", "kitchen", dec("20"), dec("0")));
        let second = Order::place(&mut cart, checkout, now(), &mut rng);

        assert_ne!(first.id, second.id);
    }

    #[test]
    fn test_order_serde_for_session_storage() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut cart = Cart::new();
        cart.add(product(1, "Mug", "kitchen", dec("9.99"), dec("7.17")));
        let order = Order::place(&mut cart, valid_form().validate().unwrap(), now(), &mut rng);

        let value = serde_json::to_value(&order).unwrap();
        assert_eq!(value["status"], "completed");
        let back: Order = serde_json::from_value(value).unwrap();
        assert_eq!(back, order);
    }
}
