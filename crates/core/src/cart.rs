//! Per-session shopping cart.
//!
//! The cart is a list of products with quantities. Every entry has a
//! quantity of at least one; setting a quantity below one removes the entry.
//! Totals are folds over the entries and are recomputed on every read.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Price, Product, ProductId};

/// A product in the cart with its quantity (always `>= 1`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub product: Product,
    pub quantity: u32,
}

impl CartItem {
    /// `price × quantity`, before discount.
    #[must_use]
    pub fn line_subtotal(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }

    /// `price × quantity × discount/100`.
    #[must_use]
    pub fn line_discount(&self) -> Decimal {
        self.product.unit_discount() * Decimal::from(self.quantity)
    }

    /// Line amount after discount.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.line_subtotal() - self.line_discount()
    }
}

/// Snapshot of cart totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartTotals {
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub final_total: Decimal,
    pub item_count: u32,
}

impl CartTotals {
    /// Subtotal as a displayable price.
    #[must_use]
    pub const fn subtotal_price(&self) -> Price {
        Price::usd(self.subtotal)
    }

    /// Discount as a displayable price.
    #[must_use]
    pub const fn discount_price(&self) -> Price {
        Price::usd(self.discount)
    }

    /// Final total as a displayable price.
    #[must_use]
    pub const fn final_price(&self) -> Price {
        Price::usd(self.final_total)
    }
}

/// The shopping cart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Entries in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up the entry for a product.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.product.id == id)
    }

    /// Add one unit of `product`.
    ///
    /// Increments the quantity when the product is already present,
    /// otherwise appends it with quantity 1. Returns the new quantity.
    pub fn add(&mut self, product: Product) -> u32 {
        if let Some(item) = self.items.iter_mut().find(|i| i.product.id == product.id) {
            item.quantity = item.quantity.saturating_add(1);
            return item.quantity;
        }
        self.items.push(CartItem {
            product,
            quantity: 1,
        });
        1
    }

    /// Remove the entry for `id`. Returns whether anything was removed.
    pub fn remove(&mut self, id: ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.product.id != id);
        self.items.len() != before
    }

    /// Overwrite the quantity for `id`; a quantity below one removes the entry.
    ///
    /// Unknown IDs are ignored. Returns whether the cart changed.
    pub fn set_quantity(&mut self, id: ProductId, quantity: u32) -> bool {
        if quantity < 1 {
            return self.remove(id);
        }
        match self.items.iter_mut().find(|i| i.product.id == id) {
            Some(item) if item.quantity != quantity => {
                item.quantity = quantity;
                true
            }
            _ => false,
        }
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// `Σ price × quantity`.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.items.iter().map(CartItem::line_subtotal).sum()
    }

    /// `Σ price × quantity × discount/100`.
    #[must_use]
    pub fn discount(&self) -> Decimal {
        self.items.iter().map(CartItem::line_discount).sum()
    }

    /// `subtotal − discount`.
    #[must_use]
    pub fn final_total(&self) -> Decimal {
        self.subtotal() - self.discount()
    }

    /// Total number of units across all entries.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |acc, item| acc.saturating_add(item.quantity))
    }

    /// All totals at once.
    #[must_use]
    pub fn totals(&self) -> CartTotals {
        let subtotal = self.subtotal();
        let discount = self.discount();
        CartTotals {
            subtotal,
            discount,
            final_total: subtotal - discount,
            item_count: self.item_count(),
        }
    }

    /// Take the entries out, leaving the cart empty.
    pub fn take_items(&mut self) -> Vec<CartItem> {
        std::mem::take(&mut self.items)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::product::tests::product;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_add_to_empty_cart_inserts_quantity_one() {
        let mut cart = Cart::new();
        let qty = cart.add(product(1, "Mug", "kitchen", dec("20"), dec("10")));
        assert_eq!(qty, 1);
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 1);
    }

    #[test]
    fn test_add_twice_increments_single_entry() {
        let mut cart = Cart::new();
        let mug = product(1, "Mug", "kitchen", dec("20"), dec("10"));
        cart.add(mug.clone());
        let qty = cart.add(mug);
        assert_eq!(qty, 2);
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.get(ProductId::new(1)).unwrap().quantity, 2);
    }

    #[test]
    fn test_add_keeps_insertion_order() {
        let mut cart = Cart::new();
        cart.add(product(2, "B", "x", dec("1"), dec("0")));
        cart.add(product(1, "A", "x", dec("1"), dec("0")));
        cart.add(product(2, "B", "x", dec("1"), dec("0")));
        let ids: Vec<_> = cart.items().iter().map(|i| i.product.id.as_i32()).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_set_quantity_zero_removes_entry() {
        let mut cart = Cart::new();
        cart.add(product(1, "Mug", "kitchen", dec("20"), dec("10")));
        assert!(cart.set_quantity(ProductId::new(1), 0));
        assert!(cart.is_empty());
        assert!(cart.get(ProductId::new(1)).is_none());
    }

    #[test]
    fn test_set_quantity_overwrites() {
        let mut cart = Cart::new();
        cart.add(product(1, "Mug", "kitchen", dec("20"), dec("10")));
        assert!(cart.set_quantity(ProductId::new(1), 5));
        assert_eq!(cart.item_count(), 5);
        assert!(!cart.set_quantity(ProductId::new(1), 5));
    }

    #[test]
    fn test_set_quantity_unknown_id_is_ignored() {
        let mut cart = Cart::new();
        assert!(!cart.set_quantity(ProductId::new(9), 3));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove() {
        let mut cart = Cart::new();
        cart.add(product(1, "Mug", "kitchen", dec("20"), dec("10")));
        cart.add(product(2, "Pan", "kitchen", dec("30"), dec("0")));
        assert!(cart.remove(ProductId::new(1)));
        assert!(!cart.remove(ProductId::new(1)));
        assert_eq!(cart.items().len(), 1);
    }

    #[test]
    fn test_totals_scenario() {
        let mut cart = Cart::new();
        let mug = product(1, "Mug", "kitchen", dec("20"), dec("10"));
        cart.add(mug.clone());
        cart.add(mug);

        let totals = cart.totals();
        assert_eq!(totals.subtotal, dec("40"));
        assert_eq!(totals.discount, dec("4"));
        assert_eq!(totals.final_total, dec("36"));
        assert_eq!(totals.item_count, 2);
        assert_eq!(totals.subtotal_price().to_string(), "$40.00");
        assert_eq!(totals.discount_price().to_string(), "$4.00");
        assert_eq!(totals.final_price().to_string(), "$36.00");
    }

    #[test]
    fn test_totals_are_folds_over_entries() {
        let mut cart = Cart::new();
        cart.add(product(1, "A", "x", dec("9.99"), dec("7.17")));
        cart.add(product(2, "B", "x", dec("19.99"), dec("0")));
        cart.set_quantity(ProductId::new(2), 3);

        let expected_subtotal = dec("9.99") + dec("19.99") * dec("3");
        let expected_discount = dec("9.99") * dec("7.17") / dec("100");
        assert_eq!(cart.subtotal(), expected_subtotal);
        assert_eq!(cart.discount(), expected_discount);
        assert_eq!(cart.final_total(), expected_subtotal - expected_discount);
        assert!(cart.final_total() >= Decimal::ZERO);
    }

    #[test]
    fn test_empty_cart_totals_are_zero() {
        let totals = Cart::new().totals();
        assert_eq!(totals.subtotal, Decimal::ZERO);
        assert_eq!(totals.discount, Decimal::ZERO);
        assert_eq!(totals.final_total, Decimal::ZERO);
        assert_eq!(totals.item_count, 0);
    }

    #[test]
    fn test_take_items_empties_cart() {
        let mut cart = Cart::new();
        cart.add(product(1, "A", "x", dec("1"), dec("0")));
        let items = cart.take_items();
        assert_eq!(items.len(), 1);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_cart_serde_round_trip_through_session_json() {
        let mut cart = Cart::new();
        cart.add(product(1, "A", "x", dec("9.99"), dec("7.17")));
        let value = serde_json::to_value(&cart).unwrap();
        assert!(value.is_array());
        let back: Cart = serde_json::from_value(value).unwrap();
        assert_eq!(back, cart);
    }
}
