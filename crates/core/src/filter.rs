//! Product filtering for the catalog views.
//!
//! A [`ProductFilter`] combines three predicates, all of which must hold:
//! - case-insensitive substring match of the search term on title or
//!   description (an empty term matches everything)
//! - exact category match, or [`CategoryFilter::All`]
//! - inclusive lower and upper bounds on the list price
//!
//! Filtering never reorders: results keep the API's order.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::Product;

/// Category selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CategoryFilter {
    #[default]
    All,
    Named(String),
}

impl CategoryFilter {
    /// Parse a form value; empty or `"all"` selects every category.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("all") {
            Self::All
        } else {
            Self::Named(value.to_string())
        }
    }

    #[must_use]
    pub fn matches(&self, category: &str) -> bool {
        match self {
            Self::All => true,
            Self::Named(name) => name == category,
        }
    }

    /// Value to put back into the form control.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::All => "all",
            Self::Named(name) => name,
        }
    }
}

/// Combined search, category and price filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductFilter {
    pub search: String,
    pub category: CategoryFilter,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
}

impl ProductFilter {
    /// Whether `product` passes every predicate.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        self.matches_search(product)
            && self.category.matches(&product.category)
            && self.matches_price(product.price)
    }

    fn matches_search(&self, product: &Product) -> bool {
        let term = self.search.trim();
        if term.is_empty() {
            return true;
        }
        let term = term.to_lowercase();
        product.title.to_lowercase().contains(&term)
            || product.description.to_lowercase().contains(&term)
    }

    fn matches_price(&self, price: Decimal) -> bool {
        self.min_price.is_none_or(|min| price >= min) && self.max_price.is_none_or(|max| price <= max)
    }

    /// Products that pass the filter, in their original order.
    #[must_use]
    pub fn apply<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        products.iter().filter(|p| self.matches(p)).collect()
    }

    /// Whether the filter is the identity (nothing narrowed).
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.search.trim().is_empty()
            && self.category == CategoryFilter::All
            && self.min_price.is_none()
            && self.max_price.is_none()
    }
}

/// Distinct categories in first-seen order.
#[must_use]
pub fn categories(products: &[Product]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for product in products {
        if !seen.iter().any(|c| c == &product.category) {
            seen.push(product.category.clone());
        }
    }
    seen
}

/// Lowest and highest list price, or `None` for an empty catalog.
#[must_use]
pub fn price_bounds(products: &[Product]) -> Option<(Decimal, Decimal)> {
    products.iter().fold(None, |acc, p| match acc {
        None => Some((p.price, p.price)),
        Some((lo, hi)) => Some((lo.min(p.price), hi.max(p.price))),
    })
}
