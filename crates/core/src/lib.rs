//! Demo Dashboard Core - Shared domain library.
//!
//! This crate provides the types and pure logic used by the dashboard web
//! server:
//! - catalog, content, and user records as served by the remote API
//! - the per-session shopping cart and its totals
//! - the product filter predicate
//! - checkout form validation and simulated order synthesis
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no clocks it reads by itself. Callers pass in the current time
//! and the random source where needed.
//!
//! # Modules
//!
//! - [`types`] - Entity records, type-safe IDs, and prices
//! - [`cart`] - Cart operations and totals
//! - [`filter`] - Product search / category / price filtering
//! - [`checkout`] - Payment and shipping form validation
//! - [`validation`] - Field-level validation errors and login form checks
//! - [`order`] - Simulated order records

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod checkout;
pub mod filter;
pub mod order;
pub mod types;
pub mod validation;

pub use cart::{Cart, CartItem, CartTotals};
pub use checkout::{CheckoutForm, PaymentDetails, ShippingAddress, ValidatedCheckout};
pub use filter::{CategoryFilter, ProductFilter};
pub use order::{Order, OrderId, OrderStatus, PaymentMethod};
pub use types::*;
pub use validation::{FieldError, ValidationErrors, validate_login};
