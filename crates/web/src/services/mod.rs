//! Business logic services for the dashboard.
//!
//! # Services
//!
//! - `auth` - Login, logout, and session restoration against the remote API
//! - `cart` - Session-backed cart storage
//! - `checkout` - Simulated payment and order placement

pub mod auth;
pub mod cart;
pub mod checkout;
