//! Session-stored models for the dashboard.

pub mod session;

pub use session::{AuthState, CurrentUser, keys as session_keys};
