//! Session middleware configuration.
//!
//! Sets up in-memory sessions using tower-sessions. Session data (auth
//! token, cart, last order) is per visitor and lost on restart.

use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::DashboardConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "dd_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session layer with an in-memory store.
#[must_use]
pub fn create_session_layer(config: &DashboardConfig) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
