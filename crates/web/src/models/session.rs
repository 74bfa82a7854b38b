//! Session-related types.
//!
//! Types stored in the session for authentication state. The cart and the
//! last order are stored as the core `Cart` and `Order` types.

use demo_dashboard_core::User;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// Session-stored authentication state.
///
/// The token alone authenticates the session; the profile is kept next to it
/// so a restored session still knows who is signed in. A missing profile is
/// re-fetched from the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthState {
    #[serde(with = "secret_string")]
    pub token: SecretString,
    #[serde(default)]
    pub user: Option<User>,
}

/// The signed-in user as handed to handlers.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    pub token: SecretString,
}

/// Session keys.
pub mod keys {
    /// Key for the [`AuthState`](super::AuthState) of a signed-in visitor.
    pub const AUTH: &str = "auth";

    /// Key for the visitor's cart.
    pub const CART: &str = "cart";

    /// Key for the most recent order, shown once on the dashboard.
    pub const LAST_ORDER: &str = "last_order";
}

/// Serde for `SecretString` as a plain string (session storage only).
mod secret_string {
    use secrecy::{ExposeSecret, SecretString};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(secret.expose_secret())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SecretString, D::Error> {
        String::deserialize(deserializer).map(SecretString::from)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn test_auth_state_storage_shape() {
        let state: AuthState = serde_json::from_value(serde_json::json!({
            "token": "abc.def",
            "user": {"id": 1, "username": "emilys"}
        }))
        .unwrap();
        assert_eq!(state.token.expose_secret(), "abc.def");
        assert_eq!(state.user.as_ref().unwrap().username, "emilys");

        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(value["token"], "abc.def");
    }

    #[test]
    fn test_profile_is_optional() {
        let state: AuthState =
            serde_json::from_value(serde_json::json!({"token": "abc.def"})).unwrap();
        assert!(state.user.is_none());
    }

    #[test]
    fn test_debug_hides_token() {
        let state = AuthState {
            token: SecretString::from("abc.def".to_string()),
            user: None,
        };
        assert!(!format!("{state:?}").contains("abc.def"));
    }
}
