//! Authenticated user records.

use serde::{Deserialize, Serialize};

use super::id::UserId;

/// Profile of a signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl User {
    /// Name to greet the user with, falling back to the username.
    #[must_use]
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

/// Body returned by `POST /auth/login`: the profile plus a bearer token.
///
/// Implements `Debug` manually to redact the tokens.
#[derive(Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub user: User,
    /// Bearer token; older API revisions called it `token`.
    #[serde(rename = "accessToken", alias = "token")]
    pub access_token: String,
    #[serde(rename = "refreshToken", default)]
    pub refresh_token: Option<String>,
}

impl std::fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginResponse")
            .field("user", &self.user)
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const LOGIN_BODY: &str = r#"{
        "id": 1,
        "username": "emilys",
        "email": "emily.johnson@x.dummyjson.com",
        "firstName": "Emily",
        "lastName": "Johnson",
        "gender": "female",
        "image": "https://dummyjson.com/icon/emilys/128",
        "accessToken": "eyJhbGciOi.access",
        "refreshToken": "eyJhbGciOi.refresh"
    }"#;

    #[test]
    fn test_login_response_access_token() {
        let resp: LoginResponse = serde_json::from_str(LOGIN_BODY).unwrap();
        assert_eq!(resp.user.username, "emilys");
        assert_eq!(resp.access_token, "eyJhbGciOi.access");
        assert_eq!(resp.refresh_token.as_deref(), Some("eyJhbGciOi.refresh"));
    }

    #[test]
    fn test_login_response_legacy_token_field() {
        let json = r#"{"id": 1, "username": "emilys", "token": "legacy"}"#;
        let resp: LoginResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.access_token, "legacy");
        assert!(resp.refresh_token.is_none());
    }

    #[test]
    fn test_login_response_debug_redacts_tokens() {
        let resp: LoginResponse = serde_json::from_str(LOGIN_BODY).unwrap();
        let debug = format!("{resp:?}");
        assert!(debug.contains("emilys"));
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("eyJhbGciOi"));
    }

    #[test]
    fn test_display_name() {
        let resp: LoginResponse = serde_json::from_str(LOGIN_BODY).unwrap();
        assert_eq!(resp.user.display_name(), "Emily Johnson");

        let bare = User {
            first_name: String::new(),
            last_name: String::new(),
            ..resp.user
        };
        assert_eq!(bare.display_name(), "emilys");
    }
}
