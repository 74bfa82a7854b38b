//! Authentication error types.

use thiserror::Error;

use crate::api::ApiError;

/// Message shown when the API rejects a login without saying why.
pub const DEFAULT_LOGIN_ERROR: &str = "Invalid username or password";

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The API rejected the credentials; carries the message to show.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    /// The API could not be reached or answered with a server error.
    #[error("api error: {0}")]
    Api(#[from] ApiError),

    /// Session store failed.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

impl AuthError {
    /// Map a failed login call: client errors are bad credentials.
    pub(super) fn from_login_failure(err: ApiError) -> Self {
        match err.status() {
            Some(status) if (400..500).contains(&status) && status != 429 => {
                Self::InvalidCredentials(
                    err.api_message().unwrap_or(DEFAULT_LOGIN_ERROR).to_string(),
                )
            }
            _ => Self::Api(err),
        }
    }

    /// Text for the login form. Never exposes transport details.
    #[must_use]
    pub fn login_message(&self) -> &str {
        match self {
            Self::InvalidCredentials(message) => message,
            Self::Api(err) => err.api_message().unwrap_or(DEFAULT_LOGIN_ERROR),
            Self::Session(_) => DEFAULT_LOGIN_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_request_is_invalid_credentials() {
        let err = AuthError::from_login_failure(ApiError::Status {
            status: 400,
            message: "Invalid credentials".to_string(),
        });
        assert!(matches!(err, AuthError::InvalidCredentials(ref m) if m == "Invalid credentials"));
        assert_eq!(err.login_message(), "Invalid credentials");
    }

    #[test]
    fn test_missing_message_falls_back() {
        let err = AuthError::from_login_failure(ApiError::Status {
            status: 401,
            message: String::new(),
        });
        assert_eq!(err.login_message(), DEFAULT_LOGIN_ERROR);
    }

    #[test]
    fn test_server_error_stays_api_error() {
        let err = AuthError::from_login_failure(ApiError::Status {
            status: 502,
            message: String::new(),
        });
        assert!(matches!(err, AuthError::Api(_)));
        assert_eq!(err.login_message(), DEFAULT_LOGIN_ERROR);

        let err = AuthError::from_login_failure(ApiError::RateLimited(3));
        assert!(matches!(err, AuthError::Api(_)));
    }
}
