//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::api::ApiError;
use crate::query::QueryError;
use crate::services::auth::AuthError;

/// Application-level error type for the dashboard.
#[derive(Debug, Error)]
pub enum AppError {
    /// Remote API call failed outside the query layer.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Cached read failed after its retries.
    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Session store failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Session(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Query(err) if err.is_not_found() => StatusCode::NOT_FOUND,
            Self::Api(ApiError::NotFound(_)) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Api(_) | Self::Query(_) => StatusCode::BAD_GATEWAY,
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials(_) => StatusCode::UNAUTHORIZED,
                AuthError::Api(_) => StatusCode::BAD_GATEWAY,
                AuthError::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Whether this error should be reported to Sentry.
    const fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Api(_) | Self::Query(_) | Self::Session(_) | Self::Internal(_)
        ) || matches!(self, Self::Auth(AuthError::Api(_) | AuthError::Session(_)))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if self.is_server_error() && status != StatusCode::NOT_FOUND {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Session(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Api(_) | Self::Query(_) if status == StatusCode::NOT_FOUND => {
                "Not found".to_string()
            }
            Self::Api(_) | Self::Query(_) => "External service error".to_string(),
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials(msg) => msg.clone(),
                AuthError::Api(_) => "External service error".to_string(),
                AuthError::Session(_) => "Internal server error".to_string(),
            },
            _ => self.to_string(),
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, username: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            username: Some(username.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added product", Some(&[("product_id", "12")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
