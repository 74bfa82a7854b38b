//! Client for the remote demo REST API.
//!
//! # Architecture
//!
//! - One async method per remote resource, returning the parsed body
//! - The remote API is the source of truth: nothing is stored locally
//! - No retries or caching here; see [`crate::query`] for both
//!
//! # Example
//!
//! ```rust,ignore
//! use demo_dashboard_web::api::ApiClient;
//!
//! let client = ApiClient::new(&config.api)?;
//! let session = client.login("emilys", "emilyspass").await?;
//! let products = client.products(Some(&session.token())).await?;
//! ```

mod client;

pub use client::ApiClient;

use thiserror::Error;

/// Errors that can occur when talking to the remote API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure, timeout, or an undecodable body.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The API answered 404.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Any other non-success status.
    #[error("API returned {status}: {message}")]
    Status { status: u16, message: String },
}

impl ApiError {
    /// Message the API put in its error body, if any.
    ///
    /// Login failures surface this text to the visitor.
    #[must_use]
    pub fn api_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } if !message.is_empty() => Some(message),
            _ => None,
        }
    }

    /// Whether asking again could give a different answer.
    ///
    /// A 404 and a body that does not match the schema are definitive
    /// answers; everything else may be transient.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        !matches!(self, Self::NotFound(_) | Self::Parse(_))
    }

    /// HTTP status returned by the API, when the request got that far.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::NotFound(_) => Some(404),
            Self::RateLimited(_) => Some(429),
            Self::Http(err) => err.status().map(|s| s.as_u16()),
            Self::Parse(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_message() {
        let err = ApiError::Status {
            status: 400,
            message: "Invalid credentials".to_string(),
        };
        assert_eq!(err.api_message(), Some("Invalid credentials"));
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.to_string(), "API returned 400: Invalid credentials");

        let err = ApiError::Status {
            status: 500,
            message: String::new(),
        };
        assert_eq!(err.api_message(), None);

        assert_eq!(ApiError::NotFound("/products/9".to_string()).api_message(), None);
        assert_eq!(ApiError::RateLimited(2).status(), Some(429));
        assert!(ApiError::RateLimited(2).is_transient());
        assert!(!ApiError::NotFound(String::new()).is_transient());

        let parse = ApiError::from(serde_json::from_str::<u32>("\"x\"").unwrap_err());
        assert!(!parse.is_transient());
    }
}
