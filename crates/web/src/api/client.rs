//! HTTP client for the demo REST API.
//!
//! Uses `reqwest` 0.13 with JSON bodies. Every request carries
//! `Authorization: Bearer <token>` when the caller holds one.

use std::sync::Arc;

use demo_dashboard_core::{
    CommentsPage, LoginResponse, PostId, ProductId, ProductsPage, PostsPage, Post, Product, User,
};
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use super::ApiError;
use crate::config::ApiConfig;

/// Longest slice of a response body written to the logs.
const LOG_BODY_LIMIT: usize = 500;

/// Error body shape used by the API: `{"message": "..."}`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Debug, serde::Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the remote catalog, content, and auth endpoints.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("demo-dashboard/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
            }),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    /// Send a request and decode a JSON body.
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        token: Option<&SecretString>,
        path: &str,
    ) -> Result<T, ApiError> {
        let request = match token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ApiError::RateLimited(retry_after));
        }

        // Read as text first for better error diagnostics
        let body = response.text().await?;

        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(path.to_string()));
        }

        if !status.is_success() {
            tracing::warn!(
                status = %status,
                path,
                body = %truncate(&body),
                "API returned non-success status"
            );
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.message)
                .unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                path,
                body = %truncate(&body),
                "Failed to parse API response"
            );
            ApiError::Parse(e)
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&SecretString>,
    ) -> Result<T, ApiError> {
        let request = self.inner.client.get(self.url(path));
        self.send(request, token, path).await
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Exchange credentials for a profile and bearer token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` with the API's message on bad credentials.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let path = "/auth/login";
        let request = self
            .inner
            .client
            .post(self.url(path))
            .json(&LoginRequest { username, password });
        let response: LoginResponse = self.send(request, None, path).await?;
        debug!(user_id = %response.user.id, "Login accepted");
        Ok(response)
    }

    /// Fetch the profile the token belongs to.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is rejected or the request fails.
    #[instrument(skip_all)]
    pub async fn current_user(&self, token: &SecretString) -> Result<User, ApiError> {
        self.get("/auth/me", Some(token)).await
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// First page of the product catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip_all)]
    pub async fn products(&self, token: Option<&SecretString>) -> Result<ProductsPage, ApiError> {
        self.get("/products", token).await
    }

    /// A single product.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for an unknown ID.
    #[instrument(skip(self, token), fields(product_id = %id))]
    pub async fn product(
        &self,
        id: ProductId,
        token: Option<&SecretString>,
    ) -> Result<Product, ApiError> {
        self.get(&format!("/products/{id}"), token).await
    }

    // =========================================================================
    // Posts & Comments
    // =========================================================================

    /// First page of posts.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip_all)]
    pub async fn posts(&self, token: Option<&SecretString>) -> Result<PostsPage, ApiError> {
        self.get("/posts", token).await
    }

    /// A single post.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for an unknown ID.
    #[instrument(skip(self, token), fields(post_id = %id))]
    pub async fn post(&self, id: PostId, token: Option<&SecretString>) -> Result<Post, ApiError> {
        self.get(&format!("/posts/{id}"), token).await
    }

    /// First page of comments across all posts.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip_all)]
    pub async fn comments(&self, token: Option<&SecretString>) -> Result<CommentsPage, ApiError> {
        self.get("/comments", token).await
    }

    /// Comments on one post.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token), fields(post_id = %id))]
    pub async fn post_comments(
        &self,
        id: PostId,
        token: Option<&SecretString>,
    ) -> Result<CommentsPage, ApiError> {
        self.get(&format!("/posts/{id}/comments"), token).await
    }

    // =========================================================================
    // Health
    // =========================================================================

    /// Reachability check (`GET /test`).
    ///
    /// # Errors
    ///
    /// Returns an error if the API is unreachable or unhealthy.
    #[instrument(skip_all)]
    pub async fn ping(&self) -> Result<(), ApiError> {
        let _: serde_json::Value = self.get("/test", None).await?;
        Ok(())
    }
}

fn truncate(body: &str) -> String {
    body.chars().take(LOG_BODY_LIMIT).collect()
}
