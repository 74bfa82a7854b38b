//! Cached, retrying reads of remote resources.
//!
//! Every read goes through [`QueryCache`]: a `moka` future cache keyed by
//! [`QueryKey`]. On a miss the fetch runs with a fixed number of retries and
//! exponential backoff (a 404 is final); concurrent misses on one key share a
//! single fetch.
//! Failures are never cached, so the next request tries again.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use demo_dashboard_core::{CommentsPage, Post, PostId, PostsPage, Product, ProductId, ProductsPage};
use moka::future::Cache;
use secrecy::SecretString;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::api::{ApiClient, ApiError};
use crate::config::QueryConfig;

/// Upper bound on the delay between two attempts.
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Cache key: one per remote resource.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum QueryKey {
    Products,
    Product(ProductId),
    Posts,
    Post(PostId),
    Comments,
    PostComments(PostId),
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Products => f.write_str("products"),
            Self::Product(id) => write!(f, "product:{id}"),
            Self::Posts => f.write_str("posts"),
            Self::Post(id) => write!(f, "post:{id}"),
            Self::Comments => f.write_str("comments"),
            Self::PostComments(id) => write!(f, "post-comments:{id}"),
        }
    }
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum QueryValue {
    Products(Arc<ProductsPage>),
    Product(Arc<Product>),
    Posts(Arc<PostsPage>),
    Post(Arc<Post>),
    Comments(Arc<CommentsPage>),
}

/// A read that failed after every attempt.
#[derive(Debug, Clone, Error)]
pub enum QueryError {
    #[error("{key} failed after {attempts} attempt(s): {source}")]
    Failed {
        key: QueryKey,
        attempts: u32,
        source: Arc<ApiError>,
    },

    #[error("{0} held a value of the wrong kind")]
    Mismatch(QueryKey),
}

impl QueryError {
    /// Whether the resource does not exist (as opposed to a failed fetch).
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Failed { source, .. } if matches!(**source, ApiError::NotFound(_)))
    }
}

/// Retry schedule for failed fetches.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (0-based): `min(base × 2^attempt, 30s)`.
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .map_or(MAX_BACKOFF, |d| d.min(MAX_BACKOFF))
    }

    /// Delay before retry number `attempt` after `err`.
    ///
    /// A rate limit waits at least as long as the API asked, still capped at
    /// [`MAX_BACKOFF`].
    #[must_use]
    pub fn delay_after(&self, attempt: u32, err: &ApiError) -> Duration {
        let backoff = self.backoff(attempt);
        match err {
            ApiError::RateLimited(secs) => backoff.max(Duration::from_secs(*secs)).min(MAX_BACKOFF),
            _ => backoff,
        }
    }

    /// Run `fetch` until it succeeds or the retries are spent.
    ///
    /// # Errors
    ///
    /// Returns the last error together with the number of attempts made.
    pub async fn run<T, F, Fut>(&self, key: QueryKey, mut fetch: F) -> Result<T, QueryError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let mut attempt = 0u32;
        loop {
            match fetch().await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < self.retries && err.is_transient() => {
                    let delay = self.delay_after(attempt, &err);
                    warn!(
                        key = %key,
                        attempt = attempt + 1,
                        error = %err,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "Query failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    return Err(QueryError::Failed {
                        key,
                        attempts: attempt + 1,
                        source: Arc::new(err),
                    });
                }
            }
        }
    }
}

// =============================================================================
// QueryCache
// =============================================================================

/// Shared cache of remote reads.
///
/// Catalog and content data is public, so one cache serves every session.
#[derive(Clone)]
pub struct QueryCache {
    api: ApiClient,
    cache: Cache<QueryKey, QueryValue>,
    retry: RetryPolicy,
}

impl QueryCache {
    /// Create a new query cache in front of `api`.
    #[must_use]
    pub fn new(api: ApiClient, config: &QueryConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(config.ttl)
            .build();

        Self {
            api,
            cache,
            retry: RetryPolicy {
                retries: config.retries,
                base_delay: config.retry_base_delay,
            },
        }
    }

    /// The underlying API client.
    #[must_use]
    pub const fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Return the cached value for `key` or fetch it.
    ///
    /// `fetch` receives its own clones of the client and the token so the
    /// retry loop can call it repeatedly.
    async fn fetch<F, Fut>(
        &self,
        key: QueryKey,
        token: Option<&SecretString>,
        fetch: F,
    ) -> Result<QueryValue, QueryError>
    where
        F: Fn(ApiClient, Option<SecretString>) -> Fut,
        Fut: Future<Output = Result<QueryValue, ApiError>>,
    {
        let api = self.api.clone();
        let token = token.cloned();
        let retry = self.retry;

        let init = async move {
            debug!(key = %key, "Query cache miss");
            retry
                .run(key, || fetch(api.clone(), token.clone()))
                .await
        };

        self.cache
            .try_get_with(key, init)
            .await
            .map_err(|err: Arc<QueryError>| (*err).clone())
    }

    /// First page of the product catalog.
    ///
    /// # Errors
    ///
    /// Returns an error when every attempt failed.
    #[instrument(skip_all)]
    pub async fn products(
        &self,
        token: Option<&SecretString>,
    ) -> Result<Arc<ProductsPage>, QueryError> {
        let key = QueryKey::Products;
        let value = self
            .fetch(key, token, |api, token| async move {
                Ok(QueryValue::Products(Arc::new(api.products(token.as_ref()).await?)))
            })
            .await?;
        match value {
            QueryValue::Products(page) => Ok(page),
            _ => Err(QueryError::Mismatch(key)),
        }
    }

    /// A single product.
    ///
    /// # Errors
    ///
    /// Returns an error when every attempt failed.
    #[instrument(skip(self, token), fields(product_id = %id))]
    pub async fn product(
        &self,
        id: ProductId,
        token: Option<&SecretString>,
    ) -> Result<Arc<Product>, QueryError> {
        let key = QueryKey::Product(id);
        let value = self
            .fetch(key, token, move |api, token| async move {
                Ok(QueryValue::Product(Arc::new(api.product(id, token.as_ref()).await?)))
            })
            .await?;
        match value {
            QueryValue::Product(product) => Ok(product),
            _ => Err(QueryError::Mismatch(key)),
        }
    }

    /// First page of posts.
    ///
    /// # Errors
    ///
    /// Returns an error when every attempt failed.
    #[instrument(skip_all)]
    pub async fn posts(&self, token: Option<&SecretString>) -> Result<Arc<PostsPage>, QueryError> {
        let key = QueryKey::Posts;
        let value = self
            .fetch(key, token, |api, token| async move {
                Ok(QueryValue::Posts(Arc::new(api.posts(token.as_ref()).await?)))
            })
            .await?;
        match value {
            QueryValue::Posts(page) => Ok(page),
            _ => Err(QueryError::Mismatch(key)),
        }
    }

    /// A single post.
    ///
    /// # Errors
    ///
    /// Returns an error when every attempt failed.
    #[instrument(skip(self, token), fields(post_id = %id))]
    pub async fn post(&self, id: PostId, token: Option<&SecretString>) -> Result<Arc<Post>, QueryError> {
        let key = QueryKey::Post(id);
        let value = self
            .fetch(key, token, move |api, token| async move {
                Ok(QueryValue::Post(Arc::new(api.post(id, token.as_ref()).await?)))
            })
            .await?;
        match value {
            QueryValue::Post(post) => Ok(post),
            _ => Err(QueryError::Mismatch(key)),
        }
    }

    /// First page of comments.
    ///
    /// # Errors
    ///
    /// Returns an error when every attempt failed.
    #[instrument(skip_all)]
    pub async fn comments(
        &self,
        token: Option<&SecretString>,
    ) -> Result<Arc<CommentsPage>, QueryError> {
        let key = QueryKey::Comments;
        let value = self
            .fetch(key, token, |api, token| async move {
                Ok(QueryValue::Comments(Arc::new(api.comments(token.as_ref()).await?)))
            })
            .await?;
        match value {
            QueryValue::Comments(page) => Ok(page),
            _ => Err(QueryError::Mismatch(key)),
        }
    }

    /// Comments on one post.
    ///
    /// # Errors
    ///
    /// Returns an error when every attempt failed.
    #[instrument(skip(self, token), fields(post_id = %id))]
    pub async fn post_comments(
        &self,
        id: PostId,
        token: Option<&SecretString>,
    ) -> Result<Arc<CommentsPage>, QueryError> {
        let key = QueryKey::PostComments(id);
        let value = self
            .fetch(key, token, move |api, token| async move {
                Ok(QueryValue::Comments(Arc::new(
                    api.post_comments(id, token.as_ref()).await?,
                )))
            })
            .await?;
        match value {
            QueryValue::Comments(page) => Ok(page),
            _ => Err(QueryError::Mismatch(key)),
        }
    }

    /// Drop every cached value.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;
    use url::Url;

    use super::*;
    use crate::config::ApiConfig;

    fn policy(retries: u32) -> RetryPolicy {
        RetryPolicy {
            retries,
            base_delay: Duration::from_millis(1),
        }
    }

    fn status_error() -> ApiError {
        ApiError::Status {
            status: 503,
            message: "unavailable".to_string(),
        }
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy {
            retries: 3,
            base_delay: Duration::from_secs(1),
        };
        assert_eq!(policy.backoff(0), Duration::from_secs(1));
        assert_eq!(policy.backoff(1), Duration::from_secs(2));
        assert_eq!(policy.backoff(2), Duration::from_secs(4));
        assert_eq!(policy.backoff(5), MAX_BACKOFF);
        assert_eq!(policy.backoff(40), MAX_BACKOFF);
    }

    #[tokio::test]
    async fn test_retry_succeeds_after_failures() {
        let calls = AtomicU32::new(0);
        let result = policy(3)
            .run(QueryKey::Posts, || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move { if n < 2 { Err(status_error()) } else { Ok(n) } }
            })
            .await
            .unwrap();
        assert_eq!(result, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_fixed_count() {
        let calls = AtomicU32::new(0);
        let err = policy(3)
            .run(QueryKey::Comments, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err::<(), _>(status_error()) }
            })
            .await
            .unwrap_err();
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert!(matches!(err, QueryError::Failed { attempts: 4, .. }));
        assert!(err.to_string().starts_with("comments failed after 4 attempt(s)"));
    }

    #[tokio::test]
    async fn test_not_found_is_not_retried() {
        let calls = AtomicU32::new(0);
        let err = policy(3)
            .run(QueryKey::Product(ProductId::new(9)), || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err::<(), _>(ApiError::NotFound("/products/9".to_string())) }
            })
            .await
            .unwrap_err();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_parse_error_is_not_retried() {
        let calls = AtomicU32::new(0);
        let err = policy(3)
            .run(QueryKey::Posts, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async {
                    let parse = serde_json::from_str::<PostsPage>("{}").unwrap_err();
                    Err::<(), _>(ApiError::Parse(parse))
                }
            })
            .await
            .unwrap_err();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(err, QueryError::Failed { attempts: 1, .. }));
    }

    #[test]
    fn test_rate_limit_waits_for_retry_after() {
        let policy = RetryPolicy {
            retries: 3,
            base_delay: Duration::from_secs(1),
        };
        assert_eq!(policy.delay_after(0, &ApiError::RateLimited(7)), Duration::from_secs(7));
        assert_eq!(policy.delay_after(3, &ApiError::RateLimited(2)), Duration::from_secs(8));
        assert_eq!(policy.delay_after(0, &ApiError::RateLimited(120)), MAX_BACKOFF);
        assert_eq!(policy.delay_after(1, &status_error()), Duration::from_secs(2));
    }

    #[test]
    fn test_not_found_detection() {
        let err = QueryError::Failed {
            key: QueryKey::Product(ProductId::new(9)),
            attempts: 1,
            source: Arc::new(ApiError::NotFound("/products/9".to_string())),
        };
        assert!(err.is_not_found());
        assert!(!QueryError::Mismatch(QueryKey::Posts).is_not_found());
    }

    /// Fake API whose `/posts` fails `failures` times before answering.
    async fn spawn_flaky_api(failures: u32) -> (ApiClient, Arc<AtomicU32>) {
        let hits = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&hits);
        let app = Router::new().route(
            "/posts",
            get(move || {
                let counter = Arc::clone(&counter);
                async move {
                    let n = counter.fetch_add(1, Ordering::SeqCst);
                    if n < failures {
                        Err(StatusCode::INTERNAL_SERVER_ERROR)
                    } else {
                        Ok(Json(json!({"posts": [], "total": 251})))
                    }
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let api = ApiClient::new(&ApiConfig {
            base_url: Url::parse(&format!("http://{addr}")).unwrap(),
            timeout: Duration::from_secs(5),
        })
        .unwrap();
        (api, hits)
    }

    fn test_config(retries: u32) -> QueryConfig {
        QueryConfig {
            retries,
            retry_base_delay: Duration::from_millis(1),
            ..QueryConfig::default()
        }
    }

    #[tokio::test]
    async fn test_cache_hit_skips_network() {
        let (api, hits) = spawn_flaky_api(0).await;
        let queries = QueryCache::new(api, &test_config(3));

        assert_eq!(queries.posts(None).await.unwrap().total, 251);
        assert_eq!(queries.posts(None).await.unwrap().total, 251);
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        queries.invalidate_all();
        queries.posts(None).await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_cache_retries_then_caches() {
        let (api, hits) = spawn_flaky_api(2).await;
        let queries = QueryCache::new(api, &test_config(3));

        assert_eq!(queries.posts(None).await.unwrap().total, 251);
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let (api, hits) = spawn_flaky_api(2).await;
        let queries = QueryCache::new(api, &test_config(0));

        assert!(queries.posts(None).await.is_err());
        assert!(queries.posts(None).await.is_err());
        assert_eq!(queries.posts(None).await.unwrap().total, 251);
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_concurrent_misses_share_one_fetch() {
        let (api, hits) = spawn_flaky_api(0).await;
        let queries = QueryCache::new(api, &test_config(0));

        let (a, b, c) = tokio::join!(queries.posts(None), queries.posts(None), queries.posts(None));
        assert!(a.is_ok() && b.is_ok() && c.is_ok());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
