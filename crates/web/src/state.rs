//! Application state shared across handlers.

use std::sync::Arc;

use crate::api::{ApiClient, ApiError};
use crate::config::DashboardConfig;
use crate::query::QueryCache;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the configuration, the API client, and the shared query cache.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: DashboardConfig,
    queries: QueryCache,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: DashboardConfig) -> Result<Self, ApiError> {
        let api = ApiClient::new(&config.api)?;
        let queries = QueryCache::new(api, &config.query);

        Ok(Self {
            inner: Arc::new(AppStateInner { config, queries }),
        })
    }

    /// Get a reference to the dashboard configuration.
    #[must_use]
    pub fn config(&self) -> &DashboardConfig {
        &self.inner.config
    }

    /// Get a reference to the remote API client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        self.inner.queries.api()
    }

    /// Get a reference to the shared query cache.
    #[must_use]
    pub fn queries(&self) -> &QueryCache {
        &self.inner.queries
    }
}
