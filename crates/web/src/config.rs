//! Dashboard configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional; defaults target the public demo API.
//!
//! - `DASHBOARD_HOST` - Bind address (default: 127.0.0.1)
//! - `DASHBOARD_PORT` - Listen port (default: 3000)
//! - `DASHBOARD_BASE_URL` - Public URL of the dashboard (default: http://localhost:3000)
//! - `DASHBOARD_API_BASE_URL` - Remote REST API (default: https://dummyjson.com)
//! - `DASHBOARD_API_TIMEOUT_SECS` - Per-request timeout (default: 10)
//! - `DASHBOARD_QUERY_RETRIES` - Retries after a failed fetch (default: 3)
//! - `DASHBOARD_QUERY_TTL_SECS` - How long fetched data stays cached (default: 300)
//! - `DASHBOARD_CHECKOUT_DELAY_MS` - Simulated payment processing time (default: 2000)
//! - `DASHBOARD_REDIRECT_DELAY_SECS` - Confirmation page redirect delay (default: 3)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate, 0.0-1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Trace sample rate, 0.0-1.0 (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Dashboard application configuration.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the dashboard
    pub base_url: String,
    /// Remote API configuration
    pub api: ApiConfig,
    /// Query cache configuration
    pub query: QueryConfig,
    /// Checkout simulation timings
    pub checkout: CheckoutConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate
    pub sentry_sample_rate: f32,
    /// Sentry performance trace sample rate
    pub sentry_traces_sample_rate: f32,
}

/// Remote REST API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL, without trailing slash
    pub base_url: Url,
    /// Per-request timeout
    pub timeout: Duration,
}

/// Query cache configuration.
#[derive(Debug, Clone)]
pub struct QueryConfig {
    /// Retries after the first failed attempt
    pub retries: u32,
    /// Base delay for exponential backoff between attempts
    pub retry_base_delay: Duration,
    /// Time-to-live of cached values
    pub ttl: Duration,
    /// Maximum number of cached entries
    pub max_capacity: u64,
}

/// Checkout simulation timings.
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    /// Artificial payment processing delay
    pub processing_delay: Duration,
    /// Delay before the confirmation page sends the visitor home
    pub redirect_delay: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_API_BASE_URL).unwrap_or_else(|_| unreachable!()),
            timeout: Duration::from_secs(10),
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            retries: 3,
            retry_base_delay: Duration::from_secs(1),
            ttl: Duration::from_secs(300),
            max_capacity: 1000,
        }
    }
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            processing_delay: Duration::from_millis(2000),
            redirect_delay: Duration::from_secs(3),
        }
    }
}

const DEFAULT_API_BASE_URL: &str = "https://dummyjson.com";

impl DashboardConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env_or("DASHBOARD_HOST", IpAddr::from([127, 0, 0, 1]))?;
        let port = parse_env_or("DASHBOARD_PORT", 3000u16)?;
        let base_url = get_env_or_default("DASHBOARD_BASE_URL", "http://localhost:3000");

        let api = ApiConfig {
            base_url: parse_url("DASHBOARD_API_BASE_URL", DEFAULT_API_BASE_URL)?,
            timeout: Duration::from_secs(parse_env_or("DASHBOARD_API_TIMEOUT_SECS", 10u64)?),
        };

        let defaults = QueryConfig::default();
        let query = QueryConfig {
            retries: parse_env_or("DASHBOARD_QUERY_RETRIES", defaults.retries)?,
            ttl: Duration::from_secs(parse_env_or(
                "DASHBOARD_QUERY_TTL_SECS",
                defaults.ttl.as_secs(),
            )?),
            ..defaults
        };

        let checkout = CheckoutConfig {
            processing_delay: Duration::from_millis(parse_env_or(
                "DASHBOARD_CHECKOUT_DELAY_MS",
                2000u64,
            )?),
            redirect_delay: Duration::from_secs(parse_env_or(
                "DASHBOARD_REDIRECT_DELAY_SECS",
                3u64,
            )?),
        };

        Ok(Self {
            host,
            port,
            base_url,
            api,
            query,
            checkout,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_rate("SENTRY_SAMPLE_RATE", 1.0)?,
            sentry_traces_sample_rate: parse_rate("SENTRY_TRACES_SAMPLE_RATE", 0.0)?,
        })
    }

    /// Configuration for tests and local tooling: defaults, pointed at `api_base_url`.
    #[must_use]
    pub fn for_api(api_base_url: Url) -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 0,
            base_url: "http://localhost".to_string(),
            api: ApiConfig {
                base_url: api_base_url,
                ..ApiConfig::default()
            },
            query: QueryConfig::default(),
            checkout: CheckoutConfig::default(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |raw| parse_value(key, &raw))
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse a URL variable and strip any trailing slash.
fn parse_url(key: &str, default: &str) -> Result<Url, ConfigError> {
    let raw = get_env_or_default(key, default);
    normalize_base_url(&raw)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn normalize_base_url(raw: &str) -> Result<Url, url::ParseError> {
    Url::parse(raw.trim().trim_end_matches('/'))
}

/// Parse a sample rate in `0.0..=1.0`.
fn parse_rate(key: &str, default: f32) -> Result<f32, ConfigError> {
    let rate = parse_env_or(key, default)?;
    if (0.0..=1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be between 0.0 and 1.0 (got {rate})"),
        ))
    }
}
