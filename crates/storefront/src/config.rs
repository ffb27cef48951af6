//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SCAMAZON_API_URL` - Base URL of the backend REST API (e.g., `http://localhost:5000`)
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront (default: `http://{host}:{port}`)
//! - `SCAMAZON_API_TIMEOUT_SECS` - Per-request timeout for backend calls (default: 10)
//! - `SCAMAZON_STALE_RESPONSES` - How overlapping requests resolve:
//!   `last-resolution-wins` (default) or `latest-dispatch-wins`
//! - `SCAMAZON_SESSION_IDLE_SECS` - Idle time before a session's state is dropped (default: 86400)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::store::StalePolicy;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Backend API configuration
    pub api: ApiConfig,
    /// Resolution policy for overlapping requests on the same slice
    pub stale_policy: StalePolicy,
    /// How long an idle session keeps its in-memory state
    pub session_idle: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Backend REST API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL without a trailing slash
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string())
            })?;
        let base_url = get_optional_env("STOREFRONT_BASE_URL")
            .unwrap_or_else(|| format!("http://{host}:{port}"));

        let api = ApiConfig::from_env()?;
        let stale_policy = parse_stale_policy(&get_env_or_default(
            "SCAMAZON_STALE_RESPONSES",
            "last-resolution-wins",
        ))?;
        let session_idle = Duration::from_secs(parse_secs(
            "SCAMAZON_SESSION_IDLE_SECS",
            &get_env_or_default("SCAMAZON_SESSION_IDLE_SECS", "86400"),
        )?);

        Ok(Self {
            host,
            port,
            base_url,
            api,
            stale_policy,
            session_idle,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl ApiConfig {
    /// Load the backend API settings on their own (used by the CLI as well).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `SCAMAZON_API_URL` is missing or not an http(s) URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = normalize_api_url(&get_required_env("SCAMAZON_API_URL")?)?;
        let timeout = Duration::from_secs(parse_secs(
            "SCAMAZON_API_TIMEOUT_SECS",
            &get_env_or_default("SCAMAZON_API_TIMEOUT_SECS", "10"),
        )?);
        Ok(Self { base_url, timeout })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Validate the API base URL and strip any trailing slash.
fn normalize_api_url(raw: &str) -> Result<String, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|e| {
        ConfigError::InvalidEnvVar("SCAMAZON_API_URL".to_string(), e.to_string())
    })?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ConfigError::InvalidEnvVar(
            "SCAMAZON_API_URL".to_string(),
            "must be an http(s) URL with a host".to_string(),
        ));
    }
    Ok(url.as_str().trim_end_matches('/').to_string())
}

/// Parse a positive number of seconds.
fn parse_secs(key: &str, value: &str) -> Result<u64, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be greater than zero".to_string(),
        )),
        Ok(secs) => Ok(secs),
        Err(e) => Err(ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
    }
}

fn parse_stale_policy(value: &str) -> Result<StalePolicy, ConfigError> {
    value.parse().map_err(|e: String| {
        ConfigError::InvalidEnvVar("SCAMAZON_STALE_RESPONSES".to_string(), e)
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_api_url_strips_trailing_slash() {
        assert_eq!(
            normalize_api_url("http://localhost:5000/").unwrap(),
            "http://localhost:5000"
        );
        assert_eq!(
            normalize_api_url(" https://api.example.com/shop/ ").unwrap(),
            "https://api.example.com/shop"
        );
    }

    #[test]
    fn test_normalize_api_url_rejects_non_http() {
        assert!(matches!(
            normalize_api_url("ftp://example.com"),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
        assert!(normalize_api_url("not a url").is_err());
    }

    #[test]
    fn test_parse_secs() {
        assert_eq!(parse_secs("T", "30").unwrap(), 30);
        assert!(parse_secs("T", "0").is_err());
        assert!(parse_secs("T", "soon").is_err());
    }

    #[test]
    fn test_parse_stale_policy() {
        assert_eq!(
            parse_stale_policy("latest-dispatch-wins").unwrap(),
            StalePolicy::LatestDispatchWins
        );
        assert_eq!(
            parse_stale_policy("last-resolution-wins").unwrap(),
            StalePolicy::LastResolutionWins
        );
        assert!(parse_stale_policy("first-wins").is_err());
    }

    #[test]
    fn test_socket_addr() {
        let config = StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            api: ApiConfig {
                base_url: "http://localhost:5000".to_string(),
                timeout: Duration::from_secs(10),
            },
            stale_policy: StalePolicy::default(),
            session_idle: Duration::from_secs(60),
            sentry_dsn: None,
            sentry_environment: None,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }
}
