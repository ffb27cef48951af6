//! Backend REST API client.
//!
//! # Architecture
//!
//! - One `reqwest::Client` shared behind an `Arc`, cheap to clone into tasks
//! - JSON request and response bodies, typed with `scamazon-core` records
//! - No retry, no backoff, no caching: every call is one round-trip and any
//!   transport or status failure is returned to the caller as an [`ApiError`]
//!
//! # Resources
//!
//! - [`basket`] - fetch, add, remove, clear
//! - [`addresses`] - list, create, update, delete, set default
//! - [`products`] - single product, products by category
//! - [`users`] - register, login, logout
//!
//! # Example
//!
//! ```rust,ignore
//! use scamazon_storefront::api::ApiClient;
//!
//! let client = ApiClient::new(&config.api)?;
//! let basket = client.get_basket(None).await?;
//! let basket = client.add_item(None, &product, Quantity::ONE).await?;
//! ```

pub mod addresses;
pub mod basket;
pub mod products;
pub mod types;
pub mod users;

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::ApiConfig;

/// How many characters of an error body to keep for logs and error messages.
const ERROR_BODY_PREVIEW: usize = 200;

/// Errors that can occur when calling the backend API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (connect, timeout, TLS...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// Response status code.
        status: StatusCode,
        /// Start of the response body.
        body: String,
    },

    /// The backend answered 404 for the requested resource.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The response body was not the JSON we expected.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ApiError {
    /// Whether the backend reported the resource as missing.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Whether the backend rejected the caller's credentials.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { status, .. } if *status == StatusCode::UNAUTHORIZED)
    }
}

/// Client for the backend REST API.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: String,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("scamazon-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.trim_end_matches('/').to_string(),
            }),
        })
    }

    /// The API base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Start a request for `path` (which must begin with `/`).
    fn request(&self, method: Method, path: &str, token: Option<&SecretString>) -> RequestBuilder {
        let url = format!("{}{path}", self.inner.base_url);
        let builder = self.inner.client.request(method, url);
        match token {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    /// Send a request and parse the JSON response body.
    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let text = self.send(request).await?;
        serde_json::from_str(&text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %preview(&text),
                "Failed to parse backend response"
            );
            ApiError::Parse(e)
        })
    }

    /// Send a request whose response body is ignored.
    async fn execute_empty(&self, request: RequestBuilder) -> Result<(), ApiError> {
        self.send(request).await.map(drop)
    }

    /// Send a request and return the body of a successful response.
    async fn send(&self, request: RequestBuilder) -> Result<String, ApiError> {
        let (client, request) = request.build_split();
        let request = request?;
        let method = request.method().clone();
        let path = request.url().path().to_string();

        let response = client.execute(request).await.map_err(|e| {
            tracing::warn!(%method, %path, error = %e, "Backend request failed");
            ApiError::Http(e)
        })?;

        let status = response.status();
        let text = response.text().await?;

        if status == StatusCode::NOT_FOUND {
            tracing::debug!(%method, %path, "Backend returned 404");
            return Err(ApiError::NotFound(path));
        }

        if !status.is_success() {
            tracing::error!(
                %method,
                %path,
                status = %status,
                body = %preview(&text),
                "Backend returned non-success status"
            );
            return Err(ApiError::Status {
                status,
                body: preview(&text),
            });
        }

        tracing::debug!(%method, %path, status = %status, "Backend request succeeded");
        Ok(text)
    }
}

fn preview(text: &str) -> String {
    text.chars().take(ERROR_BODY_PREVIEW).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ApiError::NotFound("/api/products/9".to_string());
        assert_eq!(err.to_string(), "Not found: /api/products/9");

        let err = ApiError::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 500 Internal Server Error: boom");
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_is_unauthorized() {
        let err = ApiError::Status {
            status: StatusCode::UNAUTHORIZED,
            body: String::new(),
        };
        assert!(err.is_unauthorized());
    }

    #[test]
    fn test_preview_truncates() {
        let long = "x".repeat(500);
        assert_eq!(preview(&long).len(), ERROR_BODY_PREVIEW);
    }
}
