//! HTTP client with tracing and per-request timeouts.
//!
//! This module provides:
//! - [`HttpApi`] - the seam the transport and session talk through
//! - [`HttpClient`] - the reqwest-backed implementation
//! - [`HttpResponse`] - status plus body, decoded by the caller

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use tracing::{debug, instrument};
use url::Url;

use crate::error::FetchError;

/// Default request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// User agent string for the StorH feed.
const USER_AGENT: &str = concat!("storh-feed/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// Response
// ============================================================================

/// A completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

impl HttpResponse {
    /// Creates a response.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns true for HTTP 200.
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// Returns true for HTTP 401.
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }
}

// ============================================================================
// HTTP API Trait
// ============================================================================

/// Network operations needed by the feed.
///
/// Status codes are returned, not turned into errors: mapping a status to
/// an outcome is the caller's job. Errors are reserved for exchanges that
/// never produced a response.
#[async_trait]
pub trait HttpApi: Send + Sync {
    /// Performs a GET, with `Authorization: Bearer <token>` when a token is given.
    async fn get(&self, url: &Url, bearer: Option<&str>) -> Result<HttpResponse, FetchError>;

    /// Performs a POST with a JSON body.
    async fn post_json(
        &self,
        url: &Url,
        body: &serde_json::Value,
    ) -> Result<HttpResponse, FetchError>;
}

// ============================================================================
// HTTP Client
// ============================================================================

/// reqwest-backed [`HttpApi`] with a bounded timeout on every request.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
    timeout: Duration,
}

impl HttpClient {
    /// Creates a new HTTP client with default settings.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a new HTTP client with a custom timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            inner: client,
            timeout,
        })
    }

    /// Returns the per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn complete(&self, request: reqwest::RequestBuilder) -> Result<HttpResponse, FetchError> {
        let response = request.send().await.map_err(|e| self.map_send_error(e))?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| self.map_send_error(e))?;
        debug!(status, bytes = body.len(), "Response received");
        Ok(HttpResponse { status, body })
    }

    fn map_send_error(&self, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout(self.timeout.as_secs())
        } else {
            FetchError::Http(error)
        }
    }
}

#[async_trait]
impl HttpApi for HttpClient {
    #[instrument(skip(self, bearer), fields(url = %url))]
    async fn get(&self, url: &Url, bearer: Option<&str>) -> Result<HttpResponse, FetchError> {
        debug!(authenticated = bearer.is_some(), "GET request");

        let mut request = self
            .inner
            .get(url.clone())
            .header(header::ACCEPT, "application/json");
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        self.complete(request).await
    }

    #[instrument(skip(self, body), fields(url = %url))]
    async fn post_json(
        &self,
        url: &Url,
        body: &serde_json::Value,
    ) -> Result<HttpResponse, FetchError> {
        debug!("POST request with JSON");

        let request = self
            .inner
            .post(url.clone())
            .header(header::ACCEPT, "application/json")
            .json(body);

        self.complete(request).await
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_keeps_timeout() {
        let client = HttpClient::with_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(client.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_response_helpers() {
        assert!(HttpResponse::new(200, "{}").is_ok());
        assert!(HttpResponse::new(401, "").is_unauthorized());
        assert!(!HttpResponse::new(204, "").is_ok());
    }
}
