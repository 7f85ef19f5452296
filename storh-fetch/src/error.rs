//! Fetch error types.

use thiserror::Error;

/// Error type for fetch operations.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Login was rejected (bad credentials or a non-200 login response).
    #[error("Login failed: {0}")]
    LoginFailed(String),

    /// Re-authentication during 401 recovery failed.
    #[error("Authentication failure: {0}")]
    AuthenticationFailure(String),

    /// The account has no group to read items from.
    #[error("No group available for this account")]
    NoGroupAvailable,

    /// The service answered with a status this client does not handle.
    #[error("Unexpected HTTP status: {0}")]
    UnexpectedStatus(u16),

    /// The response body could not be decoded.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// An authenticated request was attempted before any login.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Request timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// HTTP request failed before a response was received.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid service URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl FetchError {
    /// Returns true if this error aborts the bootstrap sequence outright.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            FetchError::LoginFailed(_) | FetchError::NoGroupAvailable | FetchError::InvalidUrl(_)
        )
    }

    /// Returns true if a later attempt might succeed without intervention.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Timeout(_) | FetchError::UnexpectedStatus(_) => true,
            FetchError::Http(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            _ => false,
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::MalformedResponse(err.to_string())
    }
}
