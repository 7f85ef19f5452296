//! Store error types.

use storh_core::CoreError;
use thiserror::Error;

/// Errors that can occur in the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// No source supplied a required credential.
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    /// A loaded value failed model validation.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl StoreError {
    /// Returns true if the user can fix this by editing config or environment.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            StoreError::Config(_) | StoreError::MissingCredentials(_) | StoreError::Core(_)
        )
    }
}
