//! Store error types.

use catalog_core::CoreError;
use catalog_fetch::FetchError;
use thiserror::Error;

/// Errors returned by the store crate.
///
/// Product store operations never return these; their failures land in
/// state. They come from persistence, configuration and form validation.
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

    /// Form input was rejected.
    #[error(transparent)]
    Validation(#[from] CoreError),

    /// The data client could not be built.
    #[error("Client error: {0}")]
    Client(#[from] FetchError),
}

impl StoreError {
    /// Returns true for rejected form input.
    pub fn is_validation(&self) -> bool {
        matches!(self, StoreError::Validation(_))
    }
}
