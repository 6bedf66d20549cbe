//! Core error types for the catalog.

use thiserror::Error;

/// Core error type for catalog operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A product form is missing required fields.
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    /// Invalid data from API response or user input.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}
