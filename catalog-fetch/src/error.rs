//! Fetch error types.

use thiserror::Error;

/// Error type for data client operations.
///
/// The `Display` output is what the store surfaces to users, so server
/// errors render as the bare server message.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP transport failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Request timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Rate limited by the API.
    #[error("Rate limited, retry after {retry_after:?} seconds")]
    RateLimited {
        /// Seconds to wait before retrying.
        retry_after: Option<u64>,
    },

    /// Authentication failed.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The API answered with a non-success status.
    #[error("{message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the response.
        message: String,
    },

    /// Response body did not match the expected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Base URL or path could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Any other failure, carried as a plain message.
    #[error("{0}")]
    Other(String),
}

impl FetchError {
    /// Creates a server error.
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: message.into(),
        }
    }

    /// Returns the HTTP status associated with this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::AuthenticationFailed(_) => Some(401),
            Self::RateLimited { .. } => Some(429),
            _ => None,
        }
    }

    /// Returns true if the resource does not exist.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Returns the human-readable message, or `None` if it is blank.
    pub fn message(&self) -> Option<String> {
        let message = self.to_string();
        if message.trim().is_empty() {
            None
        } else {
            Some(message)
        }
    }
}

impl From<url::ParseError> for FetchError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}
