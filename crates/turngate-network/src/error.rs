//! Error types for the check-in API client.

use thiserror::Error;

/// Result type alias for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors returned by [`CheckInClient`](crate::CheckInClient) operations.
///
/// The backend reports failures two ways, through the HTTP status and through
/// an `error.code` embedded in a 2xx body. Both end up as [`ApiError::Business`].
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection, TLS or timeout failure. The request may not have reached
    /// the backend.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// HTTP 401; the API key is missing or was rejected.
    #[error("Unauthorized")]
    Unauthorized,

    /// The backend refused the operation.
    #[error("{message}")]
    Business { message: String },

    /// Response body could not be decoded, with the raw body for debugging.
    #[error("Failed to decode response: {message}")]
    Decode { message: String, body: String },

    /// The client could not be built from the configuration.
    #[error("Client configuration error: {0}")]
    Configuration(String),
}

impl ApiError {
    /// Create a new business error.
    pub fn business(message: impl Into<String>) -> Self {
        Self::Business {
            message: message.into(),
        }
    }

    /// Create a new decode error.
    pub fn decode(message: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
            body: body.into(),
        }
    }

    /// Returns `true` if the transport timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Network(e) if e.is_timeout())
    }
}
