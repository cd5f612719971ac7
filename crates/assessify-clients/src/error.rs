//! Client error types.

use thiserror::Error;

/// Errors that can occur when talking to the knowledge platform.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Authentication failed (invalid or missing token).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The requested document was not found.
    #[error("document not found: {0}")]
    NotFound(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The response body did not have the expected shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}
