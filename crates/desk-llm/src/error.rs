//! Error types for provider operations

use thiserror::Error;

/// Result type alias for provider operations
pub type Result<T> = std::result::Result<T, LlmError>;

/// Errors raised by chat and embedding providers
#[derive(Debug, Error)]
pub enum LlmError {
    /// Provider is misconfigured (missing API key, bad model name)
    #[error("configuration error: {0}")]
    Configuration(String),

    /// API key was rejected
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Provider-side rate limit hit
    #[error("rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Request was rejected as malformed
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Requested model does not exist
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// Request failed for another reason
    #[error("request failed: {0}")]
    RequestFailed(String),

    /// Response did not match the expected shape
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Network or HTTP transport error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}
