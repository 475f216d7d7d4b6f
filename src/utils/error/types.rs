//! Error types for the fetch layer

use thiserror::Error;

/// Result type alias for the fetch layer
pub type Result<T> = std::result::Result<T, FetchError>;

/// Error handed to coalesced waiters.
///
/// Whether concurrent waiters share one allocation or receive their own
/// copy is decided by the coalescer's `ErrorHandling` policy.
pub type SharedError = std::sync::Arc<FetchError>;

/// Main error type for the fetch layer
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    /// Connection-level failures (DNS, refused, reset). Retryable.
    #[error("Network error: {0}")]
    Network(String),

    /// Per-call timeout elapsed. Retryable.
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// Upstream answered 4xx. Surfaced immediately, never retried.
    #[error("Client error (HTTP {status}): {message}")]
    ClientError { status: u16, message: String },

    /// Upstream answered 5xx. Retryable.
    #[error("Server error (HTTP {status}): {message}")]
    ServerError { status: u16, message: String },

    /// Malformed response body
    #[error("Parse error: {0}")]
    Parse(String),

    /// Retries exhausted
    #[error("Request failed after {max_retries} retries ({url}): {message}")]
    RequestFailed {
        url: String,
        max_retries: u32,
        message: String,
    },

    /// A warming condition was not met. Not a failure.
    #[error("Warming skipped: {0}")]
    WarmingSkipped(String),

    /// A coalesced request outlived the pending ceiling
    #[error("Pending request '{key}' timed out after {waited_ms}ms")]
    PendingTimeout { key: String, waited_ms: u64 },

    /// Generic wrapper for a downstream fetch failure
    #[error("Tool execution error: {0}")]
    ToolExecution(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}
