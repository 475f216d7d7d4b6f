//! Helper constructors and classification for `FetchError`

use super::types::FetchError;
use std::any::Any;

impl FetchError {
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network(message.into())
    }

    pub fn timeout<S: Into<String>>(message: S) -> Self {
        Self::Timeout(message.into())
    }

    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse(message.into())
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    pub fn tool_execution<S: Into<String>>(message: S) -> Self {
        Self::ToolExecution(message.into())
    }

    /// Turn a caught panic payload into an internal error
    pub fn from_panic(context: &str, payload: Box<dyn Any + Send>) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        Self::Internal(format!("{} panicked: {}", context, message))
    }

    /// Build the error matching an HTTP status code
    pub fn from_status<S: Into<String>>(status: u16, message: S) -> Self {
        match status {
            400..=499 => Self::ClientError {
                status,
                message: message.into(),
            },
            _ => Self::ServerError {
                status,
                message: message.into(),
            },
        }
    }

    /// Whether the upstream client should try again after this error
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::Timeout(_) | Self::ServerError { .. }
        )
    }

    /// Stable machine-readable code
    pub fn code(&self) -> String {
        match self {
            Self::Network(_) => "NETWORK_ERROR".to_string(),
            Self::Timeout(_) => "TIMEOUT".to_string(),
            Self::ClientError { status, .. } | Self::ServerError { status, .. } => {
                format!("HTTP_{}", status)
            }
            Self::Parse(_) => "PARSE_ERROR".to_string(),
            Self::RequestFailed { .. } => "REQUEST_FAILED".to_string(),
            Self::WarmingSkipped(_) => "WARMING_SKIPPED".to_string(),
            Self::PendingTimeout { .. } => "PENDING_TIMEOUT".to_string(),
            Self::ToolExecution(_) => "TOOL_EXECUTION_ERROR".to_string(),
            Self::Config(_) => "CONFIG_ERROR".to_string(),
            Self::Validation(_) => "VALIDATION_ERROR".to_string(),
            Self::Internal(_) => "INTERNAL_ERROR".to_string(),
        }
    }

    /// HTTP status carried by the error, if any
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::ClientError { status, .. } | Self::ServerError { status, .. } => Some(*status),
            _ => None,
        }
    }
}
