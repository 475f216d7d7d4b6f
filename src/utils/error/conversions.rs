//! Conversions from library errors into `FetchError`

use super::types::FetchError;

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout(err.to_string())
        } else if err.is_decode() {
            FetchError::Parse(err.to_string())
        } else if let Some(status) = err.status() {
            FetchError::from_status(status.as_u16(), err.to_string())
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Parse(err.to_string())
    }
}

impl From<serde_yaml::Error> for FetchError {
    fn from(err: serde_yaml::Error) -> Self {
        FetchError::Config(format!("YAML error: {}", err))
    }
}

impl From<std::io::Error> for FetchError {
    fn from(err: std::io::Error) -> Self {
        FetchError::Internal(format!("IO error: {}", err))
    }
}

impl From<tokio::time::error::Elapsed> for FetchError {
    fn from(err: tokio::time::error::Elapsed) -> Self {
        FetchError::Timeout(err.to_string())
    }
}
