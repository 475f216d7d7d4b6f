//! Request options and result envelope

use super::cache_status::CacheStatus;
use crate::core::resource::ResponseBody;
use crate::utils::error::{FetchError, Result};
use reqwest::Method;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;

/// How the response body is decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseType {
    /// JSON when the content type says so, text otherwise
    #[default]
    Auto,
    Json,
    Text,
}

/// Per-request overrides
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub query: Vec<(String, String)>,
    pub headers: HashMap<String, String>,
    pub timeout: Option<Duration>,
    pub max_retries: Option<u32>,
    pub response_type: ResponseType,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            query: Vec::new(),
            headers: HashMap::new(),
            timeout: None,
            max_retries: None,
            response_type: ResponseType::Auto,
        }
    }
}

impl RequestOptions {
    pub fn with_query<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn with_header<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    pub fn with_response_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = response_type;
        self
    }
}

/// Structured failure carried by `UpstreamRequestResult`
#[derive(Debug, Clone, Serialize)]
pub struct UpstreamError {
    /// `HTTP_<status>`, `REQUEST_FAILED`, `PARSE_ERROR`, ...
    pub code: String,
    pub message: String,
    pub details: serde_json::Value,
    #[serde(skip)]
    pub cause: FetchError,
}

/// Outcome of `UpstreamClient::request`.
///
/// Failures are reported here instead of as an `Err` so that callers can
/// inspect status, headers and attempts regardless of outcome.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamRequestResult {
    pub success: bool,
    pub data: Option<ResponseBody>,
    pub error: Option<UpstreamError>,
    pub status_code: Option<u16>,
    pub response_headers: HashMap<String, String>,
    pub cache_status: CacheStatus,
    pub attempts: u32,
    pub duration_ms: f64,
}

impl UpstreamRequestResult {
    pub(crate) fn failure(error: UpstreamError, attempts: u32, duration_ms: f64) -> Self {
        Self {
            success: false,
            data: None,
            status_code: error.cause.status_code(),
            error: Some(error),
            response_headers: HashMap::new(),
            cache_status: CacheStatus::Unknown,
            attempts,
            duration_ms,
        }
    }

    /// Whether the response advertised a content encoding
    pub fn compressed(&self) -> bool {
        self.response_headers.contains_key("content-encoding")
    }

    pub fn into_result(self) -> Result<ResponseBody> {
        match (self.data, self.error) {
            (Some(data), _) if self.success => Ok(data),
            (_, Some(error)) => Err(error.cause),
            _ => Err(FetchError::internal("Upstream result carried neither data nor error")),
        }
    }
}
