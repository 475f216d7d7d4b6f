//! Upstream client implementation

use super::cache_status::{CacheStatus, infer_cache_status};
use super::retry::RetryPolicy;
use super::trace::{CallTrace, Trace, TraceRecorder};
use super::types::{RequestOptions, ResponseType, UpstreamError, UpstreamRequestResult};
use crate::config::UpstreamConfig;
use crate::core::resource::ResponseBody;
use crate::utils::error::{FetchError, Result};
use chrono::Utc;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde_json::json;
use std::collections::HashMap;
use std::str::FromStr;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use url::Url;

/// Error bodies longer than this are truncated in messages
const MAX_ERROR_BODY_CHARS: usize = 200;

/// One HTTP exchange, before status classification
struct RawResponse {
    status: u16,
    headers: HashMap<String, String>,
    cache_status: CacheStatus,
    content_type: Option<String>,
    body: String,
}

/// A successful attempt
struct HttpResponse {
    status: u16,
    headers: HashMap<String, String>,
    cache_status: CacheStatus,
    body: ResponseBody,
}

/// HTTP client for the catalog API
#[derive(Debug)]
pub struct UpstreamClient {
    config: UpstreamConfig,
    client: reqwest::Client,
    base_url: Url,
    retry: RetryPolicy,
    trace: TraceRecorder,
}

impl UpstreamClient {
    pub fn new(config: UpstreamConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| FetchError::config(format!("Invalid base URL: {}", e)))?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
        for (name, value) in &config.default_headers {
            let name = HeaderName::from_str(name)
                .map_err(|e| FetchError::config(format!("Invalid header name {}: {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| FetchError::config(format!("Invalid header value: {}", e)))?;
            headers.insert(name, value);
        }

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()
            .map_err(|e| FetchError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            retry: RetryPolicy::from_config(&config),
            trace: TraceRecorder::new(config.enable_tracing),
            config,
            client,
            base_url,
        })
    }

    pub fn config(&self) -> &UpstreamConfig {
        &self.config
    }

    /// Resolve an endpoint against the base URL and append query pairs
    pub fn build_url(&self, endpoint: &str, query: &[(String, String)]) -> Result<Url> {
        let joined = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        );
        let mut url = Url::parse(&joined)
            .map_err(|e| FetchError::validation(format!("Invalid endpoint {}: {}", endpoint, e)))?;

        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// Perform a request with timeout and retry.
    ///
    /// Never returns `Err`: the outcome, success or failure, is described by
    /// the returned `UpstreamRequestResult`.
    pub async fn request(&self, endpoint: &str, options: RequestOptions) -> UpstreamRequestResult {
        let started = Instant::now();

        let url = match self.build_url(endpoint, &options.query) {
            Ok(url) => url,
            Err(cause) => {
                let error = UpstreamError {
                    code: cause.code(),
                    message: cause.to_string(),
                    details: json!({ "endpoint": endpoint }),
                    cause,
                };
                return UpstreamRequestResult::failure(error, 0, elapsed_ms(started));
            }
        };

        let policy = match options.max_retries {
            Some(max_retries) => self.retry.with_max_retries(max_retries),
            None => self.retry.clone(),
        };
        let timeout = options.timeout.unwrap_or_else(|| self.config.timeout());

        let url_ref = &url;
        let options_ref = &options;
        let outcome = policy
            .call(move |attempt| self.attempt(url_ref, endpoint, options_ref, timeout, attempt))
            .await;
        let duration_ms = elapsed_ms(started);

        match outcome.result {
            Ok(response) => UpstreamRequestResult {
                success: true,
                data: Some(response.body),
                error: None,
                status_code: Some(response.status),
                response_headers: response.headers,
                cache_status: response.cache_status,
                attempts: outcome.attempts,
                duration_ms,
            },
            Err(last_error) if outcome.exhausted => {
                let cause = FetchError::RequestFailed {
                    url: url.to_string(),
                    max_retries: policy.max_retries(),
                    message: last_error.to_string(),
                };
                let error = UpstreamError {
                    code: cause.code(),
                    message: format!(
                        "Request failed after {} attempts: {}",
                        outcome.attempts, last_error
                    ),
                    details: json!({
                        "url": url.as_str(),
                        "maxRetries": policy.max_retries(),
                        "attempts": outcome.attempts,
                        "lastError": last_error.to_string(),
                    }),
                    cause,
                };
                warn!("{} {}", endpoint, error.message);
                let mut result =
                    UpstreamRequestResult::failure(error, outcome.attempts, duration_ms);
                result.status_code = last_error.status_code();
                result
            }
            Err(cause) => {
                let message = match &cause {
                    FetchError::ClientError { message, .. } => message.clone(),
                    other => other.to_string(),
                };
                let error = UpstreamError {
                    code: cause.code(),
                    message,
                    details: json!({ "url": url.as_str(), "attempts": outcome.attempts }),
                    cause,
                };
                debug!("{} failed without retry: {}", endpoint, error.code);
                UpstreamRequestResult::failure(error, outcome.attempts, duration_ms)
            }
        }
    }

    async fn attempt(
        &self,
        url: &Url,
        endpoint: &str,
        options: &RequestOptions,
        timeout: Duration,
        attempt: u32,
    ) -> Result<HttpResponse> {
        let start_time = Utc::now();
        let clock = Instant::now();

        let raw = self.send(url, options, timeout).await;
        let (status_code, cache_status) = match &raw {
            Ok(raw) => (Some(raw.status), raw.cache_status),
            Err(_) => (None, CacheStatus::Unknown),
        };
        let result = raw.and_then(|raw| classify(raw, options.response_type));

        if self.trace.is_enabled() {
            self.trace.record(CallTrace {
                id: uuid::Uuid::new_v4().to_string(),
                endpoint: endpoint.to_string(),
                url: url.to_string(),
                start_time,
                end_time: Utc::now(),
                duration_ms: elapsed_ms(clock),
                status_code,
                success: result.is_ok(),
                cache_status,
                attempt: attempt + 1,
                error: result.as_ref().err().map(|e| e.to_string()),
            });
        }

        result
    }

    async fn send(&self, url: &Url, options: &RequestOptions, timeout: Duration) -> Result<RawResponse> {
        let mut builder = self.client.request(options.method.clone(), url.clone());
        for (name, value) in &options.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let exchange = async {
            let response = builder.send().await?;
            let status = response.status().as_u16();
            let cache_status = infer_cache_status(response.headers());
            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let headers = response
                .headers()
                .iter()
                .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
                .collect();
            let body = response.text().await?;

            Ok::<_, FetchError>(RawResponse {
                status,
                headers,
                cache_status,
                content_type,
                body,
            })
        };

        tokio::time::timeout(timeout, exchange).await.map_err(|_| {
            FetchError::timeout(format!(
                "Request to {} timed out after {}ms",
                url,
                timeout.as_millis()
            ))
        })?
    }

    pub fn start_trace(&self, operation: &str) {
        self.trace.start(operation);
    }

    pub fn get_trace(&self) -> Trace {
        self.trace.snapshot()
    }

    pub fn clear_trace(&self) {
        self.trace.clear();
    }

    pub fn set_tracing_enabled(&self, enabled: bool) {
        self.trace.set_enabled(enabled);
    }

    pub fn is_tracing_enabled(&self) -> bool {
        self.trace.is_enabled()
    }
}

fn classify(raw: RawResponse, response_type: ResponseType) -> Result<HttpResponse> {
    match raw.status {
        200..=299 => {
            let body = decode_body(raw.body, raw.content_type.as_deref(), response_type)?;
            Ok(HttpResponse {
                status: raw.status,
                headers: raw.headers,
                cache_status: raw.cache_status,
                body,
            })
        }
        status => Err(FetchError::from_status(status, error_message(status, &raw.body))),
    }
}

fn decode_body(
    body: String,
    content_type: Option<&str>,
    response_type: ResponseType,
) -> Result<ResponseBody> {
    let is_json = content_type.is_some_and(|ct| ct.contains("json"));
    match response_type {
        ResponseType::Text => Ok(ResponseBody::Text(body)),
        ResponseType::Auto if !is_json => Ok(ResponseBody::Text(body)),
        ResponseType::Auto | ResponseType::Json => serde_json::from_str(&body)
            .map(ResponseBody::Json)
            .map_err(|e| FetchError::parse(format!("Invalid JSON body: {}", e))),
    }
}

/// Prefer the `message` field of a JSON error body, then the raw body,
/// then the canonical reason phrase
fn error_message(status: u16, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(message) = value.get("message").and_then(|m| m.as_str()) {
            return message.to_string();
        }
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.chars().take(MAX_ERROR_BODY_CHARS).collect();
    }

    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown error")
        .to_string()
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
