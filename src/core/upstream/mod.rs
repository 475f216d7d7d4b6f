//! Retrying HTTP client for the catalog API
//!
//! Every call is bounded by a timeout, retried with exponential backoff on
//! transient failures, and optionally recorded as a `CallTrace` so a whole
//! operation can be inspected afterwards.

mod cache_status;
mod catalog;
mod client;
mod retry;
mod trace;
mod types;

pub use cache_status::{CacheStatus, infer_cache_status};
pub use catalog::routes;
pub use client::UpstreamClient;
pub use retry::{RetryOutcome, RetryPolicy};
pub use trace::{CallTrace, Trace};
pub use types::{RequestOptions, ResponseType, UpstreamError, UpstreamRequestResult};
