//! # catalog-fetch-rs
//!
//! A resilient fetch layer for git-backed content catalogs.
//!
//! ## Features
//!
//! - **Upstream client**: per-call timeouts, exponential backoff retries and
//!   CDN cache-status detection, with optional call tracing
//! - **Request coalescing**: concurrent fetches of one key share a single
//!   upstream call
//! - **Cache warming**: scheduled, condition-gated strategies plus
//!   pattern-driven warming from observed traffic
//! - **Performance monitoring**: percentiles, bottleneck detection and
//!   threshold alerts
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use catalog_fetch::{Config, FetchLayer, ResourceKey};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let layer = FetchLayer::new(Config::default())?;
//!     layer.start();
//!
//!     let body = layer.fetch(&ResourceKey::languages()).await?;
//!     println!("{} bytes", body.size_bytes());
//!
//!     layer.close();
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod config;
pub mod core;
pub mod monitoring;
pub mod utils;

pub use config::Config;
pub use core::coalescer::{CoalescedFetcher, CoalescingStats, ErrorHandling, RequestCoalescer};
pub use core::upstream::{CacheStatus, RequestOptions, UpstreamClient, UpstreamRequestResult};
pub use core::warmer::{CacheWarmer, WarmingResult, WarmingStrategy};
pub use core::{
    CacheStore, CatalogFetcher, FetchLayer, Fetcher, MemoryCacheStore, MetricSink, ResourceKey,
    ResourceKind, ResponseBody,
};
pub use monitoring::{PerformanceInsights, PerformanceMonitor, PerformanceStats};
pub use utils::error::{FetchError, Result, SharedError};

// Version information
/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
/// Description of the crate
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Build metadata captured by `build.rs`
#[derive(Debug, Clone)]
pub struct BuildInfo {
    pub version: &'static str,
    pub build_time: &'static str,
    pub git_hash: &'static str,
    pub rust_version: &'static str,
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self {
            version: VERSION,
            build_time: env!("BUILD_TIME"),
            git_hash: env!("GIT_HASH"),
            rust_version: env!("RUST_VERSION"),
        }
    }
}

pub fn build_info() -> BuildInfo {
    BuildInfo::default()
}
