//! Cache status inference from response headers

use reqwest::header::{AGE, CACHE_CONTROL, HeaderMap};
use serde::{Deserialize, Serialize};

/// Whether an upstream response was served from an intermediate cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStatus {
    Hit,
    Miss,
    Partial,
    Expired,
    #[default]
    Unknown,
}

impl CacheStatus {
    pub fn is_hit(&self) -> bool {
        matches!(self, CacheStatus::Hit)
    }

    pub fn is_miss(&self) -> bool {
        matches!(self, CacheStatus::Miss | CacheStatus::Expired)
    }
}

/// Infer the cache status of a response.
///
/// Headers are consulted in priority order: `CF-Cache-Status`, `X-Cache`,
/// `Age` presence, `Cache-Control`. A header with an unrecognised value
/// falls through to the next one.
pub fn infer_cache_status(headers: &HeaderMap) -> CacheStatus {
    if let Some(status) = header_str(headers, "cf-cache-status").and_then(from_cdn_status) {
        return status;
    }

    if let Some(status) = header_str(headers, "x-cache").and_then(from_x_cache) {
        return status;
    }

    // Any parseable `Age` counts, including 0.
    if header_str(headers, AGE.as_str()).is_some_and(|v| v.trim().parse::<u64>().is_ok()) {
        return CacheStatus::Hit;
    }

    if let Some(cache_control) = header_str(headers, CACHE_CONTROL.as_str()) {
        let cache_control = cache_control.to_ascii_lowercase();
        if cache_control.contains("no-cache") || cache_control.contains("no-store") {
            return CacheStatus::Miss;
        }
    }

    CacheStatus::Unknown
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn from_cdn_status(value: &str) -> Option<CacheStatus> {
    match value.trim().to_ascii_uppercase().as_str() {
        "HIT" | "REVALIDATED" => Some(CacheStatus::Hit),
        "MISS" | "BYPASS" | "DYNAMIC" => Some(CacheStatus::Miss),
        "EXPIRED" | "STALE" | "UPDATING" => Some(CacheStatus::Expired),
        _ => None,
    }
}

fn from_x_cache(value: &str) -> Option<CacheStatus> {
    let value = value.to_ascii_lowercase();
    if value.contains("hit") {
        Some(CacheStatus::Hit)
    } else if value.contains("miss") {
        Some(CacheStatus::Miss)
    } else if value.contains("partial") {
        Some(CacheStatus::Partial)
    } else {
        None
    }
}
