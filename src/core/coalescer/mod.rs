//! Request coalescing
//!
//! At most one fetch runs per key at a time; every caller that arrives
//! while it is in flight receives the same settlement.

#[allow(clippy::module_inception)]
mod coalescer;
mod fetcher;
pub mod types;

pub use coalescer::RequestCoalescer;
pub use fetcher::CoalescedFetcher;
pub use types::{CoalescingStats, ErrorHandling, KeyGenerator, PendingRequest};
