//! Scheduled, condition-gated cache warming
//!
//! Jobs pair a `WarmingStrategy` with run history. Resources are fetched
//! through the same `Fetcher` organic traffic uses, so warming shares
//! deduplication and metrics with it.

mod conditions;
mod patterns;
mod schedule;
mod types;
#[allow(clippy::module_inception)]
mod warmer;

#[cfg(feature = "system-load")]
pub use conditions::SystemLoadProbe;
pub use conditions::{ConditionContext, LoadProbe, StaticLoadProbe, WarmingCondition};
pub use patterns::{catalog_sweep, popular_scripture, seed_resources, translation_helps};
pub use schedule::Schedule;
pub use types::{
    AccessPattern, JobStatus, WarmingFailure, WarmingJob, WarmingPriority, WarmingResult,
    WarmingStats, WarmingStrategy,
};
pub use warmer::{CacheWarmer, PATTERN_JOB, default_strategies};
