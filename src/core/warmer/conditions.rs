//! Warming conditions and host load probes

use crate::monitoring::PerformanceMonitor;
use crate::utils::error::{FetchError, Result};
use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// Window used when evaluating `CacheHitRatioBelow`
const HIT_RATIO_WINDOW_HOURS: f64 = 1.0;

/// A gate that must hold for a warming run to proceed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WarmingCondition {
    /// UTC hours `[start_hour, end_hour)`, wrapping past midnight when
    /// `start_hour > end_hour`. Equal bounds cover the whole day.
    TimeRange { start_hour: u32, end_hour: u32 },
    /// Recent cache hit rate (percentage) is below the threshold
    CacheHitRatioBelow { threshold_pct: f64 },
    /// Normalized host load is below the threshold
    SystemLoadBelow { max_load: f64 },
    DayOfWeek { days: Vec<Weekday> },
}

/// Samples current host load, normalized so that 1.0 means fully busy
pub trait LoadProbe: Send + Sync {
    fn current_load(&self) -> Result<f64>;
}

/// One-minute load average divided by available parallelism
#[cfg(feature = "system-load")]
#[derive(Debug, Default)]
pub struct SystemLoadProbe;

#[cfg(feature = "system-load")]
impl LoadProbe for SystemLoadProbe {
    fn current_load(&self) -> Result<f64> {
        let cpus = std::thread::available_parallelism()
            .map(|n| n.get())
            .map_err(|e| FetchError::internal(format!("Cannot determine CPU count: {}", e)))?;
        let load = sysinfo::System::load_average();
        Ok(load.one / cpus as f64)
    }
}

/// Fixed load value
#[derive(Debug, Clone, Copy)]
pub struct StaticLoadProbe(pub f64);

impl LoadProbe for StaticLoadProbe {
    fn current_load(&self) -> Result<f64> {
        Ok(self.0)
    }
}

/// Inputs a condition may read
pub struct ConditionContext<'a> {
    pub now: DateTime<Utc>,
    pub monitor: Option<&'a PerformanceMonitor>,
    pub load_probe: Option<&'a dyn LoadProbe>,
}

impl WarmingCondition {
    /// `Ok(None)` when the condition holds, `Ok(Some(reason))` when it does
    /// not. Probe failures are errors.
    pub fn check(&self, ctx: &ConditionContext<'_>) -> Result<Option<String>> {
        match self {
            WarmingCondition::TimeRange {
                start_hour,
                end_hour,
            } => {
                let hour = ctx.now.hour();
                let inside = match start_hour.cmp(end_hour) {
                    std::cmp::Ordering::Less => hour >= *start_hour && hour < *end_hour,
                    std::cmp::Ordering::Greater => hour >= *start_hour || hour < *end_hour,
                    std::cmp::Ordering::Equal => true,
                };
                Ok((!inside).then(|| {
                    format!(
                        "outside time range {:02}:00-{:02}:00 (now {:02}:00)",
                        start_hour, end_hour, hour
                    )
                }))
            }
            WarmingCondition::CacheHitRatioBelow { threshold_pct } => {
                let Some(monitor) = ctx.monitor else {
                    return Ok(None);
                };
                let rate = monitor.get_stats(HIT_RATIO_WINDOW_HOURS).cache_hit_rate;
                Ok((rate >= *threshold_pct).then(|| {
                    format!(
                        "cache hit rate {:.1}% is not below {:.1}%",
                        rate, threshold_pct
                    )
                }))
            }
            WarmingCondition::SystemLoadBelow { max_load } => {
                let probe = ctx
                    .load_probe
                    .ok_or_else(|| FetchError::config("No load probe configured"))?;
                let load = probe.current_load()?;
                Ok((load >= *max_load)
                    .then(|| format!("system load {:.2} is not below {:.2}", load, max_load)))
            }
            WarmingCondition::DayOfWeek { days } => {
                let today = ctx.now.weekday();
                Ok((!days.contains(&today)).then(|| format!("{} is not a warming day", today)))
            }
        }
    }
}
