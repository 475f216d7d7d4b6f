//! Warmer types

use super::conditions::WarmingCondition;
use super::schedule::Schedule;
use crate::core::resource::ResourceKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_max_concurrency() -> usize {
    3
}

fn default_inter_request_delay_ms() -> u64 {
    100
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum WarmingPriority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

/// What to warm, when, and under which conditions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarmingStrategy {
    pub name: String,
    #[serde(default)]
    pub resources: Vec<ResourceKey>,
    pub schedule: Schedule,
    #[serde(default)]
    pub priority: WarmingPriority,
    #[serde(default)]
    pub conditions: Vec<WarmingCondition>,
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    #[serde(default = "default_inter_request_delay_ms")]
    pub inter_request_delay_ms: u64,
}

impl WarmingStrategy {
    pub fn new<S: Into<String>>(name: S, schedule: Schedule) -> Self {
        Self {
            name: name.into(),
            resources: Vec::new(),
            schedule,
            priority: WarmingPriority::default(),
            conditions: Vec::new(),
            max_concurrency: default_max_concurrency(),
            inter_request_delay_ms: default_inter_request_delay_ms(),
        }
    }

    pub fn with_resources(mut self, resources: Vec<ResourceKey>) -> Self {
        self.resources = resources;
        self
    }

    pub fn with_priority(mut self, priority: WarmingPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_condition(mut self, condition: WarmingCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    pub fn with_inter_request_delay(mut self, delay: Duration) -> Self {
        self.inter_request_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn inter_request_delay(&self) -> Duration {
        Duration::from_millis(self.inter_request_delay_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Scheduled,
    Running,
    /// Last run finished; eligible again once `next_run` passes
    Completed,
    /// Last run returned an error; eligible again once `next_run` passes
    Failed,
}

/// A registered strategy and its run history
#[derive(Debug, Clone, Serialize)]
pub struct WarmingJob {
    /// Same as the strategy name
    pub id: String,
    pub strategy: WarmingStrategy,
    pub last_run: Option<DateTime<Utc>>,
    pub next_run: DateTime<Utc>,
    pub run_count: u64,
    /// Running mean of per-run success percentage
    pub success_rate: f64,
    pub enabled: bool,
    pub status: JobStatus,
}

impl WarmingJob {
    pub(super) fn new(strategy: WarmingStrategy, now: DateTime<Utc>) -> Self {
        Self {
            id: strategy.name.clone(),
            next_run: strategy.schedule.next_run_after(now),
            strategy,
            last_run: None,
            run_count: 0,
            success_rate: 0.0,
            enabled: true,
            status: JobStatus::Scheduled,
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.enabled && self.status != JobStatus::Running && self.next_run <= now
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WarmingFailure {
    pub resource: String,
    pub error: String,
}

/// Outcome of one warming run
#[derive(Debug, Clone, Serialize)]
pub struct WarmingResult {
    pub strategy: String,
    pub started_at: DateTime<Utc>,
    pub duration_ms: f64,
    pub resources_processed: usize,
    pub resources_warmed: usize,
    pub resources_failed: usize,
    /// Why the run did not happen, when a condition was not met
    pub skipped: Option<String>,
    pub errors: Vec<WarmingFailure>,
}

impl WarmingResult {
    pub(super) fn skipped(strategy: &str, started_at: DateTime<Utc>, reason: String) -> Self {
        Self {
            strategy: strategy.to_string(),
            started_at,
            duration_ms: 0.0,
            resources_processed: 0,
            resources_warmed: 0,
            resources_failed: 0,
            skipped: Some(reason),
            errors: Vec::new(),
        }
    }

    pub fn is_skipped(&self) -> bool {
        self.skipped.is_some()
    }

    /// Percentage of processed resources that were warmed
    pub fn success_rate(&self) -> f64 {
        if self.resources_processed == 0 {
            100.0
        } else {
            self.resources_warmed as f64 / self.resources_processed as f64 * 100.0
        }
    }
}

/// How a resource has been accessed recently
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccessPattern {
    pub resource: ResourceKey,
    pub frequency: usize,
    pub last_accessed: Option<DateTime<Utc>>,
    pub average_response_time_ms: f64,
    pub cache_hit_ratio: f64,
    /// Ranking score; higher warms first
    pub priority: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct WarmingStats {
    pub total_jobs: usize,
    pub enabled_jobs: usize,
    pub running: bool,
    pub total_runs: u64,
    pub skipped_runs: u64,
    pub failed_runs: u64,
    pub resources_warmed: u64,
    pub resources_failed: u64,
    pub average_success_rate: f64,
    pub last_run: Option<DateTime<Utc>>,
}
