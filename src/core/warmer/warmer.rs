//! Cache warmer implementation

use super::conditions::{ConditionContext, LoadProbe, WarmingCondition};
use super::patterns;
use super::schedule::Schedule;
use super::types::{
    AccessPattern, JobStatus, WarmingFailure, WarmingJob, WarmingPriority, WarmingResult,
    WarmingStats, WarmingStrategy,
};
use crate::config::WarmerConfig;
use crate::core::traits::Fetcher;
use crate::monitoring::PerformanceMonitor;
use crate::utils::error::{FetchError, Result};
use chrono::{DateTime, Utc};
use futures::FutureExt;
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, HashMap};
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info, warn};

/// Name of the job rebuilt by `refresh_pattern_job`
pub const PATTERN_JOB: &str = "pattern-driven";

/// Off-peak catalog sweep only runs below this normalized load
const OFF_PEAK_MAX_LOAD: f64 = 0.7;

#[derive(Debug, Default)]
struct Totals {
    runs: u64,
    skipped: u64,
    failed: u64,
    warmed: u64,
    failed_resources: u64,
    success_rate_sum: f64,
    last_run: Option<DateTime<Utc>>,
}

/// Built-in strategies used when the configuration lists none
pub fn default_strategies() -> Vec<WarmingStrategy> {
    vec![
        WarmingStrategy::new("popular-scripture", Schedule::Hourly { minute: 0 })
            .with_priority(WarmingPriority::High)
            .with_resources(patterns::popular_scripture()),
        WarmingStrategy::new(
            "translation-helps",
            Schedule::Interval {
                every_secs: 6 * 3_600,
            },
        )
        .with_resources(patterns::translation_helps()),
        WarmingStrategy::new("off-peak-catalog", Schedule::Daily { hour: 3, minute: 0 })
            .with_priority(WarmingPriority::Low)
            .with_max_concurrency(2)
            .with_condition(WarmingCondition::TimeRange {
                start_hour: 2,
                end_hour: 6,
            })
            .with_condition(WarmingCondition::SystemLoadBelow {
                max_load: OFF_PEAK_MAX_LOAD,
            })
            .with_resources(patterns::catalog_sweep()),
    ]
}

/// Jobs marked `Running` by one scheduled pass. Any that have not reported
/// when the pass is dropped go back to `Scheduled`.
struct RunningJobs<'a> {
    jobs: &'a RwLock<HashMap<String, WarmingJob>>,
    unfinished: Vec<String>,
    now: DateTime<Utc>,
}

impl RunningJobs<'_> {
    fn finish(&mut self, id: &str) {
        self.unfinished.retain(|pending| pending != id);
    }
}

impl Drop for RunningJobs<'_> {
    fn drop(&mut self) {
        if self.unfinished.is_empty() {
            return;
        }
        let mut jobs = self.jobs.write();
        for id in self.unfinished.drain(..) {
            if let Some(job) = jobs.get_mut(&id) {
                if job.status == JobStatus::Running {
                    warn!("Warming job '{}' interrupted, rescheduling", id);
                    job.status = JobStatus::Scheduled;
                    job.next_run = job.strategy.schedule.next_run_after(self.now);
                }
            }
        }
    }
}

/// Proactively fetches resources on a schedule through a shared `Fetcher`
pub struct CacheWarmer<F: Fetcher> {
    config: WarmerConfig,
    fetcher: Arc<F>,
    monitor: Option<Arc<PerformanceMonitor>>,
    load_probe: Option<Arc<dyn LoadProbe>>,
    jobs: RwLock<HashMap<String, WarmingJob>>,
    totals: Mutex<Totals>,
    scheduler: Mutex<Option<JoinHandle<()>>>,
}

impl<F: Fetcher> CacheWarmer<F> {
    pub fn new(config: WarmerConfig, fetcher: Arc<F>) -> Self {
        let strategies = if config.strategies.is_empty() {
            default_strategies()
        } else {
            config.strategies.clone()
        };

        let now = Utc::now();
        let jobs = strategies
            .into_iter()
            .map(|strategy| {
                let job = WarmingJob::new(strategy, now);
                (job.id.clone(), job)
            })
            .collect();

        Self {
            config,
            fetcher,
            monitor: None,
            load_probe: default_load_probe(),
            jobs: RwLock::new(jobs),
            totals: Mutex::new(Totals::default()),
            scheduler: Mutex::new(None),
        }
    }

    pub fn with_monitor(mut self, monitor: Arc<PerformanceMonitor>) -> Self {
        self.monitor = Some(monitor);
        self
    }

    pub fn with_load_probe(mut self, probe: Arc<dyn LoadProbe>) -> Self {
        self.load_probe = Some(probe);
        self
    }

    fn check_conditions(
        &self,
        strategy: &WarmingStrategy,
        now: DateTime<Utc>,
    ) -> Result<Option<String>> {
        let ctx = ConditionContext {
            now,
            monitor: self.monitor.as_deref(),
            load_probe: self.load_probe.as_deref(),
        };
        for condition in &strategy.conditions {
            if let Some(reason) = condition.check(&ctx)? {
                return Ok(Some(reason));
            }
        }
        Ok(None)
    }

    pub async fn warm_cache(&self, strategy: &WarmingStrategy) -> Result<WarmingResult> {
        self.warm_cache_at(strategy, Utc::now()).await
    }

    /// Warm every resource of `strategy`, evaluating conditions at `now`.
    ///
    /// A condition that does not hold yields a skipped result, not an error.
    /// Individual fetch failures are collected into the result.
    pub async fn warm_cache_at(
        &self,
        strategy: &WarmingStrategy,
        now: DateTime<Utc>,
    ) -> Result<WarmingResult> {
        let conditions = self.check_conditions(strategy, now);
        let reason = match conditions {
            Ok(reason) => reason,
            Err(e) => {
                self.totals.lock().failed += 1;
                return Err(e);
            }
        };
        if let Some(reason) = reason {
            info!("Skipping warming strategy '{}': {}", strategy.name, reason);
            self.totals.lock().skipped += 1;
            return Ok(WarmingResult::skipped(&strategy.name, now, reason));
        }

        info!(
            "Warming {} resources for strategy '{}'",
            strategy.resources.len(),
            strategy.name
        );
        let clock = Instant::now();
        let semaphore = Arc::new(Semaphore::new(strategy.max_concurrency.max(1)));
        let delay = strategy.inter_request_delay();
        let mut tasks = JoinSet::new();
        let mut outstanding = BTreeMap::new();

        for (index, key) in strategy.resources.iter().enumerate() {
            if index > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| FetchError::internal(format!("Warming semaphore closed: {}", e)))?;
            let fetcher = self.fetcher.clone();
            let key = key.clone();
            outstanding.insert(index, key.canonical());
            tasks.spawn(async move {
                let _permit = permit;
                let outcome = AssertUnwindSafe(fetcher.fetch(&key))
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|panic| {
                        Err(FetchError::from_panic(
                            &format!("Warming {}", key.canonical()),
                            panic,
                        ))
                    });
                (index, outcome.map(|_| ()))
            });
        }

        let mut warmed = 0;
        let mut errors = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => {
                    let resource = outstanding.remove(&index).unwrap_or_default();
                    match outcome {
                        Ok(()) => warmed += 1,
                        Err(e) => {
                            debug!("Failed to warm {}: {}", resource, e);
                            errors.push(WarmingFailure {
                                resource,
                                error: e.to_string(),
                            });
                        }
                    }
                }
                Err(e) => warn!("Warming task ended abnormally: {}", e),
            }
        }
        // Whatever is left never reported back.
        errors.extend(outstanding.into_values().map(|resource| WarmingFailure {
            resource,
            error: "Warming task did not complete".to_string(),
        }));

        let result = WarmingResult {
            strategy: strategy.name.clone(),
            started_at: now,
            duration_ms: clock.elapsed().as_secs_f64() * 1000.0,
            resources_processed: strategy.resources.len(),
            resources_warmed: warmed,
            resources_failed: errors.len(),
            skipped: None,
            errors,
        };

        if result.resources_failed > 0 {
            warn!(
                "Strategy '{}' warmed {}/{} resources",
                result.strategy, result.resources_warmed, result.resources_processed
            );
        } else {
            info!(
                "Strategy '{}' warmed {} resources in {:.0}ms",
                result.strategy, result.resources_warmed, result.duration_ms
            );
        }

        let mut totals = self.totals.lock();
        totals.runs += 1;
        totals.warmed += result.resources_warmed as u64;
        totals.failed_resources += result.resources_failed as u64;
        totals.success_rate_sum += result.success_rate();
        totals.last_run = Some(now);

        Ok(result)
    }

    pub async fn execute_scheduled_jobs(&self) -> Result<Vec<WarmingResult>> {
        self.execute_scheduled_jobs_at(Utc::now()).await
    }

    /// Run every enabled job whose `next_run` has passed, highest priority
    /// first. A job that fails is marked `Failed` and rescheduled; the
    /// remaining jobs still run.
    pub async fn execute_scheduled_jobs_at(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<WarmingResult>> {
        let mut due: Vec<(String, WarmingStrategy)> = {
            let mut jobs = self.jobs.write();
            jobs.values_mut()
                .filter(|job| job.is_due(now))
                .map(|job| {
                    job.status = JobStatus::Running;
                    (job.id.clone(), job.strategy.clone())
                })
                .collect()
        };
        if due.is_empty() {
            return Ok(Vec::new());
        }
        due.sort_by(|a, b| b.1.priority.cmp(&a.1.priority).then_with(|| a.0.cmp(&b.0)));
        debug!("{} warming jobs due", due.len());

        let mut running = RunningJobs {
            jobs: &self.jobs,
            unfinished: due.iter().map(|(id, _)| id.clone()).collect(),
            now,
        };
        let mut results = Vec::with_capacity(due.len());
        for (id, strategy) in due {
            let outcome = self.warm_cache_at(&strategy, now).await;
            running.finish(&id);

            let mut jobs = self.jobs.write();
            let Some(job) = jobs.get_mut(&id) else {
                continue;
            };
            job.next_run = job.strategy.schedule.next_run_after(now);
            match outcome {
                Ok(result) if result.is_skipped() => {
                    job.status = JobStatus::Scheduled;
                    results.push(result);
                }
                Ok(result) => {
                    job.run_count += 1;
                    job.last_run = Some(now);
                    job.success_rate = (job.success_rate * (job.run_count - 1) as f64
                        + result.success_rate())
                        / job.run_count as f64;
                    job.status = JobStatus::Completed;
                    results.push(result);
                }
                Err(e) => {
                    error!("Warming job '{}' failed: {}", id, e);
                    job.status = JobStatus::Failed;
                }
            }
        }

        Ok(results)
    }

    /// Rank recently accessed resources; falls back to the seed list when
    /// no metrics are available
    pub fn analyze_patterns(&self) -> Vec<AccessPattern> {
        self.analyze_patterns_at(Utc::now())
    }

    pub fn analyze_patterns_at(&self, now: DateTime<Utc>) -> Vec<AccessPattern> {
        let top = self.config.top_patterns;
        let Some(monitor) = &self.monitor else {
            return patterns::seed_patterns(top);
        };

        let analyzed = patterns::analyze(
            &monitor.recent_metrics(self.config.pattern_window_hours),
            now,
            top,
        );
        if analyzed.is_empty() {
            patterns::seed_patterns(top)
        } else {
            analyzed
        }
    }

    /// Rebuild the pattern-driven job from the current analysis, keeping its
    /// schedule state when it already exists
    pub fn refresh_pattern_job(&self) {
        let resources = self
            .analyze_patterns()
            .into_iter()
            .map(|pattern| pattern.resource)
            .collect::<Vec<_>>();

        let mut jobs = self.jobs.write();
        match jobs.get_mut(PATTERN_JOB) {
            Some(job) => job.strategy.resources = resources,
            None => {
                let strategy = WarmingStrategy::new(
                    PATTERN_JOB,
                    Schedule::Interval { every_secs: 3_600 },
                )
                .with_priority(WarmingPriority::High)
                .with_resources(resources);
                jobs.insert(PATTERN_JOB.to_string(), WarmingJob::new(strategy, Utc::now()));
            }
        }
    }

    /// Register a strategy, replacing any job with the same name
    pub fn add_job(&self, strategy: WarmingStrategy) -> String {
        let job = WarmingJob::new(strategy, Utc::now());
        let id = job.id.clone();
        info!("Registered warming job '{}'", id);
        self.jobs.write().insert(id.clone(), job);
        id
    }

    pub fn remove_job(&self, id: &str) -> bool {
        self.jobs.write().remove(id).is_some()
    }

    pub fn enable_job(&self, id: &str) -> bool {
        self.set_enabled(id, true)
    }

    pub fn disable_job(&self, id: &str) -> bool {
        self.set_enabled(id, false)
    }

    fn set_enabled(&self, id: &str, enabled: bool) -> bool {
        match self.jobs.write().get_mut(id) {
            Some(job) => {
                job.enabled = enabled;
                true
            }
            None => false,
        }
    }

    pub fn get_job(&self, id: &str) -> Option<WarmingJob> {
        self.jobs.read().get(id).cloned()
    }

    /// All jobs, ordered by id
    pub fn jobs(&self) -> Vec<WarmingJob> {
        let mut jobs: Vec<WarmingJob> = self.jobs.read().values().cloned().collect();
        jobs.sort_by(|a, b| a.id.cmp(&b.id));
        jobs
    }

    pub fn get_warming_stats(&self) -> WarmingStats {
        let (total_jobs, enabled_jobs) = {
            let jobs = self.jobs.read();
            (jobs.len(), jobs.values().filter(|j| j.enabled).count())
        };
        let totals = self.totals.lock();

        WarmingStats {
            total_jobs,
            enabled_jobs,
            running: self.scheduler.lock().is_some(),
            total_runs: totals.runs,
            skipped_runs: totals.skipped,
            failed_runs: totals.failed,
            resources_warmed: totals.warmed,
            resources_failed: totals.failed_resources,
            average_success_rate: if totals.runs == 0 {
                0.0
            } else {
                totals.success_rate_sum / totals.runs as f64
            },
            last_run: totals.last_run,
        }
    }

    /// Spawn the scheduler loop. Does nothing when warming is disabled.
    pub fn start(self: &Arc<Self>) {
        if !self.config.enabled {
            info!("Cache warming disabled");
            return;
        }

        let mut scheduler = self.scheduler.lock();
        if scheduler.is_some() {
            return;
        }

        let weak: Weak<Self> = Arc::downgrade(self);
        let period = Duration::from_secs(self.config.check_interval_secs.max(1));
        *scheduler = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let Some(warmer) = weak.upgrade() else {
                    break;
                };
                warmer.refresh_pattern_job();
                if let Err(e) = warmer.execute_scheduled_jobs().await {
                    error!("Scheduled warming failed: {}", e);
                }
            }
        }));
        info!("Cache warmer started ({:?} check interval)", period);
    }

    pub fn close(&self) {
        if let Some(handle) = self.scheduler.lock().take() {
            handle.abort();
            info!("Cache warmer stopped");
        }
    }
}

impl<F: Fetcher> Drop for CacheWarmer<F> {
    fn drop(&mut self) {
        if let Some(handle) = self.scheduler.get_mut().take() {
            handle.abort();
        }
    }
}

#[cfg(feature = "system-load")]
fn default_load_probe() -> Option<Arc<dyn LoadProbe>> {
    Some(Arc::new(super::conditions::SystemLoadProbe))
}

#[cfg(not(feature = "system-load"))]
fn default_load_probe() -> Option<Arc<dyn LoadProbe>> {
    None
}
