//! Performance benchmarks for catalog-fetch-rs
//!
//! Covers the hot paths: cache reads, coalesced fan-out, endpoint
//! normalization and window statistics.

use catalog_fetch::config::{CacheConfig, CoalescerConfig, MonitoringConfig};
use catalog_fetch::core::traits::CacheStore;
use catalog_fetch::monitoring::{PerformanceMonitor, RequestSample, normalize_endpoint};
use catalog_fetch::{MemoryCacheStore, RequestCoalescer, ResourceKey, ResourceKind, ResponseBody};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::sync::Arc;
use tokio::runtime::Runtime;

fn notes_key(i: usize) -> ResourceKey {
    ResourceKey::raw(
        ResourceKind::TranslationNotes,
        "unfoldingWord",
        "en_tn",
        "master",
        &format!("tn_{}.tsv", i),
    )
}

/// Benchmark cache operations
fn bench_cache_operations(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("cache_operations");

    for cache_size in [100u64, 1_000, 10_000] {
        let config = CacheConfig {
            max_entries: cache_size,
            ..CacheConfig::default()
        };
        let cache = MemoryCacheStore::new(&config);
        rt.block_on(async {
            for i in 0..cache_size as usize {
                cache
                    .set(&notes_key(i).canonical(), ResponseBody::Text("x".repeat(64)))
                    .await;
            }
        });
        let hot = notes_key(0).canonical();

        group.bench_with_input(BenchmarkId::new("cache_get", cache_size), &hot, |b, key| {
            b.iter(|| rt.block_on(async { black_box(cache.get(key).await) }));
        });
    }

    group.finish();
}

/// Benchmark concurrent callers sharing one fetch
fn bench_coalesced_fan_out(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("coalescer");

    for num_tasks in [10usize, 50, 100] {
        group.bench_with_input(
            BenchmarkId::new("fan_out", num_tasks),
            &num_tasks,
            |b, &num_tasks| {
                let config = CoalescerConfig {
                    coalescing_window_ms: 0,
                    ..CoalescerConfig::default()
                };
                let coalescer = Arc::new(RequestCoalescer::<usize>::new(config));

                b.iter(|| {
                    let coalescer = coalescer.clone();
                    rt.block_on(async move {
                        let mut handles = Vec::with_capacity(num_tasks);
                        for _ in 0..num_tasks {
                            let coalescer = coalescer.clone();
                            handles.push(tokio::spawn(async move {
                                coalescer
                                    .coalesce("catalog/list/languages", || async {
                                        tokio::task::yield_now().await;
                                        Ok(42usize)
                                    })
                                    .await
                            }));
                        }
                        for handle in handles {
                            black_box(handle.await.unwrap().unwrap());
                        }
                    })
                });
            },
        );
    }

    group.finish();
}

/// Benchmark endpoint normalization
fn bench_normalization(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalization");

    let endpoints = [
        "repos/unfoldingWord/en_tn/raw/master/tn_TIT.tsv",
        "repos/unfoldingWord/en_ult/raw/master/57-TIT.usfm",
        "catalog/search?lang=en&subject=Bible&limit=50",
        "users/unfoldingWord/repos",
    ];
    for endpoint in endpoints {
        group.bench_with_input(
            BenchmarkId::new("normalize_endpoint", endpoint),
            endpoint,
            |b, endpoint| b.iter(|| black_box(normalize_endpoint(endpoint))),
        );
    }

    group.finish();
}

/// Benchmark window statistics over a full metric buffer
fn bench_stats(c: &mut Criterion) {
    let mut group = c.benchmark_group("monitoring");

    for samples in [1_000usize, 10_000] {
        let monitor = PerformanceMonitor::new(MonitoringConfig {
            max_metrics: samples,
            response_time_threshold_ms: f64::MAX,
            ..MonitoringConfig::default()
        });
        for i in 0..samples {
            let key = notes_key(i % 66);
            monitor.record_metrics(
                RequestSample::new(key.canonical(), (i % 500) as f64, 200)
                    .with_resource(&key)
                    .with_cache_hit(i % 3 == 0),
            );
        }

        group.bench_with_input(BenchmarkId::new("get_stats", samples), &monitor, |b, monitor| {
            b.iter(|| black_box(monitor.get_stats(24.0)))
        });
        group.bench_with_input(
            BenchmarkId::new("get_insights", samples),
            &monitor,
            |b, monitor| b.iter(|| black_box(monitor.get_insights())),
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_cache_operations,
    bench_coalesced_fan_out,
    bench_normalization,
    bench_stats
);

criterion_main!(benches);
