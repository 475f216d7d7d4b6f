//! Access-pattern analysis and the cold-start seed list

use super::types::AccessPattern;
use crate::core::resource::{ResourceKey, ResourceKind};
use crate::monitoring::RequestMetric;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

const FREQUENCY_WEIGHT: f64 = 2.0;
const MAX_FREQUENCY_BONUS: f64 = 30.0;
const LOW_HIT_RATIO: f64 = 0.5;
const LOW_HIT_RATIO_BONUS: f64 = 15.0;
const SLOW_RESPONSE_MS: f64 = 1_000.0;
const SLOW_RESPONSE_BONUS: f64 = 10.0;

const SEED_OWNER: &str = "unfoldingWord";
const SEED_BRANCH: &str = "master";
const SEED_BOOKS: [(&str, &str); 6] = [
    ("01", "GEN"),
    ("19", "PSA"),
    ("41", "MAT"),
    ("44", "JHN"),
    ("46", "ROM"),
    ("57", "TIT"),
];

fn recency_bonus(last: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let age = now - last;
    if age <= Duration::hours(1) {
        20.0
    } else if age <= Duration::hours(6) {
        10.0
    } else if age <= Duration::hours(24) {
        5.0
    } else {
        0.0
    }
}

#[derive(Default)]
struct Accumulator {
    kind: Option<ResourceKind>,
    count: usize,
    hits: usize,
    total_ms: f64,
    last: Option<DateTime<Utc>>,
}

/// Rank resources seen in `metrics`; returns at most `top_n`
pub(super) fn analyze(
    metrics: &[RequestMetric],
    now: DateTime<Utc>,
    top_n: usize,
) -> Vec<AccessPattern> {
    let mut grouped: HashMap<&str, Accumulator> = HashMap::new();
    for metric in metrics {
        let Some(resource) = metric.resource.as_deref() else {
            continue;
        };
        let acc = grouped.entry(resource).or_default();
        acc.kind = acc.kind.or(metric.kind);
        acc.count += 1;
        acc.total_ms += metric.response_time_ms;
        if metric.cache_hit {
            acc.hits += 1;
        }
        acc.last = acc.last.max(Some(metric.timestamp));
    }

    let mut patterns: Vec<AccessPattern> = grouped
        .into_iter()
        .map(|(resource, acc)| {
            let kind = acc.kind.unwrap_or_default();
            let average = acc.total_ms / acc.count as f64;
            let hit_ratio = acc.hits as f64 / acc.count as f64;

            let mut priority = kind.importance()
                + (acc.count as f64 * FREQUENCY_WEIGHT).min(MAX_FREQUENCY_BONUS);
            if let Some(last) = acc.last {
                priority += recency_bonus(last, now);
            }
            if hit_ratio < LOW_HIT_RATIO {
                priority += LOW_HIT_RATIO_BONUS;
            }
            if average > SLOW_RESPONSE_MS {
                priority += SLOW_RESPONSE_BONUS;
            }

            AccessPattern {
                resource: ResourceKey::parse(kind, resource),
                frequency: acc.count,
                last_accessed: acc.last,
                average_response_time_ms: average,
                cache_hit_ratio: hit_ratio,
                priority,
            }
        })
        .collect();

    sort_patterns(&mut patterns);
    patterns.truncate(top_n);
    patterns
}

fn sort_patterns(patterns: &mut [AccessPattern]) {
    patterns.sort_by(|a, b| {
        b.priority
            .total_cmp(&a.priority)
            .then_with(|| b.frequency.cmp(&a.frequency))
            .then_with(|| a.resource.canonical().cmp(&b.resource.canonical()))
    });
}

/// Patterns for the seed list, ranked by kind importance alone
pub(super) fn seed_patterns(top_n: usize) -> Vec<AccessPattern> {
    let mut patterns: Vec<AccessPattern> = seed_resources()
        .into_iter()
        .map(|resource| AccessPattern {
            priority: resource.kind.importance(),
            resource,
            frequency: 0,
            last_accessed: None,
            average_response_time_ms: 0.0,
            cache_hit_ratio: 0.0,
        })
        .collect();
    sort_patterns(&mut patterns);
    patterns.truncate(top_n);
    patterns
}

pub fn popular_scripture() -> Vec<ResourceKey> {
    ["en_ult", "en_ust"]
        .iter()
        .flat_map(|repo| {
            SEED_BOOKS.iter().map(move |(number, book)| {
                ResourceKey::raw(
                    ResourceKind::Scripture,
                    SEED_OWNER,
                    repo,
                    SEED_BRANCH,
                    &format!("{}-{}.usfm", number, book),
                )
            })
        })
        .collect()
}

pub fn translation_helps() -> Vec<ResourceKey> {
    let mut keys = Vec::new();
    for (_, book) in SEED_BOOKS {
        keys.push(ResourceKey::raw(
            ResourceKind::TranslationNotes,
            SEED_OWNER,
            "en_tn",
            SEED_BRANCH,
            &format!("tn_{}.tsv", book),
        ));
        keys.push(ResourceKey::raw(
            ResourceKind::TranslationQuestions,
            SEED_OWNER,
            "en_tq",
            SEED_BRANCH,
            &format!("tq_{}.tsv", book),
        ));
        keys.push(ResourceKey::raw(
            ResourceKind::WordLinks,
            SEED_OWNER,
            "en_twl",
            SEED_BRANCH,
            &format!("twl_{}.tsv", book),
        ));
    }
    keys
}

pub fn catalog_sweep() -> Vec<ResourceKey> {
    vec![
        ResourceKey::languages(),
        ResourceKey::owners(),
        ResourceKey::catalog_search([("lang", "en"), ("stage", "prod")]),
        ResourceKey::catalog_search([("subject", "Bible"), ("stage", "prod")]),
        ResourceKey::user_repos(SEED_OWNER),
    ]
}

pub fn seed_resources() -> Vec<ResourceKey> {
    let mut seeds = popular_scripture();
    seeds.extend(translation_helps());
    seeds.extend(catalog_sweep());
    seeds
}
