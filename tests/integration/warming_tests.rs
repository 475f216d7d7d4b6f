//! Cache warming integration tests

#[cfg(test)]
mod tests {
    use crate::common::CatalogMock;
    use crate::common::assertions::WarmingResultAssertions;
    use catalog_fetch::core::warmer::{
        JobStatus, PATTERN_JOB, Schedule, WarmingCondition, WarmingStrategy,
    };
    use catalog_fetch::{FetchLayer, ResourceKey, ResourceKind};
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use std::time::Duration;

    fn notes(book: &str) -> ResourceKey {
        ResourceKey::raw(
            ResourceKind::TranslationNotes,
            "unfoldingWord",
            "en_tn",
            "master",
            &format!("tn_{}.tsv", book),
        )
    }

    fn notes_route(book: &str) -> String {
        format!("repos/unfoldingWord/en_tn/raw/master/tn_{}.tsv", book)
    }

    fn strategy(name: &str, resources: Vec<ResourceKey>) -> WarmingStrategy {
        WarmingStrategy::new(name, Schedule::every(Duration::from_secs(60)))
            .with_resources(resources)
            .with_inter_request_delay(Duration::ZERO)
    }

    #[tokio::test]
    async fn test_partial_failure_counts() {
        let mock = CatalogMock::start().await;
        for book in ["GEN", "EXO", "LEV"] {
            mock.json(&notes_route(book), json!({"book": book}), Some(1))
                .await;
        }
        for book in ["NUM", "DEU"] {
            mock.status(&notes_route(book), 404, Some(1)).await;
        }

        let layer = FetchLayer::new(mock.config()).unwrap();
        let books = ["GEN", "EXO", "LEV", "NUM", "DEU"];
        let result = layer
            .warmer()
            .warm_cache(&strategy("pentateuch", books.iter().map(|b| notes(b)).collect()))
            .await
            .unwrap();

        result.assert_counts(5, 3, 2);
        crate::assert_approx_eq!(result.success_rate(), 60.0);
        assert!(result.errors.iter().any(|e| e.resource.contains("tn_NUM.tsv")));
    }

    #[tokio::test]
    async fn test_warmed_resources_served_from_cache() {
        let mock = CatalogMock::start().await;
        mock.json(&notes_route("TIT"), json!({"book": "TIT"}), Some(1))
            .await;

        let layer = FetchLayer::new(mock.config()).unwrap();
        let result = layer
            .warmer()
            .warm_cache(&strategy("titus", vec![notes("TIT")]))
            .await
            .unwrap();
        result.assert_counts(1, 1, 0);

        let body = layer.fetch(&notes("TIT")).await.unwrap();
        assert_eq!(body.as_json(), Some(&json!({"book": "TIT"})));
    }

    #[tokio::test]
    async fn test_time_window_skips_without_fetching() {
        let mock = CatalogMock::start().await;
        mock.json(&notes_route("GEN"), json!({}), Some(0)).await;

        let layer = FetchLayer::new(mock.config()).unwrap();
        let off_peak = strategy("off-peak", vec![notes("GEN")]).with_condition(
            WarmingCondition::TimeRange {
                start_hour: 2,
                end_hour: 6,
            },
        );
        let afternoon = Utc.with_ymd_and_hms(2024, 3, 4, 14, 0, 0).unwrap();

        let result = layer
            .warmer()
            .warm_cache_at(&off_peak, afternoon)
            .await
            .unwrap();
        result.assert_skipped();
        assert_eq!(layer.get_warming_stats().skipped_runs, 1);
    }

    #[tokio::test]
    async fn test_scheduled_job_runs_once_per_period() {
        let mock = CatalogMock::start().await;
        mock.json("catalog/list/languages", json!({"data": []}), None)
            .await;

        let mut config = mock.config();
        config.warmer.strategies = vec![strategy("languages", vec![ResourceKey::languages()])];
        let layer = FetchLayer::new(config).unwrap();
        let warmer = layer.warmer();

        let later = Utc::now() + chrono::Duration::minutes(2);
        let results = warmer.execute_scheduled_jobs_at(later).await.unwrap();
        assert_eq!(results.len(), 1);
        results[0].assert_counts(1, 1, 0);

        let job = warmer.get_job("languages").unwrap();
        assert_eq!(job.run_count, 1);
        assert_eq!(job.status, JobStatus::Completed);
        assert!(job.next_run > later);

        let again = warmer.execute_scheduled_jobs_at(later).await.unwrap();
        assert!(again.is_empty());
    }

    #[tokio::test]
    async fn test_observed_traffic_drives_pattern_job() {
        let mock = CatalogMock::start().await;
        mock.json(&notes_route("ROM"), json!({}), None).await;
        mock.json("catalog/list/owners", json!({"data": []}), None)
            .await;

        let mut config = mock.config();
        config.cache.enabled = false;
        let layer = FetchLayer::new(config).unwrap();

        for _ in 0..3 {
            layer.fetch(&notes("ROM")).await.unwrap();
        }
        layer.fetch(&ResourceKey::owners()).await.unwrap();

        let patterns = layer.warmer().analyze_patterns();
        assert_eq!(patterns.len(), 2);
        assert_eq!(patterns[0].resource, notes("ROM"));
        assert_eq!(patterns[0].frequency, 3);

        layer.warmer().refresh_pattern_job();
        let job = layer.warmer().get_job(PATTERN_JOB).unwrap();
        assert_eq!(job.strategy.resources[0], notes("ROM"));
    }
}
