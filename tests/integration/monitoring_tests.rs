//! Monitoring integration tests: metrics recorded by the fetch path

#[cfg(test)]
mod tests {
    use crate::common::CatalogMock;
    use catalog_fetch::monitoring::{Alert, AlertKind, BottleneckKind};
    use catalog_fetch::{FetchLayer, ResourceKey, ResourceKind};
    use parking_lot::Mutex;
    use serde_json::json;
    use std::sync::Arc;
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

    #[tokio::test]
    async fn test_slow_upstream_raises_latency_alert() {
        let mock = CatalogMock::start().await;
        mock.slow_json(
            "catalog/list/languages",
            json!({"data": []}),
            Duration::from_millis(120),
            1,
        )
        .await;

        let mut config = mock.config();
        config.monitoring.response_time_threshold_ms = 50.0;
        let layer = FetchLayer::new(config).unwrap();

        let seen: Arc<Mutex<Vec<Alert>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        layer
            .monitor()
            .set_alert_callback(Arc::new(move |alert: &Alert| sink.lock().push(alert.clone())));

        layer.fetch(&ResourceKey::languages()).await.unwrap();

        let alerts = seen.lock().clone();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::ResponseTime);
        assert_eq!(layer.monitor().alert_history(10).len(), 1);

        let insights = layer.get_insights();
        assert_eq!(insights.bottlenecks[0].kind, BottleneckKind::HighLatency);
        assert!(!insights.recommendations.is_empty());
    }

    #[tokio::test]
    async fn test_failing_upstream_raises_error_rate_alert() {
        let mock = CatalogMock::start().await;
        mock.status("users/ghost/repos", 404, None).await;

        let mut config = mock.config();
        config.cache.enabled = false;
        let layer = FetchLayer::new(config).unwrap();

        for _ in 0..10 {
            assert!(layer.fetch(&ResourceKey::user_repos("ghost")).await.is_err());
        }

        let history = layer.monitor().alert_history(100);
        assert!(history.iter().any(|a| a.kind == AlertKind::ErrorRate));
        assert_eq!(layer.get_stats(1.0).error_rate, 100.0);
        assert_eq!(layer.get_coalescing_stats().error_count, 10);
    }

    #[tokio::test]
    async fn test_book_files_group_under_one_endpoint() {
        let mock = CatalogMock::start().await;
        let books = ["GEN", "EXO", "LEV", "NUM", "DEU"];
        for book in books {
            mock.json(
                &format!("repos/unfoldingWord/en_tn/raw/master/tn_{}.tsv", book),
                json!({}),
                Some(1),
            )
            .await;
        }

        let layer = FetchLayer::new(mock.config()).unwrap();
        for book in books {
            layer.fetch(&notes(book)).await.unwrap();
        }

        let stats = layer.get_stats(1.0);
        assert_eq!(stats.total_requests, 5);
        assert_eq!(stats.slowest_endpoints.len(), 1);
        assert_eq!(stats.slowest_endpoints[0].count, 5);
        assert!(stats.slowest_endpoints[0].endpoint.ends_with("tn_{book}.tsv"));
    }
}
