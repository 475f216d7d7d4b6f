//! Fetch path integration tests
//!
//! Requests flow through the coalescer, cache and upstream client and are
//! reported to the monitor.

#[cfg(test)]
mod tests {
    use crate::common::CatalogMock;
    use catalog_fetch::core::upstream::CacheStatus;
    use catalog_fetch::{FetchError, FetchLayer, ResourceKey, ResourceKind, ResponseBody};
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, ResponseTemplate};

    #[tokio::test]
    async fn test_raw_file_fetched_as_text() {
        let mock = CatalogMock::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/unfoldingWord/en_tn/raw/master/tn_TIT.tsv"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("Reference\tID\tNote\n1:1\tabcd\tPaul", "text/tab-separated-values"),
            )
            .mount(&mock.server)
            .await;

        let layer = FetchLayer::new(mock.config()).unwrap();
        let key = ResourceKey::raw(
            ResourceKind::TranslationNotes,
            "unfoldingWord",
            "en_tn",
            "master",
            "tn_TIT.tsv",
        );

        let body = layer.fetch(&key).await.unwrap();
        assert!(body.as_text().unwrap().starts_with("Reference\tID"));
    }

    #[tokio::test]
    async fn test_search_parameters_reach_upstream() {
        let mock = CatalogMock::start().await;
        Mock::given(method("GET"))
            .and(path("/catalog/search"))
            .and(query_param("lang", "en"))
            .and(query_param("subject", "Bible"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true, "data": []})))
            .expect(1)
            .mount(&mock.server)
            .await;

        let layer = FetchLayer::new(mock.config()).unwrap();
        let key = ResourceKey::catalog_search([("subject", "Bible"), ("lang", "en")]);

        let body = layer.fetch(&key).await.unwrap();
        assert_eq!(body, ResponseBody::Json(json!({"ok": true, "data": []})));
    }

    #[tokio::test]
    async fn test_fan_out_hits_upstream_once() {
        let mock = CatalogMock::start().await;
        mock.slow_json(
            "catalog/list/languages",
            json!({"data": ["en"]}),
            Duration::from_millis(150),
            1,
        )
        .await;

        let mut config = mock.config();
        config.cache.enabled = false;
        let layer = FetchLayer::new(config).unwrap();
        let key = ResourceKey::languages();

        let (a, b, c, d, e) = tokio::join!(
            layer.fetch(&key),
            layer.fetch(&key),
            layer.fetch(&key),
            layer.fetch(&key),
            layer.fetch(&key)
        );
        for result in [a, b, c, d, e] {
            assert_eq!(result.unwrap(), ResponseBody::Json(json!({"data": ["en"]})));
        }

        let stats = layer.get_coalescing_stats();
        assert_eq!(stats.unique_requests, 1);
        assert_eq!(stats.coalesced_requests, 4);
        assert_eq!(stats.pending_count, 0);

        // Settled: the next call starts a new upstream fetch
        mock.server.reset().await;
        mock.json("catalog/list/languages", json!({"data": ["fr"]}), Some(1))
            .await;
        let fresh = layer.fetch(&key).await.unwrap();
        assert_eq!(fresh, ResponseBody::Json(json!({"data": ["fr"]})));
    }

    #[tokio::test]
    async fn test_retries_then_succeeds() {
        let mock = CatalogMock::start().await;
        Mock::given(method("GET"))
            .and(path("/catalog/list/owners"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .expect(2)
            .mount(&mock.server)
            .await;
        mock.json("catalog/list/owners", json!({"data": ["unfoldingWord"]}), Some(1))
            .await;

        let mut config = mock.config();
        config.upstream.max_retries = 2;
        config.upstream.enable_tracing = true;
        let layer = FetchLayer::new(config).unwrap();

        layer.start_trace("owners");
        layer.fetch(&ResourceKey::owners()).await.unwrap();

        let trace = layer.get_trace();
        assert_eq!(trace.operation.as_deref(), Some("owners"));
        assert_eq!(trace.calls.len(), 3);
        assert_eq!(trace.calls.last().map(|c| c.attempt), Some(3));
        assert!(trace.calls.last().is_some_and(|c| c.success));
    }

    #[tokio::test]
    async fn test_retry_exhaustion_is_request_failed() {
        let mock = CatalogMock::start().await;
        mock.status("catalog/list/owners", 500, Some(2)).await;

        let mut config = mock.config();
        config.upstream.max_retries = 1;
        let layer = FetchLayer::new(config).unwrap();

        let err = layer.fetch(&ResourceKey::owners()).await.unwrap_err();
        assert!(matches!(
            &*err,
            FetchError::RequestFailed { max_retries: 1, .. }
        ));
    }

    #[tokio::test]
    async fn test_cdn_cache_status_recorded() {
        let mock = CatalogMock::start().await;
        Mock::given(method("GET"))
            .and(path("/catalog/list/languages"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("cf-cache-status", "HIT")
                    .set_body_json(json!({"data": []})),
            )
            .mount(&mock.server)
            .await;

        let mut config = mock.config();
        config.cache.enabled = false;
        let layer = FetchLayer::new(config).unwrap();

        let result = layer.upstream().list_languages().await;
        assert!(result.success);
        assert_eq!(result.cache_status, CacheStatus::Hit);

        layer.fetch(&ResourceKey::languages()).await.unwrap();
        assert_eq!(layer.get_stats(1.0).cache_hit_rate, 100.0);
    }
}
