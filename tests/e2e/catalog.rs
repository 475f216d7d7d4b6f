//! E2E tests for the public catalog API

#[cfg(test)]
mod tests {
    use catalog_fetch::{Config, FetchLayer, ResourceKey, ResourceKind};

    fn live_layer() -> FetchLayer {
        let config = Config::from_env().expect("Failed to load config from environment");
        FetchLayer::new(config).expect("Failed to build fetch layer")
    }

    #[tokio::test]
    #[ignore]
    async fn test_list_languages() {
        let layer = live_layer();
        let body = layer.fetch(&ResourceKey::languages()).await;
        assert!(body.is_ok(), "languages fetch failed: {:?}", body.err());
        assert!(body.unwrap().as_json().is_some());
    }

    #[tokio::test]
    #[ignore]
    async fn test_raw_translation_notes() {
        let layer = live_layer();
        let key = ResourceKey::raw(
            ResourceKind::TranslationNotes,
            "unfoldingWord",
            "en_tn",
            "master",
            "tn_TIT.tsv",
        );

        let body = layer.fetch(&key).await.expect("tn_TIT.tsv fetch failed");
        assert!(body.size_bytes() > 0);
    }

    #[tokio::test]
    #[ignore]
    async fn test_catalog_search() {
        let layer = live_layer();
        let result = layer
            .upstream()
            .search_catalog(&[("lang", "en"), ("subject", "Bible")])
            .await;
        assert!(result.success, "search failed: {:?}", result.error);
        assert!(result.attempts >= 1);
        assert_ne!(result.status_code, None);
    }
}
