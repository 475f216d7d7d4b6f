//! Configuration integration tests
//!
//! Environment overrides share process state, so every test touching
//! `CATALOG_*` variables lives in one test function.

#[cfg(test)]
mod tests {
    use crate::common::CatalogMock;
    use catalog_fetch::core::warmer::Schedule;
    use catalog_fetch::{Config, ErrorHandling, FetchError, FetchLayer, ResourceKey};
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_file_config_drives_fetch_layer() {
        let mock = CatalogMock::start().await;
        mock.json("catalog/list/owners", json!({"data": ["unfoldingWord"]}), Some(1))
            .await;

        let file = write_config(&format!(
            r#"
upstream:
  base_url: "{}"
  timeout_ms: 2000
  max_retries: 0
coalescer:
  error_handling: share
warmer:
  enabled: false
  strategies:
    - name: owners
      schedule:
        type: hourly
        minute: 30
      resources:
        - kind: catalog
          endpoint: catalog/list/owners
"#,
            mock.uri()
        ));

        let config = Config::from_file(file.path()).await.unwrap();
        assert_eq!(config.coalescer.error_handling, ErrorHandling::Share);

        let layer = FetchLayer::new(config).unwrap();
        let job = layer.warmer().get_job("owners").unwrap();
        assert_eq!(job.strategy.schedule, Schedule::Hourly { minute: 30 });
        assert_eq!(job.strategy.resources, vec![ResourceKey::owners()]);

        let results = layer.warm_all().await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].resources_warmed, 1);
    }

    #[tokio::test]
    async fn test_invalid_schedule_rejected() {
        let file = write_config(
            r#"
warmer:
  strategies:
    - name: broken
      schedule:
        type: daily
        hour: 25
        minute: 0
"#,
        );

        let err = Config::from_file(file.path()).await.unwrap_err();
        assert!(matches!(err, FetchError::Config(ref msg) if msg.contains("broken")));
    }

    #[tokio::test]
    async fn test_unparseable_file_rejected() {
        let file = write_config("upstream: [not, a, map");
        assert!(matches!(
            Config::from_file(file.path()).await,
            Err(FetchError::Config(_))
        ));
    }

    #[test]
    fn test_environment_overrides() {
        // SAFETY: no other test in this binary reads CATALOG_* variables
        unsafe {
            std::env::set_var("CATALOG_BASE_URL", "http://127.0.0.1:9/api/v1");
            std::env::set_var("CATALOG_MAX_RETRIES", "5");
            std::env::set_var("CATALOG_WARMER_ENABLED", "false");
        }
        let config = Config::from_env().unwrap();
        assert_eq!(config.upstream.base_url, "http://127.0.0.1:9/api/v1");
        assert_eq!(config.upstream.max_retries, 5);
        assert!(!config.warmer.enabled);

        unsafe {
            std::env::set_var("CATALOG_MAX_RETRIES", "lots");
        }
        assert!(matches!(Config::from_env(), Err(FetchError::Config(_))));

        unsafe {
            std::env::remove_var("CATALOG_BASE_URL");
            std::env::remove_var("CATALOG_MAX_RETRIES");
            std::env::remove_var("CATALOG_WARMER_ENABLED");
        }
    }
}
