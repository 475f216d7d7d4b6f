//! Test fixtures: configs and a mock catalog upstream

use catalog_fetch::Config;
use serde_json::Value;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Config pointed at `base_url` with fast timeouts and no retry delay
pub fn test_config(base_url: &str) -> Config {
    let mut config = Config::default();
    config.upstream.base_url = base_url.to_string();
    config.upstream.timeout_ms = 2_000;
    config.upstream.retry_delay_ms = 1;
    config.upstream.max_retries = 0;
    config.warmer.enabled = false;
    config
}

/// A `wiremock` server answering catalog routes
pub struct CatalogMock {
    pub server: MockServer,
}

impl CatalogMock {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    pub fn config(&self) -> Config {
        test_config(&self.uri())
    }

    /// Answer `GET /{route}` with a JSON body, optionally expecting a call count
    pub async fn json(&self, route: &str, body: Value, expected_calls: Option<u64>) {
        self.respond(route, ResponseTemplate::new(200).set_body_json(body), expected_calls)
            .await;
    }

    /// Answer `GET /{route}` with a delayed JSON body
    pub async fn slow_json(&self, route: &str, body: Value, delay: Duration, expected_calls: u64) {
        self.respond(
            route,
            ResponseTemplate::new(200).set_body_json(body).set_delay(delay),
            Some(expected_calls),
        )
        .await;
    }

    /// Answer `GET /{route}` with a bare status
    pub async fn status(&self, route: &str, status: u16, expected_calls: Option<u64>) {
        self.respond(route, ResponseTemplate::new(status), expected_calls)
            .await;
    }

    async fn respond(&self, route: &str, template: ResponseTemplate, expected_calls: Option<u64>) {
        let mock = Mock::given(method("GET"))
            .and(path(format!("/{}", route.trim_start_matches('/'))))
            .respond_with(template);
        let mock = match expected_calls {
            Some(calls) => mock.expect(calls),
            None => mock,
        };
        mock.mount(&self.server).await;
    }
}
