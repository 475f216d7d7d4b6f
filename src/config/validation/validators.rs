//! Validators for every configuration section

use super::Validate;
use crate::config::models::*;

impl Validate for UpstreamConfig {
    fn validate(&self) -> Result<(), String> {
        let url = url::Url::parse(&self.base_url)
            .map_err(|e| format!("Invalid base_url '{}': {}", self.base_url, e))?;

        match url.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(format!(
                    "Unsupported base_url scheme '{}'. Only http and https are supported",
                    scheme
                ));
            }
        }

        if self.timeout_ms == 0 {
            return Err("Upstream timeout must be greater than 0".to_string());
        }

        if self.max_retries > 10 {
            return Err("Upstream max_retries must not exceed 10".to_string());
        }

        if self.user_agent.trim().is_empty() {
            return Err("User agent cannot be empty".to_string());
        }

        Ok(())
    }
}

impl Validate for CoalescerConfig {
    fn validate(&self) -> Result<(), String> {
        if self.timeout_ms == 0 {
            return Err("Coalescer pending timeout must be greater than 0".to_string());
        }

        if self.max_concurrent_keys == 0 {
            return Err("Coalescer max_concurrent_keys must be greater than 0".to_string());
        }

        if self.coalescing_window_ms >= self.timeout_ms {
            return Err("Coalescing window must be shorter than the pending timeout".to_string());
        }

        if self.cleanup_interval_ms == 0 {
            return Err("Coalescer cleanup interval must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Validate for WarmerConfig {
    fn validate(&self) -> Result<(), String> {
        if self.check_interval_secs == 0 {
            return Err("Warmer check interval must be greater than 0".to_string());
        }

        if self.top_patterns == 0 {
            return Err("Warmer top_patterns must be greater than 0".to_string());
        }

        if self.pattern_window_hours <= 0.0 {
            return Err("Warmer pattern window must be positive".to_string());
        }

        for strategy in &self.strategies {
            if strategy.name.trim().is_empty() {
                return Err("Warming strategy name cannot be empty".to_string());
            }
            if strategy.max_concurrency == 0 {
                return Err(format!(
                    "Warming strategy '{}' must allow at least one concurrent request",
                    strategy.name
                ));
            }
            strategy
                .schedule
                .validate()
                .map_err(|e| format!("Warming strategy '{}': {}", strategy.name, e))?;
        }

        Ok(())
    }
}

impl Validate for MonitoringConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_metrics < 10 {
            return Err("Monitor max_metrics must be at least 10".to_string());
        }

        if self.response_time_threshold_ms <= 0.0 {
            return Err("Response time threshold must be positive".to_string());
        }

        if self.error_rate_threshold_pct <= 0.0 || self.error_rate_threshold_pct > 100.0 {
            return Err("Error rate threshold must be between 0 and 100".to_string());
        }

        if self.slow_endpoint_threshold_ms <= 0.0 {
            return Err("Slow endpoint threshold must be positive".to_string());
        }

        if self.alert_window == 0 {
            return Err("Alert window must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Validate for CacheConfig {
    fn validate(&self) -> Result<(), String> {
        if self.enabled && self.ttl_secs == 0 {
            return Err("Cache TTL must be greater than 0".to_string());
        }

        if self.enabled && self.max_entries == 0 {
            return Err("Cache max entries must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Validate for LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        tracing_subscriber::EnvFilter::try_new(&self.level)
            .map(|_| ())
            .map_err(|e| format!("Invalid log level '{}': {}", self.level, e))
    }
}
