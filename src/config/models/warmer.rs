//! Cache warmer configuration

use super::*;
use crate::core::warmer::WarmingStrategy;
use serde::{Deserialize, Serialize};

/// Cache warmer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarmerConfig {
    /// Run the background scheduler
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// How often the scheduler looks for due jobs
    #[serde(default = "default_check_interval_secs")]
    pub check_interval_secs: u64,
    /// Number of patterns kept by `analyze_patterns`
    #[serde(default = "default_top_patterns")]
    pub top_patterns: usize,
    /// Metric window read by `analyze_patterns`
    #[serde(default = "default_pattern_window_hours")]
    pub pattern_window_hours: f64,
    /// Strategies registered at startup; built-ins are used when empty
    #[serde(default)]
    pub strategies: Vec<WarmingStrategy>,
}

impl Default for WarmerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            check_interval_secs: default_check_interval_secs(),
            top_patterns: default_top_patterns(),
            pattern_window_hours: default_pattern_window_hours(),
            strategies: Vec::new(),
        }
    }
}

impl WarmerConfig {
    /// Merge warmer configurations; strategies are appended, replacing any
    /// with the same name
    pub fn merge(mut self, other: Self) -> Self {
        if !other.enabled {
            self.enabled = false;
        }
        if other.check_interval_secs != default_check_interval_secs() {
            self.check_interval_secs = other.check_interval_secs;
        }
        if other.top_patterns != default_top_patterns() {
            self.top_patterns = other.top_patterns;
        }
        if other.pattern_window_hours != default_pattern_window_hours() {
            self.pattern_window_hours = other.pattern_window_hours;
        }
        for strategy in other.strategies {
            self.strategies.retain(|s| s.name != strategy.name);
            self.strategies.push(strategy);
        }
        self
    }
}
