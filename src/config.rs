//! Analysis configuration
//!
//! Settings are read once per pass. The per-category zero-handling table lives
//! here so the policy can be audited and tested on its own.

use crate::error::ComputeError;
use crate::metric::Metric;
use crate::types::Category;
use serde::{Deserialize, Serialize};

/// How a category treats halves with no usable observations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroPolicy {
    /// Divide by at least one and floor the baseline average at 1
    FloorBaseline,
    /// Emit no prediction when a division by zero would occur
    SkipWhenEmpty,
}

/// Zero-handling policy for each category
pub fn zero_policy(category: Category) -> ZeroPolicy {
    match category {
        Category::Steps | Category::ScreenTime => ZeroPolicy::FloorBaseline,
        Category::Sleep | Category::ExerciseMinutes => ZeroPolicy::SkipWhenEmpty,
    }
}

/// Per-pass analysis settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Count absent or zero sleep days in the sleep average denominator
    pub count_zero_sleep_as_no_sleep: bool,
    /// Metrics participating in the pass
    pub metrics: Vec<Metric>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            count_zero_sleep_as_no_sleep: false,
            metrics: Metric::ALL.to_vec(),
        }
    }
}

impl AnalysisConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_count_zero_sleep(mut self, enabled: bool) -> Self {
        self.count_zero_sleep_as_no_sleep = enabled;
        self
    }

    /// Restrict the pass to the given metrics
    pub fn with_metrics(mut self, metrics: impl IntoIterator<Item = Metric>) -> Self {
        self.metrics = metrics.into_iter().collect();
        self.normalize();
        self
    }

    /// Parse a comma separated metric list such as "steps,sleepHours"
    pub fn with_metric_keys(self, keys: &str) -> Result<Self, ComputeError> {
        let metrics = keys
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(Metric::from_key)
            .collect::<Result<Vec<_>, _>>()?;

        if metrics.is_empty() {
            return Err(ComputeError::InvalidConfig(
                "metric list must not be empty".to_string(),
            ));
        }

        Ok(self.with_metrics(metrics))
    }

    /// Enabled metrics in correlation order
    pub fn enabled_metrics(&self) -> Vec<Metric> {
        Metric::ALL
            .iter()
            .copied()
            .filter(|m| self.metrics.contains(m))
            .collect()
    }

    pub fn is_enabled(&self, metric: Metric) -> bool {
        self.metrics.contains(&metric)
    }

    /// Categories whose source metric is enabled, in declaration order
    pub fn enabled_categories(&self) -> Vec<Category> {
        Category::ALL
            .iter()
            .copied()
            .filter(|c| self.is_enabled(c.metric()))
            .collect()
    }

    fn normalize(&mut self) {
        self.metrics.sort();
        self.metrics.dedup();
    }

    /// Load configuration from JSON
    pub fn from_json(json: &str) -> Result<Self, ComputeError> {
        let mut config: AnalysisConfig = serde_json::from_str(json)?;
        config.normalize();
        Ok(config)
    }

    /// Serialize configuration to JSON
    pub fn to_json(&self) -> Result<String, ComputeError> {
        serde_json::to_string(self).map_err(|e| ComputeError::EncodingError(e.to_string()))
    }
}
