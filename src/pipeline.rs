//! Pipeline orchestration
//!
//! This module provides the public API for Pulse Trends.
//! It composes the metric aggregator and the correlation engine over one
//! day series, and wraps the JSON-in/JSON-out path used by FFI and the CLI.

use crate::aggregator::MetricAggregator;
use crate::config::AnalysisConfig;
use crate::correlation::CorrelationEngine;
use crate::encoder::ReportEncoder;
use crate::error::ComputeError;
use crate::schema::RecordAdapter;
use crate::types::{Analysis, DailyRecord};
use tracing::debug;

/// Run one analysis pass over a chronological day series.
///
/// Pure: the same records and configuration always produce the same
/// predictions and correlations.
pub fn analyze(records: &[DailyRecord], config: &AnalysisConfig) -> Analysis {
    let predictions = MetricAggregator::new(config).predict(records);
    let correlations = CorrelationEngine::new(config).correlate(records);

    debug!(
        records = records.len(),
        predictions = predictions.len(),
        correlations = correlations.len(),
        "analysis pass complete"
    );

    Analysis {
        predictions,
        correlations,
    }
}

/// Convert a JSON array of daily records into a report.
///
/// # Arguments
/// * `records_json` - JSON array of `health.daily_record.v1` records
/// * `config_json` - Optional `AnalysisConfig` JSON; defaults apply when `None`
///
/// # Returns
/// The report as pretty-printed JSON
///
/// # Example
/// ```ignore
/// let report = records_to_report(
///     r#"[{"date":"2024-02-01","steps":8000},{"date":"2024-02-02","steps":9100}]"#,
///     None,
/// )?;
/// ```
pub fn records_to_report(records_json: &str, config_json: Option<&str>) -> Result<String, ComputeError> {
    let config = match config_json {
        Some(json) => AnalysisConfig::from_json(json)?,
        None => AnalysisConfig::default(),
    };
    TrendProcessor::with_config(config).process_json(records_json)
}

/// Reusable processor holding configuration and an encoder.
///
/// Holds no state between passes other than its settings.
pub struct TrendProcessor {
    config: AnalysisConfig,
    encoder: ReportEncoder,
}

impl Default for TrendProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl TrendProcessor {
    /// Create a new processor with default settings
    pub fn new() -> Self {
        Self::with_config(AnalysisConfig::default())
    }

    /// Create a processor with specific settings
    pub fn with_config(config: AnalysisConfig) -> Self {
        Self {
            config,
            encoder: ReportEncoder::new(),
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Load settings from JSON
    pub fn load_config(&mut self, json: &str) -> Result<(), ComputeError> {
        self.config = AnalysisConfig::from_json(json)?;
        Ok(())
    }

    /// Save settings to JSON
    pub fn save_config(&self) -> Result<String, ComputeError> {
        self.config.to_json()
    }

    /// Analyze records without encoding
    pub fn analyze(&self, records: &[DailyRecord]) -> Analysis {
        analyze(records, &self.config)
    }

    /// Analyze records and encode the report to JSON
    pub fn process(&self, records: &[DailyRecord]) -> Result<String, ComputeError> {
        let analysis = self.analyze(records);
        self.encoder.encode_to_json(records, &analysis)
    }

    /// Parse, prepare, analyze and encode a JSON array of records
    pub fn process_json(&self, records_json: &str) -> Result<String, ComputeError> {
        let records = RecordAdapter::prepare(RecordAdapter::parse_array(records_json)?)?;
        self.process(&records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metric::Metric;
    use crate::types::{Category, Rank};
    use chrono::{Duration, NaiveDate};
    use pretty_assertions::assert_eq;

    /// Two weeks where steps rise from 100 to 150 a day and sleep drops
    fn two_weeks() -> Vec<DailyRecord> {
        let start = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        (0..14)
            .map(|i| {
                let recent = i >= 7;
                DailyRecord {
                    steps: Some(if recent { 150.0 } else { 100.0 }),
                    sleep_hours: Some((if recent { 6.0 } else { 8.0 }) + (i % 2) as f64 * 0.5),
                    exercise_minutes: Some(15.0 + (i % 3) as f64),
                    active_energy: Some(250.0 + i as f64 * 12.0),
                    ..DailyRecord::new(start + Duration::days(i))
                }
            })
            .collect()
    }

    fn sample_json() -> String {
        serde_json::to_string(&two_weeks()).unwrap()
    }

    #[test]
    fn test_analyze_two_weeks() {
        let analysis = analyze(&two_weeks(), &AnalysisConfig::default());

        let categories: Vec<Category> = analysis.predictions.iter().map(|p| p.category).collect();
        // No screen time recorded at all
        assert_eq!(
            categories,
            vec![Category::Steps, Category::Sleep, Category::ExerciseMinutes]
        );
        assert!(analysis.predictions[0].narrative.ends_with("by 50%"));
        assert_eq!(analysis.predictions[1].rank, Rank::Declined);
        assert_eq!(analysis.predictions[2].rank, Rank::Declined);

        // Four metrics present -> six pairs, all with variance
        assert_eq!(analysis.correlations.len(), 6);
        let steps_energy = analysis
            .correlations
            .iter()
            .find(|c| c.series_a == Metric::Steps && c.series_b == Metric::ActiveEnergy)
            .unwrap();
        assert!(steps_energy.coefficient > 0.8);
    }

    #[test]
    fn test_analyze_is_deterministic() {
        let records = two_weeks();
        let config = AnalysisConfig::default();
        let first = serde_json::to_string(&analyze(&records, &config)).unwrap();
        let second = serde_json::to_string(&analyze(&records, &config)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_analyze_empty_input() {
        let analysis = analyze(&[], &AnalysisConfig::default());
        assert!(analysis.predictions.is_empty());
        assert!(analysis.correlations.is_empty());
    }

    #[test]
    fn test_records_to_report() {
        let report = records_to_report(&sample_json(), None).unwrap();
        let value: serde_json::Value = serde_json::from_str(&report).unwrap();

        assert_eq!(value["producer"]["name"], "pulse-trends");
        assert_eq!(value["window"]["days"], 14);
        assert_eq!(value["predictions"][0]["category"], "Steps");
        assert_eq!(value["predictions"][1]["rank"], -1);
    }

    #[test]
    fn test_records_to_report_with_config() {
        let report =
            records_to_report(&sample_json(), Some(r#"{"metrics": ["steps", "activeEnergy"]}"#))
                .unwrap();
        let value: serde_json::Value = serde_json::from_str(&report).unwrap();

        assert_eq!(value["predictions"].as_array().unwrap().len(), 1);
        assert_eq!(value["correlations"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_unsorted_input_is_sorted() {
        let mut records = two_weeks();
        records.reverse();
        let json = serde_json::to_string(&records).unwrap();

        let processor = TrendProcessor::new();
        let report: serde_json::Value =
            serde_json::from_str(&processor.process_json(&json).unwrap()).unwrap();
        assert_eq!(report["window"]["first_date"], "2024-02-01");
        assert!(report["predictions"][0]["narrative"]
            .as_str()
            .unwrap()
            .ends_with("by 50%"));
    }

    #[test]
    fn test_invalid_json() {
        assert!(records_to_report("not valid json", None).is_err());
        assert!(records_to_report("[]", Some("{bad")).is_err());
    }

    #[test]
    fn test_huge_values_pass_validation_without_panicking() {
        let records: Vec<DailyRecord> = two_weeks()
            .into_iter()
            .map(|mut day| {
                day.steps = Some(1e17);
                day
            })
            .collect();
        let json = serde_json::to_string(&records).unwrap();

        let report: serde_json::Value =
            serde_json::from_str(&records_to_report(&json, None).unwrap()).unwrap();
        let categories: Vec<&str> = report["predictions"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["category"].as_str().unwrap())
            .collect();
        assert_eq!(categories, vec!["Sleep", "Exercise Minutes"]);
    }

    #[test]
    fn test_config_persistence() {
        let processor =
            TrendProcessor::with_config(AnalysisConfig::new().with_count_zero_sleep(true));
        let saved = processor.save_config().unwrap();

        let mut restored = TrendProcessor::new();
        restored.load_config(&saved).unwrap();
        assert!(restored.config().count_zero_sleep_as_no_sleep);
    }
}
