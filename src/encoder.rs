//! Report encoding
//!
//! This module wraps an analysis result in a report envelope for the
//! presentation layer. Predictions and correlations are copied through
//! unchanged; only the envelope carries run-specific metadata.

use crate::error::ComputeError;
use crate::types::{
    Analysis, AnalysisReport, DailyRecord, ReportCorrelation, ReportProducer, ReportWindow,
};
use crate::{PRODUCER_NAME, PULSE_VERSION};
use chrono::Utc;
use uuid::Uuid;

/// Current report schema version
pub const REPORT_VERSION: &str = "1.0.0";

/// Encoder producing report payloads
pub struct ReportEncoder {
    instance_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Encode an analysis of `records` into a report
    pub fn encode(&self, records: &[DailyRecord], analysis: &Analysis) -> AnalysisReport {
        let producer = ReportProducer {
            name: PRODUCER_NAME.to_string(),
            version: PULSE_VERSION.to_string(),
            instance_id: self.instance_id.clone(),
        };

        let window = ReportWindow {
            days: records.len(),
            first_date: records.first().map(|r| r.date),
            last_date: records.last().map(|r| r.date),
        };

        let correlations = analysis
            .correlations
            .iter()
            .map(|entry| ReportCorrelation {
                series_a: entry.series_a,
                series_b: entry.series_b,
                coefficient: entry.coefficient,
                strength: entry.strength(),
                summary: entry.summary(),
            })
            .collect();

        AnalysisReport {
            report_version: REPORT_VERSION.to_string(),
            producer,
            window,
            computed_at_utc: Utc::now().to_rfc3339(),
            predictions: analysis.predictions.clone(),
            correlations,
        }
    }

    /// Encode to a JSON string
    pub fn encode_to_json(
        &self,
        records: &[DailyRecord],
        analysis: &Analysis,
    ) -> Result<String, ComputeError> {
        let report = self.encode(records, analysis);
        serde_json::to_string_pretty(&report).map_err(|e| ComputeError::EncodingError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metric::Metric;
    use crate::types::{Category, CorrelationEntry, CorrelationStrength, Prediction, Rank};
    use chrono::NaiveDate;

    fn sample() -> (Vec<DailyRecord>, Analysis) {
        let records = vec![
            DailyRecord::new(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()),
            DailyRecord::new(NaiveDate::from_ymd_opt(2024, 2, 14).unwrap()),
        ];
        let analysis = Analysis {
            predictions: vec![Prediction::new(
                Category::Sleep,
                "You have been sleeping 1 hours fewer compared to last week",
            )
            .with_rank(Rank::Declined)],
            correlations: vec![CorrelationEntry {
                series_a: Metric::Steps,
                series_b: Metric::ActiveEnergy,
                coefficient: 0.91,
            }],
        };
        (records, analysis)
    }

    #[test]
    fn test_encode_envelope() {
        let (records, analysis) = sample();
        let encoder = ReportEncoder::with_instance_id("test-instance".to_string());
        let report = encoder.encode(&records, &analysis);

        assert_eq!(report.report_version, REPORT_VERSION);
        assert_eq!(report.producer.name, PRODUCER_NAME);
        assert_eq!(report.producer.instance_id, "test-instance");
        assert_eq!(report.window.days, 2);
        assert_eq!(report.window.first_date, NaiveDate::from_ymd_opt(2024, 2, 1));
        assert_eq!(report.window.last_date, NaiveDate::from_ymd_opt(2024, 2, 14));
        assert_eq!(report.predictions, analysis.predictions);
        assert_eq!(report.correlations[0].strength, CorrelationStrength::StrongPositive);
        assert_eq!(report.correlations[0].summary, "Steps & Active Energy r = 0.91");
    }

    #[test]
    fn test_encode_to_json() {
        let (records, analysis) = sample();
        let json = ReportEncoder::new().encode_to_json(&records, &analysis).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["predictions"][0]["category"], "Sleep");
        assert_eq!(value["predictions"][0]["rank"], -1);
        assert_eq!(value["correlations"][0]["series_a"], "steps");
        assert_eq!(value["correlations"][0]["series_b"], "activeEnergy");
        assert_eq!(value["correlations"][0]["strength"], "strong_positive");
        assert_eq!(value["window"]["first_date"], "2024-02-01");
    }

    #[test]
    fn test_unique_instance_ids() {
        assert_ne!(ReportEncoder::new().instance_id(), ReportEncoder::new().instance_id());
    }
}
