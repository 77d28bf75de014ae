//! Adapter for reading daily records
//!
//! Parses JSON arrays or NDJSON into `DailyRecord`s and prepares them for an
//! analysis pass.

use crate::error::ComputeError;
use crate::schema::record::{validate_order, validate_record, ValidationError};
use crate::types::DailyRecord;
use chrono::NaiveDate;
use tracing::debug;

/// Adapter for parsing and checking daily records
pub struct RecordAdapter;

impl RecordAdapter {
    /// Parse a JSON string containing an array of DailyRecords
    pub fn parse_array(json: &str) -> Result<Vec<DailyRecord>, ComputeError> {
        let records: Vec<DailyRecord> = serde_json::from_str(json)?;
        Ok(records)
    }

    /// Parse NDJSON (newline-delimited JSON) containing DailyRecords
    pub fn parse_ndjson(ndjson: &str) -> Result<Vec<DailyRecord>, ComputeError> {
        let mut records = Vec::new();
        for (line_num, line) in ndjson.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<DailyRecord>(trimmed) {
                Ok(record) => records.push(record),
                Err(e) => {
                    return Err(ComputeError::ParseError(format!(
                        "Failed to parse line {}: {}",
                        line_num + 1,
                        e
                    )));
                }
            }
        }
        Ok(records)
    }

    /// Validate a batch of records as given, including their order
    pub fn validate_records(records: &[DailyRecord]) -> Vec<ValidationResult> {
        let mut results = Vec::new();

        for (index, record) in records.iter().enumerate() {
            let mut error = validate_record(record).err();
            if error.is_none() && index > 0 {
                error = validate_order(&records[index - 1], record).err();
            }
            if let Some(error) = error {
                results.push(ValidationResult {
                    index,
                    date: record.date,
                    error,
                });
            }
        }

        results
    }

    /// Check values, sort oldest first and reject duplicate days.
    ///
    /// Missing values are kept as they are.
    pub fn prepare(mut records: Vec<DailyRecord>) -> Result<Vec<DailyRecord>, ComputeError> {
        for record in &records {
            validate_record(record)?;
        }

        if !records.windows(2).all(|w| w[0].date < w[1].date) {
            debug!(records = records.len(), "sorting records chronologically");
            records.sort_by_key(|r| r.date);
        }

        for pair in records.windows(2) {
            validate_order(&pair[0], &pair[1])?;
        }

        Ok(records)
    }
}

/// Result of record validation
#[derive(Debug)]
pub struct ValidationResult {
    pub index: usize,
    pub date: NaiveDate,
    pub error: ValidationError,
}
