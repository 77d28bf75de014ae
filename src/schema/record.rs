//! health.daily_record.v1 record checks
//!
//! Missing values are normal and never fail validation. What does fail:
//! - values that are not finite numbers
//! - negative values (every tracked metric is a count, duration or mass)
//! - dates that repeat or go backwards

use crate::metric::Metric;
use crate::types::DailyRecord;
use chrono::NaiveDate;

/// Current input schema version
pub const INPUT_SCHEMA_VERSION: &str = "health.daily_record.v1";

/// Check the values of a single record
pub fn validate_record(record: &DailyRecord) -> Result<(), ValidationError> {
    for metric in Metric::ALL {
        if let Some(value) = metric.value(record) {
            if !value.is_finite() {
                return Err(ValidationError::NonFiniteValue {
                    date: record.date,
                    metric,
                });
            }
            if value < 0.0 {
                return Err(ValidationError::NegativeValue {
                    date: record.date,
                    metric,
                    value,
                });
            }
        }
    }
    Ok(())
}

/// Check that `record` may follow `previous` in a chronological series
pub fn validate_order(previous: &DailyRecord, record: &DailyRecord) -> Result<(), ValidationError> {
    if record.date == previous.date {
        Err(ValidationError::DuplicateDate { date: record.date })
    } else if record.date < previous.date {
        Err(ValidationError::OutOfOrder {
            date: record.date,
            previous: previous.date,
        })
    } else {
        Ok(())
    }
}

/// Validation errors for daily records
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{metric} on {date} is not a finite number")]
    NonFiniteValue { date: NaiveDate, metric: Metric },

    #[error("{metric} on {date} is negative ({value})")]
    NegativeValue {
        date: NaiveDate,
        metric: Metric,
        value: f64,
    },

    #[error("Duplicate record for {date}")]
    DuplicateDate { date: NaiveDate },

    #[error("Record for {date} follows {previous}; records must be oldest first")]
    OutOfOrder { date: NaiveDate, previous: NaiveDate },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> DailyRecord {
        DailyRecord::new(NaiveDate::from_ymd_opt(2024, 2, d).unwrap())
    }

    #[test]
    fn test_missing_values_are_valid() {
        assert!(validate_record(&day(1)).is_ok());
    }

    #[test]
    fn test_zero_is_valid() {
        let record = DailyRecord {
            sleep_hours: Some(0.0),
            ..day(1)
        };
        assert!(validate_record(&record).is_ok());
    }

    #[test]
    fn test_negative_value() {
        let record = DailyRecord {
            steps: Some(-5.0),
            ..day(1)
        };
        let err = validate_record(&record).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::NegativeValue {
                metric: Metric::Steps,
                ..
            }
        ));
        assert_eq!(err.to_string(), "steps on 2024-02-01 is negative (-5)");
    }

    #[test]
    fn test_non_finite_value() {
        let record = DailyRecord {
            body_weight: Some(f64::NAN),
            ..day(1)
        };
        assert!(matches!(
            validate_record(&record),
            Err(ValidationError::NonFiniteValue {
                metric: Metric::BodyWeight,
                ..
            })
        ));
    }

    #[test]
    fn test_order() {
        assert!(validate_order(&day(1), &day(2)).is_ok());
        assert_eq!(
            validate_order(&day(2), &day(2)),
            Err(ValidationError::DuplicateDate { date: day(2).date })
        );
        assert!(matches!(
            validate_order(&day(3), &day(2)),
            Err(ValidationError::OutOfOrder { .. })
        ));
    }
}
