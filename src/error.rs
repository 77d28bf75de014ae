//! Error types for Pulse Trends

use thiserror::Error;

/// Errors that can occur around an analysis pass.
///
/// The numerical core itself never fails: missing samples and undefined
/// correlations are omissions, not errors. These variants cover the input
/// and output boundaries.
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Failed to parse daily records: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid daily record: {0}")]
    InvalidRecord(#[from] crate::schema::ValidationError),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}
