//! Pulse Trends - On-device trend and correlation analysis for daily health metrics
//!
//! Pulse turns a short series of daily health records into two result sets
//! through a deterministic, side-effect-free pass:
//!
//! - **Trend predictions**: the series is split into an initial and a recent
//!   window and each category (steps, sleep, exercise, screen time) gets a
//!   qualitative statement and a tri-state rank
//! - **Correlations**: Pearson coefficients for every pair of tracked metrics,
//!   computed over the days where both were recorded

pub mod aggregator;
pub mod config;
pub mod correlation;
pub mod encoder;
pub mod error;
pub mod metric;
pub mod pipeline;
pub mod schema;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use config::AnalysisConfig;
pub use error::ComputeError;
pub use metric::Metric;
pub use pipeline::{analyze, records_to_report, TrendProcessor};
pub use types::{Analysis, Category, CorrelationEntry, DailyRecord, Prediction, Rank};

// Schema exports
pub use schema::{RecordAdapter, INPUT_SCHEMA_VERSION};

/// Pulse version embedded in all reports
pub const PULSE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "pulse-trends";
