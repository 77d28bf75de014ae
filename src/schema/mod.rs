//! health.daily_record.v1 input schema
//!
//! This module defines how daily records arrive at the engine (JSON array or
//! NDJSON) and the checks applied before an analysis pass.

mod adapter;
mod record;

pub use adapter::*;
pub use record::*;
