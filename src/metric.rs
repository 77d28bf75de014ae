//! Metric identifiers
//!
//! The eight tracked daily metrics form a closed set. Their declaration order
//! is the fixed ordering used for pairwise correlation indexing.

use crate::error::ComputeError;
use crate::types::DailyRecord;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A tracked daily health metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Metric {
    Steps,
    ActiveEnergy,
    ExerciseMinutes,
    SleepHours,
    MinutesInDaylight,
    BodyWeight,
    ScreenTimeSocialMedia,
    ScreenTimeTotal,
}

impl Metric {
    /// All metrics in correlation order
    pub const ALL: [Metric; 8] = [
        Metric::Steps,
        Metric::ActiveEnergy,
        Metric::ExerciseMinutes,
        Metric::SleepHours,
        Metric::MinutesInDaylight,
        Metric::BodyWeight,
        Metric::ScreenTimeSocialMedia,
        Metric::ScreenTimeTotal,
    ];

    /// Read this metric from a day's record
    pub fn value(&self, record: &DailyRecord) -> Option<f64> {
        match self {
            Metric::Steps => record.steps,
            Metric::ActiveEnergy => record.active_energy,
            Metric::ExerciseMinutes => record.exercise_minutes,
            Metric::SleepHours => record.sleep_hours,
            Metric::MinutesInDaylight => record.minutes_in_daylight,
            Metric::BodyWeight => record.body_weight,
            Metric::ScreenTimeSocialMedia => record.screen_time_social_media,
            Metric::ScreenTimeTotal => record.screen_time_total,
        }
    }

    /// Wire identifier
    pub fn key(&self) -> &'static str {
        match self {
            Metric::Steps => "steps",
            Metric::ActiveEnergy => "activeEnergy",
            Metric::ExerciseMinutes => "exerciseMinutes",
            Metric::SleepHours => "sleepHours",
            Metric::MinutesInDaylight => "minutesInDaylight",
            Metric::BodyWeight => "bodyWeight",
            Metric::ScreenTimeSocialMedia => "screenTimeSocialMedia",
            Metric::ScreenTimeTotal => "screenTimeTotal",
        }
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Steps => "Steps",
            Metric::ActiveEnergy => "Active Energy",
            Metric::ExerciseMinutes => "Exercise Minutes",
            Metric::SleepHours => "Sleep Hours",
            Metric::MinutesInDaylight => "Minutes In Daylight",
            Metric::BodyWeight => "Body Weight",
            Metric::ScreenTimeSocialMedia => "Time Spent browsing Social Media",
            Metric::ScreenTimeTotal => "Total Screen Time",
        }
    }

    /// Parse a wire identifier
    pub fn from_key(key: &str) -> Result<Self, ComputeError> {
        Metric::ALL
            .iter()
            .copied()
            .find(|m| m.key() == key)
            .ok_or_else(|| ComputeError::UnknownMetric(key.to_string()))
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Metric {
    type Err = ComputeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::from_key(s.trim())
    }
}
