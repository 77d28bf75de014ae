//! Core types for the Pulse Trends engine
//!
//! This module defines the data structures that flow through an analysis pass:
//! daily records in, predictions and correlation entries out, and the report
//! envelope handed to the presentation layer.

use crate::metric::Metric;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One calendar day of optionally-present health metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyRecord {
    /// Calendar date (YYYY-MM-DD)
    pub date: NaiveDate,
    /// Step count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<f64>,
    /// Active energy burned (kcal)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_energy: Option<f64>,
    /// Exercise time (minutes)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exercise_minutes: Option<f64>,
    /// Body weight (lbs)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_weight: Option<f64>,
    /// Hours asleep, 3 PM to 3 PM
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep_hours: Option<f64>,
    /// Time in daylight (minutes)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minutes_in_daylight: Option<f64>,
    /// Social media screen time (hours)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen_time_social_media: Option<f64>,
    /// Total screen time (hours)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen_time_total: Option<f64>,
}

impl DailyRecord {
    /// Create a record with every metric absent
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            steps: None,
            active_energy: None,
            exercise_minutes: None,
            body_weight: None,
            sleep_hours: None,
            minutes_in_daylight: None,
            screen_time_social_media: None,
            screen_time_total: None,
        }
    }

    /// Number of metrics present on this day
    pub fn present_count(&self) -> usize {
        Metric::ALL
            .iter()
            .filter(|m| m.value(self).is_some())
            .count()
    }
}

/// Tri-state trend classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
pub enum Rank {
    Declined,
    #[default]
    Neutral,
    Improved,
}

impl Rank {
    pub fn as_i8(&self) -> i8 {
        match self {
            Rank::Declined => -1,
            Rank::Neutral => 0,
            Rank::Improved => 1,
        }
    }
}

impl From<Rank> for i8 {
    fn from(rank: Rank) -> Self {
        rank.as_i8()
    }
}

impl TryFrom<i8> for Rank {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Rank::Declined),
            0 => Ok(Rank::Neutral),
            1 => Ok(Rank::Improved),
            other => Err(format!("rank out of range: {other}")),
        }
    }
}

/// Prediction category, in declaration (output) order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Steps")]
    Steps,
    #[serde(rename = "Sleep")]
    Sleep,
    #[serde(rename = "Exercise Minutes")]
    ExerciseMinutes,
    #[serde(rename = "Screen Time")]
    ScreenTime,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Steps,
        Category::Sleep,
        Category::ExerciseMinutes,
        Category::ScreenTime,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Steps => "Steps",
            Category::Sleep => "Sleep",
            Category::ExerciseMinutes => "Exercise Minutes",
            Category::ScreenTime => "Screen Time",
        }
    }

    /// Symbol name used by the presentation layer
    pub fn icon(&self) -> &'static str {
        match self {
            Category::Steps => "figure.walk.motion",
            Category::Sleep => "bed.double",
            Category::ExerciseMinutes => "figure.play",
            Category::ScreenTime => "iphone",
        }
    }

    /// The daily metric this category is computed from
    pub fn metric(&self) -> Metric {
        match self {
            Category::Steps => Metric::Steps,
            Category::Sleep => Metric::SleepHours,
            Category::ExerciseMinutes => Metric::ExerciseMinutes,
            Category::ScreenTime => Metric::ScreenTimeTotal,
        }
    }

    /// Background text shown alongside a category's detail chart
    pub fn description(&self) -> Option<&'static str> {
        match self {
            Category::Sleep => Some(
                "Sleep is crucial for various aspects of health and well-being. It allows the body and mind to recharge, enabling better cognitive function, such as improved concentration and memory retention. Adequate sleep also plays a vital role in physical health, as it is involved in the repair of the heart and blood vessels, and it supports growth and stress regulation. Furthermore, it helps regulate mood and is associated with lower risk of chronic health issues, contributing to overall quality of life.",
            ),
            Category::Steps => Some(
                "Taking regular steps, such as walking, is fundamental for maintaining physical health. It enhances cardiovascular fitness, aiding in the reduction of heart disease risk, and supports the management of body weight by burning calories. Engaging in regular walking can also strengthen bones and muscles, reducing the risk of osteoporosis and muscle loss. Additionally, it can improve mental health by reducing stress, anxiety, and depressive symptoms, contributing to an overall sense of well-being.",
            ),
            Category::ExerciseMinutes => Some(
                "Regular exercise, even in short durations, is highly beneficial for health. Just a few minutes of physical activity each day can boost cardiovascular health, improving heart function and reducing the risk of heart disease. These exercise minutes can also aid in weight management by increasing metabolic rate and burning extra calories. Furthermore, engaging in daily physical activity, even briefly, can enhance mental health by releasing endorphins that reduce stress and improve mood.",
            ),
            Category::ScreenTime => None,
        }
    }

    /// Question to put to the user when a trend needs explaining
    pub fn follow_up_question(&self, rank: Rank) -> Option<&'static str> {
        match (self, rank) {
            (Category::Sleep, Rank::Declined) => Some(
                "It looks like you have not been sleeping well this week. Has something changed?",
            ),
            _ => None,
        }
    }
}

/// Qualitative trend statement for one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prediction {
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub narrative: String,
    pub rank: Rank,
}

impl Prediction {
    /// Create a neutral prediction carrying the category's icon
    pub fn new(category: Category, narrative: impl Into<String>) -> Self {
        Self {
            category,
            icon: Some(category.icon().to_string()),
            narrative: narrative.into(),
            rank: Rank::Neutral,
        }
    }

    pub fn with_rank(mut self, rank: Rank) -> Self {
        self.rank = rank;
        self
    }

    pub fn follow_up_question(&self) -> Option<&'static str> {
        self.category.follow_up_question(self.rank)
    }
}

/// Presentation band for a correlation coefficient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationStrength {
    StrongPositive,
    ModeratePositive,
    Weak,
    ModerateNegative,
    StrongNegative,
}

impl CorrelationStrength {
    pub const STRONG_THRESHOLD: f64 = 0.8;
    pub const MODERATE_THRESHOLD: f64 = 0.45;

    /// Classify a coefficient into a band
    pub fn classify(coefficient: f64) -> Self {
        if coefficient > Self::STRONG_THRESHOLD {
            CorrelationStrength::StrongPositive
        } else if coefficient > Self::MODERATE_THRESHOLD {
            CorrelationStrength::ModeratePositive
        } else if coefficient < -Self::STRONG_THRESHOLD {
            CorrelationStrength::StrongNegative
        } else if coefficient < -Self::MODERATE_THRESHOLD {
            CorrelationStrength::ModerateNegative
        } else {
            CorrelationStrength::Weak
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            CorrelationStrength::StrongPositive | CorrelationStrength::ModeratePositive => {
                "chart.line.uptrend.xyaxis.circle.fill"
            }
            CorrelationStrength::StrongNegative | CorrelationStrength::ModerateNegative => {
                "chart.line.downtrend.xyaxis.circle.fill"
            }
            CorrelationStrength::Weak => "chart.line.flattrend.xyaxis.circle.fill",
        }
    }
}

/// Pearson coefficient for one unordered metric pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationEntry {
    pub series_a: Metric,
    pub series_b: Metric,
    pub coefficient: f64,
}

impl CorrelationEntry {
    pub fn strength(&self) -> CorrelationStrength {
        CorrelationStrength::classify(self.coefficient)
    }

    /// Coefficient with two decimals
    pub fn formatted_coefficient(&self) -> String {
        format!("{:.2}", self.coefficient)
    }

    /// One-line summary, e.g. "Steps & Sleep Hours r = 0.52"
    pub fn summary(&self) -> String {
        format!(
            "{} & {} r = {}",
            self.series_a.label(),
            self.series_b.label(),
            self.formatted_coefficient()
        )
    }
}

/// Result of one analysis pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub predictions: Vec<Prediction>,
    pub correlations: Vec<CorrelationEntry>,
}

/// Report producer metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Span of days the analysis covered
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportWindow {
    pub days: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

/// Correlation entry enriched for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportCorrelation {
    pub series_a: Metric,
    pub series_b: Metric,
    pub coefficient: f64,
    pub strength: CorrelationStrength,
    pub summary: String,
}

/// Complete report payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub report_version: String,
    pub producer: ReportProducer,
    pub window: ReportWindow,
    pub computed_at_utc: String,
    pub predictions: Vec<Prediction>,
    pub correlations: Vec<ReportCorrelation>,
}
