//! Metric aggregation
//!
//! This module splits a day series into two comparison windows and turns
//! per-category averages into qualitative predictions:
//! - Steps and screen time compare the recent window against the initial one
//! - Sleep does the same but suppresses the prediction on empty data
//! - Exercise minutes are ranked on their absolute daily average
//!
//! Values are truncated to whole units before summing and every division is
//! integer division. This keeps the reported averages and percentages stable
//! against the figures the app has always shown.

use crate::config::{zero_policy, AnalysisConfig, ZeroPolicy};
use crate::types::{Category, DailyRecord, Prediction, Rank};
use tracing::debug;

/// Percentage points around 100 that still count as "similar"
pub const SIMILARITY_BAND_PCT: i64 = 5;

/// Daily exercise average below which exercise is flagged
pub const LOW_EXERCISE_MINUTES: i64 = 20;

/// Daily exercise average above which exercise is praised
pub const HIGH_EXERCISE_MINUTES: i64 = 60;

/// The two comparison windows of a day series
#[derive(Debug, Clone, Copy)]
pub struct WindowSplit<'a> {
    /// First `floor(N/2)` records
    pub initial: &'a [DailyRecord],
    /// Last `floor(N/2)` records
    pub recent: &'a [DailyRecord],
}

impl<'a> WindowSplit<'a> {
    /// Split records into equal halves. With an odd count the middle day
    /// belongs to neither window.
    pub fn of(records: &'a [DailyRecord]) -> Self {
        let half = records.len() / 2;
        Self {
            initial: &records[..half],
            recent: &records[records.len() - half..],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.initial.is_empty()
    }
}

/// Running total and observation count for one window of one category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Accumulator {
    pub total: i64,
    pub count: i64,
}

impl Accumulator {
    /// Add an observation, truncated toward zero.
    ///
    /// Returns `None` if the total no longer fits in an `i64`.
    pub fn add(&mut self, value: f64) -> Option<()> {
        self.total = self.total.checked_add(value as i64)?;
        self.count += 1;
        Some(())
    }

    /// Fold another window into this one
    pub fn merge(&mut self, other: Accumulator) -> Option<()> {
        self.total = self.total.checked_add(other.total)?;
        self.count += other.count;
        Some(())
    }

    /// Count a day without adding to the total
    pub fn add_empty_day(&mut self) {
        self.count += 1;
    }

    /// Sum every present value of the category's metric
    fn collect(records: &[DailyRecord], category: Category) -> Option<Self> {
        let metric = category.metric();
        let mut acc = Self::default();
        for value in records.iter().filter_map(|r| metric.value(r)) {
            acc.add(value)?;
        }
        Some(acc)
    }

    /// Average with the denominator floored at one
    fn floored_average(&self) -> i64 {
        self.total / self.count.max(1)
    }
}

/// Direction of a period-over-period change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Higher,
    Lower,
    Similar,
}

/// Integer comparison of the recent average against the baseline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodComparison {
    pub initial_average: i64,
    pub recent_average: i64,
    /// `recent * 100 / initial`
    pub percentage: i64,
}

impl PeriodComparison {
    /// Compare two averages. Returns `None` when the baseline is zero or
    /// the percentage does not fit in an `i64`.
    pub fn new(initial_average: i64, recent_average: i64) -> Option<Self> {
        if initial_average == 0 {
            return None;
        }
        Some(Self {
            initial_average,
            recent_average,
            percentage: recent_average.checked_mul(100)? / initial_average,
        })
    }

    /// Percentage points above (positive) or below 100
    pub fn delta(&self) -> i64 {
        self.percentage.saturating_sub(100)
    }

    pub fn direction(&self) -> Direction {
        let delta = self.delta();
        if delta.abs() > SIMILARITY_BAND_PCT {
            if delta > 0 {
                Direction::Higher
            } else {
                Direction::Lower
            }
        } else {
            Direction::Similar
        }
    }

    /// Whole units lost between the windows
    pub fn shortfall(&self) -> i64 {
        self.initial_average.saturating_sub(self.recent_average)
    }
}

/// Computes per-category trend predictions
#[derive(Debug, Clone)]
pub struct MetricAggregator {
    categories: Vec<Category>,
    count_zero_sleep_as_no_sleep: bool,
}

impl Default for MetricAggregator {
    fn default() -> Self {
        Self::new(&AnalysisConfig::default())
    }
}

impl MetricAggregator {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            categories: config.enabled_categories(),
            count_zero_sleep_as_no_sleep: config.count_zero_sleep_as_no_sleep,
        }
    }

    /// Produce predictions in category declaration order.
    ///
    /// Categories without enough data are left out. Fewer than two records
    /// yields no predictions.
    pub fn predict(&self, records: &[DailyRecord]) -> Vec<Prediction> {
        let split = WindowSplit::of(records);
        if split.is_empty() {
            debug!(records = records.len(), "too few records to compare windows");
            return Vec::new();
        }

        let mut predictions = Vec::with_capacity(self.categories.len());
        for &category in &self.categories {
            match self.predict_category(category, &split) {
                Some(prediction) => predictions.push(prediction),
                None => debug!(category = category.label(), "insufficient data, prediction skipped"),
            }
        }
        predictions
    }

    /// Prediction for a single category, if its data allows one
    pub fn predict_category(&self, category: Category, split: &WindowSplit<'_>) -> Option<Prediction> {
        match category {
            Category::Steps => steps_prediction(split),
            Category::Sleep => sleep_prediction(split, self.count_zero_sleep_as_no_sleep),
            Category::ExerciseMinutes => exercise_prediction(split),
            Category::ScreenTime => screen_time_prediction(split),
        }
    }
}

/// Window comparison under the floor-to-one policy.
///
/// A category with no observations in either window is dropped, as is one
/// whose sums overflow.
fn floored_comparison(split: &WindowSplit<'_>, category: Category) -> Option<PeriodComparison> {
    debug_assert_eq!(zero_policy(category), ZeroPolicy::FloorBaseline);

    let initial = Accumulator::collect(split.initial, category)?;
    let recent = Accumulator::collect(split.recent, category)?;
    if initial.count == 0 && recent.count == 0 {
        return None;
    }

    let initial_average = initial.floored_average().max(1);
    let recent_average = recent.floored_average();
    PeriodComparison::new(initial_average, recent_average)
}

fn steps_prediction(split: &WindowSplit<'_>) -> Option<Prediction> {
    let comparison = floored_comparison(split, Category::Steps)?;

    let narrative = match comparison.direction() {
        Direction::Higher => format!(
            "Your steps average in the last 7 days has been higher compared to the week before by {}%",
            comparison.delta()
        ),
        Direction::Lower => {
            "Your steps average in the last 7 days has been lower compared to the week before".to_string()
        }
        Direction::Similar => {
            "Your steps average in the last 7 days is relatively similar compared to the week before.".to_string()
        }
    };

    Some(Prediction::new(Category::Steps, narrative))
}

fn screen_time_prediction(split: &WindowSplit<'_>) -> Option<Prediction> {
    let comparison = floored_comparison(split, Category::ScreenTime)?;

    // A drop in screen time is ranked Declined, same as sleep.
    let prediction = match comparison.direction() {
        Direction::Higher => Prediction::new(
            Category::ScreenTime,
            format!(
                "Your screen time in the last 7 days has been higher compared to the week before by {}%",
                comparison.delta()
            ),
        ),
        Direction::Lower => Prediction::new(
            Category::ScreenTime,
            format!(
                "You have been using your phone {} hours fewer compared to last week",
                comparison.shortfall()
            ),
        )
        .with_rank(Rank::Declined),
        Direction::Similar => Prediction::new(
            Category::ScreenTime,
            "Your screen time in the last 7 days is relatively similar compared to the week before.",
        ),
    };

    Some(prediction)
}

/// Sleep accumulation for one window. A zero-hour sample is treated like a
/// missing one; both only count toward the denominator when configured.
fn sleep_accumulator(records: &[DailyRecord], count_zero_sleep_as_no_sleep: bool) -> Option<Accumulator> {
    let mut acc = Accumulator::default();
    for record in records {
        match record.sleep_hours {
            Some(hours) if hours != 0.0 => acc.add(hours)?,
            _ => {
                if count_zero_sleep_as_no_sleep {
                    acc.add_empty_day();
                }
            }
        }
    }
    Some(acc)
}

fn sleep_prediction(split: &WindowSplit<'_>, count_zero_sleep_as_no_sleep: bool) -> Option<Prediction> {
    debug_assert_eq!(zero_policy(Category::Sleep), ZeroPolicy::SkipWhenEmpty);

    let initial = sleep_accumulator(split.initial, count_zero_sleep_as_no_sleep)?;
    let recent = sleep_accumulator(split.recent, count_zero_sleep_as_no_sleep)?;
    if initial.total == 0 || recent.total == 0 {
        return None;
    }

    // Totals are non-zero, so both counts are too.
    let comparison = PeriodComparison::new(
        initial.total / initial.count,
        recent.total / recent.count,
    )?;

    let prediction = match comparison.direction() {
        Direction::Higher => Prediction::new(
            Category::Sleep,
            format!(
                "Your sleep average in the last 7 days has been higher compared to the week before by {}%",
                comparison.delta()
            ),
        ),
        Direction::Lower => Prediction::new(
            Category::Sleep,
            format!(
                "You have been sleeping {} hours fewer compared to last week",
                comparison.shortfall()
            ),
        )
        .with_rank(Rank::Declined),
        Direction::Similar => Prediction::new(
            Category::Sleep,
            "Your sleep average in the last 7 days is relatively similar compared to the week before.",
        ),
    };

    Some(prediction)
}

/// Rank for an absolute daily exercise average
pub fn exercise_rank(average_minutes: i64) -> Rank {
    if average_minutes < LOW_EXERCISE_MINUTES {
        Rank::Declined
    } else if average_minutes > HIGH_EXERCISE_MINUTES {
        Rank::Improved
    } else {
        Rank::Neutral
    }
}

fn exercise_prediction(split: &WindowSplit<'_>) -> Option<Prediction> {
    debug_assert_eq!(zero_policy(Category::ExerciseMinutes), ZeroPolicy::SkipWhenEmpty);

    let mut combined = Accumulator::collect(split.initial, Category::ExerciseMinutes)?;
    combined.merge(Accumulator::collect(split.recent, Category::ExerciseMinutes)?)?;

    if combined.count == 0 {
        return None;
    }

    let average = combined.total / combined.count;
    let narrative = format!(
        "You have spent an average of {average} minutes exercising every day in the past two weeks"
    );

    Some(Prediction::new(Category::ExerciseMinutes, narrative).with_rank(exercise_rank(average)))
}
