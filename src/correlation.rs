//! Pairwise correlation
//!
//! Computes the Pearson coefficient for every unordered pair of enabled
//! metrics, using only the days on which both metrics were recorded.

use crate::config::AnalysisConfig;
use crate::metric::Metric;
use crate::types::{CorrelationEntry, DailyRecord};
use tracing::debug;

/// Pearson correlation coefficient of two equally long series.
///
/// Uses the raw-sum form
/// `(n·Σxy − Σx·Σy) / sqrt((n·Σx² − (Σx)²)·(n·Σy² − (Σy)²))`.
/// Returns `None` when the coefficient is undefined: empty or mismatched
/// input, a series without variance, or a zero denominator.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.is_empty() || xs.len() != ys.len() {
        return None;
    }
    // Rounding in the raw sums can leave a tiny non-zero variance for a
    // constant series, so check for it directly.
    if is_constant(xs) || is_constant(ys) {
        return None;
    }

    let n = xs.len() as f64;
    let sum_x: f64 = xs.iter().sum();
    let sum_y: f64 = ys.iter().sum();
    let sum_x_squared: f64 = xs.iter().map(|x| x * x).sum();
    let sum_y_squared: f64 = ys.iter().map(|y| y * y).sum();
    let sum_xy: f64 = xs.iter().zip(ys).map(|(x, y)| x * y).sum();

    let numerator = n * sum_xy - sum_x * sum_y;
    let denominator =
        ((n * sum_x_squared - sum_x.powi(2)) * (n * sum_y_squared - sum_y.powi(2))).sqrt();

    if denominator == 0.0 || !denominator.is_finite() {
        return None;
    }

    Some((numerator / denominator).clamp(-1.0, 1.0))
}

fn is_constant(values: &[f64]) -> bool {
    values.iter().all(|v| *v == values[0])
}

/// Values of two metrics on the days where both are present, in day order
pub fn paired_values(records: &[DailyRecord], a: Metric, b: Metric) -> (Vec<f64>, Vec<f64>) {
    records
        .iter()
        .filter_map(|r| Some((a.value(r)?, b.value(r)?)))
        .unzip()
}

/// Computes correlation entries over the enabled metrics
#[derive(Debug, Clone)]
pub struct CorrelationEngine {
    metrics: Vec<Metric>,
}

impl Default for CorrelationEngine {
    fn default() -> Self {
        Self::new(&AnalysisConfig::default())
    }
}

impl CorrelationEngine {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            metrics: config.enabled_metrics(),
        }
    }

    /// Metrics in pairing order
    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    /// Coefficient for one pair; independent of argument order
    pub fn correlate_pair(records: &[DailyRecord], a: Metric, b: Metric) -> Option<f64> {
        let (xs, ys) = paired_values(records, a, b);
        pearson(&xs, &ys)
    }

    /// One entry per pair `i < j` whose coefficient is defined
    pub fn correlate(&self, records: &[DailyRecord]) -> Vec<CorrelationEntry> {
        let mut entries = Vec::new();

        for (i, &series_a) in self.metrics.iter().enumerate() {
            for &series_b in &self.metrics[i + 1..] {
                match Self::correlate_pair(records, series_a, series_b) {
                    Some(coefficient) => entries.push(CorrelationEntry {
                        series_a,
                        series_b,
                        coefficient,
                    }),
                    None => debug!(
                        a = series_a.key(),
                        b = series_b.key(),
                        "correlation undefined, pair omitted"
                    ),
                }
            }
        }

        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use pretty_assertions::assert_eq;

    const EPS: f64 = 1e-9;

    fn make_days(n: usize) -> Vec<DailyRecord> {
        let start = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        (0..n)
            .map(|i| DailyRecord::new(start + Duration::days(i as i64)))
            .collect()
    }

    /// 14 days with every metric present and no two metrics collinear
    fn varied_days() -> Vec<DailyRecord> {
        let mut days = make_days(14);
        for (i, day) in days.iter_mut().enumerate() {
            let t = i as f64;
            day.steps = Some(6000.0 + 350.0 * t);
            day.active_energy = Some(300.0 + (t * 1.3).sin() * 80.0);
            day.exercise_minutes = Some(20.0 + ((i * 7) % 5) as f64 * 9.0);
            day.sleep_hours = Some(7.5 - 0.1 * t + if i % 3 == 0 { 0.6 } else { 0.0 });
            day.minutes_in_daylight = Some(45.0 + (t * 0.7).cos() * 20.0);
            day.body_weight = Some(170.0 + ((i * 3) % 4) as f64 * 0.4);
            day.screen_time_social_media = Some(1.0 + (t * 2.1).sin().abs());
            day.screen_time_total = Some(4.0 + t * t * 0.02);
        }
        days
    }

    #[test]
    fn test_perfect_positive() {
        let xs: Vec<f64> = (1..=10).map(f64::from).collect();
        let ys: Vec<f64> = xs.iter().map(|x| 2.0 * x + 3.0).collect();
        assert!((pearson(&xs, &ys).unwrap() - 1.0).abs() < EPS);
    }

    #[test]
    fn test_perfect_negative() {
        let xs: Vec<f64> = (1..=10).map(f64::from).collect();
        let ys: Vec<f64> = xs.iter().map(|x| 100.0 - 4.0 * x).collect();
        assert!((pearson(&xs, &ys).unwrap() + 1.0).abs() < EPS);
    }

    #[test]
    fn test_known_value() {
        let xs = [1.0, 2.0, 3.0, 4.0, 5.0];
        let ys = [2.0, 4.0, 5.0, 4.0, 5.0];
        // n·Σxy − ΣxΣy = 5·66 − 15·20 = 30; sqrt(50 · 30) = 38.7298
        let r = pearson(&xs, &ys).unwrap();
        assert!((r - 30.0 / 1500f64.sqrt()).abs() < EPS);
    }

    #[test]
    fn test_undefined_cases() {
        assert_eq!(pearson(&[], &[]), None);
        assert_eq!(pearson(&[1.0], &[2.0]), None);
        assert_eq!(pearson(&[1.0, 2.0], &[1.0]), None);
        assert_eq!(pearson(&[7.3; 14], &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0, 13.0, 14.0]), None);
    }

    #[test]
    fn test_paired_values_filters_missing() {
        let mut days = make_days(4);
        days[0].steps = Some(1.0);
        days[0].sleep_hours = Some(8.0);
        days[1].steps = Some(2.0);
        days[2].sleep_hours = Some(6.0);
        days[3].steps = Some(4.0);
        days[3].sleep_hours = Some(5.0);

        let (xs, ys) = paired_values(&days, Metric::Steps, Metric::SleepHours);
        assert_eq!(xs, vec![1.0, 4.0]);
        assert_eq!(ys, vec![8.0, 5.0]);
    }

    #[test]
    fn test_all_pairs_in_fixed_order() {
        let entries = CorrelationEngine::default().correlate(&varied_days());
        assert_eq!(entries.len(), 28);

        let mut expected = Vec::new();
        for i in 0..Metric::ALL.len() {
            for j in i + 1..Metric::ALL.len() {
                expected.push((Metric::ALL[i], Metric::ALL[j]));
            }
        }
        let actual: Vec<(Metric, Metric)> =
            entries.iter().map(|e| (e.series_a, e.series_b)).collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_coefficients_bounded() {
        for entry in CorrelationEngine::default().correlate(&varied_days()) {
            assert!(
                (-1.0..=1.0).contains(&entry.coefficient),
                "{} out of range",
                entry.summary()
            );
        }
    }

    #[test]
    fn test_symmetry() {
        let days = varied_days();
        for a in Metric::ALL {
            for b in Metric::ALL {
                assert_eq!(
                    CorrelationEngine::correlate_pair(&days, a, b),
                    CorrelationEngine::correlate_pair(&days, b, a)
                );
            }
        }
    }

    #[test]
    fn test_constant_series_omitted() {
        let mut days = varied_days();
        for day in days.iter_mut() {
            day.body_weight = Some(172.4);
        }

        let entries = CorrelationEngine::default().correlate(&days);
        assert_eq!(entries.len(), 21);
        assert!(entries
            .iter()
            .all(|e| e.series_a != Metric::BodyWeight && e.series_b != Metric::BodyWeight));
    }

    #[test]
    fn test_absent_metric_omitted() {
        let mut days = varied_days();
        for day in days.iter_mut() {
            day.screen_time_social_media = None;
            day.screen_time_total = None;
        }
        assert_eq!(CorrelationEngine::default().correlate(&days).len(), 15);
    }

    #[test]
    fn test_enabled_subset() {
        let config = AnalysisConfig::new().with_metrics([
            Metric::SleepHours,
            Metric::Steps,
            Metric::ExerciseMinutes,
        ]);
        let engine = CorrelationEngine::new(&config);
        assert_eq!(
            engine.metrics(),
            &[Metric::Steps, Metric::ExerciseMinutes, Metric::SleepHours]
        );
        assert_eq!(engine.correlate(&varied_days()).len(), 3);
    }

    #[test]
    fn test_deterministic() {
        let days = varied_days();
        let engine = CorrelationEngine::default();
        assert_eq!(engine.correlate(&days), engine.correlate(&days));
    }
}
