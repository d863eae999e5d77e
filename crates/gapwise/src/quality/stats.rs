//! Descriptive statistics computed during quality analysis.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Welford accumulator for mean and variance in a single pass.
#[derive(Debug, Clone, Default)]
struct RunningMoments {
    count: usize,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningMoments {
    fn new() -> Self {
        Self {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            ..Self::default()
        }
    }

    fn add(&mut self, value: f64) {
        self.count += 1;

        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        let delta2 = value - self.mean;
        self.m2 += delta * delta2;

        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    /// Population variance.
    fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / self.count as f64
        }
    }
}

/// Summary of a numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumericStatistics {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std: f64,
    pub median: f64,
    pub q1: f64,
    pub q3: f64,
}

impl NumericStatistics {
    /// Compute statistics over finite values. Returns `None` when empty.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let mut moments = RunningMoments::new();
        for &v in values {
            moments.add(v);
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        Some(Self {
            count: moments.count,
            min: moments.min,
            max: moments.max,
            mean: moments.mean,
            std: moments.variance().sqrt(),
            median: quantile(&sorted, 0.5),
            q1: quantile(&sorted, 0.25),
            q3: quantile(&sorted, 0.75),
        })
    }

    /// Interquartile range.
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }

    /// Tukey fences for the given multiplier. `None` when the quartiles
    /// overflowed and the fences are not finite.
    pub fn outlier_bounds(&self, multiplier: f64) -> Option<(f64, f64)> {
        let iqr = self.iqr();
        let (low, high) = (self.q1 - multiplier * iqr, self.q3 + multiplier * iqr);
        (low.is_finite() && high.is_finite()).then_some((low, high))
    }

    /// Coefficient of variation, undefined for a zero or non-finite mean.
    pub fn coefficient_of_variation(&self) -> Option<f64> {
        if self.mean == 0.0 || !self.mean.is_finite() || !self.std.is_finite() {
            return None;
        }
        Some(self.std / self.mean.abs())
    }
}

/// Linear interpolation between closest ranks on sorted input.
fn quantile(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let rank = p * (n - 1) as f64;
            let lower = rank.floor() as usize;
            let upper = rank.ceil() as usize;
            let weight = rank - lower as f64;
            sorted[lower] + (sorted[upper] - sorted[lower]) * weight
        }
    }
}

/// Cadence suggested by the median gap between consecutive timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApparentFrequency {
    SubDaily,
    Daily,
    Weekly,
    Monthly,
    QuarterlyOrYearly,
}

impl ApparentFrequency {
    /// Bucket a gap measured in days.
    pub fn from_gap_days(days: f64) -> Self {
        if days < 1.0 {
            ApparentFrequency::SubDaily
        } else if days < 2.0 {
            ApparentFrequency::Daily
        } else if days < 10.0 {
            ApparentFrequency::Weekly
        } else if days < 45.0 {
            ApparentFrequency::Monthly
        } else {
            ApparentFrequency::QuarterlyOrYearly
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ApparentFrequency::SubDaily => "sub-daily",
            ApparentFrequency::Daily => "daily",
            ApparentFrequency::Weekly => "weekly",
            ApparentFrequency::Monthly => "monthly",
            ApparentFrequency::QuarterlyOrYearly => "quarterly or yearly",
        }
    }
}

impl fmt::Display for ApparentFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Summary of a date column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateStatistics {
    pub count: usize,
    pub min: DateTime<Utc>,
    pub max: DateTime<Utc>,
    /// Values whose instant already appeared earlier in the column.
    pub duplicate_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub median_gap_days: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apparent_frequency: Option<ApparentFrequency>,
}

impl DateStatistics {
    /// Compute statistics over parsed instants. Returns `None` when empty.
    pub fn from_instants(instants: &[DateTime<Utc>]) -> Option<Self> {
        let mut sorted = instants.to_vec();
        sorted.sort();

        let min = *sorted.first()?;
        let max = *sorted.last()?;

        let count = sorted.len();
        sorted.dedup();
        let duplicate_count = count - sorted.len();

        let mut gaps: Vec<f64> = sorted
            .windows(2)
            .map(|w| (w[1] - w[0]).num_seconds() as f64 / 86_400.0)
            .collect();
        gaps.sort_by(|a, b| a.total_cmp(b));
        let median_gap_days = (!gaps.is_empty()).then(|| quantile(&gaps, 0.5));

        Some(Self {
            count,
            min,
            max,
            duplicate_count,
            median_gap_days,
            apparent_frequency: median_gap_days.map(ApparentFrequency::from_gap_days),
        })
    }
}

/// Frequency of one distinct value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

/// Summary of a binary or categorical column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStatistics {
    pub count: usize,
    pub distinct_count: usize,
    /// Most frequent values first, ties in first-seen order.
    pub top_values: Vec<ValueCount>,
}

/// Statistics attached to a quality report, by column type.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnStatistics {
    Numeric(NumericStatistics),
    Date(DateStatistics),
    Category(CategoryStatistics),
    #[default]
    None,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_numeric_statistics() {
        let stats = NumericStatistics::from_values(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();

        assert_eq!(stats.count, 5);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 5.0);
        assert!((stats.mean - 3.0).abs() < 1e-9);
        assert!((stats.std - 2.0_f64.sqrt()).abs() < 1e-9);
        assert_eq!(stats.median, 3.0);
        assert_eq!(stats.q1, 2.0);
        assert_eq!(stats.q3, 4.0);
        assert_eq!(stats.outlier_bounds(1.5), Some((-1.0, 7.0)));
    }

    #[test]
    fn test_interpolated_quartiles() {
        let stats = NumericStatistics::from_values(&[10.0, 20.0, 30.0, 40.0]).unwrap();

        assert_eq!(stats.median, 25.0);
        assert_eq!(stats.q1, 17.5);
        assert_eq!(stats.q3, 32.5);
    }

    #[test]
    fn test_empty_and_zero_mean() {
        assert!(NumericStatistics::from_values(&[]).is_none());

        let stats = NumericStatistics::from_values(&[-1.0, 1.0]).unwrap();
        assert_eq!(stats.coefficient_of_variation(), None);
    }

    #[test]
    fn test_overflowing_values_have_no_fences() {
        let stats = NumericStatistics::from_values(&[-f64::MAX, f64::MAX]).unwrap();

        assert_eq!(stats.outlier_bounds(1.5), None);
        assert_eq!(stats.coefficient_of_variation(), None);
        assert_eq!(stats.min, -f64::MAX);
    }

    #[test]
    fn test_apparent_frequency_buckets() {
        assert_eq!(ApparentFrequency::from_gap_days(0.5), ApparentFrequency::SubDaily);
        assert_eq!(ApparentFrequency::from_gap_days(1.0), ApparentFrequency::Daily);
        assert_eq!(ApparentFrequency::from_gap_days(7.0), ApparentFrequency::Weekly);
        assert_eq!(ApparentFrequency::from_gap_days(31.0), ApparentFrequency::Monthly);
        assert_eq!(ApparentFrequency::from_gap_days(91.0), ApparentFrequency::QuarterlyOrYearly);
    }

    #[test]
    fn test_date_statistics() {
        let day = |d| Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap();
        let stats = DateStatistics::from_instants(&[day(3), day(1), day(2), day(2), day(8)]).unwrap();

        assert_eq!(stats.min, day(1));
        assert_eq!(stats.max, day(8));
        assert_eq!(stats.duplicate_count, 1);
        assert_eq!(stats.median_gap_days, Some(1.0));
        assert_eq!(stats.apparent_frequency, Some(ApparentFrequency::Daily));
    }
}
