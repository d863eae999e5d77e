//! Per-series break reports and the validation summary.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::temporal::Frequency;

/// Severity bucket of a series, by the kind of gaps it has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SeriesCategory {
    /// No missing periods.
    Complete,
    /// Gaps only before the critical window.
    NonCriticalOnly,
    /// At least one gap inside the critical window.
    Critical,
}

impl SeriesCategory {
    /// Classify from break counts. Critical breaks dominate.
    pub fn from_counts(critical: usize, non_critical: usize) -> Self {
        if critical > 0 {
            SeriesCategory::Critical
        } else if non_critical > 0 {
            SeriesCategory::NonCriticalOnly
        } else {
            SeriesCategory::Complete
        }
    }

    /// Numeric category used on the wire (1, 2 or 3).
    pub fn number(&self) -> u8 {
        match self {
            SeriesCategory::Complete => 1,
            SeriesCategory::NonCriticalOnly => 2,
            SeriesCategory::Critical => 3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SeriesCategory::Complete => "complete",
            SeriesCategory::NonCriticalOnly => "non-critical gaps",
            SeriesCategory::Critical => "critical gaps",
        }
    }
}

impl Serialize for SeriesCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.number())
    }
}

impl<'de> Deserialize<'de> for SeriesCategory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match u8::deserialize(deserializer)? {
            1 => Ok(SeriesCategory::Complete),
            2 => Ok(SeriesCategory::NonCriticalOnly),
            3 => Ok(SeriesCategory::Critical),
            other => Err(serde::de::Error::custom(format!(
                "series category must be 1, 2 or 3, got {}",
                other
            ))),
        }
    }
}

/// Gap analysis for one series.
///
/// Only the counts and flags are required when deserializing; a validator
/// that omits the date lists or `category` still yields a usable report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "ReportFields")]
pub struct SeriesBreakReport {
    pub series_id: String,
    pub critical_breaks_count: usize,
    pub non_critical_breaks_count: usize,
    /// Rows of this series that survived date and id parsing.
    pub total_records: usize,
    pub has_critical_breaks: bool,
    pub has_non_critical_breaks: bool,
    pub category: SeriesCategory,
    pub critical_break_dates: Vec<NaiveDate>,
    pub non_critical_break_dates: Vec<NaiveDate>,
    /// First observed period start.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_period: Option<NaiveDate>,
    /// Last observed period start.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_period: Option<NaiveDate>,
    /// Earliest period whose absence counts as critical.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub critical_period_start: Option<NaiveDate>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReportFields {
    series_id: String,
    critical_breaks_count: usize,
    non_critical_breaks_count: usize,
    total_records: usize,
    has_critical_breaks: bool,
    has_non_critical_breaks: bool,
    #[serde(default)]
    category: Option<SeriesCategory>,
    #[serde(default)]
    critical_break_dates: Vec<NaiveDate>,
    #[serde(default)]
    non_critical_break_dates: Vec<NaiveDate>,
    #[serde(default)]
    first_period: Option<NaiveDate>,
    #[serde(default)]
    last_period: Option<NaiveDate>,
    #[serde(default)]
    critical_period_start: Option<NaiveDate>,
}

impl From<ReportFields> for SeriesBreakReport {
    fn from(fields: ReportFields) -> Self {
        let category = fields.category.unwrap_or_else(|| {
            SeriesCategory::from_counts(fields.critical_breaks_count, fields.non_critical_breaks_count)
        });
        Self {
            series_id: fields.series_id,
            critical_breaks_count: fields.critical_breaks_count,
            non_critical_breaks_count: fields.non_critical_breaks_count,
            total_records: fields.total_records,
            has_critical_breaks: fields.has_critical_breaks,
            has_non_critical_breaks: fields.has_non_critical_breaks,
            category,
            critical_break_dates: fields.critical_break_dates,
            non_critical_break_dates: fields.non_critical_break_dates,
            first_period: fields.first_period,
            last_period: fields.last_period,
            critical_period_start: fields.critical_period_start,
        }
    }
}

impl SeriesBreakReport {
    /// Missing periods of both kinds, in date order.
    pub fn missing_dates(&self) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = self
            .non_critical_break_dates
            .iter()
            .chain(self.critical_break_dates.iter())
            .copied()
            .collect();
        dates.sort();
        dates
    }
}

/// Result of validating every series of a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationSummary {
    pub total_series: usize,
    pub category1_count: usize,
    pub category2_count: usize,
    pub category3_count: usize,
    pub processed_records: usize,
    /// Rows skipped for an unparseable date or a null id.
    #[serde(default)]
    pub dropped_records: usize,
    /// Reports sorted by series id.
    pub series_analysis: Vec<SeriesBreakReport>,
    pub time_granularity: Frequency,
    pub prediction_length: u32,
    pub required_length: u32,
}

impl ValidationSummary {
    /// Build a summary from per-series reports.
    pub fn from_reports(
        series_analysis: Vec<SeriesBreakReport>,
        processed_records: usize,
        dropped_records: usize,
        time_granularity: Frequency,
        prediction_length: u32,
        required_length: u32,
    ) -> Self {
        let count = |category| {
            series_analysis
                .iter()
                .filter(|r| r.category == category)
                .count()
        };

        Self {
            total_series: series_analysis.len(),
            category1_count: count(SeriesCategory::Complete),
            category2_count: count(SeriesCategory::NonCriticalOnly),
            category3_count: count(SeriesCategory::Critical),
            processed_records,
            dropped_records,
            series_analysis,
            time_granularity,
            prediction_length,
            required_length,
        }
    }

    /// Whether any series has a gap inside its critical window.
    pub fn has_critical_breaks(&self) -> bool {
        self.category3_count > 0
    }

    /// Report for one series.
    pub fn series(&self, series_id: &str) -> Option<&SeriesBreakReport> {
        self.series_analysis.iter().find(|r| r.series_id == series_id)
    }
}
