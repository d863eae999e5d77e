//! Gap policies, aggregation methods and the records of what was applied.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::GapwiseError;
use crate::input::Row;

/// Column added by `mark_missing` to flag synthesized rows.
pub const MISSING_FLAG_COLUMN: &str = "is_missing";

/// What to do with a series that has gaps inside its critical window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriticalPolicy {
    /// Synthesize zero-valued rows for the missing periods.
    #[default]
    FillZeros,
    /// Drop the whole series.
    Remove,
}

/// What to do with a series that has gaps before its critical window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NonCriticalPolicy {
    /// Synthesize zero-valued rows for the missing periods.
    #[default]
    FillZeros,
    /// Synthesize zero-valued rows flagged in [`MISSING_FLAG_COLUMN`].
    MarkMissing,
    /// Drop the whole series.
    Remove,
}

impl CriticalPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            CriticalPolicy::FillZeros => "fill_zeros",
            CriticalPolicy::Remove => "remove",
        }
    }
}

impl NonCriticalPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            NonCriticalPolicy::FillZeros => "fill_zeros",
            NonCriticalPolicy::MarkMissing => "mark_missing",
            NonCriticalPolicy::Remove => "remove",
        }
    }
}

impl FromStr for CriticalPolicy {
    type Err = GapwiseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "fill_zeros" => Ok(CriticalPolicy::FillZeros),
            "remove" => Ok(CriticalPolicy::Remove),
            _ => Err(GapwiseError::Config(format!(
                "unknown critical break policy '{}': expected fill_zeros or remove",
                s
            ))),
        }
    }
}

impl FromStr for NonCriticalPolicy {
    type Err = GapwiseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "fill_zeros" => Ok(NonCriticalPolicy::FillZeros),
            "mark_missing" => Ok(NonCriticalPolicy::MarkMissing),
            "remove" => Ok(NonCriticalPolicy::Remove),
            _ => Err(GapwiseError::Config(format!(
                "unknown non-critical break policy '{}': expected fill_zeros, mark_missing or remove",
                s
            ))),
        }
    }
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase().replace('-', "_")
}

/// The user's gap handling choice, applied to every series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GapChoices {
    pub critical_breaks: CriticalPolicy,
    pub non_critical_breaks: NonCriticalPolicy,
}

impl GapChoices {
    pub fn new(critical_breaks: CriticalPolicy, non_critical_breaks: NonCriticalPolicy) -> Self {
        Self {
            critical_breaks,
            non_critical_breaks,
        }
    }

    /// Whether either policy synthesizes rows and so needs a target column.
    pub fn fills(&self) -> bool {
        self.critical_breaks == CriticalPolicy::FillZeros
            || self.non_critical_breaks != NonCriticalPolicy::Remove
    }
}

/// Reduction applied to a column within one aggregation bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationMethod {
    Sum,
    Mean,
    Median,
    Min,
    Max,
    First,
    Last,
    Mode,
}

impl AggregationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationMethod::Sum => "sum",
            AggregationMethod::Mean => "mean",
            AggregationMethod::Median => "median",
            AggregationMethod::Min => "min",
            AggregationMethod::Max => "max",
            AggregationMethod::First => "first",
            AggregationMethod::Last => "last",
            AggregationMethod::Mode => "mode",
        }
    }

    /// Allowed on numeric columns.
    pub fn applies_to_numeric(&self) -> bool {
        !matches!(self, AggregationMethod::Mode)
    }

    /// Allowed on categorical and binary columns.
    pub fn applies_to_discrete(&self) -> bool {
        matches!(
            self,
            AggregationMethod::Mode | AggregationMethod::First | AggregationMethod::Last
        )
    }
}

impl FromStr for AggregationMethod {
    type Err = GapwiseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sum" => Ok(AggregationMethod::Sum),
            "mean" | "avg" | "average" => Ok(AggregationMethod::Mean),
            "median" => Ok(AggregationMethod::Median),
            "min" => Ok(AggregationMethod::Min),
            "max" => Ok(AggregationMethod::Max),
            "first" => Ok(AggregationMethod::First),
            "last" => Ok(AggregationMethod::Last),
            "mode" => Ok(AggregationMethod::Mode),
            _ => Err(GapwiseError::Config(format!("unknown aggregation method '{}'", s))),
        }
    }
}

impl fmt::Display for AggregationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One repair step applied to a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum RepairAction {
    /// Every row of the series was dropped.
    RemoveSeries {
        series_id: String,
        rows: usize,
        critical: bool,
    },
    /// Zero-valued rows were added for missing periods.
    FillZeros {
        series_id: String,
        dates: Vec<NaiveDate>,
        critical: bool,
    },
    /// Zero-valued rows flagged as missing were added.
    MarkMissing {
        series_id: String,
        dates: Vec<NaiveDate>,
    },
}

impl RepairAction {
    /// Get a human-readable description of the action.
    pub fn description(&self) -> String {
        let window = |critical: &bool| if *critical { "critical" } else { "non-critical" };
        match self {
            RepairAction::RemoveSeries {
                series_id,
                rows,
                critical,
            } => format!(
                "Removed series '{}' ({} rows) for {} breaks",
                series_id,
                rows,
                window(critical)
            ),
            RepairAction::FillZeros {
                series_id,
                dates,
                critical,
            } => format!(
                "Filled {} {} gap(s) in '{}' with zeros",
                dates.len(),
                window(critical),
                series_id
            ),
            RepairAction::MarkMissing { series_id, dates } => format!(
                "Added {} row(s) marked missing to '{}'",
                dates.len(),
                series_id
            ),
        }
    }
}

/// Counts of what a repair pass did.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairSummary {
    pub series_removed: usize,
    pub rows_removed: usize,
    pub rows_synthesized: usize,
    pub rows_marked_missing: usize,
    /// Per-series detail, in series order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<RepairAction>,
}

impl RepairSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an action and update the counts.
    pub fn record(&mut self, action: RepairAction) {
        match &action {
            RepairAction::RemoveSeries { rows, .. } => {
                self.series_removed += 1;
                self.rows_removed += rows;
            }
            RepairAction::FillZeros { dates, .. } => self.rows_synthesized += dates.len(),
            RepairAction::MarkMissing { dates, .. } => {
                self.rows_synthesized += dates.len();
                self.rows_marked_missing += dates.len();
            }
        }
        self.actions.push(action);
    }
}

/// Repaired rows and what was done to them.
#[derive(Debug, Clone)]
pub struct RepairOutcome {
    pub rows: Vec<Row>,
    pub summary: RepairSummary,
}

/// Row counts before and after aggregation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationSummary {
    pub original_count: usize,
    pub aggregated_count: usize,
    pub reduction_percent: f64,
}

impl AggregationSummary {
    pub fn new(original_count: usize, aggregated_count: usize) -> Self {
        let reduction_percent = if original_count == 0 {
            0.0
        } else {
            original_count.saturating_sub(aggregated_count) as f64 * 100.0 / original_count as f64
        };
        Self {
            original_count,
            aggregated_count,
            reduction_percent,
        }
    }
}

/// Aggregated rows, one per (series, period), and the size reduction.
#[derive(Debug, Clone)]
pub struct AggregationOutcome {
    pub rows: Vec<Row>,
    pub summary: AggregationSummary,
}
