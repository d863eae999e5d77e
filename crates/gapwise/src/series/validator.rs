//! Date-continuity analysis of every series in a dataset.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::input::{Row, RowSet};
use crate::temporal::{Frequency, parse_date};

use super::config::{ForecastConfig, OVERALL_SERIES_ID, ValidatedConfig};
use super::report::{SeriesBreakReport, SeriesCategory, ValidationSummary};

/// Observed periods of one series.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub id: String,
    /// Distinct period starts.
    pub periods: BTreeSet<NaiveDate>,
    /// Rows that contributed, duplicates included.
    pub record_count: usize,
}

impl Series {
    fn new(id: String) -> Self {
        Self {
            id,
            periods: BTreeSet::new(),
            record_count: 0,
        }
    }

    pub fn first_period(&self) -> Option<NaiveDate> {
        self.periods.first().copied()
    }

    pub fn last_period(&self) -> Option<NaiveDate> {
        self.periods.last().copied()
    }
}

/// Rows grouped into series, plus the rows that could not be placed.
#[derive(Debug, Clone, Default)]
pub struct SeriesGrouping {
    /// Series keyed and ordered by id.
    pub series: BTreeMap<String, Series>,
    pub processed_records: usize,
    pub dropped_records: usize,
}

/// Series key of a row: the id column's text, or `"overall"` when no id
/// column is configured. `None` when the configured id is null.
pub fn series_key(row: &Row, id_column: Option<&str>) -> Option<String> {
    match id_column {
        None => Some(OVERALL_SERIES_ID.to_string()),
        Some(column) => row
            .get(column)
            .filter(|v| !v.is_null())
            .map(|v| v.as_text().into_owned()),
    }
}

/// Period start of a row's date under `frequency`, if the date parses.
pub fn row_period(row: &Row, date_column: &str, frequency: Frequency) -> Option<NaiveDate> {
    let instant = parse_date(row.get(date_column)?)?;
    Some(frequency.period_start(instant.date_naive()))
}

/// Group rows into series by id, bucketing dates to period starts.
pub fn group_series(rows: &[Row], config: &ValidatedConfig) -> SeriesGrouping {
    let mut grouping = SeriesGrouping::default();

    for row in rows {
        let key = series_key(row, config.series_id_column());
        let period = row_period(row, &config.date_column, config.frequency);
        let (Some(key), Some(period)) = (key, period) else {
            grouping.dropped_records += 1;
            continue;
        };

        let series = grouping
            .series
            .entry(key.clone())
            .or_insert_with(|| Series::new(key));
        series.periods.insert(period);
        series.record_count += 1;
        grouping.processed_records += 1;
    }

    if grouping.dropped_records > 0 {
        warn!(
            dropped = grouping.dropped_records,
            "dropped rows with an unparseable date or a missing series id"
        );
    }

    grouping
}

/// Checks every series for missing periods against the expected cadence.
///
/// Missing periods at or after `last period - horizon * multiplier` steps
/// are critical; earlier ones are non-critical.
#[derive(Debug, Clone, Default)]
pub struct SeriesValidator;

impl SeriesValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate a dataset. Preconditions fail before any row is read.
    pub fn validate(&self, data: &RowSet, config: &ForecastConfig) -> Result<ValidationSummary> {
        let config = config.validate_against(data)?;
        Ok(self.validate_checked(&data.rows, &config))
    }

    /// Validate with a config that already passed its checks.
    pub fn validate_checked(&self, rows: &[Row], config: &ValidatedConfig) -> ValidationSummary {
        let grouping = group_series(rows, config);

        let reports: Vec<SeriesBreakReport> = grouping
            .series
            .values()
            .filter_map(|series| analyze_series(series, config))
            .collect();

        let summary = ValidationSummary::from_reports(
            reports,
            grouping.processed_records,
            grouping.dropped_records,
            config.frequency,
            config.horizon,
            config.required_length,
        );

        info!(
            series = summary.total_series,
            complete = summary.category1_count,
            non_critical = summary.category2_count,
            critical = summary.category3_count,
            "validated series"
        );

        summary
    }
}

/// Break report for one series. `None` for a series with no periods.
pub fn analyze_series(series: &Series, config: &ValidatedConfig) -> Option<SeriesBreakReport> {
    let first = series.first_period()?;
    let last = series.last_period()?;
    let frequency = config.frequency;

    let critical_period_start = frequency
        .step(last, -i64::from(config.required_length))
        .unwrap_or(NaiveDate::MIN);

    let (critical, non_critical): (Vec<NaiveDate>, Vec<NaiveDate>) = frequency
        .sequence(first, last)
        .into_iter()
        .filter(|date| !series.periods.contains(date))
        .partition(|date| *date >= critical_period_start);

    let category = SeriesCategory::from_counts(critical.len(), non_critical.len());
    debug!(
        series = %series.id,
        critical = critical.len(),
        non_critical = non_critical.len(),
        "analyzed series"
    );

    Some(SeriesBreakReport {
        series_id: series.id.clone(),
        critical_breaks_count: critical.len(),
        non_critical_breaks_count: non_critical.len(),
        total_records: series.record_count,
        has_critical_breaks: !critical.is_empty(),
        has_non_critical_breaks: !non_critical.is_empty(),
        category,
        critical_break_dates: critical,
        non_critical_break_dates: non_critical,
        first_period: Some(first),
        last_period: Some(last),
        critical_period_start: Some(critical_period_start),
    })
}
