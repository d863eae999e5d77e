//! Applies the user's gap handling choice to every series.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::error::{GapwiseError, Result};
use crate::input::{RawValue, Row};
use crate::series::{SeriesBreakReport, ValidatedConfig, series_key};
use crate::temporal::format_date;

use super::operations::{
    CriticalPolicy, GapChoices, MISSING_FLAG_COLUMN, NonCriticalPolicy, RepairAction,
    RepairOutcome, RepairSummary,
};

/// Removes or fills the gaps found by series validation.
///
/// Removal short-circuits: a series dropped for critical breaks gets no
/// non-critical handling. Rows whose series is not in the analysis pass
/// through untouched.
#[derive(Debug, Clone, Default)]
pub struct GapRepairer;

impl GapRepairer {
    pub fn new() -> Self {
        Self
    }

    /// Repair `rows` using per-series reports from the validator.
    pub fn repair(
        &self,
        rows: &[Row],
        analysis: &[SeriesBreakReport],
        choices: &GapChoices,
        config: &ValidatedConfig,
    ) -> Result<RepairOutcome> {
        let target = self.check_target(analysis, choices, config)?;

        let mut summary = RepairSummary::new();
        let mut removed: HashSet<&str> = HashSet::new();
        let mut synthesized: Vec<Row> = Vec::new();

        let row_counts = count_rows(rows, config);

        for report in analysis {
            let id = report.series_id.as_str();
            let series_rows = row_counts.get(id).copied().unwrap_or(0);

            let removal = if report.has_critical_breaks
                && choices.critical_breaks == CriticalPolicy::Remove
            {
                Some(true)
            } else if report.has_non_critical_breaks
                && choices.non_critical_breaks == NonCriticalPolicy::Remove
            {
                Some(false)
            } else {
                None
            };
            if let Some(critical) = removal {
                removed.insert(id);
                summary.record(RepairAction::RemoveSeries {
                    series_id: id.to_string(),
                    rows: series_rows,
                    critical,
                });
                continue;
            }

            // `check_target` already failed if a fill lacks a target
            let Some(target) = target else { continue };

            if report.has_critical_breaks {
                let dates = &report.critical_break_dates;
                synthesized.extend(fill_rows(id, dates, target, false, config));
                summary.record(RepairAction::FillZeros {
                    series_id: id.to_string(),
                    dates: dates.clone(),
                    critical: true,
                });
            }

            if report.has_non_critical_breaks {
                let dates = &report.non_critical_break_dates;
                if choices.non_critical_breaks == NonCriticalPolicy::MarkMissing {
                    synthesized.extend(fill_rows(id, dates, target, true, config));
                    summary.record(RepairAction::MarkMissing {
                        series_id: id.to_string(),
                        dates: dates.clone(),
                    });
                } else {
                    synthesized.extend(fill_rows(id, dates, target, false, config));
                    summary.record(RepairAction::FillZeros {
                        series_id: id.to_string(),
                        dates: dates.clone(),
                        critical: false,
                    });
                }
            }
        }

        let mark_missing = summary.rows_marked_missing > 0;
        let mut repaired: Vec<Row> = rows
            .iter()
            .filter(|row| {
                series_key(row, config.series_id_column())
                    .is_none_or(|key| !removed.contains(key.as_str()))
            })
            .cloned()
            .collect();

        repaired.extend(synthesized);
        if mark_missing {
            for row in &mut repaired {
                row.entry(MISSING_FLAG_COLUMN.to_string())
                    .or_insert(RawValue::Number(0.0));
            }
        }

        for action in &summary.actions {
            debug!("{}", action.description());
        }
        info!(
            series_removed = summary.series_removed,
            rows_removed = summary.rows_removed,
            rows_synthesized = summary.rows_synthesized,
            "repaired series"
        );

        Ok(RepairOutcome {
            rows: repaired,
            summary,
        })
    }

    /// The target column, required only when a fill will actually happen.
    fn check_target<'a>(
        &self,
        analysis: &[SeriesBreakReport],
        choices: &GapChoices,
        config: &'a ValidatedConfig,
    ) -> Result<Option<&'a str>> {
        let needs_fill = analysis.iter().any(|r| {
            let critical_fill = r.has_critical_breaks;
            let removed = (r.has_critical_breaks
                && choices.critical_breaks == CriticalPolicy::Remove)
                || (r.has_non_critical_breaks
                    && choices.non_critical_breaks == NonCriticalPolicy::Remove);
            let non_critical_fill = r.has_non_critical_breaks
                && choices.non_critical_breaks != NonCriticalPolicy::Remove;
            !removed && (critical_fill || non_critical_fill)
        });

        match config.target_column.as_deref() {
            Some(target) => Ok(Some(target)),
            None if needs_fill => Err(GapwiseError::Precondition(
                "filling gaps requires a target column".to_string(),
            )),
            None => Ok(None),
        }
    }
}

fn count_rows(rows: &[Row], config: &ValidatedConfig) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for row in rows {
        if let Some(key) = series_key(row, config.series_id_column()) {
            *counts.entry(key).or_insert(0) += 1;
        }
    }
    counts
}

fn fill_rows(
    series_id: &str,
    dates: &[NaiveDate],
    target: &str,
    mark_missing: bool,
    config: &ValidatedConfig,
) -> Vec<Row> {
    dates
        .iter()
        .map(|date| {
            let mut row = Row::new();
            if let Some(id_column) = config.series_id_column() {
                row.insert(id_column.to_string(), RawValue::Text(series_id.to_string()));
            }
            row.insert(config.date_column.clone(), RawValue::Text(format_date(*date)));
            row.insert(target.to_string(), RawValue::Number(0.0));
            if mark_missing {
                row.insert(MISSING_FLAG_COLUMN.to_string(), RawValue::Number(1.0));
            }
            row
        })
        .collect()
}
