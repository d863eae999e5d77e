//! Reduces rows to one per (series, period).

use std::collections::BTreeMap;

use chrono::NaiveDate;
use indexmap::IndexMap;
use tracing::{info, warn};

use crate::error::{GapwiseError, Result};
use crate::inference::coerce_number;
use crate::input::{RawValue, Row, collect_headers};
use crate::schema::{ClassificationOverlay, ColumnType};
use crate::series::{ValidatedConfig, row_period, series_key};
use crate::temporal::format_date;

use super::operations::{
    AggregationMethod, AggregationOutcome, AggregationSummary, MISSING_FLAG_COLUMN,
};

/// Buckets rows by series and period start and reduces each column by type.
///
/// Numeric columns default to the mean, categorical and binary columns to
/// the mode. Date, text and unknown columns keep the first non-null value.
#[derive(Debug, Clone, Default)]
pub struct Aggregator;

impl Aggregator {
    pub fn new() -> Self {
        Self
    }

    /// Aggregate `rows` under the config's frequency.
    ///
    /// `methods` overrides the default reduction for individual columns and
    /// must suit the column's effective type.
    pub fn aggregate(
        &self,
        rows: &[Row],
        config: &ValidatedConfig,
        types: &ClassificationOverlay,
        methods: &IndexMap<String, AggregationMethod>,
    ) -> Result<AggregationOutcome> {
        let headers = collect_headers(rows);
        let plan = self.plan(&headers, config, types, methods)?;

        let mut buckets: BTreeMap<(NaiveDate, String), Vec<&Row>> = BTreeMap::new();
        let mut dropped = 0usize;
        for row in rows {
            let key = series_key(row, config.series_id_column());
            let period = row_period(row, &config.date_column, config.frequency);
            match (period, key) {
                (Some(period), Some(key)) => buckets.entry((period, key)).or_default().push(row),
                _ => dropped += 1,
            }
        }
        if dropped > 0 {
            warn!(dropped, "skipped rows with an unparseable date or a missing series id");
        }

        let aggregated: Vec<Row> = buckets
            .into_iter()
            .map(|((period, series_id), members)| {
                let mut out = Row::new();
                for column in &headers {
                    let value = if *column == config.date_column {
                        RawValue::Text(format_date(period))
                    } else if config.series_id_column() == Some(column.as_str()) {
                        members
                            .iter()
                            .find_map(|r| r.get(column).filter(|v| !v.is_null()).cloned())
                            .unwrap_or_else(|| RawValue::Text(series_id.clone()))
                    } else {
                        let method = plan.get(column).copied().unwrap_or(AggregationMethod::First);
                        reduce(&members, column, method)
                    };
                    out.insert(column.clone(), value);
                }
                out
            })
            .collect();

        let summary = AggregationSummary::new(rows.len(), aggregated.len());
        info!(
            original = summary.original_count,
            aggregated = summary.aggregated_count,
            frequency = %config.frequency,
            "aggregated rows"
        );

        Ok(AggregationOutcome {
            rows: aggregated,
            summary,
        })
    }

    /// Resolve the reduction for every non-key column.
    fn plan(
        &self,
        headers: &[String],
        config: &ValidatedConfig,
        types: &ClassificationOverlay,
        methods: &IndexMap<String, AggregationMethod>,
    ) -> Result<IndexMap<String, AggregationMethod>> {
        let is_key = |column: &str| {
            column == config.date_column || config.series_id_column() == Some(column)
        };

        for (column, method) in methods {
            if is_key(column.as_str()) {
                return Err(GapwiseError::Precondition(format!(
                    "'{}' is a grouping column and cannot be aggregated",
                    column
                )));
            }
            if !headers.contains(column) {
                return Err(GapwiseError::MissingColumn {
                    column: column.clone(),
                    context: "aggregation method set for a column not in the data".to_string(),
                });
            }
            let column_type = types.resolve(column, ColumnType::Unknown);
            let allowed = match column_type {
                ColumnType::Numeric => method.applies_to_numeric(),
                ColumnType::Categorical | ColumnType::Binary => method.applies_to_discrete(),
                _ => matches!(method, AggregationMethod::First | AggregationMethod::Last),
            };
            if !allowed {
                return Err(GapwiseError::Precondition(format!(
                    "cannot aggregate {} column '{}' with {}",
                    column_type, column, method
                )));
            }
        }

        Ok(headers
            .iter()
            .filter(|column| !is_key(column.as_str()))
            .map(|column| {
                let method = methods
                    .get(column)
                    .copied()
                    .unwrap_or_else(|| default_method(column, types));
                (column.clone(), method)
            })
            .collect())
    }
}

fn default_method(column: &str, types: &ClassificationOverlay) -> AggregationMethod {
    // A period holding any synthesized row stays flagged
    if column == MISSING_FLAG_COLUMN {
        return AggregationMethod::Max;
    }
    match types.resolve(column, ColumnType::Unknown) {
        ColumnType::Numeric => AggregationMethod::Mean,
        ColumnType::Categorical | ColumnType::Binary => AggregationMethod::Mode,
        ColumnType::Date | ColumnType::Text | ColumnType::Unknown => AggregationMethod::First,
    }
}

fn present<'a>(members: &'a [&'a Row], column: &'a str) -> impl Iterator<Item = &'a RawValue> {
    members
        .iter()
        .filter_map(move |r| r.get(column))
        .filter(|v| !v.is_null())
}

fn reduce(members: &[&Row], column: &str, method: AggregationMethod) -> RawValue {
    match method {
        AggregationMethod::First => present(members, column).next().cloned().unwrap_or_default(),
        AggregationMethod::Last => present(members, column).last().cloned().unwrap_or_default(),
        AggregationMethod::Mode => mode(present(members, column)).unwrap_or_default(),
        numeric => {
            let numbers: Vec<f64> = present(members, column).filter_map(coerce_number).collect();
            reduce_numbers(&numbers, numeric).map_or(RawValue::Null, RawValue::Number)
        }
    }
}

fn reduce_numbers(values: &[f64], method: AggregationMethod) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let result = match method {
        AggregationMethod::Sum => values.iter().sum(),
        AggregationMethod::Mean => values.iter().sum::<f64>() / values.len() as f64,
        AggregationMethod::Median => {
            let mut sorted = values.to_vec();
            sorted.sort_by(|a, b| a.total_cmp(b));
            let mid = sorted.len() / 2;
            if sorted.len() % 2 == 0 {
                (sorted[mid - 1] + sorted[mid]) / 2.0
            } else {
                sorted[mid]
            }
        }
        AggregationMethod::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
        AggregationMethod::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        AggregationMethod::First => values[0],
        AggregationMethod::Last => values[values.len() - 1],
        AggregationMethod::Mode => return None,
    };
    Some(result)
}

/// Most frequent value by text form; ties go to the first seen.
fn mode<'a>(values: impl Iterator<Item = &'a RawValue>) -> Option<RawValue> {
    let mut counts: IndexMap<String, (usize, &RawValue)> = IndexMap::new();
    for value in values {
        counts
            .entry(value.as_text().into_owned())
            .or_insert((0, value))
            .0 += 1;
    }

    let mut best: Option<(usize, &RawValue)> = None;
    for (count, value) in counts.into_values() {
        if best.is_none_or(|(best_count, _)| count > best_count) {
            best = Some((count, value));
        }
    }
    best.map(|(_, value)| value.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Parser;
    use crate::series::ForecastConfig;

    fn run(
        csv: &str,
        config: ForecastConfig,
        types: &[(&str, ColumnType)],
        methods: &[(&str, AggregationMethod)],
    ) -> Result<AggregationOutcome> {
        let data = Parser::new().parse_str(csv).unwrap();
        let overlay = types
            .iter()
            .fold(ClassificationOverlay::new(), |o, (c, t)| o.with_auto(*c, *t));
        let methods: IndexMap<String, AggregationMethod> =
            methods.iter().map(|(c, m)| (c.to_string(), *m)).collect();
        Aggregator::new().aggregate(&data.rows, &config.validate()?, &overlay, &methods)
    }

    #[test]
    fn test_monthly_mean() {
        let csv = "date,sales\n2024-01-05,10\n2024-01-20,20\n";
        let outcome = run(
            csv,
            ForecastConfig::new("date", "M", 1),
            &[("sales", ColumnType::Numeric)],
            &[],
        )
        .unwrap();

        assert_eq!(outcome.rows.len(), 1);
        assert_eq!(outcome.rows[0]["sales"], RawValue::Number(15.0));
        assert_eq!(outcome.rows[0]["date"], RawValue::from("2024-01-01"));
        assert_eq!(outcome.summary.reduction_percent, 50.0);
    }

    #[test]
    fn test_sorted_by_period_then_series() {
        let csv = "\
date,store,sales
2024-02-03,b,1
2024-01-10,b,2
2024-02-01,a,3
2024-01-15,a,4
";
        let config = ForecastConfig::new("date", "M", 1).with_id_column("store");
        let outcome = run(csv, config, &[("sales", ColumnType::Numeric)], &[]).unwrap();

        let keys: Vec<(String, String)> = outcome
            .rows
            .iter()
            .map(|r| (r["date"].to_string(), r["store"].to_string()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("2024-01-01".to_string(), "a".to_string()),
                ("2024-01-01".to_string(), "b".to_string()),
                ("2024-02-01".to_string(), "a".to_string()),
                ("2024-02-01".to_string(), "b".to_string()),
            ]
        );
    }

    #[test]
    fn test_explicit_methods_and_mode() {
        let csv = "\
date,sales,promo,note
2024-01-01,10,yes,first
2024-01-02,20,no,
2024-01-03,30,no,third
2024-01-04,5,yes,fourth
";
        let outcome = run(
            csv,
            ForecastConfig::new("date", "W", 1),
            &[
                ("sales", ColumnType::Numeric),
                ("promo", ColumnType::Binary),
                ("note", ColumnType::Text),
            ],
            &[("sales", AggregationMethod::Sum)],
        )
        .unwrap();

        // 2024-01-01 is a Monday, so all four rows share one week
        assert_eq!(outcome.rows.len(), 1);
        let row = &outcome.rows[0];
        assert_eq!(row["sales"], RawValue::Number(65.0));
        assert_eq!(row["promo"], RawValue::from("yes"));
        assert_eq!(row["note"], RawValue::from("first"));
    }

    #[test]
    fn test_median_min_max_last() {
        let values = [3.0, 1.0, 4.0, 2.0];
        assert_eq!(reduce_numbers(&values, AggregationMethod::Median), Some(2.5));
        assert_eq!(reduce_numbers(&values, AggregationMethod::Min), Some(1.0));
        assert_eq!(reduce_numbers(&values, AggregationMethod::Max), Some(4.0));
        assert_eq!(reduce_numbers(&values, AggregationMethod::Last), Some(2.0));
        assert_eq!(reduce_numbers(&[], AggregationMethod::Mean), None);
    }

    #[test]
    fn test_method_must_suit_type() {
        let csv = "date,store,region\n2024-01-01,a,north\n";
        let config = ForecastConfig::new("date", "M", 1).with_id_column("store");

        let err = run(
            csv,
            config.clone(),
            &[("region", ColumnType::Categorical)],
            &[("region", AggregationMethod::Sum)],
        )
        .unwrap_err();
        assert!(err.is_precondition());

        let err = run(csv, config, &[], &[("store", AggregationMethod::First)]).unwrap_err();
        assert!(err.is_precondition());
    }

    #[test]
    fn test_missing_flag_uses_max() {
        let csv = "date,sales,is_missing\n2024-01-01,0,1\n2024-01-15,7,0\n";
        let outcome = run(
            csv,
            ForecastConfig::new("date", "M", 1),
            &[("sales", ColumnType::Numeric)],
            &[],
        )
        .unwrap();

        assert_eq!(outcome.rows[0][MISSING_FLAG_COLUMN], RawValue::Number(1.0));
    }
}
