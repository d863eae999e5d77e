//! Per-column quality checks.

use chrono::{DateTime, Months, NaiveDate, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::inference::coerce_number;
use crate::input::{RawValue, RowSet};
use crate::schema::{ColumnClassification, ColumnType};
use crate::temporal::{format_canonical, parse_date};

use super::observation::{Evidence, Observation, ObservationType, Severity};
use super::stats::{
    CategoryStatistics, ColumnStatistics, DateStatistics, NumericStatistics, ValueCount,
};

/// Column-name fragments for measures that should never be negative.
const NON_NEGATIVE_HINTS: &[&str] = &[
    "quantity", "sales", "units", "count", "price", "amount", "revenue", "demand", "volume", "qty",
];

/// Thresholds for the quality checks.
#[derive(Debug, Clone)]
pub struct QualityConfig {
    /// Date the plausibility window is measured from; `None` means today.
    pub reference_date: Option<NaiveDate>,
    /// Null share above which a column is flagged.
    pub null_warning_ratio: f64,
    /// Zero share above which a numeric column is flagged.
    pub zero_warning_ratio: f64,
    /// Tukey multiplier for general numeric data.
    pub iqr_multiplier: f64,
    /// Tukey multiplier when every value is at most `lenient_max`.
    pub lenient_iqr_multiplier: f64,
    pub lenient_max: f64,
    /// Coefficient of variation above which a suggestion is raised.
    pub cv_threshold: f64,
    pub max_past_years: u32,
    pub max_future_years: u32,
    /// Minority/majority ratio below which a binary column is imbalanced.
    pub imbalance_ratio: f64,
    /// Unique/row ratio above which a categorical column is too granular.
    pub high_cardinality_ratio: f64,
    /// Distinct-count range that makes a good grouping column.
    pub grouping_min: usize,
    pub grouping_max: usize,
    /// Example values attached to a finding.
    pub max_examples: usize,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            reference_date: None,
            null_warning_ratio: 0.1,
            zero_warning_ratio: 0.1,
            iqr_multiplier: 1.5,
            lenient_iqr_multiplier: 2.0,
            lenient_max: 100.0,
            cv_threshold: 1.0,
            max_past_years: 100,
            max_future_years: 10,
            imbalance_ratio: 0.1,
            high_cardinality_ratio: 0.8,
            grouping_min: 2,
            grouping_max: 10,
            max_examples: 3,
        }
    }
}

impl QualityConfig {
    /// Pin the reference date used by the date-range check.
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }
}

/// Findings and statistics for one column.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnQuality {
    pub column: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    pub total_count: usize,
    pub null_count: usize,
    pub issues: Vec<Observation>,
    pub warnings: Vec<Observation>,
    pub suggestions: Vec<Observation>,
    pub stats: ColumnStatistics,
}

impl ColumnQuality {
    fn new(column: &str, column_type: ColumnType, total_count: usize, null_count: usize) -> Self {
        Self {
            column: column.to_string(),
            column_type,
            total_count,
            null_count,
            issues: Vec::new(),
            warnings: Vec::new(),
            suggestions: Vec::new(),
            stats: ColumnStatistics::None,
        }
    }

    fn push(&mut self, observation: Observation) {
        match observation.severity {
            Severity::Issue => self.issues.push(observation),
            Severity::Warning => self.warnings.push(observation),
            Severity::Suggestion => self.suggestions.push(observation),
        }
    }

    /// Whether the column may be used by later stages.
    pub fn is_usable(&self) -> bool {
        self.issues.is_empty()
    }

    /// All findings, most severe first.
    pub fn observations(&self) -> impl Iterator<Item = &Observation> {
        self.issues
            .iter()
            .chain(self.warnings.iter())
            .chain(self.suggestions.iter())
    }

    /// Copy finding descriptions onto a classification record.
    pub fn apply_to(&self, classification: &mut ColumnClassification) {
        let describe = |obs: &[Observation]| -> Vec<String> {
            obs.iter().map(|o| o.description.clone()).collect()
        };
        classification.issues = describe(&self.issues);
        classification.warnings = describe(&self.warnings);
        classification.suggestions = describe(&self.suggestions);
    }
}

/// Runs the type-specific quality checks.
pub struct QualityAnalyzer {
    config: QualityConfig,
}

impl QualityAnalyzer {
    /// Create an analyzer with default thresholds.
    pub fn new() -> Self {
        Self::with_config(QualityConfig::default())
    }

    /// Create an analyzer with custom thresholds.
    pub fn with_config(config: QualityConfig) -> Self {
        Self { config }
    }

    /// Analyze every classified column of a row set.
    pub fn analyze_rows(
        &self,
        data: &RowSet,
        classifications: &[ColumnClassification],
    ) -> Vec<ColumnQuality> {
        classifications
            .iter()
            .map(|c| {
                let values: Vec<RawValue> = data.column_values(&c.name).cloned().collect();
                self.analyze(&c.name, &values, c.column_type)
            })
            .collect()
    }

    /// Analyze one column under the given type.
    pub fn analyze(&self, name: &str, values: &[RawValue], column_type: ColumnType) -> ColumnQuality {
        let present: Vec<&RawValue> = values.iter().filter(|v| !v.is_null()).collect();
        let null_count = values.len() - present.len();
        let mut quality = ColumnQuality::new(name, column_type, values.len(), null_count);

        if present.is_empty() {
            quality.push(no_parseable_values(name, values.len()));
            return quality;
        }

        if !values.is_empty() {
            let null_ratio = null_count as f64 / values.len() as f64;
            if null_ratio > self.config.null_warning_ratio {
                quality.push(
                    Observation::new(
                        ObservationType::Completeness,
                        Severity::Warning,
                        name,
                        format!("{:.1}% of values are missing", null_ratio * 100.0),
                    )
                    .with_evidence(
                        Evidence::new()
                            .with_occurrences(null_count)
                            .with_percentage(null_ratio * 100.0),
                    ),
                );
            }
        }

        match column_type {
            ColumnType::Numeric => self.check_numeric(name, &present, &mut quality),
            ColumnType::Date => self.check_date(name, &present, &mut quality),
            ColumnType::Binary => self.check_binary(name, &present, &mut quality),
            ColumnType::Categorical => {
                self.check_categorical(name, &present, values.len(), &mut quality)
            }
            ColumnType::Text | ColumnType::Unknown => {}
        }

        quality
    }

    fn check_numeric(&self, name: &str, present: &[&RawValue], quality: &mut ColumnQuality) {
        let numbers: Vec<f64> = present.iter().filter_map(|v| coerce_number(v)).collect();
        let Some(stats) = NumericStatistics::from_values(&numbers) else {
            quality.push(no_parseable_values(name, quality.total_count));
            return;
        };
        push_unparseable(name, present.len() - numbers.len(), present.len(), "numbers", quality);

        let n = numbers.len() as f64;

        let lower_name = name.to_lowercase();
        if NON_NEGATIVE_HINTS.iter().any(|hint| lower_name.contains(hint)) {
            let negatives: Vec<f64> = numbers.iter().copied().filter(|v| *v < 0.0).collect();
            if !negatives.is_empty() {
                quality.push(
                    Observation::new(
                        ObservationType::NegativeValues,
                        Severity::Warning,
                        name,
                        format!("{} negative value(s) in a column expected to be non-negative", negatives.len()),
                    )
                    .with_evidence(
                        Evidence::new()
                            .with_occurrences(negatives.len())
                            .with_percentage(negatives.len() as f64 / n * 100.0)
                            .with_examples(
                                negatives.iter().take(self.config.max_examples).map(|v| json!(v)).collect(),
                            )
                            .with_expected(json!({ "min": 0 })),
                    ),
                );
            }
        }

        // Percentage-like columns get wider fences
        let multiplier = if stats.max <= self.config.lenient_max {
            self.config.lenient_iqr_multiplier
        } else {
            self.config.iqr_multiplier
        };
        // Values near the float limits overflow the quartiles; skip the fences then
        if let Some((low, high)) = stats.outlier_bounds(multiplier) {
            let outliers: Vec<f64> = numbers.iter().copied().filter(|v| *v < low || *v > high).collect();
            if !outliers.is_empty() {
                let pct = outliers.len() as f64 / n * 100.0;
                let examples = outliers
                    .iter()
                    .take(self.config.max_examples)
                    .map(|v| json!({ "value": v, "direction": if *v > high { "high" } else { "low" } }))
                    .collect();
                quality.push(
                    Observation::new(
                        ObservationType::Outlier,
                        Severity::Warning,
                        name,
                        format!(
                            "{} outlier(s) ({:.1}%) outside the normal range [{}, {}]",
                            outliers.len(),
                            pct,
                            stats.q1,
                            stats.q3
                        ),
                    )
                    .with_evidence(
                        Evidence::new()
                            .with_occurrences(outliers.len())
                            .with_percentage(pct)
                            .with_examples(examples)
                            .with_expected(json!([stats.q1, stats.q3])),
                    ),
                );
            }
        }

        let zeros = numbers.iter().filter(|v| **v == 0.0).count();
        let zero_ratio = zeros as f64 / n;
        if zero_ratio > self.config.zero_warning_ratio {
            quality.push(
                Observation::new(
                    ObservationType::ExcessZeros,
                    Severity::Warning,
                    name,
                    format!("{:.1}% of values are exactly zero", zero_ratio * 100.0),
                )
                .with_evidence(
                    Evidence::new()
                        .with_occurrences(zeros)
                        .with_percentage(zero_ratio * 100.0),
                ),
            );
        }

        if let Some(cv) = stats.coefficient_of_variation() {
            if cv > self.config.cv_threshold {
                quality.push(
                    Observation::new(
                        ObservationType::HighVariation,
                        Severity::Suggestion,
                        name,
                        format!("High variability (CV {:.2}); investigate before forecasting", cv),
                    )
                    .with_evidence(Evidence::new().with_expected(json!({ "maxCv": self.config.cv_threshold }))),
                );
            }
        }

        quality.stats = ColumnStatistics::Numeric(stats);
    }

    fn check_date(&self, name: &str, present: &[&RawValue], quality: &mut ColumnQuality) {
        let instants: Vec<DateTime<Utc>> = present.iter().filter_map(|v| parse_date(v)).collect();
        let Some(stats) = DateStatistics::from_instants(&instants) else {
            quality.push(no_parseable_values(name, quality.total_count));
            return;
        };
        push_unparseable(name, present.len() - instants.len(), present.len(), "dates", quality);

        let reference = self.config.reference_date.unwrap_or_else(|| Utc::now().date_naive());
        let earliest = reference.checked_sub_months(Months::new(self.config.max_past_years.saturating_mul(12)));
        let latest = reference.checked_add_months(Months::new(self.config.max_future_years.saturating_mul(12)));

        let too_old = earliest.is_some_and(|limit| stats.min.date_naive() < limit);
        let too_new = latest.is_some_and(|limit| stats.max.date_naive() > limit);
        if too_old || too_new {
            quality.push(
                Observation::new(
                    ObservationType::DateRange,
                    Severity::Warning,
                    name,
                    format!(
                        "Dates span {} to {}, outside the plausible window",
                        format_canonical(&stats.min),
                        format_canonical(&stats.max)
                    ),
                )
                .with_evidence(Evidence::new().with_expected(json!({
                    "earliest": earliest.map(|d| d.to_string()),
                    "latest": latest.map(|d| d.to_string()),
                }))),
            );
        }

        if stats.duplicate_count > 0 {
            quality.push(
                Observation::new(
                    ObservationType::DuplicateTimestamps,
                    Severity::Warning,
                    name,
                    format!("{} duplicate timestamp(s)", stats.duplicate_count),
                )
                .with_evidence(
                    Evidence::new()
                        .with_occurrences(stats.duplicate_count)
                        .with_percentage(stats.duplicate_count as f64 / stats.count as f64 * 100.0),
                ),
            );
        }

        if let Some(frequency) = stats.apparent_frequency {
            quality.push(
                Observation::new(
                    ObservationType::SamplingFrequency,
                    Severity::Suggestion,
                    name,
                    format!("Data appears to be sampled {}", frequency),
                )
                .with_evidence(Evidence::new().with_expected(json!(stats.median_gap_days))),
            );
        }

        quality.stats = ColumnStatistics::Date(stats);
    }

    fn check_binary(&self, name: &str, present: &[&RawValue], quality: &mut ColumnQuality) {
        let stats = category_statistics(present, |v| v.as_text().to_lowercase());

        if stats.distinct_count > 2 {
            quality.push(
                Observation::new(
                    ObservationType::ClassMismatch,
                    Severity::Warning,
                    name,
                    format!("{} distinct values in a binary column", stats.distinct_count),
                )
                .with_evidence(
                    Evidence::new()
                        .with_occurrences(stats.distinct_count)
                        .with_examples(example_values(&stats, self.config.max_examples))
                        .with_expected(2),
                ),
            );
        } else if stats.distinct_count == 2 {
            let majority = stats.top_values[0].count;
            let minority = stats.top_values[1].count;
            let ratio = minority as f64 / majority as f64;
            if ratio < self.config.imbalance_ratio {
                quality.push(
                    Observation::new(
                        ObservationType::ClassImbalance,
                        Severity::Warning,
                        name,
                        format!(
                            "'{}' appears in only {:.1}% of rows",
                            stats.top_values[1].value,
                            minority as f64 / stats.count as f64 * 100.0
                        ),
                    )
                    .with_evidence(
                        Evidence::new()
                            .with_occurrences(minority)
                            .with_percentage(ratio * 100.0),
                    ),
                );
            }
        }

        quality.stats = ColumnStatistics::Category(stats);
    }

    fn check_categorical(
        &self,
        name: &str,
        present: &[&RawValue],
        row_count: usize,
        quality: &mut ColumnQuality,
    ) {
        let stats = category_statistics(present, |v| v.as_text().into_owned());
        let unique = stats.distinct_count;

        if unique as f64 > row_count as f64 * self.config.high_cardinality_ratio {
            quality.push(
                Observation::new(
                    ObservationType::HighCardinality,
                    Severity::Warning,
                    name,
                    format!("{} distinct values across {} rows; too many to group by", unique, row_count),
                )
                .with_evidence(
                    Evidence::new()
                        .with_occurrences(unique)
                        .with_percentage(unique as f64 / row_count as f64 * 100.0),
                ),
            );
        } else if unique == 1 {
            quality.push(Observation::new(
                ObservationType::ConstantValue,
                Severity::Warning,
                name,
                format!("Every value is '{}'", stats.top_values[0].value),
            ));
        }

        if (self.config.grouping_min..=self.config.grouping_max).contains(&unique) {
            quality.push(
                Observation::new(
                    ObservationType::GroupingCandidate,
                    Severity::Suggestion,
                    name,
                    format!("{} categories; good candidate for grouping series", unique),
                )
                .with_evidence(
                    Evidence::new().with_examples(example_values(&stats, self.config.max_examples)),
                ),
            );
        }

        quality.stats = ColumnStatistics::Category(stats);
    }
}

impl Default for QualityAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

fn no_parseable_values(name: &str, total: usize) -> Observation {
    Observation::new(
        ObservationType::NoParseableValues,
        Severity::Issue,
        name,
        "No parseable values; column excluded",
    )
    .with_evidence(Evidence::new().with_occurrences(total))
}

fn push_unparseable(name: &str, failed: usize, present: usize, kind: &str, quality: &mut ColumnQuality) {
    if failed == 0 {
        return;
    }
    let pct = failed as f64 / present as f64 * 100.0;
    quality.push(
        Observation::new(
            ObservationType::UnparseableValues,
            Severity::Warning,
            name,
            format!("{} value(s) ({:.1}%) could not be parsed as {} and are ignored", failed, pct, kind),
        )
        .with_evidence(Evidence::new().with_occurrences(failed).with_percentage(pct)),
    );
}

fn category_statistics(
    present: &[&RawValue],
    key: impl Fn(&RawValue) -> String,
) -> CategoryStatistics {
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for value in present {
        *counts.entry(key(value)).or_insert(0) += 1;
    }

    let mut top_values: Vec<ValueCount> = counts
        .into_iter()
        .map(|(value, count)| ValueCount { value, count })
        .collect();
    // Stable sort keeps first-seen order among ties
    top_values.sort_by(|a, b| b.count.cmp(&a.count));

    CategoryStatistics {
        count: present.len(),
        distinct_count: top_values.len(),
        top_values,
    }
}

fn example_values(stats: &CategoryStatistics, limit: usize) -> Vec<serde_json::Value> {
    stats.top_values.iter().take(limit).map(|vc| json!(vc.value)).collect()
}
