//! Heuristic column type classification.

use std::collections::HashSet;

use indexmap::IndexSet;

use crate::input::{RawValue, RowSet};
use crate::schema::{ColumnClassification, ColumnType};
use crate::temporal::parse_date;

use super::numeric::coerce_number;
use super::sample::ColumnSample;

/// Column-name fragments that suggest a temporal column.
const DATE_NAME_HINTS: &[&str] = &[
    "date", "time", "timestamp", "created", "updated", "modified", "month", "day", "year",
];

/// Value sets that read as a two-valued flag.
const BINARY_SETS: &[[&str; 2]] = &[["0", "1"], ["true", "false"], ["yes", "no"], ["y", "n"]];

/// Classifier thresholds.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Maximum non-null values inspected per column.
    pub sample_capacity: usize,
    /// Values examined by the date check.
    pub date_sample_size: usize,
    /// Share of the date sample that must parse as dates.
    pub date_threshold: f64,
    /// Share of non-null values that must parse as numbers.
    pub numeric_threshold: f64,
    /// Integer columns with at most this many distinct values may be codes.
    pub code_max_unique: usize,
    /// ...and at most this spread between min and max.
    pub code_max_range: f64,
    /// Distinct/total ratio below which text is treated as categorical.
    pub categorical_ratio: f64,
    /// Minimum sample size for the categorical fallback.
    pub categorical_min_sample: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            sample_capacity: 1000,
            date_sample_size: 10,
            date_threshold: 0.7,
            numeric_threshold: 0.9,
            code_max_unique: 10,
            code_max_range: 20.0,
            categorical_ratio: 0.5,
            categorical_min_sample: 5,
        }
    }
}

/// Infers a [`ColumnType`] from a column's values.
///
/// Checks run in a fixed order and the first match wins: date, binary,
/// numeric (with small integer codes demoted to categorical), the
/// categorical fallback, and finally text.
pub struct ColumnClassifier {
    config: ClassifierConfig,
}

impl ColumnClassifier {
    /// Create a classifier with default thresholds.
    pub fn new() -> Self {
        Self::with_config(ClassifierConfig::default())
    }

    /// Create a classifier with custom thresholds.
    pub fn with_config(config: ClassifierConfig) -> Self {
        Self { config }
    }

    /// Classify every column of a row set, in header order.
    pub fn classify_rows(&self, data: &RowSet) -> Vec<ColumnClassification> {
        data.headers
            .iter()
            .map(|name| {
                let sample = ColumnSample::collect(data.column_values(name), self.config.sample_capacity);
                self.classify_sample(name, &sample)
            })
            .collect()
    }

    /// Classify one column from its raw values.
    pub fn classify(&self, name: &str, values: &[RawValue]) -> ColumnClassification {
        let sample = ColumnSample::collect(values, self.config.sample_capacity);
        self.classify_sample(name, &sample)
    }

    /// Classify a pre-built sample.
    pub fn classify_sample(&self, name: &str, sample: &ColumnSample) -> ColumnClassification {
        let texts: Vec<String> = sample.values().iter().map(|v| v.as_text().into_owned()).collect();
        let distinct: IndexSet<&str> = texts.iter().map(|s| s.as_str()).collect();

        let (column_type, confidence, reasons) = self.infer(name, sample, &distinct);

        let mut classification = ColumnClassification::new(name, column_type, confidence);
        classification.sample_values = distinct.iter().take(5).map(|s| s.to_string()).collect();
        classification.null_count = sample.null_count();
        classification.unique_count = distinct.len();
        classification.reasons = reasons;
        classification
    }

    fn infer(
        &self,
        name: &str,
        sample: &ColumnSample,
        distinct: &IndexSet<&str>,
    ) -> (ColumnType, f64, Vec<String>) {
        let values = sample.values();
        let mut reasons = Vec::new();

        if values.is_empty() {
            reasons.push("no non-null values".to_string());
            return (ColumnType::Unknown, 0.0, reasons);
        }

        // 1. Date
        let lower_name = name.to_lowercase();
        let name_hint = DATE_NAME_HINTS.iter().find(|hint| lower_name.contains(*hint));
        let date_sample = &values[..values.len().min(self.config.date_sample_size)];
        let separated_dates = date_sample
            .iter()
            .filter(|v| !is_digit_only(v) && parse_date(v).is_some())
            .count();
        let date_ratio = separated_dates as f64 / date_sample.len() as f64;

        if let Some(hint) = name_hint {
            if date_sample.iter().any(|v| parse_date(v).is_some()) {
                reasons.push(format!("column name contains '{}'", hint));
                return (ColumnType::Date, 0.95, reasons);
            }
        }
        if date_ratio >= self.config.date_threshold {
            reasons.push(format!(
                "{:.0}% of sampled values parse as dates",
                date_ratio * 100.0
            ));
            return (ColumnType::Date, 0.85, reasons);
        }

        // 2. Binary, then numeric
        if let Some(pair) = binary_pair(distinct) {
            reasons.push(format!("values limited to {{{}, {}}}", pair[0], pair[1]));
            return (ColumnType::Binary, 0.9, reasons);
        }

        let numbers: Vec<f64> = values.iter().filter_map(coerce_number).collect();
        let numeric_ratio = numbers.len() as f64 / values.len() as f64;

        if numeric_ratio >= self.config.numeric_threshold {
            let all_integers = numbers.iter().all(|n| n.fract() == 0.0);
            let unique_numbers: HashSet<i64> = numbers.iter().map(|n| *n as i64).collect();
            let min = numbers.iter().copied().fold(f64::INFINITY, f64::min);
            let max = numbers.iter().copied().fold(f64::NEG_INFINITY, f64::max);

            if all_integers
                && unique_numbers.len() <= self.config.code_max_unique
                && max - min <= self.config.code_max_range
            {
                reasons.push(format!(
                    "{} distinct integers within a range of {}",
                    unique_numbers.len(),
                    max - min
                ));
                return (ColumnType::Categorical, 0.8, reasons);
            }

            reasons.push(format!(
                "{:.0}% of values parse as numbers",
                numeric_ratio * 100.0
            ));
            return (ColumnType::Numeric, 0.85, reasons);
        }

        // 3. Categorical fallback
        let unique_ratio = distinct.len() as f64 / values.len() as f64;
        if unique_ratio < self.config.categorical_ratio
            && distinct.len() > 1
            && values.len() >= self.config.categorical_min_sample
        {
            reasons.push(format!(
                "{} distinct values across {} rows",
                distinct.len(),
                values.len()
            ));
            return (ColumnType::Categorical, 0.7, reasons);
        }

        // 4. Text
        reasons.push("no structural pattern detected".to_string());
        (ColumnType::Text, 0.5, reasons)
    }
}

impl Default for ColumnClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Digit-only values (small integer codes, serials) never count toward the
/// date ratio on their own.
fn is_digit_only(value: &RawValue) -> bool {
    match value {
        RawValue::Number(_) => true,
        RawValue::Text(s) => {
            let t = s.trim();
            !t.is_empty() && t.chars().all(|c| c.is_ascii_digit())
        }
        RawValue::Null => false,
    }
}

/// The known binary pair covering every distinct value, if any.
fn binary_pair(distinct: &IndexSet<&str>) -> Option<&'static [&'static str; 2]> {
    let lowered: HashSet<String> = distinct.iter().map(|s| s.to_lowercase()).collect();
    if lowered.is_empty() || lowered.len() > 2 {
        return None;
    }
    BINARY_SETS
        .iter()
        .find(|pair| lowered.iter().all(|v| pair.contains(&v.as_str())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(values: &[&str]) -> Vec<RawValue> {
        values.iter().map(|s| RawValue::from(*s)).collect()
    }

    fn classify(name: &str, values: &[&str]) -> ColumnClassification {
        ColumnClassifier::new().classify(name, &texts(values))
    }

    #[test]
    fn test_binary_zero_one() {
        let c = classify("is_promo", &["0", "1", "1", "0", "1"]);
        assert_eq!(c.column_type, ColumnType::Binary);
        assert!(c.confidence >= 0.85);
    }

    #[test]
    fn test_binary_words_case_insensitive() {
        let c = classify("flag", &["Yes", "no", "YES", "No"]);
        assert_eq!(c.column_type, ColumnType::Binary);
    }

    #[test]
    fn test_formatted_numbers_are_numeric() {
        let c = classify("revenue", &["1,200", "3,400", "$500"]);
        assert_eq!(c.column_type, ColumnType::Numeric);
        assert_eq!(c.confidence, 0.85);
    }

    #[test]
    fn test_small_integer_codes_are_categorical() {
        let c = classify("store", &["1", "2", "3", "4", "2", "1"]);
        assert_eq!(c.column_type, ColumnType::Categorical);
        assert_eq!(c.confidence, 0.8);
    }

    #[test]
    fn test_iso_dates_without_name_hint() {
        let c = classify("when", &["2024-01-01", "2024-01-02", "2024-01-03"]);
        assert_eq!(c.column_type, ColumnType::Date);
        assert_eq!(c.confidence, 0.85);
    }

    #[test]
    fn test_name_hint_raises_confidence() {
        let c = classify("order_date", &["01/02/2024", "01/03/2024"]);
        assert_eq!(c.column_type, ColumnType::Date);
        assert_eq!(c.confidence, 0.95);
    }

    #[test]
    fn test_digit_only_values_are_not_dates() {
        // 5-digit codes parse as serials but carry no separators
        let c = classify("sku", &["10001", "10002", "10003", "20004", "30005"]);
        assert_eq!(c.column_type, ColumnType::Numeric);
    }

    #[test]
    fn test_name_hint_needs_a_parseable_value() {
        let c = classify("year", &["2019", "2020", "2021", "2022"]);
        assert_eq!(c.column_type, ColumnType::Categorical);
    }

    #[test]
    fn test_categorical_fallback() {
        let c = classify("region", &["north", "south", "north", "east", "south", "north", "north"]);
        assert_eq!(c.column_type, ColumnType::Categorical);
        assert_eq!(c.confidence, 0.7);
    }

    #[test]
    fn test_text_fallback() {
        let c = classify("comment", &["great", "late delivery", "ok", "broken box"]);
        assert_eq!(c.column_type, ColumnType::Text);
        assert_eq!(c.confidence, 0.5);
    }

    #[test]
    fn test_all_null_is_unknown() {
        let c = classify("empty", &["", "NA", "null"]);
        assert_eq!(c.column_type, ColumnType::Unknown);
        assert_eq!(c.null_count, 3);
    }

    #[test]
    fn test_sample_values_and_counts() {
        let c = classify("region", &["a", "b", "", "c", "d", "e", "f", "a"]);
        assert_eq!(c.sample_values.len(), 5);
        assert_eq!(c.null_count, 1);
        assert_eq!(c.unique_count, 6);
    }

    #[test]
    fn test_classify_rows_in_header_order() {
        let data = crate::input::Parser::new()
            .parse_str("date,store,sales\n2024-01-01,1,10.5\n2024-01-02,2,11.25\n")
            .unwrap();
        let result = ColumnClassifier::new().classify_rows(&data);
        let types: Vec<ColumnType> = result.iter().map(|c| c.column_type).collect();

        assert_eq!(types, vec![ColumnType::Date, ColumnType::Categorical, ColumnType::Numeric]);
    }
}
