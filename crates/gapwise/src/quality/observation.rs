//! Findings produced by column quality analysis.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservationType {
    /// Nothing in the column could be parsed for its type.
    NoParseableValues,
    /// Some values could not be parsed for the column's type.
    UnparseableValues,
    /// High share of missing values.
    Completeness,
    /// Negative values in a column that measures something non-negative.
    NegativeValues,
    /// Values outside the IQR fences.
    Outlier,
    /// Many values exactly zero.
    ExcessZeros,
    /// Standard deviation large relative to the mean.
    HighVariation,
    /// Dates implausibly far in the past or future.
    DateRange,
    /// The same timestamp appears more than once.
    DuplicateTimestamps,
    /// Apparent cadence of the date column.
    SamplingFrequency,
    /// A binary column holds more than two values.
    ClassMismatch,
    /// One class of a binary column is rare.
    ClassImbalance,
    /// Too many distinct values to group by.
    HighCardinality,
    /// A single distinct value carries no information.
    ConstantValue,
    /// Cardinality suits grouping.
    GroupingCandidate,
}

impl ObservationType {
    /// Get a human-readable label for the observation type.
    pub fn label(&self) -> &'static str {
        match self {
            ObservationType::NoParseableValues => "No Parseable Values",
            ObservationType::UnparseableValues => "Unparseable Values",
            ObservationType::Completeness => "Completeness Issue",
            ObservationType::NegativeValues => "Negative Values",
            ObservationType::Outlier => "Outlier",
            ObservationType::ExcessZeros => "Excess Zeros",
            ObservationType::HighVariation => "High Variation",
            ObservationType::DateRange => "Date Range",
            ObservationType::DuplicateTimestamps => "Duplicate Timestamps",
            ObservationType::SamplingFrequency => "Sampling Frequency",
            ObservationType::ClassMismatch => "Class Mismatch",
            ObservationType::ClassImbalance => "Class Imbalance",
            ObservationType::HighCardinality => "High Cardinality",
            ObservationType::ConstantValue => "Constant Value",
            ObservationType::GroupingCandidate => "Grouping Candidate",
        }
    }
}

/// Severity level of an observation.
///
/// Only `Issue` excludes a column from later stages; everything else is
/// advisory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Optional improvement or informational note.
    Suggestion,
    /// Potential problem worth reviewing.
    Warning,
    /// The column cannot be used.
    Issue,
}

impl Severity {
    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Suggestion => "Suggestion",
            Severity::Warning => "Warning",
            Severity::Issue => "Issue",
        }
    }
}

/// Evidence supporting an observation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Evidence {
    /// Number of occurrences.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurrences: Option<usize>,
    /// Percentage of affected values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
    /// Example values.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub examples: Vec<Value>,
    /// Expected value or range.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<Value>,
}

impl Evidence {
    /// Create empty evidence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set occurrences.
    pub fn with_occurrences(mut self, count: usize) -> Self {
        self.occurrences = Some(count);
        self
    }

    /// Set percentage.
    pub fn with_percentage(mut self, pct: f64) -> Self {
        self.percentage = Some(pct);
        self
    }

    /// Set example values.
    pub fn with_examples(mut self, examples: Vec<Value>) -> Self {
        self.examples = examples;
        self
    }

    /// Set expected value.
    pub fn with_expected(mut self, expected: impl Into<Value>) -> Self {
        self.expected = Some(expected.into());
        self
    }
}

/// One finding about a column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    /// Kind of finding.
    #[serde(rename = "type")]
    pub observation_type: ObservationType,
    /// Severity level.
    pub severity: Severity,
    /// Affected column name.
    pub column: String,
    /// Human-readable description.
    pub description: String,
    /// Supporting evidence.
    #[serde(default)]
    pub evidence: Evidence,
}

impl Observation {
    /// Create a new observation.
    pub fn new(
        observation_type: ObservationType,
        severity: Severity,
        column: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            observation_type,
            severity,
            column: column.into(),
            description: description.into(),
            evidence: Evidence::new(),
        }
    }

    /// Set the evidence.
    pub fn with_evidence(mut self, evidence: Evidence) -> Self {
        self.evidence = evidence;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_observation() {
        let obs = Observation::new(
            ObservationType::ExcessZeros,
            Severity::Warning,
            "sales",
            "35% of values are exactly zero",
        )
        .with_evidence(Evidence::new().with_occurrences(7).with_percentage(35.0));

        assert_eq!(obs.severity, Severity::Warning);
        assert_eq!(obs.column, "sales");
        assert_eq!(obs.evidence.occurrences, Some(7));
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Suggestion < Severity::Warning);
        assert!(Severity::Warning < Severity::Issue);
    }

    #[test]
    fn test_serialized_shape() {
        let obs = Observation::new(
            ObservationType::HighCardinality,
            Severity::Warning,
            "sku",
            "too many values",
        );
        let json = serde_json::to_value(&obs).unwrap();

        assert_eq!(json["type"], "high_cardinality");
        assert_eq!(json["severity"], "warning");
        assert!(json["evidence"].get("examples").is_none());
    }
}
