//! Column classification record.

use serde::{Deserialize, Serialize};

use super::types::ColumnType;

/// The classifier's verdict for one column, enriched by quality analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnClassification {
    /// Column name.
    pub name: String,
    /// Inferred semantic type.
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    /// Confidence in the inferred type (0.0-1.0).
    pub confidence: f64,
    /// Up to five distinct sample values for display.
    #[serde(default)]
    pub sample_values: Vec<String>,
    /// Number of null/missing values.
    pub null_count: usize,
    /// Number of distinct non-null values.
    pub unique_count: usize,
    /// Why the classifier settled on this type.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reasons: Vec<String>,
    /// Problems severe enough to exclude the column downstream.
    #[serde(default)]
    pub issues: Vec<String>,
    /// Advisory findings.
    #[serde(default)]
    pub warnings: Vec<String>,
    /// Optional improvements.
    #[serde(default)]
    pub suggestions: Vec<String>,
}

impl ColumnClassification {
    /// Create a classification with no findings attached.
    pub fn new(name: impl Into<String>, column_type: ColumnType, confidence: f64) -> Self {
        Self {
            name: name.into(),
            column_type,
            confidence,
            sample_values: Vec::new(),
            null_count: 0,
            unique_count: 0,
            reasons: Vec::new(),
            issues: Vec::new(),
            warnings: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    /// A column with issues is excluded from validation and aggregation.
    pub fn is_usable(&self) -> bool {
        self.issues.is_empty()
    }

    /// Share of null values among all values seen.
    pub fn null_percentage(&self, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            (self.null_count as f64 / total as f64) * 100.0
        }
    }
}
