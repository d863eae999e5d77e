//! Auto and user classification layers.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::column::ColumnClassification;
use super::types::ColumnType;

/// Two immutable layers of column types, merged with user precedence.
///
/// Auto results and user overrides live in separate maps. Recording a new
/// auto result never touches the user layer, so an override survives any
/// number of re-classifications.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationOverlay {
    #[serde(default)]
    auto_classified: IndexMap<String, ColumnType>,
    #[serde(default)]
    user_classified: IndexMap<String, ColumnType>,
}

impl ClassificationOverlay {
    /// Create an empty overlay.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an overlay whose auto layer holds the given classifications.
    pub fn from_classifications<'a>(
        classifications: impl IntoIterator<Item = &'a ColumnClassification>,
    ) -> Self {
        classifications
            .into_iter()
            .fold(Self::new(), |overlay, c| overlay.with_auto(&c.name, c.column_type))
    }

    /// Record an inferred type.
    pub fn with_auto(mut self, column: impl Into<String>, column_type: ColumnType) -> Self {
        self.auto_classified.insert(column.into(), column_type);
        self
    }

    /// Record a user override.
    pub fn with_user(mut self, column: impl Into<String>, column_type: ColumnType) -> Self {
        self.user_classified.insert(column.into(), column_type);
        self
    }

    /// Drop a user override, falling back to the inferred type.
    pub fn without_user(mut self, column: &str) -> Self {
        self.user_classified.shift_remove(column);
        self
    }

    /// Merge another overlay's user overrides on top of this one.
    pub fn with_user_overrides(mut self, overrides: &IndexMap<String, ColumnType>) -> Self {
        for (column, column_type) in overrides {
            self.user_classified.insert(column.clone(), *column_type);
        }
        self
    }

    /// `user ?? auto`, or `None` if neither layer knows the column.
    pub fn effective_type(&self, column: &str) -> Option<ColumnType> {
        self.user_classified
            .get(column)
            .or_else(|| self.auto_classified.get(column))
            .copied()
    }

    /// `user ?? auto ?? inferred`.
    pub fn resolve(&self, column: &str, inferred: ColumnType) -> ColumnType {
        self.effective_type(column).unwrap_or(inferred)
    }

    /// Whether the user has overridden this column.
    pub fn is_user_classified(&self, column: &str) -> bool {
        self.user_classified.contains_key(column)
    }

    /// The auto layer.
    pub fn auto_classified(&self) -> &IndexMap<String, ColumnType> {
        &self.auto_classified
    }

    /// The user layer.
    pub fn user_classified(&self) -> &IndexMap<String, ColumnType> {
        &self.user_classified
    }
}
