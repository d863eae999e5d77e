//! Core type definitions for column classification.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GapwiseError;

/// Semantic type inferred for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// Calendar dates or timestamps.
    Date,
    /// Continuous or count-like numbers.
    Numeric,
    /// Two-valued flags (0/1, yes/no, true/false).
    Binary,
    /// Low-cardinality discrete values.
    Categorical,
    /// Free text.
    Text,
    /// Unable to determine type.
    #[default]
    Unknown,
}

impl ColumnType {
    /// Returns true if this type is numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Numeric)
    }

    /// Returns true if this type is temporal.
    pub fn is_temporal(&self) -> bool {
        matches!(self, ColumnType::Date)
    }

    /// Returns true for types reduced by mode during aggregation.
    pub fn is_discrete(&self) -> bool {
        matches!(self, ColumnType::Binary | ColumnType::Categorical)
    }

    /// Lowercase name as used in overrides and on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Date => "date",
            ColumnType::Numeric => "numeric",
            ColumnType::Binary => "binary",
            ColumnType::Categorical => "categorical",
            ColumnType::Text => "text",
            ColumnType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = GapwiseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "date" | "datetime" | "timestamp" => Ok(ColumnType::Date),
            "numeric" | "number" | "float" | "integer" => Ok(ColumnType::Numeric),
            "binary" | "boolean" | "bool" => Ok(ColumnType::Binary),
            "categorical" | "category" => Ok(ColumnType::Categorical),
            "text" | "string" => Ok(ColumnType::Text),
            "unknown" => Ok(ColumnType::Unknown),
            _ => Err(GapwiseError::Config(format!(
                "Unknown column type '{}': use date, numeric, binary, categorical or text",
                s
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!("Number".parse::<ColumnType>().unwrap(), ColumnType::Numeric);
        assert_eq!("bool".parse::<ColumnType>().unwrap(), ColumnType::Binary);
        assert!("matrix".parse::<ColumnType>().is_err());
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&ColumnType::Categorical).unwrap();
        assert_eq!(json, "\"categorical\"");
    }
}
