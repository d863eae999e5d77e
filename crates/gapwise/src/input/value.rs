//! Dynamically typed cell values.

use std::borrow::Cow;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// A single row: column name to raw value, in column order.
pub type Row = IndexMap<String, RawValue>;

/// A raw scalar as it arrives from CSV parsing or a JSON payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RawValue {
    #[default]
    Null,
    Number(f64),
    Text(String),
}

impl RawValue {
    /// Build a value from a CSV field. Empty fields become `Null`.
    pub fn from_field(field: &str) -> Self {
        if field.is_empty() {
            RawValue::Null
        } else {
            RawValue::Text(field.to_string())
        }
    }

    /// True for `Null` and for text that conventionally encodes a missing value.
    pub fn is_null(&self) -> bool {
        match self {
            RawValue::Null => true,
            RawValue::Number(n) => n.is_nan(),
            RawValue::Text(s) => is_null_text(s),
        }
    }

    /// Text form of the value; numbers print without a trailing `.0`.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            RawValue::Null => Cow::Borrowed(""),
            RawValue::Number(n) => Cow::Owned(format_number(*n)),
            RawValue::Text(s) => Cow::Borrowed(s.trim()),
        }
    }

    /// Returns the number if this value is already numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RawValue::Number(n) if n.is_finite() => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl From<f64> for RawValue {
    fn from(n: f64) -> Self {
        RawValue::Number(n)
    }
}

impl From<i64> for RawValue {
    fn from(n: i64) -> Self {
        RawValue::Number(n as f64)
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        RawValue::Text(s)
    }
}

impl From<Value> for RawValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => RawValue::Null,
            Value::Bool(b) => RawValue::Text(b.to_string()),
            Value::Number(n) => n.as_f64().map(RawValue::Number).unwrap_or(RawValue::Null),
            Value::String(s) => RawValue::Text(s),
            other => RawValue::Text(other.to_string()),
        }
    }
}

impl Serialize for RawValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RawValue::Null => serializer.serialize_none(),
            RawValue::Number(n) if n.fract() == 0.0 && n.abs() < 9.0e15 => {
                serializer.serialize_i64(*n as i64)
            }
            RawValue::Number(n) => serializer.serialize_f64(*n),
            RawValue::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl<'de> Deserialize<'de> for RawValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(RawValue::from)
    }
}

/// Check if a string represents a missing/null value.
pub fn is_null_text(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("na")
        || trimmed.eq_ignore_ascii_case("n/a")
        || trimmed.eq_ignore_ascii_case("nan")
        || trimmed.eq_ignore_ascii_case("null")
        || trimmed.eq_ignore_ascii_case("none")
        || trimmed.eq_ignore_ascii_case("nil")
        || trimmed == "."
        || trimmed == "-"
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 9.0e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}
