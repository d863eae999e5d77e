//! Forecast configuration shared by validation, repair and aggregation.

use serde::{Deserialize, Serialize};

use crate::error::{GapwiseError, Result};
use crate::input::RowSet;
use crate::temporal::Frequency;

/// Trailing window, in multiples of the horizon, whose gaps are critical.
pub const DEFAULT_CRITICAL_WINDOW_MULTIPLIER: u32 = 2;

/// Current version of the [`ForecastConfig`] layout.
pub const FORECAST_CONFIG_VERSION: u32 = 1;

/// Series name used when no id column is configured.
pub const OVERALL_SERIES_ID: &str = "overall";

/// Column selections and forecast parameters for one dataset.
///
/// The frequency is kept as the user typed it and the horizon as a signed
/// integer so that bad input survives deserialization and is rejected by
/// [`ForecastConfig::validate`] with a descriptive error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    pub date_column: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_column: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_column: Option<String>,
    pub frequency: String,
    pub horizon: i64,
    #[serde(default = "default_multiplier")]
    pub critical_window_multiplier: u32,
}

fn default_version() -> u32 {
    FORECAST_CONFIG_VERSION
}

fn default_multiplier() -> u32 {
    DEFAULT_CRITICAL_WINDOW_MULTIPLIER
}

impl ForecastConfig {
    /// Create a config with no id or target column.
    pub fn new(date_column: impl Into<String>, frequency: impl Into<String>, horizon: i64) -> Self {
        Self {
            version: FORECAST_CONFIG_VERSION,
            date_column: date_column.into(),
            target_column: None,
            id_column: None,
            frequency: frequency.into(),
            horizon,
            critical_window_multiplier: DEFAULT_CRITICAL_WINDOW_MULTIPLIER,
        }
    }

    /// Set the series id column.
    pub fn with_id_column(mut self, column: impl Into<String>) -> Self {
        self.id_column = Some(column.into());
        self
    }

    /// Set the forecast target column.
    pub fn with_target_column(mut self, column: impl Into<String>) -> Self {
        self.target_column = Some(column.into());
        self
    }

    /// Override the critical window multiplier.
    pub fn with_critical_window_multiplier(mut self, multiplier: u32) -> Self {
        self.critical_window_multiplier = multiplier;
        self
    }

    /// Check the parameters and resolve them into a [`ValidatedConfig`].
    pub fn validate(&self) -> Result<ValidatedConfig> {
        let frequency: Frequency = self.frequency.parse()?;

        if self.horizon < 1 {
            return Err(GapwiseError::InvalidHorizon(self.horizon));
        }
        let horizon =
            u32::try_from(self.horizon).map_err(|_| GapwiseError::InvalidHorizon(self.horizon))?;

        if self.critical_window_multiplier == 0 {
            return Err(GapwiseError::Config(
                "critical window multiplier must be at least 1".to_string(),
            ));
        }
        if self.date_column.trim().is_empty() {
            return Err(GapwiseError::MissingColumn {
                column: String::new(),
                context: "no date column selected".to_string(),
            });
        }

        let required_length = horizon
            .checked_mul(self.critical_window_multiplier)
            .ok_or_else(|| GapwiseError::Config("critical window is too large".to_string()))?;

        Ok(ValidatedConfig {
            date_column: self.date_column.clone(),
            target_column: self.target_column.clone(),
            id_column: self.id_column.clone(),
            frequency,
            horizon,
            required_length,
        })
    }

    /// [`validate`](Self::validate), then check the selected columns exist.
    pub fn validate_against(&self, data: &RowSet) -> Result<ValidatedConfig> {
        let config = self.validate()?;
        config.check_columns(data)?;
        Ok(config)
    }
}

/// A [`ForecastConfig`] whose parameters passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedConfig {
    pub date_column: String,
    pub target_column: Option<String>,
    pub id_column: Option<String>,
    pub frequency: Frequency,
    pub horizon: u32,
    /// Length of the critical window: horizon times the multiplier.
    pub required_length: u32,
}

impl ValidatedConfig {
    /// Fail unless the data is non-empty and holds every selected column.
    pub fn check_columns(&self, data: &RowSet) -> Result<()> {
        if data.row_count() == 0 {
            return Err(GapwiseError::EmptyData("dataset has no rows".to_string()));
        }

        let required = std::iter::once((&self.date_column, "date column"))
            .chain(self.id_column.iter().map(|c| (c, "id column")));
        for (column, role) in required {
            if !data.has_column(column) {
                return Err(GapwiseError::MissingColumn {
                    column: column.clone(),
                    context: format!("{} not found in data", role),
                });
            }
        }
        Ok(())
    }

    /// Configured id column, if any.
    pub fn series_id_column(&self) -> Option<&str> {
        self.id_column.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config() {
        let config = ForecastConfig::new("date", "monthly", 3).with_id_column("store");
        let validated = config.validate().unwrap();

        assert_eq!(validated.frequency, Frequency::Monthly);
        assert_eq!(validated.horizon, 3);
        assert_eq!(validated.required_length, 6);
        assert_eq!(validated.series_id_column(), Some("store"));
    }

    #[test]
    fn test_invalid_frequency() {
        let err = ForecastConfig::new("date", "X", 1).validate().unwrap_err();
        assert!(matches!(err, GapwiseError::InvalidFrequency(_)));
        assert!(err.is_precondition());
    }

    #[test]
    fn test_invalid_horizon() {
        for horizon in [0, -4] {
            let err = ForecastConfig::new("date", "D", horizon).validate().unwrap_err();
            assert!(matches!(err, GapwiseError::InvalidHorizon(h) if h == horizon));
        }
    }

    #[test]
    fn test_multiplier_override() {
        let validated = ForecastConfig::new("date", "D", 2)
            .with_critical_window_multiplier(3)
            .validate()
            .unwrap();
        assert_eq!(validated.required_length, 6);
    }

    #[test]
    fn test_missing_columns() {
        let data = crate::input::Parser::new()
            .parse_str("day,sales\n2024-01-01,1\n")
            .unwrap();

        let err = ForecastConfig::new("date", "D", 1).validate_against(&data).unwrap_err();
        assert!(matches!(err, GapwiseError::MissingColumn { ref column, .. } if column == "date"));

        let err = ForecastConfig::new("day", "D", 1)
            .with_id_column("store")
            .validate_against(&data)
            .unwrap_err();
        assert!(matches!(err, GapwiseError::MissingColumn { ref column, .. } if column == "store"));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let json = r#"{"dateColumn":"date","frequency":"W","horizon":4}"#;
        let config: ForecastConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.version, FORECAST_CONFIG_VERSION);
        assert_eq!(config.critical_window_multiplier, DEFAULT_CRITICAL_WINDOW_MULTIPLIER);
        assert_eq!(config.id_column, None);
    }
}
