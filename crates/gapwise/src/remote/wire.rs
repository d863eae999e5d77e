//! JSON shapes of the validation endpoint.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::input::{Row, RowSet};
use crate::series::{ForecastConfig, SeriesValidator, ValidationSummary};

/// Path of the series validation endpoint.
pub const VALIDATE_SERIES_PATH: &str = "/api/validate-series";

/// Forecast parameters as the endpoint names them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_column: Option<String>,
    pub timestamp_column: String,
    pub time_granularity: String,
    pub prediction_length: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_column: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critical_window_multiplier: Option<u32>,
}

impl From<&ForecastConfig> for WireConfig {
    fn from(config: &ForecastConfig) -> Self {
        Self {
            id_column: config.id_column.clone(),
            timestamp_column: config.date_column.clone(),
            time_granularity: config.frequency.clone(),
            prediction_length: config.horizon,
            target_column: config.target_column.clone(),
            critical_window_multiplier: Some(config.critical_window_multiplier),
        }
    }
}

impl From<WireConfig> for ForecastConfig {
    fn from(wire: WireConfig) -> Self {
        let mut config = ForecastConfig::new(
            wire.timestamp_column,
            wire.time_granularity,
            wire.prediction_length,
        );
        config.id_column = wire.id_column;
        config.target_column = wire.target_column;
        if let Some(multiplier) = wire.critical_window_multiplier {
            config.critical_window_multiplier = multiplier;
        }
        config
    }
}

/// Body of a validation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationRequest {
    pub data: Vec<Row>,
    pub config: WireConfig,
}

impl ValidationRequest {
    pub fn new(data: Vec<Row>, config: &ForecastConfig) -> Self {
        Self {
            data,
            config: WireConfig::from(config),
        }
    }

    /// Run the validator on this request's rows.
    pub fn execute(self) -> Result<ValidationResponse> {
        let config = ForecastConfig::from(self.config);
        let data = RowSet::from_rows(self.data);
        let summary = SeriesValidator::new().validate(&data, &config)?;
        Ok(ValidationResponse::new(summary))
    }
}

/// Successful validation payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResponse {
    pub success: bool,
    #[serde(flatten)]
    pub summary: ValidationSummary,
}

impl ValidationResponse {
    pub fn new(summary: ValidationSummary) -> Self {
        Self {
            success: true,
            summary,
        }
    }
}

/// Failure payload, sent with a non-2xx status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
