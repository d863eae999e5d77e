//! Series integrity validation against a forecast frequency and horizon.

mod config;
mod report;
mod validator;

pub use config::{
    DEFAULT_CRITICAL_WINDOW_MULTIPLIER, FORECAST_CONFIG_VERSION, ForecastConfig, OVERALL_SERIES_ID,
    ValidatedConfig,
};
pub use report::{SeriesBreakReport, SeriesCategory, ValidationSummary};
pub use validator::{
    Series, SeriesGrouping, SeriesValidator, analyze_series, group_series, row_period, series_key,
};
