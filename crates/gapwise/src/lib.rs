//! Gapwise: data preparation for time-series forecasting.
//!
//! Gapwise profiles an uploaded table, checks every series for missing
//! periods, and repairs or aggregates the data before it is handed to a
//! forecasting model.
//!
//! # Stages
//!
//! - **Profile**: infer a type for every column and run type-specific
//!   quality checks
//! - **Validate**: group rows into series and classify gaps as critical
//!   (inside the window right before the forecast) or non-critical
//! - **Repair**: remove broken series or fill their gaps with zero rows
//! - **Aggregate**: reduce rows to one per series and period
//!
//! # Example
//!
//! ```no_run
//! use gapwise::{ForecastConfig, GapChoices, Gapwise};
//! use indexmap::IndexMap;
//!
//! let gapwise = Gapwise::new();
//! let (data, _) = gapwise.load("sales.csv").unwrap();
//! let profile = gapwise.profile(&data, &IndexMap::new());
//!
//! let config = ForecastConfig::new("date", "W", 4)
//!     .with_id_column("store")
//!     .with_target_column("sales");
//! let summary = gapwise.validate(&data, &config).unwrap();
//! println!("{} series with critical breaks", summary.category3_count);
//!
//! let prepared = gapwise
//!     .prepare(&data, &profile, &config, &GapChoices::default(), &IndexMap::new())
//!     .unwrap();
//! println!("{} rows ready", prepared.rows.len());
//! ```

pub mod error;
pub mod export;
pub mod inference;
pub mod input;
pub mod quality;
pub mod remote;
pub mod schema;
pub mod series;
pub mod temporal;
pub mod transform;

mod gapwise;

pub use crate::gapwise::{
    DataProfile, Gapwise, GapwiseConfig, ObservationCounts, PreparedData, ProfileSummary,
};
pub use error::{GapwiseError, Result};
pub use export::ExportFormat;
pub use input::{RawValue, Row, RowSet, SourceMetadata};
pub use quality::{ColumnQuality, Observation, ObservationType, Severity};
pub use remote::ValidationClient;
pub use schema::{ClassificationOverlay, ColumnClassification, ColumnType};
pub use series::{ForecastConfig, SeriesBreakReport, SeriesCategory, ValidationSummary};
pub use temporal::Frequency;
pub use transform::{AggregationMethod, CriticalPolicy, GapChoices, NonCriticalPolicy};
