//! Column quality analysis: descriptive statistics and advisory findings.
//!
//! Findings are graded by [`Severity`]. Only a column with no parseable
//! values at all produces an `Issue`; everything else is a warning or a
//! suggestion and never blocks the pipeline.

mod analyzer;
mod observation;
mod stats;

pub use analyzer::{ColumnQuality, QualityAnalyzer, QualityConfig};
pub use observation::{Evidence, Observation, ObservationType, Severity};
pub use stats::{
    ApparentFrequency, CategoryStatistics, ColumnStatistics, DateStatistics, NumericStatistics,
    ValueCount,
};
