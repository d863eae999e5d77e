//! Gap repair and period aggregation of validated series.

mod aggregate;
mod operations;
mod repair;

pub use aggregate::Aggregator;
pub use operations::{
    AggregationMethod, AggregationOutcome, AggregationSummary, CriticalPolicy, GapChoices,
    MISSING_FLAG_COLUMN, NonCriticalPolicy, RepairAction, RepairOutcome, RepairSummary,
};
pub use repair::GapRepairer;
