//! Column types, classifications and the classification overlay.

mod column;
mod overlay;
mod types;

pub use column::ColumnClassification;
pub use overlay::ClassificationOverlay;
pub use types::ColumnType;
