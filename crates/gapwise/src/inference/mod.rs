//! Column type inference.

mod classifier;
mod numeric;
mod sample;

pub use classifier::{ClassifierConfig, ColumnClassifier};
pub use numeric::{coerce_number, coerce_number_str};
pub use sample::ColumnSample;
