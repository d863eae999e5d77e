//! Bounded column samples.

use crate::input::RawValue;

/// Fixed seed so the same column always yields the same sample.
const SAMPLE_SEED: u64 = 0x6761_7077_6973_6521;

/// Non-null values drawn from a column, with null and total counts.
///
/// The first `capacity` non-null values are kept in order; later values
/// replace earlier ones by reservoir sampling with a fixed seed.
#[derive(Debug, Clone, Default)]
pub struct ColumnSample {
    values: Vec<RawValue>,
    null_count: usize,
    total_count: usize,
}

impl ColumnSample {
    /// Sample up to `capacity` non-null values.
    pub fn collect<'a>(values: impl IntoIterator<Item = &'a RawValue>, capacity: usize) -> Self {
        let mut rng = fastrand::Rng::with_seed(SAMPLE_SEED);
        let mut sample = Vec::with_capacity(capacity.min(1024));
        let mut null_count = 0;
        let mut total_count = 0;
        let mut seen = 0usize;

        for value in values {
            total_count += 1;
            if value.is_null() {
                null_count += 1;
                continue;
            }

            seen += 1;
            if sample.len() < capacity {
                sample.push(value.clone());
            } else {
                let j = rng.usize(0..seen);
                if j < capacity {
                    sample[j] = value.clone();
                }
            }
        }

        Self {
            values: sample,
            null_count,
            total_count,
        }
    }

    /// Sampled non-null values.
    pub fn values(&self) -> &[RawValue] {
        &self.values
    }

    /// Nulls seen in the full column.
    pub fn null_count(&self) -> usize {
        self.null_count
    }

    /// Values seen in the full column, nulls included.
    pub fn total_count(&self) -> usize {
        self.total_count
    }

    /// Whether no non-null value was seen.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of sampled non-null values.
    pub fn len(&self) -> usize {
        self.values.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_nulls_and_keeps_order() {
        let values: Vec<RawValue> = ["a", "", "b", "NA", "c"].iter().map(|s| RawValue::from(*s)).collect();
        let sample = ColumnSample::collect(&values, 10);

        assert_eq!(sample.null_count(), 2);
        assert_eq!(sample.total_count(), 5);
        assert_eq!(sample.values(), &[RawValue::from("a"), RawValue::from("b"), RawValue::from("c")]);
    }

    #[test]
    fn test_capacity_is_respected_and_deterministic() {
        let values: Vec<RawValue> = (0..500).map(|i| RawValue::Number(i as f64)).collect();
        let first = ColumnSample::collect(&values, 50);
        let second = ColumnSample::collect(&values, 50);

        assert_eq!(first.len(), 50);
        assert_eq!(first.total_count(), 500);
        assert_eq!(first.values(), second.values());
    }
}
