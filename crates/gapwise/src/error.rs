//! Error types for the gapwise library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for gapwise operations.
#[derive(Debug, Error)]
pub enum GapwiseError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Empty file or no data to analyze.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// Frequency string that does not map to a calendar step.
    #[error("Unknown frequency '{0}': expected one of D, W, M, Q, Y")]
    InvalidFrequency(String),

    /// Forecast horizon that is not a positive integer.
    #[error("Invalid horizon {0}: must be a positive integer")]
    InvalidHorizon(i64),

    /// A required column was not selected or is absent from the data.
    #[error("Missing column '{column}': {context}")]
    MissingColumn { column: String, context: String },

    /// Any other violated precondition of a pipeline stage.
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// The remote validator could not be reached.
    #[error("Transport error after {attempts} attempt(s): {message}")]
    Transport { attempts: usize, message: String },

    /// The remote validator answered with an error payload.
    #[error("Validator rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GapwiseError {
    /// Whether retrying the same request could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GapwiseError::Transport { .. })
    }

    /// Whether this error is a fail-fast precondition violation.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            GapwiseError::EmptyData(_)
                | GapwiseError::InvalidFrequency(_)
                | GapwiseError::InvalidHorizon(_)
                | GapwiseError::MissingColumn { .. }
                | GapwiseError::Precondition(_)
        )
    }
}

/// Result type alias for gapwise operations.
pub type Result<T> = std::result::Result<T, GapwiseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_only_for_transport() {
        let transport = GapwiseError::Transport {
            attempts: 2,
            message: "connection refused".to_string(),
        };
        let rejected = GapwiseError::Rejected {
            status: 400,
            message: "bad frequency".to_string(),
        };

        assert!(transport.is_retryable());
        assert!(!rejected.is_retryable());
        assert!(!GapwiseError::InvalidHorizon(0).is_retryable());
    }

    #[test]
    fn test_precondition_classification() {
        assert!(GapwiseError::InvalidFrequency("X".into()).is_precondition());
        assert!(GapwiseError::EmptyData("no rows".into()).is_precondition());
        assert!(!GapwiseError::Config("bad".into()).is_precondition());
    }
}
