//! In-memory row sets and source metadata.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::value::{RawValue, Row};

/// Metadata about the source data file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// File name without path.
    pub file: String,
    /// Full path to the file.
    pub path: PathBuf,
    /// SHA-256 hash of the file contents.
    pub hash: String,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Detected format (csv, tsv, etc.).
    pub format: String,
    /// Number of data rows (excluding header).
    pub row_count: usize,
    /// Number of columns.
    pub column_count: usize,
    /// When the file was loaded.
    pub loaded_at: DateTime<Utc>,
}

impl SourceMetadata {
    /// Create metadata for a file that has been loaded.
    pub fn new(
        path: PathBuf,
        hash: String,
        size_bytes: u64,
        format: String,
        row_count: usize,
        column_count: usize,
    ) -> Self {
        let file = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            file,
            path,
            hash,
            size_bytes,
            format,
            row_count,
            column_count,
            loaded_at: Utc::now(),
        }
    }
}

/// Rows of one dataset plus the column order they were loaded with.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RowSet {
    /// Column headers in source order.
    pub headers: Vec<String>,
    /// Row data.
    pub rows: Vec<Row>,
}

impl RowSet {
    /// Create a row set with explicit headers.
    pub fn new(headers: Vec<String>, rows: Vec<Row>) -> Self {
        Self { headers, rows }
    }

    /// Create a row set from rows alone, collecting headers in first-seen order.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let headers = collect_headers(&rows);
        Self { headers, rows }
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Check whether a column exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }

    /// Get all values for a column. Missing cells yield `Null`.
    pub fn column_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a RawValue> + 'a {
        column_values(&self.rows, name)
    }
}

/// Values of one column across rows; rows lacking the column yield `Null`.
pub fn column_values<'a>(rows: &'a [Row], name: &'a str) -> impl Iterator<Item = &'a RawValue> + 'a {
    static NULL: RawValue = RawValue::Null;
    rows.iter().map(move |row| row.get(name).unwrap_or(&NULL))
}

/// Union of row keys in first-seen order.
pub fn collect_headers(rows: &[Row]) -> Vec<String> {
    let mut headers: indexmap::IndexSet<String> = indexmap::IndexSet::new();
    for row in rows {
        for key in row.keys() {
            if !headers.contains(key) {
                headers.insert(key.clone());
            }
        }
    }
    headers.into_iter().collect()
}
