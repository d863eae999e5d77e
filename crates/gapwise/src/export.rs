//! Serialization of prepared rows to CSV, TSV or JSON.

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GapwiseError, Result};
use crate::input::{Row, collect_headers};

/// Output file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Tsv,
    Json,
}

impl ExportFormat {
    /// Conventional file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Tsv => "tsv",
            ExportFormat::Json => "json",
        }
    }

    /// Guess the format from a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }
}

impl FromStr for ExportFormat {
    type Err = GapwiseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "tsv" | "tab" => Ok(ExportFormat::Tsv),
            "json" => Ok(ExportFormat::Json),
            _ => Err(GapwiseError::Config(format!("Unknown export format: {}", s))),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Write rows to any writer. Columns follow first-seen order across rows;
/// cells missing from a row are left empty.
pub fn write_rows<W: Write>(writer: W, rows: &[Row], format: ExportFormat) -> Result<()> {
    match format {
        ExportFormat::Json => {
            serde_json::to_writer_pretty(writer, rows)?;
            Ok(())
        }
        ExportFormat::Csv => write_delimited(writer, rows, b','),
        ExportFormat::Tsv => write_delimited(writer, rows, b'\t'),
    }
}

fn write_delimited<W: Write>(writer: W, rows: &[Row], delimiter: u8) -> Result<()> {
    let headers = collect_headers(rows);
    let mut out = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);

    out.write_record(&headers)?;
    for row in rows {
        out.write_record(
            headers
                .iter()
                .map(|h| row.get(h).map(|v| v.as_text().into_owned()).unwrap_or_default()),
        )?;
    }
    out.flush().map_err(|e| GapwiseError::Csv(e.into()))?;
    Ok(())
}

/// Render rows to a string.
pub fn rows_to_string(rows: &[Row], format: ExportFormat) -> Result<String> {
    let mut buffer = Vec::new();
    write_rows(&mut buffer, rows, format)?;
    String::from_utf8(buffer).map_err(|e| GapwiseError::Config(format!("non UTF-8 output: {}", e)))
}

/// Write rows to a file.
pub fn export_rows(path: impl AsRef<Path>, rows: &[Row], format: ExportFormat) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| GapwiseError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    write_rows(BufWriter::new(file), rows, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::RawValue;

    fn rows() -> Vec<Row> {
        let mut first = Row::new();
        first.insert("date".to_string(), RawValue::from("2024-01-01"));
        first.insert("sales".to_string(), RawValue::Number(15.0));
        let mut second = Row::new();
        second.insert("date".to_string(), RawValue::from("2024-02-01"));
        second.insert("sales".to_string(), RawValue::Number(2.5));
        second.insert("is_missing".to_string(), RawValue::Number(1.0));
        vec![first, second]
    }

    #[test]
    fn test_csv_output() {
        let text = rows_to_string(&rows(), ExportFormat::Csv).unwrap();
        assert_eq!(text, "date,sales,is_missing\n2024-01-01,15,\n2024-02-01,2.5,1\n");
    }

    #[test]
    fn test_tsv_output() {
        let text = rows_to_string(&rows(), ExportFormat::Tsv).unwrap();
        assert!(text.starts_with("date\tsales\tis_missing\n"));
    }

    #[test]
    fn test_json_output() {
        let text = rows_to_string(&rows(), ExportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value[0]["sales"], 15);
        assert_eq!(value[1]["is_missing"], 1);
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(ExportFormat::from_path(Path::new("out.TSV")), Some(ExportFormat::Tsv));
        assert_eq!(ExportFormat::from_path(Path::new("out")), None);
    }
}
