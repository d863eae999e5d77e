//! Input loading and raw value handling.

mod parser;
mod source;
mod value;

pub use parser::{Parser, ParserConfig};
pub use source::{collect_headers, column_values, RowSet, SourceMetadata};
pub use value::{is_null_text, RawValue, Row};
