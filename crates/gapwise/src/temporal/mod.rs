//! Date parsing and calendar frequency arithmetic.

mod frequency;
mod parse;

pub use frequency::Frequency;
pub use parse::{format_canonical, format_date, has_time_component, parse_date, parse_date_str};
