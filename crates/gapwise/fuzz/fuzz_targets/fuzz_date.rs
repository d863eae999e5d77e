//! Fuzz target for date parsing and column classification.
//!
//! Date parsing and classification must never panic, and any parsed
//! instant must survive a trip through its canonical form.

#![no_main]

use gapwise::RawValue;
use gapwise::inference::ColumnClassifier;
use gapwise::temporal::{format_canonical, parse_date_str};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10_000 {
        return;
    }

    if let Ok(content) = std::str::from_utf8(data) {
        if let Some(instant) = parse_date_str(content) {
            let canonical = format_canonical(&instant);
            assert_eq!(parse_date_str(&canonical), Some(instant));
        }

        let values: Vec<RawValue> = content.split(',').map(RawValue::from).collect();
        let _ = ColumnClassifier::new().classify("order_date", &values);
    }
});
