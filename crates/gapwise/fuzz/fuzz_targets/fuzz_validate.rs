//! Fuzz target for series validation and repair.
//!
//! Arbitrary (series, date, value) triples must validate and repair without
//! panicking, and repaired data must contain no gaps.

#![no_main]

use arbitrary::Arbitrary;
use gapwise::{
    CriticalPolicy, ForecastConfig, GapChoices, Gapwise, NonCriticalPolicy, RawValue, Row, RowSet,
};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    frequency: u8,
    horizon: u8,
    rows: Vec<(u8, String, i16)>,
}

fuzz_target!(|input: Input| {
    let frequency = ["D", "W", "M", "Q", "Y"][input.frequency as usize % 5];
    let config = ForecastConfig::new("date", frequency, input.horizon as i64 % 8 + 1)
        .with_id_column("id")
        .with_target_column("y");

    let rows: Vec<Row> = input
        .rows
        .into_iter()
        .take(500)
        .map(|(id, date, y)| {
            let mut row = Row::new();
            row.insert("id".to_string(), RawValue::from((id % 4) as i64));
            row.insert("date".to_string(), RawValue::from(date));
            row.insert("y".to_string(), RawValue::from(y as i64));
            row
        })
        .collect();
    if rows.is_empty() {
        return;
    }
    let data = RowSet::new(vec!["id".into(), "date".into(), "y".into()], rows);

    let gapwise = Gapwise::new();
    let Ok(summary) = gapwise.validate(&data, &config) else {
        return;
    };
    let missing: usize = summary
        .series_analysis
        .iter()
        .map(|r| r.critical_breaks_count + r.non_critical_breaks_count)
        .sum();
    if missing > 10_000 {
        return;
    }

    let choices = GapChoices::new(CriticalPolicy::FillZeros, NonCriticalPolicy::MarkMissing);
    if let Ok(repaired) = gapwise.repair(&data, &summary, &choices, &config) {
        let again = RowSet::new(vec!["id".into(), "date".into(), "y".into()], repaired.rows);
        if let Ok(after) = gapwise.validate(&again, &config) {
            assert_eq!(after.category1_count, after.total_series);
        }
    }
});
