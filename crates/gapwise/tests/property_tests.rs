//! Property-based tests for date parsing, number coercion and series
//! validation.
//!
//! # Running Property Tests
//!
//! ```bash
//! cargo test -p gapwise --test property_tests
//!
//! # More cases (slower but more thorough)
//! PROPTEST_CASES=10000 cargo test -p gapwise --test property_tests
//! ```

use chrono::{Datelike, Days, NaiveDate};
use proptest::prelude::*;

use gapwise::inference::coerce_number_str;
use gapwise::input::{RawValue, Row, RowSet};
use gapwise::series::SeriesValidator;
use gapwise::temporal::{format_canonical, format_date, parse_date_str};
use gapwise::{ForecastConfig, Frequency};

// =============================================================================
// Test Strategies
// =============================================================================

/// Calendar dates between 1900 and 2199.
fn calendar_date() -> impl Strategy<Value = NaiveDate> {
    (0u64..109_500).prop_map(|offset| {
        NaiveDate::from_ymd_opt(1900, 1, 1)
            .and_then(|d| d.checked_add_days(Days::new(offset)))
            .unwrap()
    })
}

fn frequency() -> impl Strategy<Value = Frequency> {
    prop_oneof![
        Just(Frequency::Daily),
        Just(Frequency::Weekly),
        Just(Frequency::Monthly),
        Just(Frequency::Quarterly),
        Just(Frequency::Yearly),
    ]
}

/// Strings that look a bit like dates, plus arbitrary noise.
fn date_like() -> impl Strategy<Value = String> {
    prop_oneof![
        "[0-9]{1,4}[/.-][0-9]{1,2}[/.-][0-9]{1,4}",
        "[0-9]{4}-[0-9]{2}-[0-9]{2}T[0-9]{2}:[0-9]{2}(:[0-9]{2})?(Z|[+-][0-9]{2}:[0-9]{2})?",
        "[0-9]{5,8}",
        "[A-Za-z]{3,9} [0-9]{1,2},? [0-9]{4}",
        "\\PC{0,40}",
    ]
}

// =============================================================================
// Date parsing
// =============================================================================

proptest! {
    #[test]
    fn iso_dates_round_trip(date in calendar_date()) {
        let parsed = parse_date_str(&format_date(date)).unwrap();
        prop_assert_eq!(parsed.date_naive(), date);
    }

    #[test]
    fn us_slash_dates_parse_month_first(date in calendar_date()) {
        let text = format!("{:02}/{:02}/{}", date.month(), date.day(), date.year());
        let parsed = parse_date_str(&text).unwrap();
        prop_assert_eq!(parsed.date_naive(), date);
    }

    #[test]
    fn parse_never_panics(text in date_like()) {
        let _ = parse_date_str(&text);
    }

    #[test]
    fn canonical_form_is_stable(text in date_like()) {
        if let Some(instant) = parse_date_str(&text) {
            let canonical = format_canonical(&instant);
            let reparsed = parse_date_str(&canonical);
            prop_assert_eq!(reparsed, Some(instant));
        }
    }

    #[test]
    fn coerce_never_panics(text in "\\PC{0,30}") {
        if let Some(n) = coerce_number_str(&text) {
            prop_assert!(n.is_finite());
        }
    }

    #[test]
    fn thousands_separators_are_ignored(n in 0u32..10_000_000) {
        let grouped = n
            .to_string()
            .as_bytes()
            .rchunks(3)
            .rev()
            .map(|c| std::str::from_utf8(c).unwrap())
            .collect::<Vec<_>>()
            .join(",");
        prop_assert_eq!(coerce_number_str(&grouped), Some(n as f64));
    }
}

// =============================================================================
// Frequencies
// =============================================================================

proptest! {
    #[test]
    fn period_start_is_idempotent(date in calendar_date(), freq in frequency()) {
        let start = freq.period_start(date);
        prop_assert!(start <= date);
        prop_assert_eq!(freq.period_start(start), start);
    }

    #[test]
    fn stepping_lands_on_period_starts(date in calendar_date(), freq in frequency(), n in 1i64..30) {
        let start = freq.period_start(date);
        let forward = freq.step(start, n).unwrap();
        prop_assert!(forward > start);
        prop_assert_eq!(freq.period_start(forward), forward);
        prop_assert_eq!(freq.step(forward, -n), Some(start));
    }
}

// =============================================================================
// Series validation
// =============================================================================

fn rows_from_offsets(offsets: &[(u8, u16)]) -> RowSet {
    let base = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    let rows = offsets
        .iter()
        .map(|(series, offset)| {
            let date = base.checked_add_days(Days::new(*offset as u64)).unwrap();
            let mut row = Row::new();
            row.insert("date".to_string(), RawValue::Text(format_date(date)));
            row.insert("id".to_string(), RawValue::Text(format!("s{}", series % 4)));
            row.insert("y".to_string(), RawValue::Number(1.0));
            row
        })
        .collect();
    RowSet::from_rows(rows)
}

proptest! {
    #[test]
    fn validation_invariants(
        offsets in prop::collection::vec((any::<u8>(), 0u16..400), 1..80),
        freq in prop_oneof![Just("D"), Just("W"), Just("M")],
        horizon in 1i64..6,
    ) {
        let data = rows_from_offsets(&offsets);
        let config = ForecastConfig::new("date", freq, horizon).with_id_column("id");
        let summary = SeriesValidator::new().validate(&data, &config).unwrap();

        prop_assert_eq!(summary.processed_records, offsets.len());
        prop_assert_eq!(
            summary.category1_count + summary.category2_count + summary.category3_count,
            summary.total_series
        );

        let mut previous: Option<&str> = None;
        for report in &summary.series_analysis {
            prop_assert!(previous.is_none_or(|p| p < report.series_id.as_str()));
            previous = Some(&report.series_id);

            let window_start = report.critical_period_start.unwrap();
            let first = report.first_period.unwrap();
            let last = report.last_period.unwrap();
            for date in &report.critical_break_dates {
                prop_assert!(*date >= window_start);
                prop_assert!(*date < last);
            }
            for date in &report.non_critical_break_dates {
                prop_assert!(*date < window_start);
                prop_assert!(*date > first);
            }
            prop_assert_eq!(report.has_critical_breaks, !report.critical_break_dates.is_empty());
        }
    }
}
