//! Date parsing across heterogeneous string formats.
//!
//! Every successful parse yields a UTC instant. Date-only inputs land on UTC
//! midnight so later day/week/month arithmetic never drifts across time zones.
//!
//! Formats are tried in priority order:
//!
//! 1. strict ISO 8601 (`2024-01-05`, `2024-01-05T10:30:00`, `...Z`, `...+02:00`; a space may replace the `T`)
//! 2. numeric triples separated by `/`, `-` or `.` (`Y/M/D`, `M/D/Y`, `D/M/Y`)
//! 3. spreadsheet serial numbers (five or more digits, epoch 1899-12-30)
//! 4. a fixed list of common textual formats
//!
//! Ambiguous triples where both leading components are at most 12 are read
//! month first (`03/04/2024` is March 4th). A leading component above 12
//! forces day first.

use chrono::{
    DateTime, Days, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Timelike, Utc,
};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::input::RawValue;

/// Day zero of the spreadsheet serial calendar.
const SERIAL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

/// Largest serial number that still maps to a four-digit year (9999-12-31).
const MAX_SERIAL: u64 = 2_958_465;

static ISO_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid ISO date regex"));

static ISO_DATETIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}(:\d{2}(\.\d+)?)?(Z|[+-]\d{2}:?\d{2})?$")
        .expect("valid ISO datetime regex")
});

static NUMERIC_TRIPLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(\d{1,4})([/.\-])(\d{1,2})([/.\-])(\d{1,4})(?:[ T](\d{1,2}):(\d{2})(?::(\d{2}))?)?$",
    )
    .expect("valid numeric date regex")
});

static SERIAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{5,}(\.\d+)?$").expect("valid serial regex"));

/// Fallback datetime formats (with time of day).
const FALLBACK_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

/// Fallback date-only formats.
const FALLBACK_DATE_FORMATS: &[&str] = &[
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%d %b %Y",
    "%d %B %Y",
    "%d-%b-%Y",
    "%d-%b-%y",
    "%a, %d %b %Y",
];

/// Parse a raw cell into a UTC instant.
///
/// Numbers are only accepted as spreadsheet serials. Returns `None` for
/// anything unparseable; never panics.
pub fn parse_date(value: &RawValue) -> Option<DateTime<Utc>> {
    match value {
        RawValue::Null => None,
        RawValue::Number(n) => {
            if n.is_finite() && *n >= 10_000.0 && n.fract() == 0.0 {
                from_serial(*n as u64)
            } else {
                None
            }
        }
        RawValue::Text(s) => parse_date_str(s),
    }
}

/// Parse a string into a UTC instant.
pub fn parse_date_str(value: &str) -> Option<DateTime<Utc>> {
    let s = value.trim();
    if s.is_empty() {
        return None;
    }

    parse_iso(s)
        .or_else(|| parse_numeric_triple(s))
        .or_else(|| parse_serial(s))
        .or_else(|| parse_fallback(s))
}

/// Canonical string form of a parsed instant.
///
/// Midnight instants print as `YYYY-MM-DD`; others as RFC 3339 in UTC.
/// Feeding the output back to [`parse_date_str`] yields the same instant.
pub fn format_canonical(instant: &DateTime<Utc>) -> String {
    if instant.time() == NaiveTime::MIN {
        instant.date_naive().format("%Y-%m-%d").to_string()
    } else {
        instant.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }
}

/// Format a calendar date the way rows carry period starts.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn parse_iso(s: &str) -> Option<DateTime<Utc>> {
    if ISO_DATE.is_match(s) {
        return NaiveDate::parse_from_str(s, "%Y-%m-%d").ok().map(midnight);
    }

    if !ISO_DATETIME.is_match(s) {
        return None;
    }
    // A space may stand in for the `T` separator
    let normalized = s.replacen(' ', "T", 1);
    let s = normalized.as_str();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M%#z"] {
        if let Ok(dt) = DateTime::parse_from_str(s, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    let naive = s.trim_end_matches('Z');
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(naive, format) {
            return Some(dt.and_utc());
        }
    }

    None
}

fn parse_numeric_triple(s: &str) -> Option<DateTime<Utc>> {
    let caps = NUMERIC_TRIPLE.captures(s)?;
    if caps[2] != caps[4] {
        return None;
    }

    let first = &caps[1];
    let middle: u32 = caps[3].parse().ok()?;
    let last = &caps[5];

    let (year, month, day) = if first.len() == 4 {
        if last.len() > 2 {
            return None;
        }
        (first.parse::<i32>().ok()?, middle, last.parse::<u32>().ok()?)
    } else {
        if first.len() > 2 || !(last.len() == 2 || last.len() == 4) {
            return None;
        }
        let a: u32 = first.parse().ok()?;
        let year = expand_year(last)?;
        if a > 12 {
            (year, middle, a)
        } else {
            (year, a, middle)
        }
    };

    let date = NaiveDate::from_ymd_opt(year, month, day)?;

    match caps.get(6) {
        None => Some(midnight(date)),
        Some(hour) => {
            let hour: u32 = hour.as_str().parse().ok()?;
            let minute: u32 = caps.get(7)?.as_str().parse().ok()?;
            let second: u32 = caps
                .get(8)
                .map(|m| m.as_str().parse().ok())
                .unwrap_or(Some(0))?;
            let time = NaiveTime::from_hms_opt(hour, minute, second)?;
            Some(date.and_time(time).and_utc())
        }
    }
}

/// Two-digit years pivot at 50: `49` is 2049, `50` is 1950.
fn expand_year(text: &str) -> Option<i32> {
    let year: i32 = text.parse().ok()?;
    if text.len() == 2 {
        Some(if year >= 50 { 1900 + year } else { 2000 + year })
    } else {
        Some(year)
    }
}

fn parse_serial(s: &str) -> Option<DateTime<Utc>> {
    if !SERIAL.is_match(s) {
        return None;
    }
    let whole = s.split('.').next()?;
    from_serial(whole.parse().ok()?)
}

fn from_serial(days: u64) -> Option<DateTime<Utc>> {
    if days > MAX_SERIAL {
        return None;
    }
    let (y, m, d) = SERIAL_EPOCH;
    NaiveDate::from_ymd_opt(y, m, d)?
        .checked_add_days(Days::new(days))
        .map(midnight)
}

fn parse_fallback(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%d %H:%M:%S%:z", "%Y-%m-%d %H:%M:%S%#z"] {
        if let Ok(dt) = DateTime::parse_from_str(s, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    for format in FALLBACK_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt.and_utc());
        }
    }

    for format in FALLBACK_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return Some(midnight(date));
        }
    }

    None
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// True when a parsed instant carries a time of day other than midnight.
pub fn has_time_component(instant: &DateTime<Utc>) -> bool {
    instant.num_seconds_from_midnight() != 0 || instant.nanosecond() != 0
}
