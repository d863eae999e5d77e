//! Lenient numeric coercion for spreadsheet-style values.

use crate::input::RawValue;

/// Currency symbols stripped before parsing.
const CURRENCY_SYMBOLS: &[char] = &['$', '€', '£', '¥', '₹', '₩', '₽', '¢'];

/// Coerce a raw value to a finite number.
///
/// Numbers pass through. Text is cleaned first: thousands separators,
/// currency symbols, percent signs and whitespace are removed, and
/// accounting parentheses `(1,200)` become a leading minus.
pub fn coerce_number(value: &RawValue) -> Option<f64> {
    match value {
        RawValue::Null => None,
        RawValue::Number(n) => n.is_finite().then_some(*n),
        RawValue::Text(s) => coerce_number_str(s),
    }
}

/// String form of [`coerce_number`].
pub fn coerce_number_str(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    let (negative, body) = match trimmed
        .strip_prefix('(')
        .and_then(|inner| inner.strip_suffix(')'))
    {
        Some(inner) => (true, inner),
        None => (false, trimmed),
    };

    let cleaned: String = body
        .chars()
        .filter(|c| !(*c == ',' || *c == '%' || c.is_whitespace() || CURRENCY_SYMBOLS.contains(c)))
        .collect();

    // Rust accepts "inf" and "nan"; spreadsheets do not
    if cleaned.is_empty() || cleaned.chars().any(|c| c.is_alphabetic() && c != 'e' && c != 'E') {
        return None;
    }

    let number: f64 = cleaned.parse().ok()?;
    if !number.is_finite() {
        return None;
    }

    Some(if negative { -number } else { number })
}
