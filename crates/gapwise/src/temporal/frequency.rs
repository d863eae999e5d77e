//! Calendar frequencies and period arithmetic.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::GapwiseError;

/// Sampling cadence of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl Frequency {
    /// Single-letter code used on the wire.
    pub fn code(&self) -> &'static str {
        match self {
            Frequency::Daily => "D",
            Frequency::Weekly => "W",
            Frequency::Monthly => "M",
            Frequency::Quarterly => "Q",
            Frequency::Yearly => "Y",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Quarterly => "quarterly",
            Frequency::Yearly => "yearly",
        }
    }

    /// Whether rows must be bucketed before a series is one row per period.
    pub fn is_coarser_than_daily(&self) -> bool {
        !matches!(self, Frequency::Daily)
    }

    /// Move `date` by `n` steps (negative steps go backward).
    ///
    /// Month-based steps are computed from the anchor in one jump, so day
    /// clamping (Jan 31 -> Feb 29) never accumulates across steps.
    pub fn step(&self, date: NaiveDate, n: i64) -> Option<NaiveDate> {
        let magnitude = n.unsigned_abs();
        match self {
            Frequency::Daily => shift_days(date, n >= 0, magnitude),
            Frequency::Weekly => shift_days(date, n >= 0, magnitude.checked_mul(7)?),
            Frequency::Monthly => shift_months(date, n >= 0, magnitude),
            Frequency::Quarterly => shift_months(date, n >= 0, magnitude.checked_mul(3)?),
            Frequency::Yearly => shift_months(date, n >= 0, magnitude.checked_mul(12)?),
        }
    }

    /// Canonical start of the period containing `date`.
    ///
    /// Daily periods are the day itself; weeks start on ISO Monday; months,
    /// quarters and years start on their first day.
    pub fn period_start(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Frequency::Daily => date,
            Frequency::Weekly => {
                let offset = date.weekday().num_days_from_monday() as u64;
                date.checked_sub_days(Days::new(offset)).unwrap_or(date)
            }
            Frequency::Monthly => date.with_day(1).unwrap_or(date),
            Frequency::Quarterly => {
                let month = (date.month0() / 3) * 3 + 1;
                NaiveDate::from_ymd_opt(date.year(), month, 1).unwrap_or(date)
            }
            Frequency::Yearly => NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date),
        }
    }

    /// Every period start from `start` to `end`, both inclusive.
    ///
    /// Both bounds are expected to be period starts already.
    pub fn sequence(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        let mut dates = Vec::new();
        let mut k = 0;
        while let Some(date) = self.step(start, k) {
            if date > end {
                break;
            }
            dates.push(date);
            k += 1;
        }
        dates
    }
}

fn shift_days(date: NaiveDate, forward: bool, days: u64) -> Option<NaiveDate> {
    if forward {
        date.checked_add_days(Days::new(days))
    } else {
        date.checked_sub_days(Days::new(days))
    }
}

fn shift_months(date: NaiveDate, forward: bool, months: u64) -> Option<NaiveDate> {
    let months = Months::new(u32::try_from(months).ok()?);
    if forward {
        date.checked_add_months(months)
    } else {
        date.checked_sub_months(months)
    }
}

impl FromStr for Frequency {
    type Err = GapwiseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "d" | "day" | "daily" => Ok(Frequency::Daily),
            "w" | "week" | "weekly" => Ok(Frequency::Weekly),
            "m" | "month" | "monthly" => Ok(Frequency::Monthly),
            "q" | "quarter" | "quarterly" => Ok(Frequency::Quarterly),
            "y" | "a" | "year" | "yearly" | "annual" | "annually" => Ok(Frequency::Yearly),
            _ => Err(GapwiseError::InvalidFrequency(s.to_string())),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for Frequency {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for Frequency {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_aliases_case_insensitive() {
        assert_eq!("D".parse::<Frequency>().unwrap(), Frequency::Daily);
        assert_eq!("weekly".parse::<Frequency>().unwrap(), Frequency::Weekly);
        assert_eq!("Month".parse::<Frequency>().unwrap(), Frequency::Monthly);
        assert_eq!("q".parse::<Frequency>().unwrap(), Frequency::Quarterly);
        assert_eq!("ANNUAL".parse::<Frequency>().unwrap(), Frequency::Yearly);
        assert!(matches!(
            "X".parse::<Frequency>(),
            Err(GapwiseError::InvalidFrequency(_))
        ));
    }

    #[test]
    fn test_steps_forward_and_back() {
        assert_eq!(Frequency::Daily.step(d(2024, 1, 5), -2), Some(d(2024, 1, 3)));
        assert_eq!(Frequency::Weekly.step(d(2024, 1, 1), 2), Some(d(2024, 1, 15)));
        assert_eq!(Frequency::Monthly.step(d(2024, 1, 31), 1), Some(d(2024, 2, 29)));
        assert_eq!(Frequency::Monthly.step(d(2024, 1, 31), 2), Some(d(2024, 3, 31)));
        assert_eq!(Frequency::Quarterly.step(d(2024, 4, 1), -2), Some(d(2023, 10, 1)));
        assert_eq!(Frequency::Yearly.step(d(2024, 2, 29), 1), Some(d(2025, 2, 28)));
    }

    #[test]
    fn test_period_start() {
        // 2024-01-10 is a Wednesday
        assert_eq!(Frequency::Weekly.period_start(d(2024, 1, 10)), d(2024, 1, 8));
        assert_eq!(Frequency::Weekly.period_start(d(2024, 1, 8)), d(2024, 1, 8));
        assert_eq!(Frequency::Monthly.period_start(d(2024, 2, 17)), d(2024, 2, 1));
        assert_eq!(Frequency::Quarterly.period_start(d(2024, 8, 17)), d(2024, 7, 1));
        assert_eq!(Frequency::Yearly.period_start(d(2024, 8, 17)), d(2024, 1, 1));
        assert_eq!(Frequency::Daily.period_start(d(2024, 8, 17)), d(2024, 8, 17));
    }

    #[test]
    fn test_sequence_inclusive() {
        let seq = Frequency::Daily.sequence(d(2024, 1, 1), d(2024, 1, 5));
        assert_eq!(seq.len(), 5);
        assert_eq!(seq.first(), Some(&d(2024, 1, 1)));
        assert_eq!(seq.last(), Some(&d(2024, 1, 5)));

        let months = Frequency::Monthly.sequence(d(2023, 11, 1), d(2024, 2, 1));
        assert_eq!(months, vec![d(2023, 11, 1), d(2023, 12, 1), d(2024, 1, 1), d(2024, 2, 1)]);

        assert_eq!(Frequency::Daily.sequence(d(2024, 1, 1), d(2024, 1, 1)).len(), 1);
    }

    #[test]
    fn test_serde_uses_codes() {
        let json = serde_json::to_string(&Frequency::Quarterly).unwrap();
        assert_eq!(json, "\"Q\"");
        let parsed: Frequency = serde_json::from_str("\"monthly\"").unwrap();
        assert_eq!(parsed, Frequency::Monthly);
    }
}
