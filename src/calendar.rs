//! Calendar month arithmetic for contribution schedules
//!
//! Contributions are paid per calendar month, so schedules are keyed by
//! `YearMonth` rather than by full dates. Dates only appear at the edges
//! (re-entry deadlines, the caller's "today", birth dates).

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{SimResult, SimulationError};

/// A calendar month (`month` is 1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawYearMonth")]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

/// Unchecked wire form, validated through `YearMonth::new`
#[derive(Deserialize)]
struct RawYearMonth {
    year: i32,
    month: u32,
}

impl TryFrom<RawYearMonth> for YearMonth {
    type Error = SimulationError;

    fn try_from(raw: RawYearMonth) -> Result<Self, Self::Error> {
        YearMonth::new(raw.year, raw.month)
    }
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> SimResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(SimulationError::out_of_range("month", month, 1, 12));
        }
        Ok(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        // month is validated on construction, day 1 always exists
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        self.next().first_day().pred_opt().unwrap_or(NaiveDate::MIN)
    }

    /// Months since year 0, handy for differences
    fn ordinal(&self) -> i64 {
        self.year as i64 * 12 + (self.month as i64 - 1)
    }

    fn from_ordinal(ordinal: i64) -> Self {
        Self {
            year: ordinal.div_euclid(12) as i32,
            month: ordinal.rem_euclid(12) as u32 + 1,
        }
    }

    pub fn plus_months(&self, months: i64) -> Self {
        Self::from_ordinal(self.ordinal() + months)
    }

    pub fn next(&self) -> Self {
        self.plus_months(1)
    }

    pub fn prev(&self) -> Self {
        self.plus_months(-1)
    }

    /// Signed number of months from `self` to `other`
    pub fn months_until(&self, other: YearMonth) -> i64 {
        other.ordinal() - self.ordinal()
    }

    /// Year whose UMA value is in force during this month.
    ///
    /// UMA is published in January and takes effect on February 1st, so
    /// January still uses the prior year's value.
    pub fn effective_uma_year(&self) -> i32 {
        if self.month == 1 {
            self.year - 1
        } else {
            self.year
        }
    }

    /// Iterate `count` consecutive months starting at `self`
    pub fn iter_months(self, count: u32) -> impl Iterator<Item = YearMonth> {
        (0..count as i64).map(move |offset| self.plus_months(offset))
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = SimulationError;

    /// Parses `YYYY-MM`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || SimulationError::InvalidHistory(format!("malformed month `{s}`, expected YYYY-MM"));
        let (year, month) = s.trim().split_once('-').ok_or_else(malformed)?;
        let year: i32 = year.parse().map_err(|_| malformed())?;
        let month: u32 = month.parse().map_err(|_| malformed())?;
        YearMonth::new(year, month)
    }
}

/// Completed years between `birth` and `on`
pub fn age_on(birth: NaiveDate, on: NaiveDate) -> u32 {
    let mut age = on.year() - birth.year();
    if (on.month(), on.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age.max(0) as u32
}

/// Last day of the month twelve months after `last_paid`.
///
/// Computed through chrono so month-end clamping (February) is handled there.
pub fn reentry_deadline(last_paid: YearMonth) -> NaiveDate {
    last_paid
        .first_day()
        .checked_add_months(Months::new(12))
        .map(|d| YearMonth::from_date(d).last_day())
        .unwrap_or(NaiveDate::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ym(year: i32, month: u32) -> YearMonth {
        YearMonth::new(year, month).unwrap()
    }

    #[test]
    fn test_month_arithmetic() {
        assert_eq!(ym(2024, 12).next(), ym(2025, 1));
        assert_eq!(ym(2025, 1).prev(), ym(2024, 12));
        assert_eq!(ym(2024, 2).plus_months(35), ym(2027, 1));
        assert_eq!(ym(2024, 2).months_until(ym(2027, 1)), 35);
        assert_eq!(ym(2027, 1).months_until(ym(2024, 2)), -35);
        assert!(YearMonth::new(2024, 13).is_err());
    }

    #[test]
    fn test_january_uses_prior_year_uma() {
        assert_eq!(ym(2025, 1).effective_uma_year(), 2024);
        assert_eq!(ym(2025, 2).effective_uma_year(), 2025);
        assert_eq!(ym(2025, 12).effective_uma_year(), 2025);
    }

    #[test]
    fn test_month_bounds() {
        assert_eq!(ym(2024, 2).last_day(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(ym(2023, 12).last_day(), NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
    }

    #[test]
    fn test_reentry_deadline() {
        assert_eq!(reentry_deadline(ym(2024, 3)), NaiveDate::from_ymd_opt(2025, 3, 31).unwrap());
        assert_eq!(reentry_deadline(ym(2024, 2)), NaiveDate::from_ymd_opt(2025, 2, 28).unwrap());
    }

    #[test]
    fn test_age_on() {
        let birth = NaiveDate::from_ymd_opt(1966, 1, 15).unwrap();
        assert_eq!(age_on(birth, NaiveDate::from_ymd_opt(2024, 1, 14).unwrap()), 57);
        assert_eq!(age_on(birth, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()), 58);
    }

    #[test]
    fn test_deserialize_checks_month() {
        let month: YearMonth = serde_json::from_str(r#"{"year":2024,"month":2}"#).unwrap();
        assert_eq!(month, ym(2024, 2));
        assert!(serde_json::from_str::<YearMonth>(r#"{"year":2024,"month":13}"#).is_err());
        assert!(serde_json::from_str::<YearMonth>(r#"{"year":2024,"month":0}"#).is_err());
    }

    #[test]
    fn test_parse_year_month() {
        assert_eq!("2024-02".parse::<YearMonth>().unwrap(), ym(2024, 2));
        assert!("2024/02".parse::<YearMonth>().is_err());
        assert!("2024-00".parse::<YearMonth>().is_err());
    }
}
