//! Month arithmetic.
//!
//! Usage reports are requested and tabulated by calendar month. These types
//! keep the `YYYY-MM` token handling in one place.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

// ============================================================================
// Year-Month
// ============================================================================

/// A calendar month, rendered as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Creates a year-month, returning `None` for an invalid month.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// The month containing `date`.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Year component.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Month component (1-12).
    pub fn month(&self) -> u32 {
        self.month
    }

    /// First day of the month.
    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }

    /// Last day of the month.
    pub fn last_day(&self) -> NaiveDate {
        self.next()
            .first_day()
            .pred_opt()
            .unwrap_or_else(|| self.first_day())
    }

    /// The following month.
    #[must_use]
    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Number of months from `self` through `end`, inclusive.
    ///
    /// Zero when `end` precedes `self`.
    pub fn months_through(&self, end: YearMonth) -> u32 {
        let diff = end.ordinal() - self.ordinal();
        u32::try_from(diff + 1).unwrap_or(0)
    }

    /// Every month from `self` through `end`, inclusive.
    pub fn iter_through(&self, end: YearMonth) -> impl Iterator<Item = YearMonth> {
        let mut current = *self;
        let count = self.months_through(end);
        (0..count).map(move |_| {
            let month = current;
            current = current.next();
            month
        })
    }

    /// Compact `YYYYMM` form used in file names.
    pub fn compact(&self) -> String {
        format!("{:04}{:02}", self.year, self.month)
    }

    /// Column label in `Mmm-YYYY` form (e.g. `Jan-2023`).
    pub fn column_label(&self) -> String {
        self.first_day().format("%b-%Y").to_string()
    }

    fn ordinal(&self) -> i64 {
        i64::from(self.year) * 12 + i64::from(self.month) - 1
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = CoreError;

    /// Parses `YYYY-MM`, also accepting a trailing day (`YYYY-MM-DD`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::InvalidData(format!("invalid month token: {s:?}"));

        let mut parts = s.trim().split('-');
        let year = parts
            .next()
            .filter(|p| p.len() == 4)
            .and_then(|p| p.parse::<i32>().ok())
            .ok_or_else(invalid)?;
        let month = parts
            .next()
            .filter(|p| p.len() == 2)
            .and_then(|p| p.parse::<u32>().ok())
            .ok_or_else(invalid)?;

        if let Some(day) = parts.next() {
            let day: u32 = day.parse().map_err(|_| invalid())?;
            NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)?;
        }
        if parts.next().is_some() {
            return Err(invalid());
        }

        Self::new(year, month).ok_or_else(invalid)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Month Range
// ============================================================================

/// An inclusive range of months, e.g. the date range of a harvest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthRange {
    /// First month.
    pub begin: YearMonth,
    /// Last month.
    pub end: YearMonth,
}

impl MonthRange {
    /// Creates a range.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidData` if `end` precedes `begin`.
    pub fn new(begin: YearMonth, end: YearMonth) -> Result<Self, CoreError> {
        if end < begin {
            return Err(CoreError::InvalidData(format!(
                "range end {end} precedes begin {begin}"
            )));
        }
        Ok(Self { begin, end })
    }

    /// Every month in the range.
    pub fn months(&self) -> Vec<YearMonth> {
        self.begin.iter_through(self.end).collect()
    }

    /// Number of months in the range.
    pub fn len(&self) -> u32 {
        self.begin.months_through(self.end)
    }

    /// Always false; a valid range spans at least one month.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ym(s: &str) -> YearMonth {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!(ym("2023-01").to_string(), "2023-01");
        assert_eq!(ym("2023-02-28").to_string(), "2023-02");
        assert!("2023-13".parse::<YearMonth>().is_err());
        assert!("2023-1".parse::<YearMonth>().is_err());
        assert!("2023-02-30".parse::<YearMonth>().is_err());
        assert!("garbage".parse::<YearMonth>().is_err());
    }

    #[test]
    fn test_last_day() {
        assert_eq!(ym("2023-02").last_day().to_string(), "2023-02-28");
        assert_eq!(ym("2024-02").last_day().to_string(), "2024-02-29");
        assert_eq!(ym("2023-12").last_day().to_string(), "2023-12-31");
    }

    #[test]
    fn test_months_through_year_boundary() {
        assert_eq!(ym("2022-11").months_through(ym("2023-02")), 4);
        assert_eq!(ym("2023-02").months_through(ym("2023-01")), 0);
        let months: Vec<String> = ym("2022-12")
            .iter_through(ym("2023-01"))
            .map(|m| m.to_string())
            .collect();
        assert_eq!(months, vec!["2022-12", "2023-01"]);
    }

    #[test]
    fn test_compact_and_label() {
        assert_eq!(ym("2023-03").compact(), "202303");
        assert_eq!(ym("2023-03").column_label(), "Mar-2023");
    }

    #[test]
    fn test_range_validation() {
        assert!(MonthRange::new(ym("2023-03"), ym("2023-01")).is_err());
        let range = MonthRange::new(ym("2023-01"), ym("2023-03")).unwrap();
        assert_eq!(range.len(), 3);
        assert!(!range.is_empty());
    }
}
