//! Month-granular dates and inclusive date intervals.
//!
//! Every trip record is stamped with the first day of its month, so the
//! interval logic here only ever compares month starts against user bounds.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::Serialize;

/// Accepted layouts for a direct `date` column, tried in order.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d", "%d-%m-%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Normalize a date to the first day of its month
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Build a month date from loosely typed year/month values (day is always 1).
///
/// Returns `None` when the combination does not name a real month.
pub fn from_year_month(year: i32, month: u32) -> Option<NaiveDate> {
    if year < 1 {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Parse a date cell and normalize it to its month.
///
/// Accepts full dates, date-times and bare `YYYY-MM` values.
pub fn parse_month(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(month_start(date));
        }
    }

    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(month_start(datetime.date()));
        }
    }

    // YYYY-MM / YYYY/MM
    let mut parts = raw.split(['-', '/']);
    let year = parts.next()?.parse::<i32>().ok()?;
    let month = parts.next()?.parse::<u32>().ok()?;
    if parts.next().is_some() {
        return None;
    }
    from_year_month(year, month)
}

/// Inclusive date interval used by the filter engine
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Create an interval, swapping the bounds if they arrive reversed
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self { start: end, end: start }
        }
    }

    /// Smallest interval covering every date, or `None` for no dates
    pub fn extent(dates: impl IntoIterator<Item = NaiveDate>) -> Option<Self> {
        let mut iter = dates.into_iter();
        let first = iter.next()?;
        let (start, end) = iter.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
        Some(Self { start, end })
    }

    /// Check if a date falls inside the interval (both ends inclusive)
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Narrow the interval to the part that overlaps `outer`, if any
    pub fn clamp_to(&self, outer: &DateRange) -> Option<Self> {
        let start = self.start.max(outer.start);
        let end = self.end.min(outer.end);
        (start <= end).then_some(Self { start, end })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_month_formats() {
        assert_eq!(parse_month("2021-03-17"), Some(ymd(2021, 3, 1)));
        assert_eq!(parse_month("17/03/2021"), Some(ymd(2021, 3, 1)));
        assert_eq!(parse_month("2021-03-17 08:30:00"), Some(ymd(2021, 3, 1)));
        assert_eq!(parse_month("2021-03"), Some(ymd(2021, 3, 1)));
        assert_eq!(parse_month(" 2021-12 "), Some(ymd(2021, 12, 1)));
    }

    #[test]
    fn test_parse_month_rejects_garbage() {
        assert_eq!(parse_month(""), None);
        assert_eq!(parse_month("not a date"), None);
        assert_eq!(parse_month("2021-13"), None);
        assert_eq!(parse_month("2021-02-30"), None);
    }

    #[test]
    fn test_from_year_month() {
        assert_eq!(from_year_month(2021, 7), Some(ymd(2021, 7, 1)));
        assert_eq!(from_year_month(2021, 0), None);
        assert_eq!(from_year_month(0, 1), None);
    }

    #[test]
    fn test_date_range() {
        let range = DateRange::new(ymd(2021, 6, 1), ymd(2021, 2, 1));
        assert_eq!(range.start, ymd(2021, 2, 1)); // Reversed bounds are swapped

        assert!(range.contains(ymd(2021, 2, 1)));
        assert!(range.contains(ymd(2021, 6, 1)));
        assert!(!range.contains(ymd(2021, 7, 1)));

        let extent = DateRange::extent([ymd(2021, 5, 1), ymd(2021, 1, 1), ymd(2021, 9, 1)]).unwrap();
        assert_eq!(extent, DateRange::new(ymd(2021, 1, 1), ymd(2021, 9, 1)));
        assert!(DateRange::extent(Vec::<NaiveDate>::new()).is_none());
    }

    #[test]
    fn test_clamp_to() {
        let outer = DateRange::new(ymd(2021, 1, 1), ymd(2021, 12, 1));
        let wide = DateRange::new(ymd(2020, 6, 1), ymd(2021, 3, 1));
        assert_eq!(wide.clamp_to(&outer), Some(DateRange::new(ymd(2021, 1, 1), ymd(2021, 3, 1))));

        let disjoint = DateRange::new(ymd(2019, 1, 1), ymd(2019, 12, 1));
        assert_eq!(disjoint.clamp_to(&outer), None);
    }
}
