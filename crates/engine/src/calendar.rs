//! Calendar months.
//!
//! Every "first/last instant of the month" computation in the engine goes
//! through [`Month`], so year rollover and month lengths are handled by
//! `chrono` in one place.

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Day of the month used to sample interval-validity positions.
pub const PROBE_DAY: u32 = 15;

/// A calendar month in UTC.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Month {
    first: NaiveDate,
}

impl Month {
    /// Build a month from its year and number (1-12).
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|first| Self { first })
    }

    /// The month containing `instant`.
    pub fn containing(instant: DateTime<Utc>) -> Self {
        Self::containing_date(instant.date_naive())
    }

    fn containing_date(date: NaiveDate) -> Self {
        Self {
            first: date - Days::new(u64::from(date.day0())),
        }
    }

    pub fn year(self) -> i32 {
        self.first.year()
    }

    pub fn number(self) -> u32 {
        self.first.month()
    }

    /// First instant of the month (`YYYY-MM-01 00:00:00`).
    pub fn begin(self) -> DateTime<Utc> {
        self.first.and_time(NaiveTime::MIN).and_utc()
    }

    /// Last second of the month (`YYYY-MM-<last> 23:59:59`).
    pub fn end(self) -> DateTime<Utc> {
        self.next().begin() - TimeDelta::seconds(1)
    }

    /// The instant used to sample positions: the 15th at midnight.
    pub fn probe(self) -> DateTime<Utc> {
        (self.first + Days::new(u64::from(PROBE_DAY - 1)))
            .and_time(NaiveTime::MIN)
            .and_utc()
    }

    /// The month that contains the second before this month begins.
    pub fn previous(self) -> Self {
        Self::containing(self.begin() - TimeDelta::seconds(1))
    }

    pub fn next(self) -> Self {
        // Day 1 + 31 days always lands inside the following month.
        Self::containing_date(self.first + Days::new(31))
    }

    /// Two-digit month and two-digit year, e.g. `03.24`.
    pub fn label(self) -> String {
        self.first.format("%m.%y").to_string()
    }

    /// Worksheet name, e.g. `2024-03`.
    pub fn sheet_name(self) -> String {
        self.first.format("%Y-%m").to_string()
    }

    /// Iterate this month and every month before it, newest first.
    pub fn walk_back(self) -> MonthsBack {
        MonthsBack { next: self }
    }
}

/// Unbounded descending month iterator returned by [`Month::walk_back`].
#[derive(Clone, Debug)]
pub struct MonthsBack {
    next: Month,
}

impl Iterator for MonthsBack {
    type Item = Month;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next;
        self.next = current.previous();
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn month(year: i32, number: u32) -> Month {
        Month::new(year, number).unwrap()
    }

    #[test]
    fn bounds_follow_month_length() {
        assert_eq!(
            month(2024, 2).end(),
            Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap()
        );
        assert_eq!(
            month(2023, 2).end(),
            Utc.with_ymd_and_hms(2023, 2, 28, 23, 59, 59).unwrap()
        );
        assert_eq!(
            month(2024, 4).end(),
            Utc.with_ymd_and_hms(2024, 4, 30, 23, 59, 59).unwrap()
        );
        assert_eq!(
            month(2024, 4).begin(),
            Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn previous_and_next_roll_over_years() {
        assert_eq!(month(2024, 1).previous(), month(2023, 12));
        assert_eq!(month(2023, 12).next(), month(2024, 1));
        assert_eq!(month(2024, 1).next(), month(2024, 2));
        assert_eq!(month(2024, 3).previous(), month(2024, 2));
    }

    #[test]
    fn containing_truncates_to_first_day() {
        let instant = Utc.with_ymd_and_hms(2025, 7, 31, 23, 59, 59).unwrap();
        assert_eq!(Month::containing(instant), month(2025, 7));
    }

    #[test]
    fn probe_is_the_fifteenth() {
        assert_eq!(
            month(2025, 11).probe(),
            Utc.with_ymd_and_hms(2025, 11, 15, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn labels() {
        assert_eq!(month(2024, 3).label(), "03.24");
        assert_eq!(month(2009, 12).label(), "12.09");
        assert_eq!(month(2024, 3).sheet_name(), "2024-03");
    }

    #[test]
    fn walk_back_is_descending() {
        let months: Vec<Month> = month(2024, 2).walk_back().take(3).collect();
        assert_eq!(months, vec![month(2024, 2), month(2024, 1), month(2023, 12)]);
    }
}
