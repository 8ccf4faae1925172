use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A calendar month, stored canonically as its first day.
///
/// Every billing computation works on `Month` values only, never on raw dates:
/// two inputs that fall in the same calendar month and year always produce the
/// same `Month`, regardless of the day or time of day they carried. The
/// reference time zone is UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "NaiveDate", into = "NaiveDate")]
pub struct Month(NaiveDate);

impl Month {
    /// Builds a month from a year and a 1-based month number.
    /// Returns `None` when `month` is outside `1..=12` or the year is out of range.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Month)
    }

    /// Truncates any calendar date to the month it falls in.
    pub fn from_date(date: NaiveDate) -> Self {
        // Day 1 exists in every month, so `with_day(1)` cannot fail here.
        Month(date.with_day(1).unwrap_or(date))
    }

    /// Month of a UTC instant.
    pub fn from_utc(instant: DateTime<Utc>) -> Self {
        Self::from_date(instant.date_naive())
    }

    /// The current calendar month in UTC.
    ///
    /// Only the outermost caller should read the wall clock; everything below
    /// it takes the month as an explicit parameter.
    pub fn current() -> Self {
        Self::from_utc(Utc::now())
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// 1-based month number.
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// The first day of the month.
    pub fn first_day(&self) -> NaiveDate {
        self.0
    }

    /// Day 1, 00:00:00 UTC.
    pub fn start_of_month_utc(&self) -> DateTime<Utc> {
        Utc.from_utc_datetime(&self.0.and_time(NaiveTime::MIN))
    }

    /// Number of months from `self` to `other` (`other - self`), possibly negative.
    pub fn months_until(&self, other: Month) -> i64 {
        let years = i64::from(other.year()) - i64::from(self.year());
        let months = i64::from(other.month()) - i64::from(self.month());
        years * 12 + months
    }
}

impl From<NaiveDate> for Month {
    fn from(date: NaiveDate) -> Self {
        Month::from_date(date)
    }
}

impl From<DateTime<Utc>> for Month {
    fn from(instant: DateTime<Utc>) -> Self {
        Month::from_utc(instant)
    }
}

impl From<Month> for NaiveDate {
    fn from(month: Month) -> Self {
        month.0
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

/// Convenience wrapper around [`Month::current`].
pub fn current_month() -> Month {
    Month::current()
}
