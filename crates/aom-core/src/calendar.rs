//! Local calendar arithmetic
//!
//! Streaks, journals, and month partitions are all keyed by the user's local
//! calendar day, not by UTC.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, TimeZone, Utc};

/// Converts UTC instants into local days and month keys
#[derive(Debug, Clone, Copy)]
pub struct LocalCalendar {
    offset: FixedOffset,
}

impl LocalCalendar {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Local calendar day of an instant
    pub fn day(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.offset).date_naive()
    }

    /// "YYYY-MM" month key of an instant
    pub fn month_key(&self, at: DateTime<Utc>) -> String {
        month_key_of(self.day(at))
    }

    /// UTC range [start, end) covering one local day
    pub fn day_bounds(&self, day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = day
            .and_hms_opt(0, 0, 0)
            .and_then(|dt| self.offset.from_local_datetime(&dt).single())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| day.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc());
        (start, start + Duration::days(1))
    }
}

/// "YYYY-MM" month key of a day
pub fn month_key_of(day: NaiveDate) -> String {
    format!("{:04}-{:02}", day.year(), day.month())
}

/// Validate and normalize a "YYYY-MM" month key
pub fn parse_month_key(month: &str) -> Option<String> {
    let day = NaiveDate::parse_from_str(&format!("{}-01", month.trim()), "%Y-%m-%d").ok()?;
    Some(month_key_of(day))
}

/// The month key `count` months before `month` (0 returns `month` itself)
pub fn months_back(month: &str, count: u32) -> Option<String> {
    let first = NaiveDate::parse_from_str(&format!("{}-01", month), "%Y-%m-%d").ok()?;
    let shifted = first.checked_sub_months(chrono::Months::new(count))?;
    Some(month_key_of(shifted))
}
