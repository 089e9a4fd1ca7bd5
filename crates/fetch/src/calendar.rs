//! Conversions between unix timestamps and UTC calendar dates.
//!
//! Block timestamps are plain unix seconds; these helpers turn date arguments into timestamps and
//! timestamps back into printable UTC dates.

use std::fmt;

/// Seconds in a day.
pub const SECONDS_PER_DAY: u64 = 86_400;

/// A proleptic Gregorian calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CivilDate {
    /// The year.
    pub year: i64,
    /// The month, `1..=12`.
    pub month: u32,
    /// The day of the month, `1..=31`.
    pub day: u32,
}

impl CivilDate {
    /// Creates a date, returning `None` if the month or day is out of range.
    pub fn new(year: i64, month: u32, day: u32) -> Option<Self> {
        ((1..=12).contains(&month) && day >= 1 && day <= days_in_month(year, month))
            .then_some(Self { year, month, day })
    }

    /// Returns the date containing the given unix timestamp.
    pub const fn from_timestamp(timestamp: u64) -> Self {
        Self::from_days((timestamp / SECONDS_PER_DAY) as i64)
    }

    /// Returns the date `days` days after 1970-01-01.
    pub const fn from_days(days: i64) -> Self {
        let z = days + 719_468;
        let era = (if z >= 0 { z } else { z - 146_096 }) / 146_097;
        let doe = z - era * 146_097;
        let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
        let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
        let mp = (5 * doy + 2) / 153;
        let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
        let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
        let year = yoe + era * 400 + if month <= 2 { 1 } else { 0 };
        Self { year, month, day }
    }

    /// Returns the number of days between 1970-01-01 and this date.
    pub const fn days_since_epoch(&self) -> i64 {
        let year = if self.month <= 2 { self.year - 1 } else { self.year };
        let era = (if year >= 0 { year } else { year - 399 }) / 400;
        let yoe = year - era * 400;
        let mp = (self.month as i64 + 9) % 12;
        let doy = (153 * mp + 2) / 5 + self.day as i64 - 1;
        let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
        era * 146_097 + doe - 719_468
    }

    /// Returns the unix timestamp of midnight UTC on this date, or `None` before the epoch.
    pub fn midnight_timestamp(&self) -> Option<u64> {
        u64::try_from(self.days_since_epoch()).ok().map(|days| days * SECONDS_PER_DAY)
    }

    /// Moves the date back by whole months, clamping the day to the length of the target month.
    pub fn sub_months(&self, months: u32) -> Self {
        let index = self.year * 12 + (self.month as i64 - 1) - months as i64;
        let year = index.div_euclid(12);
        let month = index.rem_euclid(12) as u32 + 1;
        Self { year, month, day: self.day.min(days_in_month(year, month)) }
    }
}

impl fmt::Display for CivilDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// Returns `true` for leap years.
pub const fn is_leap_year(year: i64) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Returns the number of days in the given month.
pub const fn days_in_month(year: i64, month: u32) -> u32 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// Formats a unix timestamp as `YYYY-MM-DD HH:MM:SS UTC`.
pub fn format_utc(timestamp: u64) -> String {
    let secs = timestamp % SECONDS_PER_DAY;
    format!(
        "{} {:02}:{:02}:{:02} UTC",
        CivilDate::from_timestamp(timestamp),
        secs / 3_600,
        secs % 3_600 / 60,
        secs % 60
    )
}
