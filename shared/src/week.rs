//! Week arithmetic
//!
//! Plans are partitioned by ISO week: weeks run Monday to Sunday and week 1
//! is the week holding the year's first Thursday. Every day of a plan week
//! therefore carries the same number. The number restarts every year, so
//! callers compare week numbers for equality rather than ordering.

use crate::models::DayOfWeek;
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};

/// ISO week number of a calendar date (1-53)
pub fn week_number(date: NaiveDate) -> u32 {
    date.iso_week().week()
}

/// Week number of an instant (UTC)
pub fn week_number_at(now: DateTime<Utc>) -> u32 {
    week_number(now.date_naive())
}

/// Monday on or before the given date
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let days_from_monday = date.weekday().num_days_from_monday() as i64;
    date - Duration::days(days_from_monday)
}

/// Sunday of the week containing the given date
pub fn week_end(date: NaiveDate) -> NaiveDate {
    week_start(date) + Duration::days(6)
}

/// Day of the week for a date
pub fn day_of(date: NaiveDate) -> DayOfWeek {
    date.weekday().into()
}

/// Calendar date of `day` in the week starting at `monday`
pub fn date_in_week(monday: NaiveDate, day: DayOfWeek) -> NaiveDate {
    monday + Duration::days(day.index() as i64)
}

/// Monday of ISO `week` in ISO year `year`, `None` if the year has no such week
pub fn first_day_of_week(year: i32, week: u32) -> Option<NaiveDate> {
    NaiveDate::from_isoywd_opt(year, week, Weekday::Mon)
}

/// Monday of the most recent occurrence of `week`, looking back from `today`
///
/// A week number above the current one belongs to the previous ISO year.
pub fn recent_week_date(week: u32, today: NaiveDate) -> Option<NaiveDate> {
    let current = today.iso_week();
    let year = if week > current.week() {
        current.year() - 1
    } else {
        current.year()
    };
    first_day_of_week(year, week)
}
