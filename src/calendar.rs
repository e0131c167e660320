//! Calendar arithmetic shared by the recurrence predicates.
//!
//! Everything here works on naive (already localised) dates, so callers decide
//! the time zone once and every helper stays pure.

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Timelike, Weekday};

use crate::fields::Ordinal;

/// Hour used when a rule carries no usable `time`.
pub const DEFAULT_RESET_HOUR: u32 = 9;

/// Number of days in the given month (1-12), leap years included.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(31)
}

/// Days from `from` forward to the next `to` (0 when equal).
fn days_forward(from: Weekday, to: Weekday) -> i64 {
    ((7 + to.num_days_from_sunday() - from.num_days_from_sunday()) % 7) as i64
}

/// First date on or after `date` that falls on `weekday`.
pub fn first_weekday_on_or_after(date: NaiveDate, weekday: Weekday) -> NaiveDate {
    date + Duration::days(days_forward(date.weekday(), weekday))
}

/// Last `weekday` of the month, found by walking back from the month's final day.
pub fn last_weekday_of_month(year: i32, month: u32, weekday: Weekday) -> Option<NaiveDate> {
    let end = NaiveDate::from_ymd_opt(year, month, days_in_month(year, month))?;
    Some(end - Duration::days(days_forward(weekday, end.weekday())))
}

/// Date of the Nth (or last) `weekday` in the month. `None` if it would spill into the next month.
pub fn nth_weekday_of_month(
    year: i32,
    month: u32,
    weekday: Weekday,
    ordinal: Ordinal,
) -> Option<NaiveDate> {
    let Some(n) = ordinal.position() else {
        return last_weekday_of_month(year, month, weekday);
    };
    let first = first_weekday_on_or_after(NaiveDate::from_ymd_opt(year, month, 1)?, weekday);
    let date = first + Duration::weeks(i64::from(n) - 1);
    (date.month() == month).then_some(date)
}

/// Simplified week number: `ceil(day_of_year / 7)`, so Jan 1-7 is week 1.
///
/// Not ISO-8601; weeks restart on Jan 1 regardless of weekday.
pub fn week_of_year(date: NaiveDate) -> u32 {
    date.ordinal().div_ceil(7)
}

/// Monotonic quarter number, distinct for the same quarter in different years.
pub fn quarter_index(date: NaiveDate) -> i32 {
    date.year() * 4 + (date.month0() / 3) as i32
}

/// Weekday for a 0-6 index where Sunday is 0.
pub fn weekday_from_index(index: i64) -> Option<Weekday> {
    match index {
        0 => Some(Weekday::Sun),
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        _ => None,
    }
}

pub fn weekday_index(day: Weekday) -> i64 {
    i64::from(day.num_days_from_sunday())
}

/// Reset hour from an `HH:MM` string; anything unusable yields [`DEFAULT_RESET_HOUR`].
pub fn parse_reset_hour(time: Option<&str>) -> u32 {
    time.and_then(|t| NaiveTime::parse_from_str(t.trim(), "%H:%M").ok())
        .map(|t| t.hour())
        .unwrap_or(DEFAULT_RESET_HOUR)
}
