//! Calendar utilities shared by reconciliation, storage and statistics.
//!
//! # Responsibility
//! - Provide the current date through an injectable [`Clock`].
//! - Map dates to stable English month/weekday names.
//! - Parse, format and step dates one day at a time.
//!
//! # Invariants
//! - Every function except [`SystemClock::today`] is pure.
//! - `WEEKDAYS` is Sunday-first and `MONTHS` is January-first; statistics
//!   ranking relies on these orders for tie-breaks.

use chrono::{Datelike, Local, NaiveDate, Weekday};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Canonical text format for persisted and displayed dates.
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Month names in calendar order.
pub const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Weekday names, Sunday first.
pub const WEEKDAYS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Date text could not be parsed with the requested format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedDateError {
    pub text: String,
    pub format: String,
}

impl Display for MalformedDateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "malformed date `{}` (expected format `{}`)",
            self.text, self.format
        )
    }
}

impl Error for MalformedDateError {}

/// Source of "today" for reconciliation.
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Reads the local wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock pinned to one date. Used by tests and replay tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Returns the English weekday name for `date`.
pub fn weekday_of(date: NaiveDate) -> &'static str {
    WEEKDAYS[weekday_index(date.weekday())]
}

/// Returns the English month name for `date`.
pub fn month_of(date: NaiveDate) -> &'static str {
    MONTHS[date.month0() as usize]
}

/// Position of `weekday` in [`WEEKDAYS`].
pub fn weekday_index(weekday: Weekday) -> usize {
    weekday.num_days_from_sunday() as usize
}

/// Parses `text` with a chrono `format` string.
///
/// Surrounding whitespace is ignored; anything else that does not match the
/// format is rejected rather than defaulted.
pub fn parse_date(text: &str, format: &str) -> Result<NaiveDate, MalformedDateError> {
    NaiveDate::parse_from_str(text.trim(), format).map_err(|_| MalformedDateError {
        text: text.to_string(),
        format: format.to_string(),
    })
}

/// Parses ISO `YYYY-MM-DD` text.
pub fn parse_iso_date(text: &str) -> Result<NaiveDate, MalformedDateError> {
    parse_date(text, ISO_DATE_FORMAT)
}

/// Formats `date` as ISO `YYYY-MM-DD`.
pub fn format_date(date: NaiveDate) -> String {
    date.format(ISO_DATE_FORMAT).to_string()
}

/// Signed number of days from `a` to `b` (`b - a`).
pub fn days_between(a: NaiveDate, b: NaiveDate) -> i64 {
    b.signed_duration_since(a).num_days()
}

/// The day before `date`.
///
/// Saturates at chrono's minimum date, which no diary can reach.
pub fn predecessor(date: NaiveDate) -> NaiveDate {
    date.pred_opt().unwrap_or(date)
}

/// The day after `date`.
pub fn successor(date: NaiveDate) -> NaiveDate {
    date.succ_opt().unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn names_follow_calendar() {
        assert_eq!(weekday_of(ymd(2021, 1, 10)), "Sunday");
        assert_eq!(weekday_of(ymd(2021, 2, 1)), "Monday");
        assert_eq!(month_of(ymd(2021, 10, 31)), "October");
        assert_eq!(month_of(ymd(2021, 12, 1)), "December");
    }

    #[test]
    fn parse_date_accepts_iso_and_custom_formats() {
        assert_eq!(parse_iso_date(" 2021-02-05 ").unwrap(), ymd(2021, 2, 5));
        assert_eq!(parse_date("2-1-2021", "%m-%d-%Y").unwrap(), ymd(2021, 2, 1));
    }

    #[test]
    fn parse_date_rejects_garbage_with_context() {
        let err = parse_iso_date("2021-13-01").unwrap_err();
        assert_eq!(err.text, "2021-13-01");
        assert!(err.to_string().contains("%Y-%m-%d"));
    }

    #[test]
    fn step_functions_cross_boundaries() {
        assert_eq!(predecessor(ymd(2021, 1, 1)), ymd(2020, 12, 31));
        assert_eq!(predecessor(ymd(2020, 3, 1)), ymd(2020, 2, 29));
        assert_eq!(successor(ymd(2021, 2, 28)), ymd(2021, 3, 1));
    }

    #[test]
    fn days_between_is_signed() {
        assert_eq!(days_between(ymd(2021, 1, 10), ymd(2021, 1, 13)), 3);
        assert_eq!(days_between(ymd(2021, 1, 13), ymd(2021, 1, 10)), -3);
        assert_eq!(days_between(ymd(2021, 1, 13), ymd(2021, 1, 13)), 0);
    }

    #[test]
    fn fixed_clock_returns_pinned_date() {
        assert_eq!(FixedClock(ymd(2021, 1, 13)).today(), ymd(2021, 1, 13));
    }
}
