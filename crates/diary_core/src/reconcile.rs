//! Gap detection between the last recorded day and today.
//!
//! # Responsibility
//! - Produce the ordered list of calendar days that were never recorded.
//!
//! # Invariants
//! - Output is strictly increasing and contiguous.
//! - Both `last_recorded` and `today` are excluded.
//! - A `last_recorded` later than `today` is refused, never reconciled backwards.

use crate::calendar::{format_date, predecessor};
use chrono::NaiveDate;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// The last recorded date lies after "today" (clock skew or corrupted data).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidRangeError {
    pub last_recorded: NaiveDate,
    pub today: NaiveDate,
}

impl Display for InvalidRangeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "last recorded date {} is after today {}; refusing to catch up",
            format_date(self.last_recorded),
            format_date(self.today)
        )
    }
}

impl Error for InvalidRangeError {}

/// Returns the days strictly between `last_recorded` and `today`, oldest first.
///
/// Walks back from `today` one day at a time so month, year and leap-day
/// boundaries need no separate handling. Gaps are expected to be days, not
/// years.
pub fn reconcile(
    last_recorded: NaiveDate,
    today: NaiveDate,
) -> Result<Vec<NaiveDate>, InvalidRangeError> {
    if last_recorded > today {
        return Err(InvalidRangeError {
            last_recorded,
            today,
        });
    }

    let mut missing = Vec::new();
    let mut cursor = today;
    while cursor > last_recorded {
        cursor = predecessor(cursor);
        if cursor == last_recorded {
            break;
        }
        missing.push(cursor);
    }
    missing.reverse();

    Ok(missing)
}

#[cfg(test)]
mod tests {
    use super::reconcile;
    use crate::calendar::{days_between, successor};
    use chrono::NaiveDate;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn same_day_yields_nothing() {
        assert!(reconcile(ymd(2021, 1, 10), ymd(2021, 1, 10))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn consecutive_days_yield_nothing() {
        assert!(reconcile(ymd(2021, 1, 10), ymd(2021, 1, 11))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn three_day_gap_yields_two_days_in_order() {
        let missing = reconcile(ymd(2021, 1, 10), ymd(2021, 1, 13)).unwrap();
        assert_eq!(missing, vec![ymd(2021, 1, 11), ymd(2021, 1, 12)]);
    }

    #[test]
    fn future_last_date_is_rejected() {
        let err = reconcile(ymd(2021, 1, 14), ymd(2021, 1, 13)).unwrap_err();
        assert_eq!(err.last_recorded, ymd(2021, 1, 14));
        assert_eq!(err.today, ymd(2021, 1, 13));
    }

    #[test]
    fn gap_across_leap_day_and_year_end_is_contiguous() {
        let cases = [
            (ymd(2020, 2, 27), ymd(2020, 3, 2)),
            (ymd(2020, 12, 30), ymd(2021, 1, 3)),
            (ymd(2019, 11, 15), ymd(2020, 3, 15)),
        ];
        for (last, today) in cases {
            let missing = reconcile(last, today).unwrap();
            assert_eq!(missing.len() as i64, days_between(last, today) - 1);
            assert_eq!(missing.first().copied(), Some(successor(last)));
            assert_eq!(
                missing.last().copied().map(successor),
                Some(today),
                "last missing day must be the day before today"
            );
            assert!(missing.windows(2).all(|pair| successor(pair[0]) == pair[1]));
        }
    }
}
