//! Month arithmetic on first-of-month dates.

use chrono::{Datelike, Months, NaiveDate};

/// First day of the given month, or `None` if the pair is not a calendar month.
pub fn month_start(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Whole months from `from` to `to`; negative when `to` is earlier. Days are ignored.
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to.year() as i64 - from.year() as i64) * 12 + (to.month() as i64 - from.month() as i64)
}

/// Shift a date by `n` months in either direction.
pub fn add_months(date: NaiveDate, n: i64) -> Option<NaiveDate> {
    let step = Months::new(u32::try_from(n.unsigned_abs()).ok()?);
    if n >= 0 {
        date.checked_add_months(step)
    } else {
        date.checked_sub_months(step)
    }
}
