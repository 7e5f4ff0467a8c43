//! Date helpers shared by the pricing engine.

use chrono::NaiveDate;

/// The day before `date`, saturating at the calendar minimum.
///
/// Truncation shortens a window to end the day before a new window starts;
/// the saturation only matters for `NaiveDate::MIN`, which no real pricing
/// window uses.
pub fn day_before(date: NaiveDate) -> NaiveDate {
    date.pred_opt().unwrap_or(NaiveDate::MIN)
}

/// The day after `date`, saturating at the calendar maximum.
pub fn day_after(date: NaiveDate) -> NaiveDate {
    date.succ_opt().unwrap_or(NaiveDate::MAX)
}
