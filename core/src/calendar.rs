//! Calendar helpers: Monday-aligned weeks and Mon–Fri day counting.
//!
//! All dates are date-only (`NaiveDate`), interpreted as UTC midnight.
//! Nothing here performs I/O.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Working days in a full week.
pub const WORKING_DAYS_PER_WEEK: u32 = 5;

/// The Monday of the ISO week containing `date`.
/// Sunday maps back six days.
pub fn monday_of(date: NaiveDate) -> NaiveDate {
    let back = date.weekday().num_days_from_monday();
    date - Duration::days(i64::from(back))
}

/// Number of Monday–Friday dates in `[start, end]` inclusive.
/// Returns 0 when `end < start`.
pub fn working_days(start: NaiveDate, end: NaiveDate) -> u32 {
    if end < start {
        return 0;
    }
    // Whole weeks contribute five days each; walk only the remainder.
    let span = (end - start).num_days() + 1;
    let whole_weeks = span / 7;
    let mut count = (whole_weeks as u32) * WORKING_DAYS_PER_WEEK;
    let mut cursor = start + Duration::days(whole_weeks * 7);
    while cursor <= end {
        if is_working_day(cursor) {
            count += 1;
        }
        cursor += Duration::days(1);
    }
    count
}

pub fn is_working_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// True when `[a_start, a_end]` and `[b_start, b_end]` share at least one day.
pub fn ranges_overlap(
    a_start: NaiveDate,
    a_end: NaiveDate,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> bool {
    a_start <= b_end && a_end >= b_start
}

/// Intersection of two inclusive ranges, or `None` when they are disjoint.
pub fn clamp_range(
    start: NaiveDate,
    end: NaiveDate,
    bound_start: NaiveDate,
    bound_end: NaiveDate,
) -> Option<(NaiveDate, NaiveDate)> {
    let lo = start.max(bound_start);
    let hi = end.min(bound_end);
    (lo <= hi).then_some((lo, hi))
}

/// One simulated week. `week_start..=week_end` is the full Monday–Sunday
/// block; `clamp_start..=clamp_end` is that block cut to the proposal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeekWindow {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub clamp_start: NaiveDate,
    pub clamp_end: NaiveDate,
    pub working_days: u32,
}

impl WeekWindow {
    /// Share of a full working week covered by the clamped range.
    pub fn fraction(&self) -> f64 {
        f64::from(self.working_days) / f64::from(WORKING_DAYS_PER_WEEK)
    }

    /// Friday of this week. Leave is only counted up to here.
    pub fn friday(&self) -> NaiveDate {
        self.week_start + Duration::days(4)
    }

    /// True when `[start, end]` touches the full Monday–Sunday block.
    pub fn touches(&self, start: NaiveDate, end: NaiveDate) -> bool {
        ranges_overlap(start, end, self.week_start, self.week_end)
    }
}

/// Every week from `monday_of(start)` through `end`, stepping seven days.
/// Returns an empty list when `end < start`.
pub fn weeks_between(start: NaiveDate, end: NaiveDate) -> Vec<WeekWindow> {
    let mut weeks = Vec::new();
    if end < start {
        return weeks;
    }
    let mut cursor = monday_of(start);
    while cursor <= end {
        let week_end = cursor + Duration::days(6);
        let clamp_start = cursor.max(start);
        let clamp_end = week_end.min(end);
        weeks.push(WeekWindow {
            week_start: cursor,
            week_end,
            clamp_start,
            clamp_end,
            working_days: working_days(clamp_start, clamp_end),
        });
        cursor += Duration::days(7);
    }
    weeks
}
