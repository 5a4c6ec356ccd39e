/// Streak continuation rules
///
/// A streak continues when a check-in lands in the period right after the
/// previous one: the next day for daily habits, the next ISO week for weekly
/// habits and the next calendar month for monthly habits. Anything else
/// restarts the count.

use chrono::NaiveDate;
use crate::domain::calendar::{days_between, month_key, week_key};
use crate::domain::Frequency;

/// How a check-in today relates to the previous check-in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    /// Today is in the period right after the previous check-in
    Continues,
    /// Same day as the previous check-in (daily habits only)
    SameDay,
    /// A period was missed, or the dates are out of order
    Broken,
}

/// Classify the gap between the previous check-in and today
pub fn continuation(frequency: &Frequency, last: NaiveDate, today: NaiveDate) -> Continuation {
    match frequency {
        Frequency::Daily => match days_between(last, today) {
            1 => Continuation::Continues,
            0 => Continuation::SameDay,
            _ => Continuation::Broken,
        },
        Frequency::Weekly => {
            let (last_year, last_week) = week_key(last);
            let (this_year, this_week) = week_key(today);
            let next_week = this_year == last_year && this_week == last_week + 1;
            // Only week 52 wraps into week 1; leaving week 53 restarts the streak
            let wraps_year = this_year == last_year + 1 && last_week == 52 && this_week == 1;
            if next_week || wraps_year {
                Continuation::Continues
            } else {
                Continuation::Broken
            }
        }
        Frequency::Monthly => {
            let (last_year, last_month) = month_key(last);
            let (this_year, this_month) = month_key(today);
            let next_month = this_year == last_year && this_month == last_month + 1;
            let wraps_year = this_year == last_year + 1 && last_month == 12 && this_month == 1;
            if next_month || wraps_year {
                Continuation::Continues
            } else {
                Continuation::Broken
            }
        }
        Frequency::Other(_) => Continuation::Broken,
    }
}

/// Streak value after checking in today
pub fn next_streak(
    frequency: &Frequency,
    current: u32,
    last_check_in: Option<NaiveDate>,
    today: NaiveDate,
) -> u32 {
    let Some(last) = last_check_in else {
        return 1;
    };

    match continuation(frequency, last, today) {
        Continuation::Continues => current.saturating_add(1),
        Continuation::SameDay => current,
        Continuation::Broken => 1,
    }
}

/// Streak value after removing today's check-in
///
/// `last_remaining` is the latest check-in strictly before today, if any.
pub fn streak_after_undo(
    frequency: &Frequency,
    current: u32,
    last_remaining: Option<NaiveDate>,
    today: NaiveDate,
) -> u32 {
    match last_remaining {
        None => 0,
        Some(last) if continuation(frequency, last, today) == Continuation::Continues => {
            current.saturating_sub(1)
        }
        Some(_) => 0,
    }
}
