/// Wall-clock access and local-calendar helpers
///
/// Every "day" in the tracker is a local calendar date: the instant of a
/// check-in truncated to local midnight. Week and month boundaries are taken
/// from the same local calendar.

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime};

/// Source of the current local wall-clock time
///
/// The engine and the reminder scheduler read time only through this trait
/// so tests can pin "today" to a fixed date.
pub trait Clock: Send + Sync {
    /// Current local wall-clock time
    fn now(&self) -> NaiveDateTime;

    /// The current instant truncated to local midnight
    fn today(&self) -> NaiveDate {
        local_midnight(self.now())
    }
}

/// Clock backed by the device's local timezone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Clock frozen at a given local wall-clock time
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl FixedClock {
    /// Freeze the clock at noon of the given day
    pub fn on(day: NaiveDate) -> Self {
        Self(day.and_hms_opt(12, 0, 0).expect("noon is a valid time of day"))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now(&self) -> NaiveDateTime {
        (**self).now()
    }
}

/// Truncate a local wall-clock time to its calendar day
pub fn local_midnight(at: NaiveDateTime) -> NaiveDate {
    at.date()
}

/// Whole calendar days from `earlier` to `later` (negative if reversed)
pub fn days_between(earlier: NaiveDate, later: NaiveDate) -> i64 {
    (later - earlier).num_days()
}

/// ISO week-numbering year and week (1..=53) of a day
pub fn week_key(day: NaiveDate) -> (i32, u32) {
    let week = day.iso_week();
    (week.year(), week.week())
}

/// Calendar year and month (1..=12) of a day
pub fn month_key(day: NaiveDate) -> (i32, u32) {
    (day.year(), day.month())
}
