/// CheckIn entity for tracking habit completions
///
/// A check-in records that a habit was completed on one local day. Check-ins
/// are created by the engine and only ever removed by undoing today's check-in
/// or by deleting the owning habit.

use serde::{Deserialize, Serialize};
use chrono::NaiveDate;
use crate::domain::{CheckInId, HabitId};

/// A record of completing a habit on a specific day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckIn {
    /// Store-assigned identifier
    pub id: CheckInId,
    /// Which habit this check-in is for
    pub habit_id: HabitId,
    /// Local day of the check-in
    pub check_in_date: NaiveDate,
}

impl CheckIn {
    /// Create a check-in from existing data (used when loading from database)
    pub fn from_existing(id: CheckInId, habit_id: HabitId, check_in_date: NaiveDate) -> Self {
        Self {
            id,
            habit_id,
            check_in_date,
        }
    }
}

/// Latest check-in strictly before `day`
pub fn last_before(check_ins: &[CheckIn], day: NaiveDate) -> Option<NaiveDate> {
    check_ins
        .iter()
        .map(|c| c.check_in_date)
        .filter(|d| *d < day)
        .max()
}
