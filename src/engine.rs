/// Habit check-in engine
///
/// Decides whether a check-in is allowed today, computes the new streak for
/// the habit's frequency, records the check-in and supports undoing the
/// current day's check-in. The engine holds no state between calls; it reads
/// and writes habits through the injected store on every operation.

use std::sync::Arc;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::{last_before, next_streak, streak_after_undo, Clock, Habit, HabitId, SystemClock};
use crate::storage::{CheckInLedger, CheckInStore, HabitStore, StorageError, StreakChange};

/// Errors surfaced by check-in operations
///
/// "Already checked in" and "nothing to undo" are reported as `false`
/// results, not errors.
#[derive(Error, Debug)]
pub enum CheckInError {
    #[error("Habit not found: {habit_id}")]
    NotFound { habit_id: HabitId },

    #[error("Storage failure: {0}")]
    Storage(StorageError),

    #[error("Invalid check-in state: {message}")]
    InvalidState { message: String },
}

impl From<StorageError> for CheckInError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::HabitNotFound { habit_id } => CheckInError::NotFound { habit_id },
            other => CheckInError::Storage(other),
        }
    }
}

/// Result of a check-in attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CheckInOutcome {
    /// False when the habit was already checked in today
    pub checked_in: bool,
    /// Streak after the attempt
    pub streak: u32,
}

/// Check-in and undo operations over a store and a clock
pub struct CheckInEngine<S, C = SystemClock> {
    store: Arc<S>,
    clock: C,
}

impl<S: CheckInLedger> CheckInEngine<S, SystemClock> {
    /// Engine using the device's local clock
    pub fn new(store: Arc<S>) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<S: CheckInLedger, C: Clock> CheckInEngine<S, C> {
    pub fn with_clock(store: Arc<S>, clock: C) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Check the habit in for today
    ///
    /// The stored row is the source of truth; `habit` is refreshed with it
    /// and with the result of the check-in.
    pub async fn check_in(&self, habit: &mut Habit) -> Result<CheckInOutcome, CheckInError> {
        let today = self.clock.today();
        let current = self.load(habit.id).await?;

        if current.is_checked_in_on(today) {
            debug!("Habit {} already checked in on {}", current.id, today);
            let streak = current.streak_count;
            *habit = current;
            return Ok(CheckInOutcome { checked_in: false, streak });
        }

        let streak = next_streak(&current.frequency, current.streak_count, current.last_check_in, today);

        self.store
            .apply(&StreakChange::Record { habit_id: current.id, date: today, streak })
            .await?;

        info!("Checked in habit {} on {} (streak {})", current.id, today, streak);

        *habit = Habit {
            streak_count: streak,
            last_check_in: Some(today),
            ..current
        };
        Ok(CheckInOutcome { checked_in: true, streak })
    }

    /// Undo today's check-in and recompute the streak from history
    ///
    /// Returns `false` when the habit was not checked in today; earlier days
    /// can never be undone.
    pub async fn undo_today_check_in(&self, habit: &mut Habit) -> Result<bool, CheckInError> {
        let today = self.clock.today();
        let current = self.load(habit.id).await?;

        if !current.is_checked_in_on(today) {
            debug!("Nothing to undo for habit {} on {}", current.id, today);
            *habit = current;
            return Ok(false);
        }

        let history = self.store.check_ins_for_habit(current.id).await?;
        let restored_last = last_before(&history, today);
        let streak = streak_after_undo(&current.frequency, current.streak_count, restored_last, today);

        let change = StreakChange::Revert {
            habit_id: current.id,
            date: today,
            restored_last,
            streak,
        };

        match self.store.apply(&change).await {
            Ok(()) => {}
            Err(StorageError::CheckInNotFound { habit_id, date }) => {
                warn!("Habit {} claims a check-in on {} with no record of it", habit_id, date);
                return Err(CheckInError::InvalidState {
                    message: format!("habit {} has no check-in recorded for {}", habit_id, date),
                });
            }
            Err(e) => return Err(e.into()),
        }

        info!("Undid check-in for habit {} on {} (streak {})", current.id, today, streak);

        *habit = Habit {
            streak_count: streak,
            last_check_in: restored_last,
            ..current
        };
        Ok(true)
    }

    async fn load(&self, habit_id: HabitId) -> Result<Habit, CheckInError> {
        self.store
            .get_habit(habit_id)
            .await?
            .ok_or(CheckInError::NotFound { habit_id })
    }
}
