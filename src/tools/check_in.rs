/// Check-in commands
///
/// Thin wrappers over the check-in engine that look the habit up by id and
/// turn the outcome into a message.

use serde::{Deserialize, Serialize};
use crate::agenda::{check_in_calendar, CalendarDay};
use crate::domain::{Clock, DomainError, HabitId};
use crate::engine::CheckInEngine;
use crate::storage::{CheckInLedger, CheckInStore};
use crate::tools::habit::require_habit;
use crate::AppError;

/// Days shown by the check-in calendar unless asked otherwise
pub const DEFAULT_CALENDAR_DAYS: u32 = 30;

/// Longest span the check-in calendar will show
pub const MAX_CALENDAR_DAYS: u32 = 3660;

/// Response from a check-in attempt
#[derive(Debug, Serialize)]
pub struct CheckInResponse {
    pub success: bool,
    pub message: String,
    pub current_streak: u32,
}

/// Check a habit in for today
pub async fn check_in_habit<S: CheckInLedger, C: Clock>(
    engine: &CheckInEngine<S, C>,
    habit_id: HabitId,
) -> Result<CheckInResponse, AppError> {
    let mut habit = require_habit(engine.store().as_ref(), habit_id).await?;
    let outcome = engine.check_in(&mut habit).await?;

    let message = if outcome.checked_in {
        format!(
            "🔥 Checked in '{}'! Current streak: {}",
            habit.name,
            outcome.streak
        )
    } else {
        format!("'{}' is already checked in today", habit.name)
    };

    Ok(CheckInResponse {
        success: outcome.checked_in,
        message,
        current_streak: outcome.streak,
    })
}

/// Undo today's check-in of a habit
pub async fn undo_check_in<S: CheckInLedger, C: Clock>(
    engine: &CheckInEngine<S, C>,
    habit_id: HabitId,
) -> Result<CheckInResponse, AppError> {
    let mut habit = require_habit(engine.store().as_ref(), habit_id).await?;
    let undone = engine.undo_today_check_in(&mut habit).await?;

    let message = if undone {
        format!("Undid today's check-in for '{}'", habit.name)
    } else {
        format!("'{}' has no check-in today to undo", habit.name)
    };

    Ok(CheckInResponse {
        success: undone,
        message,
        current_streak: habit.streak_count,
    })
}

/// Parameters for the check-in calendar
#[derive(Debug, Deserialize)]
pub struct CalendarParams {
    pub habit_id: HabitId,
    pub days: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct CalendarResponse {
    pub days: Vec<CalendarDay>,
    pub checked_in_days: usize,
    pub message: String,
}

/// Per-day check-in history ending today
pub async fn habit_calendar<S: CheckInLedger, C: Clock>(
    engine: &CheckInEngine<S, C>,
    params: CalendarParams,
) -> Result<CalendarResponse, AppError> {
    let span = params.days.unwrap_or(DEFAULT_CALENDAR_DAYS);
    if span == 0 || span > MAX_CALENDAR_DAYS {
        return Err(DomainError::InvalidValue {
            message: format!("Calendar days must be 1-{}, got {}", MAX_CALENDAR_DAYS, span)
        }
        .into());
    }

    let habit = require_habit(engine.store().as_ref(), params.habit_id).await?;
    let check_ins = engine.store().check_ins_for_habit(habit.id).await?;

    let days = check_in_calendar(&check_ins, engine.clock().today(), span);
    let checked_in_days = days.iter().filter(|day| day.checked_in).count();

    let message = format!(
        "'{}' checked in on {} of the last {} days",
        habit.name,
        checked_in_days,
        span
    );
    Ok(CalendarResponse { days, checked_in_days, message })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use chrono::NaiveDate;
    use crate::domain::{FixedClock, Frequency, NewHabit};
    use crate::storage::{HabitStore, SqliteStorage, StorageError};

    async fn engine_with_habit(today: NaiveDate) -> (CheckInEngine<SqliteStorage, FixedClock>, HabitId) {
        let storage = Arc::new(SqliteStorage::in_memory().unwrap());
        let habit = storage
            .insert_habit(&NewHabit::new("Floss".to_string(), None, Frequency::Daily, None).unwrap())
            .await
            .unwrap();
        (CheckInEngine::with_clock(storage, FixedClock::on(today)), habit.id)
    }

    #[tokio::test]
    async fn test_check_in_then_undo() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        let (engine, habit_id) = engine_with_habit(today).await;

        let first = check_in_habit(&engine, habit_id).await.unwrap();
        assert!(first.success);
        assert_eq!(first.current_streak, 1);

        let again = check_in_habit(&engine, habit_id).await.unwrap();
        assert!(!again.success);
        assert_eq!(again.current_streak, 1);

        let undo = undo_check_in(&engine, habit_id).await.unwrap();
        assert!(undo.success);
        assert_eq!(undo.current_streak, 0);

        assert!(!undo_check_in(&engine, habit_id).await.unwrap().success);
    }

    #[tokio::test]
    async fn test_calendar_marks_today() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        let (engine, habit_id) = engine_with_habit(today).await;
        check_in_habit(&engine, habit_id).await.unwrap();

        let calendar = habit_calendar(&engine, CalendarParams { habit_id, days: None }).await.unwrap();

        assert_eq!(calendar.days.len(), 30);
        assert_eq!(calendar.checked_in_days, 1);
        assert_eq!(calendar.days.last().map(|d| d.date), Some(today));
    }

    #[tokio::test]
    async fn test_calendar_rejects_out_of_range_days() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        let (engine, habit_id) = engine_with_habit(today).await;

        for days in [0, MAX_CALENDAR_DAYS + 1, 200_000_000] {
            let result = habit_calendar(&engine, CalendarParams { habit_id, days: Some(days) }).await;
            assert!(matches!(result, Err(AppError::Domain(DomainError::InvalidValue { .. }))));
        }

        let longest = habit_calendar(&engine, CalendarParams { habit_id, days: Some(MAX_CALENDAR_DAYS) })
            .await
            .unwrap();
        assert_eq!(longest.days.len(), MAX_CALENDAR_DAYS as usize);
    }

    #[tokio::test]
    async fn test_check_in_unknown_habit() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        let (engine, _) = engine_with_habit(today).await;

        let result = check_in_habit(&engine, HabitId(99)).await;
        assert!(matches!(result, Err(AppError::Database(StorageError::HabitNotFound { .. }))));
    }
}
