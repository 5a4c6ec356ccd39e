/// Storage layer for persisting habit data
///
/// This module defines the store interfaces the rest of the crate talks to
/// and the SQLite implementation behind them. Every operation is async so the
/// engine can run as a cooperative unit of work.

pub mod sqlite;
pub mod migrations;

// Re-export the main storage types
pub use sqlite::*;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::domain::{
    CheckIn, Habit, HabitId, NewHabit, NewTask, Tag, TagId, Task, TaskId,
};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Database query error: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Habit not found: {habit_id}")]
    HabitNotFound { habit_id: HabitId },

    #[error("Task not found: {task_id}")]
    TaskNotFound { task_id: TaskId },

    #[error("Tag not found: {tag_id}")]
    TagNotFound { tag_id: TagId },

    #[error("No check-in recorded for habit {habit_id} on {date}")]
    CheckInNotFound { habit_id: HabitId, date: NaiveDate },

    #[error("Migration error: {0}")]
    Migration(String),
}

/// Habit rows
#[async_trait]
pub trait HabitStore: Send + Sync {
    /// Save a new habit with streak 0 and no check-in
    async fn insert_habit(&self, habit: &NewHabit) -> Result<Habit, StorageError>;

    /// Get a habit by id, `None` if it does not exist
    async fn get_habit(&self, habit_id: HabitId) -> Result<Option<Habit>, StorageError>;

    /// Overwrite a habit's editable fields
    async fn update_habit(&self, habit: &Habit) -> Result<(), StorageError>;

    /// Delete a habit together with its check-ins and tag links
    async fn delete_habit(&self, habit_id: HabitId) -> Result<(), StorageError>;

    /// All habits, newest first
    async fn list_habits(&self) -> Result<Vec<Habit>, StorageError>;

    /// Set the streak and last check-in day in a single update
    async fn update_check_in(
        &self,
        habit_id: HabitId,
        last_check_in: Option<NaiveDate>,
        streak: u32,
    ) -> Result<(), StorageError>;
}

/// Check-in history
#[async_trait]
pub trait CheckInStore: Send + Sync {
    /// Record a check-in, replacing any existing one for the same day
    async fn insert_check_in(&self, habit_id: HabitId, date: NaiveDate) -> Result<(), StorageError>;

    /// Remove the check-in for a day, returning whether one existed
    async fn delete_check_in(&self, habit_id: HabitId, date: NaiveDate) -> Result<bool, StorageError>;

    /// All check-ins of a habit, oldest first
    async fn check_ins_for_habit(&self, habit_id: HabitId) -> Result<Vec<CheckIn>, StorageError>;

    /// Whether a check-in exists for the given day
    async fn is_checked_in_on(&self, habit_id: HabitId, date: NaiveDate) -> Result<bool, StorageError>;
}

/// A streak update paired with its check-in history change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreakChange {
    /// Insert the check-in for `date` and move the streak forward
    Record {
        habit_id: HabitId,
        date: NaiveDate,
        streak: u32,
    },
    /// Delete the check-in for `date` and restore the earlier state
    Revert {
        habit_id: HabitId,
        date: NaiveDate,
        restored_last: Option<NaiveDate>,
        streak: u32,
    },
}

/// Stores that can apply a [`StreakChange`] atomically
///
/// The habit row and the check-in history are written in one transaction so
/// they can never disagree after a crash between the two writes.
#[async_trait]
pub trait CheckInLedger: HabitStore + CheckInStore {
    /// Apply both halves of the change or neither
    ///
    /// Reverting a day with no recorded check-in fails with
    /// [`StorageError::CheckInNotFound`] and leaves the habit row untouched.
    async fn apply(&self, change: &StreakChange) -> Result<(), StorageError>;
}

/// One-off tasks
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn insert_task(&self, task: &NewTask) -> Result<Task, StorageError>;

    async fn get_task(&self, task_id: TaskId) -> Result<Option<Task>, StorageError>;

    async fn update_task(&self, task: &Task) -> Result<(), StorageError>;

    async fn delete_task(&self, task_id: TaskId) -> Result<(), StorageError>;

    /// All tasks by due date, undated tasks last
    async fn list_tasks(&self) -> Result<Vec<Task>, StorageError>;
}

/// Tags and their links to habits and tasks
#[async_trait]
pub trait TagStore: Send + Sync {
    async fn insert_tag(&self, name: &str) -> Result<Tag, StorageError>;

    async fn get_tag(&self, tag_id: TagId) -> Result<Option<Tag>, StorageError>;

    /// All tags, oldest first
    async fn list_tags(&self) -> Result<Vec<Tag>, StorageError>;

    /// Case-insensitive lookup by name
    async fn find_tag_by_name(&self, name: &str) -> Result<Option<Tag>, StorageError>;

    async fn delete_tag(&self, tag_id: TagId) -> Result<(), StorageError>;

    async fn assign_tag_to_habit(&self, habit_id: HabitId, tag_id: TagId) -> Result<(), StorageError>;

    async fn remove_tag_from_habit(&self, habit_id: HabitId, tag_id: TagId) -> Result<(), StorageError>;

    async fn tags_for_habit(&self, habit_id: HabitId) -> Result<Vec<Tag>, StorageError>;

    async fn habits_for_tag(&self, tag_id: TagId) -> Result<Vec<Habit>, StorageError>;

    async fn assign_tag_to_task(&self, task_id: TaskId, tag_id: TagId) -> Result<(), StorageError>;

    async fn remove_tag_from_task(&self, task_id: TaskId, tag_id: TagId) -> Result<(), StorageError>;

    async fn tags_for_task(&self, task_id: TaskId) -> Result<Vec<Tag>, StorageError>;

    async fn tasks_for_tag(&self, tag_id: TagId) -> Result<Vec<Task>, StorageError>;
}

/// A scalar preference value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PreferenceValue {
    Bool(bool),
    Int(i64),
}

impl PreferenceValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PreferenceValue::Bool(b) => Some(*b),
            PreferenceValue::Int(_) => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            PreferenceValue::Int(i) => Some(*i),
            PreferenceValue::Bool(_) => None,
        }
    }
}

/// Namespaced key-value settings
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn get_preference(
        &self,
        namespace: &str,
        key: &str,
    ) -> Result<Option<PreferenceValue>, StorageError>;

    /// Write several keys of one namespace atomically
    async fn set_preferences(
        &self,
        namespace: &str,
        values: &[(&str, PreferenceValue)],
    ) -> Result<(), StorageError>;

    /// Remove every key of a namespace
    async fn clear_preferences(&self, namespace: &str) -> Result<(), StorageError>;
}
