/// Public library interface for the Ascend habit and task tracker
///
/// This module wires the storage layer, the check-in engine and the command
/// handlers together and exports the types used by the CLI and by tests.

use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

pub mod domain;
pub mod storage;
pub mod engine;
pub mod preferences;
pub mod reminders;
pub mod agenda;
pub mod tools;

// Re-export public modules and types
pub use domain::*;
pub use storage::{
    CheckInLedger, CheckInStore, HabitStore, PreferenceStore, PreferenceValue, SqliteStorage,
    StorageError, StreakChange, TagStore, TaskStore,
};
pub use engine::{CheckInEngine, CheckInError, CheckInOutcome};
pub use preferences::{OnboardingPreferences, ReminderPreferences, ThemePreferences};
pub use reminders::{LogNotifier, Notifier, ReminderError, ReminderKind, ReminderScheduler, ReminderTime};

/// Errors that can occur while running a command
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] StorageError),

    #[error("Domain validation error: {0}")]
    Domain(#[from] DomainError),

    #[error("Check-in error: {0}")]
    CheckIn(#[from] CheckInError),

    #[error("Reminder error: {0}")]
    Reminder(#[from] ReminderError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The application with its storage and check-in engine
///
/// One storage handle is opened here and shared by every component that
/// needs it.
pub struct AscendApp<C = SystemClock> {
    storage: Arc<SqliteStorage>,
    engine: CheckInEngine<SqliteStorage, C>,
}

impl AscendApp<SystemClock> {
    /// Open the application on the given database file
    ///
    /// This will initialize the SQLite database with the required schema
    /// if it doesn't already exist.
    pub async fn new(db_path: PathBuf) -> Result<Self, AppError> {
        tracing::info!("Initializing Ascend with database: {:?}", db_path);
        let storage = Arc::new(SqliteStorage::new(db_path)?);
        Ok(Self::from_storage(storage, SystemClock))
    }
}

impl<C: Clock + Clone> AscendApp<C> {
    /// Build the application around an existing storage handle and clock
    pub fn from_storage(storage: Arc<SqliteStorage>, clock: C) -> Self {
        let engine = CheckInEngine::with_clock(storage.clone(), clock);
        Self { storage, engine }
    }

    /// Get a reference to the storage layer
    pub fn storage(&self) -> &Arc<SqliteStorage> {
        &self.storage
    }

    pub fn engine(&self) -> &CheckInEngine<SqliteStorage, C> {
        &self.engine
    }

    pub fn clock(&self) -> &C {
        self.engine.clock()
    }

    /// Reminder scheduler delivering through `notifier`
    pub fn reminders<N: Notifier>(&self, notifier: N) -> ReminderScheduler<SqliteStorage, N, C> {
        ReminderScheduler::new(self.storage.clone(), notifier, self.clock().clone())
    }

    pub fn onboarding(&self) -> OnboardingPreferences<SqliteStorage> {
        OnboardingPreferences::new(self.storage.clone())
    }

    pub fn theme(&self) -> ThemePreferences<SqliteStorage> {
        ThemePreferences::new(self.storage.clone())
    }
}
