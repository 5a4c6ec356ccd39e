/// Daily reminder planning
///
/// Reminders fire once a day at a user-chosen local time. This module works
/// out when the next reminder is due and hands it to a [`Notifier`], which
/// owns actual delivery.

use std::fmt;
use std::sync::Arc;
use async_trait::async_trait;
use chrono::{Duration, NaiveDateTime, NaiveTime, Timelike};
use serde::Serialize;
use thiserror::Error;

use crate::domain::{Clock, DomainError};
use crate::preferences::ReminderPreferences;
use crate::storage::{PreferenceStore, StorageError};

/// Errors that can occur while planning reminders
#[derive(Error, Debug)]
pub enum ReminderError {
    #[error("Reminder preferences error: {0}")]
    Preferences(#[from] StorageError),

    #[error("Notifier error: {0}")]
    Notifier(String),
}

/// What a reminder nudges the user about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderKind {
    Habit,
    Task,
}

impl ReminderKind {
    pub const ALL: [ReminderKind; 2] = [ReminderKind::Habit, ReminderKind::Task];

    /// Prefix used for preference keys
    pub fn key(&self) -> &'static str {
        match self {
            ReminderKind::Habit => "habit",
            ReminderKind::Task => "task",
        }
    }

    /// Tag identifying this kind's scheduled work with the notifier
    pub fn schedule_tag(&self) -> &'static str {
        match self {
            ReminderKind::Habit => "habit_reminder_work",
            ReminderKind::Task => "task_reminder_work",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ReminderKind::Habit => "Don't forget your habits today!",
            ReminderKind::Task => "Don't forget your tasks today!",
        }
    }

    pub fn default_time(&self) -> ReminderTime {
        match self {
            ReminderKind::Habit => ReminderTime { hour: 8, minute: 0 },
            ReminderKind::Task => ReminderTime { hour: 9, minute: 0 },
        }
    }
}

impl fmt::Display for ReminderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A local wall-clock time of day, minute precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReminderTime {
    hour: u32,
    minute: u32,
}

impl ReminderTime {
    pub fn new(hour: u32, minute: u32) -> Result<Self, DomainError> {
        if hour > 23 {
            return Err(DomainError::InvalidValue {
                message: format!("Reminder hour must be 0-23, got {}", hour)
            });
        }
        if minute > 59 {
            return Err(DomainError::InvalidValue {
                message: format!("Reminder minute must be 0-59, got {}", minute)
            });
        }
        Ok(Self { hour, minute })
    }

    /// Parse "HH:MM"
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let time = NaiveTime::parse_from_str(input.trim(), "%H:%M").map_err(|_| {
            DomainError::InvalidValue {
                message: format!("Invalid reminder time '{}', expected HH:MM", input.trim())
            }
        })?;
        Self::new(time.hour(), time.minute())
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    /// Next occurrence strictly after `now`
    ///
    /// Today at this time if that is still ahead, otherwise tomorrow.
    pub fn next_fire_after(&self, now: NaiveDateTime) -> NaiveDateTime {
        let at = NaiveTime::from_hms_opt(self.hour, self.minute, 0)
            .unwrap_or(NaiveTime::MIN);
        let today = now.date().and_time(at);
        if today > now {
            today
        } else {
            today + Duration::days(1)
        }
    }
}

impl fmt::Display for ReminderTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Delivers scheduled local notifications
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Fire `message` once at `at`, identified by `tag`
    async fn schedule(&self, tag: &str, at: NaiveDateTime, message: &str) -> Result<(), ReminderError>;

    /// Drop any pending notification with `tag`
    async fn cancel(&self, tag: &str) -> Result<(), ReminderError>;
}

/// Notifier that only records the plan in the log
///
/// Used when no platform notification service is attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn schedule(&self, tag: &str, at: NaiveDateTime, message: &str) -> Result<(), ReminderError> {
        tracing::info!("Reminder '{}' planned for {}: {}", tag, at, message);
        Ok(())
    }

    async fn cancel(&self, tag: &str) -> Result<(), ReminderError> {
        tracing::info!("Reminder '{}' cancelled", tag);
        Ok(())
    }
}

/// Keeps the notifier in step with the saved reminder preferences
pub struct ReminderScheduler<S, N, C> {
    preferences: ReminderPreferences<S>,
    notifier: N,
    clock: C,
}

impl<S: PreferenceStore, N: Notifier, C: Clock> ReminderScheduler<S, N, C> {
    pub fn new(store: Arc<S>, notifier: N, clock: C) -> Self {
        Self {
            preferences: ReminderPreferences::new(store),
            notifier,
            clock,
        }
    }

    pub fn preferences(&self) -> &ReminderPreferences<S> {
        &self.preferences
    }

    /// Save and enable a reminder, replacing any pending one of that kind
    pub async fn schedule(&self, kind: ReminderKind, time: ReminderTime) -> Result<NaiveDateTime, ReminderError> {
        self.preferences.set_time(kind, time).await?;
        self.preferences.set_enabled(kind, true).await?;
        self.plan(kind, time).await
    }

    /// Disable a reminder and drop any pending one
    pub async fn cancel(&self, kind: ReminderKind) -> Result<(), ReminderError> {
        self.preferences.set_enabled(kind, false).await?;
        self.notifier.cancel(kind.schedule_tag()).await
    }

    /// Re-plan every enabled reminder from its saved time
    ///
    /// Run at startup; returns the kinds that were planned with their next
    /// fire times.
    pub async fn reschedule_all(&self) -> Result<Vec<(ReminderKind, NaiveDateTime)>, ReminderError> {
        let mut planned = Vec::new();
        for kind in ReminderKind::ALL {
            if self.preferences.is_enabled(kind).await? {
                let time = self.preferences.time(kind).await?;
                planned.push((kind, self.plan(kind, time).await?));
            }
        }
        Ok(planned)
    }

    /// Plan tomorrow's occurrence after a reminder has fired
    pub async fn on_fired(&self, kind: ReminderKind) -> Result<Option<NaiveDateTime>, ReminderError> {
        if !self.preferences.is_enabled(kind).await? {
            return Ok(None);
        }
        let time = self.preferences.time(kind).await?;
        self.plan(kind, time).await.map(Some)
    }

    async fn plan(&self, kind: ReminderKind, time: ReminderTime) -> Result<NaiveDateTime, ReminderError> {
        let tag = kind.schedule_tag();
        let at = time.next_fire_after(self.clock.now());

        self.notifier.cancel(tag).await?;
        self.notifier.schedule(tag, at, kind.message()).await?;

        tracing::debug!("Planned {} reminder for {}", kind, at);
        Ok(at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tokio::sync::Mutex;
    use crate::domain::FixedClock;
    use crate::storage::SqliteStorage;

    #[derive(Default)]
    struct RecordingNotifier {
        pending: Mutex<Vec<(String, NaiveDateTime, String)>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn schedule(&self, tag: &str, at: NaiveDateTime, message: &str) -> Result<(), ReminderError> {
            self.pending.lock().await.push((tag.to_string(), at, message.to_string()));
            Ok(())
        }

        async fn cancel(&self, tag: &str) -> Result<(), ReminderError> {
            self.pending.lock().await.retain(|(t, _, _)| t != tag);
            Ok(())
        }
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap().and_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_reminder_time_validation() {
        assert!(ReminderTime::new(23, 59).is_ok());
        assert!(ReminderTime::new(24, 0).is_err());
        assert!(ReminderTime::new(7, 60).is_err());
        assert_eq!(ReminderTime::parse("07:05").unwrap().to_string(), "07:05");
        assert!(ReminderTime::parse("7pm").is_err());
    }

    #[test]
    fn test_next_fire_rolls_over_to_tomorrow() {
        let time = ReminderTime::new(8, 0).unwrap();
        assert_eq!(time.next_fire_after(at(7, 59)), at(8, 0));
        // Exactly on time counts as passed
        assert_eq!(time.next_fire_after(at(8, 0)), at(8, 0) + Duration::days(1));
        assert_eq!(time.next_fire_after(at(22, 0)), at(8, 0) + Duration::days(1));
    }

    #[tokio::test]
    async fn test_schedule_replaces_pending_reminder() {
        let store = Arc::new(SqliteStorage::in_memory().unwrap());
        let scheduler = ReminderScheduler::new(store, RecordingNotifier::default(), FixedClock(at(12, 0)));

        scheduler.schedule(ReminderKind::Habit, ReminderTime::new(8, 0).unwrap()).await.unwrap();
        scheduler.schedule(ReminderKind::Habit, ReminderTime::new(18, 30).unwrap()).await.unwrap();

        let pending = scheduler.notifier.pending.lock().await.clone();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].1, at(18, 30));
        assert_eq!(pending[0].2, "Don't forget your habits today!");
    }

    #[tokio::test]
    async fn test_reschedule_only_enabled_kinds() {
        let store = Arc::new(SqliteStorage::in_memory().unwrap());
        let scheduler = ReminderScheduler::new(store, RecordingNotifier::default(), FixedClock(at(12, 0)));

        scheduler.schedule(ReminderKind::Task, ReminderTime::new(9, 0).unwrap()).await.unwrap();
        scheduler.schedule(ReminderKind::Habit, ReminderTime::new(20, 0).unwrap()).await.unwrap();
        scheduler.cancel(ReminderKind::Habit).await.unwrap();

        let planned = scheduler.reschedule_all().await.unwrap();
        assert_eq!(planned, vec![(ReminderKind::Task, at(9, 0) + Duration::days(1))]);
        assert_eq!(scheduler.on_fired(ReminderKind::Habit).await.unwrap(), None);
    }
}
