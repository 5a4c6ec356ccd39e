/// Typed access to user preferences
///
/// Each facade owns one namespace of the key-value preference store and
/// supplies the defaults used when a key has never been written.

use std::sync::Arc;
use crate::reminders::{ReminderKind, ReminderTime};
use crate::storage::{PreferenceStore, PreferenceValue, StorageError};

pub const REMINDERS_NAMESPACE: &str = "reminders";
pub const ONBOARDING_NAMESPACE: &str = "onboarding";
pub const THEME_NAMESPACE: &str = "theme";

const HAS_SEEN_ONBOARDING: &str = "has_seen_onboarding";
const DARK_THEME: &str = "dark_theme";

/// Reminder switches and times for habits and tasks
pub struct ReminderPreferences<S> {
    store: Arc<S>,
}

impl<S: PreferenceStore> ReminderPreferences<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Whether the reminder is switched on (off by default)
    pub async fn is_enabled(&self, kind: ReminderKind) -> Result<bool, StorageError> {
        let value = self
            .store
            .get_preference(REMINDERS_NAMESPACE, &enabled_key(kind))
            .await?;
        Ok(value.and_then(|v| v.as_bool()).unwrap_or(false))
    }

    pub async fn set_enabled(&self, kind: ReminderKind, enabled: bool) -> Result<(), StorageError> {
        let key = enabled_key(kind);
        self.store
            .set_preferences(REMINDERS_NAMESPACE, &[(key.as_str(), PreferenceValue::Bool(enabled))])
            .await
    }

    /// Saved reminder time, or the kind's default when unset or unreadable
    pub async fn time(&self, kind: ReminderKind) -> Result<ReminderTime, StorageError> {
        let hour = self.store.get_preference(REMINDERS_NAMESPACE, &hour_key(kind)).await?;
        let minute = self.store.get_preference(REMINDERS_NAMESPACE, &minute_key(kind)).await?;
        let default = kind.default_time();

        let hour = hour.and_then(|v| v.as_int()).unwrap_or(i64::from(default.hour()));
        let minute = minute.and_then(|v| v.as_int()).unwrap_or(i64::from(default.minute()));

        match (u32::try_from(hour), u32::try_from(minute)) {
            (Ok(h), Ok(m)) => Ok(ReminderTime::new(h, m).unwrap_or_else(|_| {
                tracing::warn!("Ignoring invalid saved {} reminder time {}:{}", kind, h, m);
                default
            })),
            _ => {
                tracing::warn!("Ignoring invalid saved {} reminder time {}:{}", kind, hour, minute);
                Ok(default)
            }
        }
    }

    /// Save hour and minute together
    pub async fn set_time(&self, kind: ReminderKind, time: ReminderTime) -> Result<(), StorageError> {
        let hour_key = hour_key(kind);
        let minute_key = minute_key(kind);
        self.store
            .set_preferences(
                REMINDERS_NAMESPACE,
                &[
                    (hour_key.as_str(), PreferenceValue::Int(i64::from(time.hour()))),
                    (minute_key.as_str(), PreferenceValue::Int(i64::from(time.minute()))),
                ],
            )
            .await
    }

    pub async fn clear_all(&self) -> Result<(), StorageError> {
        self.store.clear_preferences(REMINDERS_NAMESPACE).await
    }
}

fn enabled_key(kind: ReminderKind) -> String {
    format!("{}_reminder_enabled", kind.key())
}

fn hour_key(kind: ReminderKind) -> String {
    format!("{}_reminder_hour", kind.key())
}

fn minute_key(kind: ReminderKind) -> String {
    format!("{}_reminder_minute", kind.key())
}

/// First-run onboarding flag
pub struct OnboardingPreferences<S> {
    store: Arc<S>,
}

impl<S: PreferenceStore> OnboardingPreferences<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn has_seen_onboarding(&self) -> Result<bool, StorageError> {
        let value = self.store.get_preference(ONBOARDING_NAMESPACE, HAS_SEEN_ONBOARDING).await?;
        Ok(value.and_then(|v| v.as_bool()).unwrap_or(false))
    }

    pub async fn set_has_seen_onboarding(&self, seen: bool) -> Result<(), StorageError> {
        self.store
            .set_preferences(ONBOARDING_NAMESPACE, &[(HAS_SEEN_ONBOARDING, PreferenceValue::Bool(seen))])
            .await
    }
}

/// Light/dark appearance
pub struct ThemePreferences<S> {
    store: Arc<S>,
}

impl<S: PreferenceStore> ThemePreferences<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn is_dark_theme(&self) -> Result<bool, StorageError> {
        let value = self.store.get_preference(THEME_NAMESPACE, DARK_THEME).await?;
        Ok(value.and_then(|v| v.as_bool()).unwrap_or(false))
    }

    pub async fn set_dark_theme(&self, enabled: bool) -> Result<(), StorageError> {
        self.store
            .set_preferences(THEME_NAMESPACE, &[(DARK_THEME, PreferenceValue::Bool(enabled))])
            .await
    }

    pub async fn clear_all(&self) -> Result<(), StorageError> {
        self.store.clear_preferences(THEME_NAMESPACE).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteStorage;

    fn store() -> Arc<SqliteStorage> {
        Arc::new(SqliteStorage::in_memory().unwrap())
    }

    #[tokio::test]
    async fn test_reminder_defaults() {
        let prefs = ReminderPreferences::new(store());

        assert!(!prefs.is_enabled(ReminderKind::Habit).await.unwrap());
        assert_eq!(prefs.time(ReminderKind::Habit).await.unwrap(), ReminderTime::new(8, 0).unwrap());
        assert_eq!(prefs.time(ReminderKind::Task).await.unwrap(), ReminderTime::new(9, 0).unwrap());
    }

    #[tokio::test]
    async fn test_reminder_kinds_are_independent() {
        let prefs = ReminderPreferences::new(store());
        prefs.set_enabled(ReminderKind::Task, true).await.unwrap();
        prefs.set_time(ReminderKind::Task, ReminderTime::new(21, 45).unwrap()).await.unwrap();

        assert!(prefs.is_enabled(ReminderKind::Task).await.unwrap());
        assert!(!prefs.is_enabled(ReminderKind::Habit).await.unwrap());
        assert_eq!(prefs.time(ReminderKind::Task).await.unwrap(), ReminderTime::new(21, 45).unwrap());

        prefs.clear_all().await.unwrap();
        assert_eq!(prefs.time(ReminderKind::Task).await.unwrap(), ReminderTime::new(9, 0).unwrap());
    }

    #[tokio::test]
    async fn test_corrupt_reminder_time_falls_back() {
        let storage = store();
        storage
            .set_preferences(REMINDERS_NAMESPACE, &[("habit_reminder_hour", PreferenceValue::Int(31))])
            .await
            .unwrap();

        let prefs = ReminderPreferences::new(storage);
        assert_eq!(prefs.time(ReminderKind::Habit).await.unwrap(), ReminderTime::new(8, 0).unwrap());
    }

    #[tokio::test]
    async fn test_onboarding_and_theme_flags() {
        let storage = store();
        let onboarding = OnboardingPreferences::new(storage.clone());
        let theme = ThemePreferences::new(storage);

        assert!(!onboarding.has_seen_onboarding().await.unwrap());
        onboarding.set_has_seen_onboarding(true).await.unwrap();
        assert!(onboarding.has_seen_onboarding().await.unwrap());

        theme.set_dark_theme(true).await.unwrap();
        assert!(theme.is_dark_theme().await.unwrap());
        theme.clear_all().await.unwrap();
        assert!(!theme.is_dark_theme().await.unwrap());
        // Clearing the theme leaves other namespaces alone
        assert!(onboarding.has_seen_onboarding().await.unwrap());
    }
}
