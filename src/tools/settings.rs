/// Reminder, theme and onboarding settings

use chrono::NaiveDateTime;
use serde::Serialize;
use crate::domain::Clock;
use crate::preferences::{OnboardingPreferences, ThemePreferences};
use crate::reminders::{Notifier, ReminderKind, ReminderScheduler, ReminderTime};
use crate::storage::PreferenceStore;
use crate::AppError;

#[derive(Debug, Serialize)]
pub struct ReminderResponse {
    pub kind: ReminderKind,
    pub next_fire: Option<NaiveDateTime>,
    pub message: String,
}

/// Turn on a daily reminder at `time`
pub async fn set_reminder<S: PreferenceStore, N: Notifier, C: Clock>(
    scheduler: &ReminderScheduler<S, N, C>,
    kind: ReminderKind,
    time: ReminderTime,
) -> Result<ReminderResponse, AppError> {
    let next_fire = scheduler.schedule(kind, time).await?;
    Ok(ReminderResponse {
        kind,
        next_fire: Some(next_fire),
        message: format!("⏰ {} reminder set for {} daily", capitalized(kind), time),
    })
}

pub async fn cancel_reminder<S: PreferenceStore, N: Notifier, C: Clock>(
    scheduler: &ReminderScheduler<S, N, C>,
    kind: ReminderKind,
) -> Result<ReminderResponse, AppError> {
    scheduler.cancel(kind).await?;
    Ok(ReminderResponse {
        kind,
        next_fire: None,
        message: format!("{} reminder turned off", capitalized(kind)),
    })
}

/// Saved state of one reminder
#[derive(Debug, Serialize)]
pub struct ReminderStatus {
    pub kind: ReminderKind,
    pub enabled: bool,
    pub time: ReminderTime,
}

#[derive(Debug, Serialize)]
pub struct ReminderStatusResponse {
    pub reminders: Vec<ReminderStatus>,
    pub message: String,
}

pub async fn show_reminders<S: PreferenceStore, N: Notifier, C: Clock>(
    scheduler: &ReminderScheduler<S, N, C>,
) -> Result<ReminderStatusResponse, AppError> {
    let preferences = scheduler.preferences();
    let mut reminders = Vec::with_capacity(ReminderKind::ALL.len());
    for kind in ReminderKind::ALL {
        reminders.push(ReminderStatus {
            kind,
            enabled: preferences.is_enabled(kind).await?,
            time: preferences.time(kind).await?,
        });
    }

    let message = reminders
        .iter()
        .map(|r| format!("{}: {} at {}", capitalized(r.kind), if r.enabled { "on" } else { "off" }, r.time))
        .collect::<Vec<_>>()
        .join(", ");
    Ok(ReminderStatusResponse { reminders, message })
}

#[derive(Debug, Serialize)]
pub struct FlagResponse {
    pub enabled: bool,
    pub message: String,
}

/// Read the dark theme flag, setting it first when `dark` is given
pub async fn theme<S: PreferenceStore>(
    preferences: &ThemePreferences<S>,
    dark: Option<bool>,
) -> Result<FlagResponse, AppError> {
    if let Some(dark) = dark {
        preferences.set_dark_theme(dark).await?;
    }
    let enabled = preferences.is_dark_theme().await?;
    let message = format!("Theme: {}", if enabled { "dark" } else { "light" });
    Ok(FlagResponse { enabled, message })
}

/// Read the onboarding flag, setting it first when `seen` is given
pub async fn onboarding<S: PreferenceStore>(
    preferences: &OnboardingPreferences<S>,
    seen: Option<bool>,
) -> Result<FlagResponse, AppError> {
    if let Some(seen) = seen {
        preferences.set_has_seen_onboarding(seen).await?;
    }
    let enabled = preferences.has_seen_onboarding().await?;
    let message = if enabled {
        "Onboarding complete".to_string()
    } else {
        "Onboarding not yet seen".to_string()
    };
    Ok(FlagResponse { enabled, message })
}

fn capitalized(kind: ReminderKind) -> &'static str {
    match kind {
        ReminderKind::Habit => "Habit",
        ReminderKind::Task => "Task",
    }
}
