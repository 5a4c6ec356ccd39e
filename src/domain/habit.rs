/// Habit entity and related functionality
///
/// This module defines the Habit struct that represents a recurring
/// commitment, plus the NewHabit draft used before the store assigns an id.

use serde::{Deserialize, Serialize};
use chrono::NaiveDate;
use crate::domain::{DomainError, Frequency, HabitId};

/// A habit represents something the user wants to do regularly
///
/// The streak fields are owned by the check-in engine; direct edits through
/// [`Habit::update`] never touch them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    /// Store-assigned identifier
    pub id: HabitId,
    /// Display name (e.g., "Morning Run", "Read for 30min")
    pub name: String,
    /// Optional detailed description
    pub description: Option<String>,
    /// How often this habit should be performed
    pub frequency: Frequency,
    /// Consecutive on-schedule check-ins
    pub streak_count: u32,
    /// Local day of the most recent check-in
    pub last_check_in: Option<NaiveDate>,
    /// Day the habit's schedule is anchored on
    pub start_date: Option<NaiveDate>,
}

impl Habit {
    /// Create a habit from existing data (used when loading from database)
    pub fn from_existing(
        id: HabitId,
        name: String,
        description: Option<String>,
        frequency: Frequency,
        streak_count: u32,
        last_check_in: Option<NaiveDate>,
        start_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            id,
            name,
            description,
            frequency,
            streak_count,
            last_check_in,
            start_date,
        }
    }

    /// Update the habit's editable properties with validation
    ///
    /// Nothing is applied unless every supplied value is valid.
    pub fn update(
        &mut self,
        name: Option<String>,
        description: Option<Option<String>>,
        frequency: Option<Frequency>,
        start_date: Option<Option<NaiveDate>>,
    ) -> Result<(), DomainError> {
        if let Some(ref new_name) = name {
            validate_name(new_name)?;
        }
        if let Some(ref new_desc) = description {
            validate_description(new_desc)?;
        }
        if let Some(ref new_freq) = frequency {
            validate_frequency(new_freq)?;
        }

        if let Some(new_name) = name {
            self.name = new_name.trim().to_string();
        }
        if let Some(new_description) = description {
            self.description = new_description;
        }
        if let Some(new_frequency) = frequency {
            self.frequency = new_frequency;
        }
        if let Some(new_start_date) = start_date {
            self.start_date = new_start_date;
        }

        Ok(())
    }

    /// Whether the habit has already been checked in on `today`
    pub fn is_checked_in_on(&self, today: NaiveDate) -> bool {
        self.last_check_in == Some(today)
    }
}

/// A validated habit that has not been saved yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewHabit {
    pub name: String,
    pub description: Option<String>,
    pub frequency: Frequency,
    pub start_date: Option<NaiveDate>,
}

impl NewHabit {
    /// Validate the user-supplied fields of a new habit
    pub fn new(
        name: String,
        description: Option<String>,
        frequency: Frequency,
        start_date: Option<NaiveDate>,
    ) -> Result<Self, DomainError> {
        validate_name(&name)?;
        validate_description(&description)?;
        validate_frequency(&frequency)?;

        Ok(Self {
            name: name.trim().to_string(),
            description,
            frequency,
            start_date,
        })
    }
}

fn validate_name(name: &str) -> Result<(), DomainError> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(DomainError::InvalidHabitName(
            "Habit name cannot be empty".to_string()
        ));
    }

    if trimmed.chars().count() > 100 {
        return Err(DomainError::InvalidHabitName(
            "Habit name cannot be longer than 100 characters".to_string()
        ));
    }

    Ok(())
}

pub(crate) fn validate_description(description: &Option<String>) -> Result<(), DomainError> {
    if let Some(desc) = description {
        if desc.chars().count() > 500 {
            return Err(DomainError::Validation {
                message: "Description cannot be longer than 500 characters".to_string()
            });
        }
    }
    Ok(())
}

fn validate_frequency(frequency: &Frequency) -> Result<(), DomainError> {
    if frequency.is_known() {
        Ok(())
    } else {
        Err(DomainError::InvalidFrequency(format!(
            "'{}'. Valid options: daily, weekly, monthly",
            frequency
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Habit {
        Habit::from_existing(
            HabitId(1),
            "Morning Run".to_string(),
            None,
            Frequency::Daily,
            4,
            NaiveDate::from_ymd_opt(2024, 6, 9),
            None,
        )
    }

    #[test]
    fn test_create_valid_habit() {
        let habit = NewHabit::new(
            "  Morning Run ".to_string(),
            Some("30-minute jog around the neighborhood".to_string()),
            Frequency::Daily,
            None,
        );

        assert!(habit.is_ok());
        let habit = habit.unwrap();
        assert_eq!(habit.name, "Morning Run");
        assert_eq!(habit.frequency, Frequency::Daily);
    }

    #[test]
    fn test_invalid_habit_name() {
        let result = NewHabit::new("   ".to_string(), None, Frequency::Daily, None);
        assert!(matches!(result, Err(DomainError::InvalidHabitName(_))));

        let long_name = "x".repeat(101);
        assert!(NewHabit::new(long_name, None, Frequency::Daily, None).is_err());
    }

    #[test]
    fn test_unknown_frequency_rejected_on_create() {
        let result = NewHabit::new(
            "Stretch".to_string(),
            None,
            Frequency::Other("hourly".to_string()),
            None,
        );
        assert!(matches!(result, Err(DomainError::InvalidFrequency(_))));
    }

    #[test]
    fn test_update_leaves_streak_alone() {
        let mut habit = sample();
        habit
            .update(Some("Evening Run".to_string()), Some(Some("after work".to_string())), Some(Frequency::Weekly), None)
            .unwrap();

        assert_eq!(habit.name, "Evening Run");
        assert_eq!(habit.description.as_deref(), Some("after work"));
        assert_eq!(habit.frequency, Frequency::Weekly);
        assert_eq!(habit.streak_count, 4);
        assert_eq!(habit.last_check_in, NaiveDate::from_ymd_opt(2024, 6, 9));
    }

    #[test]
    fn test_failed_update_applies_nothing() {
        let mut habit = sample();
        let result = habit.update(Some("Renamed".to_string()), Some(Some("x".repeat(501))), None, None);

        assert!(result.is_err());
        assert_eq!(habit.name, "Morning Run");
    }
}
