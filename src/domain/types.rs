/// Core types and enums used throughout the domain layer
///
/// This module defines the identifier newtypes and the Frequency class that
/// decides how habit streaks continue.

use std::fmt;
use serde::{Deserialize, Serialize};
use crate::domain::DomainError;

/// Unique identifier for a habit
///
/// Ids are assigned by the store when a habit is first saved and never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HabitId(pub i64);

/// Unique identifier for a single check-in record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CheckInId(pub i64);

/// Unique identifier for a one-off task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(pub i64);

/// Unique identifier for a tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TagId(pub i64);

macro_rules! display_id {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.0)
                }
            }
        )*
    };
}

display_id!(HabitId, CheckInId, TaskId, TagId);

/// How often a habit should be performed
///
/// The frequency decides which gap between two check-ins still counts as a
/// continued streak. Values read back from storage that are not one of the
/// known classes are kept verbatim in `Other` and never continue a streak.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Frequency {
    /// Once per local calendar day
    Daily,
    /// Once per ISO week
    Weekly,
    /// Once per calendar month
    Monthly,
    /// Unrecognized stored value
    Other(String),
}

impl Frequency {
    /// The canonical lowercase name stored in the database
    pub fn as_str(&self) -> &str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Other(raw) => raw,
        }
    }

    /// Parse user input, rejecting anything but the three known classes
    pub fn parse_strict(input: &str) -> Result<Self, DomainError> {
        match Frequency::from(input) {
            Frequency::Other(_) => Err(DomainError::InvalidFrequency(format!(
                "'{}'. Valid options: daily, weekly, monthly",
                input.trim()
            ))),
            known => Ok(known),
        }
    }

    /// Whether this is one of the known frequency classes
    pub fn is_known(&self) -> bool {
        !matches!(self, Frequency::Other(_))
    }
}

impl From<&str> for Frequency {
    fn from(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "daily" => Frequency::Daily,
            "weekly" => Frequency::Weekly,
            "monthly" => Frequency::Monthly,
            _ => Frequency::Other(value.to_string()),
        }
    }
}

impl From<String> for Frequency {
    fn from(value: String) -> Self {
        Frequency::from(value.as_str())
    }
}

impl From<Frequency> for String {
    fn from(value: Frequency) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
