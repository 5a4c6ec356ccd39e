/// Task and Tag entities
///
/// Tasks are one-off to-dos with an optional due time. Tags are free-form
/// labels shared between habits and tasks.

use serde::{Deserialize, Serialize};
use chrono::{NaiveDate, NaiveDateTime};
use crate::domain::{habit::validate_description, DomainError, TagId, TaskId};

/// A one-off task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: Option<String>,
    /// Local wall-clock due time
    pub due_date: Option<NaiveDateTime>,
    pub is_completed: bool,
}

impl Task {
    /// Whether the task is due at some point during `day`
    pub fn is_due_on(&self, day: NaiveDate) -> bool {
        self.due_date.map(|due| due.date() == day).unwrap_or(false)
    }

    /// Update the task's editable properties with validation
    pub fn update(
        &mut self,
        title: Option<String>,
        description: Option<Option<String>>,
        due_date: Option<Option<NaiveDateTime>>,
    ) -> Result<(), DomainError> {
        if let Some(ref new_title) = title {
            validate_title(new_title)?;
        }
        if let Some(ref new_desc) = description {
            validate_description(new_desc)?;
        }

        if let Some(new_title) = title {
            self.title = new_title.trim().to_string();
        }
        if let Some(new_description) = description {
            self.description = new_description;
        }
        if let Some(new_due_date) = due_date {
            self.due_date = new_due_date;
        }
        Ok(())
    }
}

/// A validated task that has not been saved yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDateTime>,
}

impl NewTask {
    pub fn new(
        title: String,
        description: Option<String>,
        due_date: Option<NaiveDateTime>,
    ) -> Result<Self, DomainError> {
        validate_title(&title)?;
        validate_description(&description)?;

        Ok(Self {
            title: title.trim().to_string(),
            description,
            due_date,
        })
    }
}

/// A label attachable to habits and tasks
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
}

impl Tag {
    /// Validate and normalize a tag name
    pub fn validate_name(name: &str) -> Result<String, DomainError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidValue {
                message: "Tag name cannot be empty".to_string()
            });
        }
        if trimmed.chars().count() > 50 {
            return Err(DomainError::InvalidValue {
                message: "Tag name cannot be longer than 50 characters".to_string()
            });
        }
        Ok(trimmed.to_string())
    }

    /// Case-insensitive name comparison
    pub fn has_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.trim().to_lowercase()
    }
}

fn validate_title(title: &str) -> Result<(), DomainError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(DomainError::Validation {
            message: "Task title cannot be empty".to_string()
        });
    }
    if trimmed.chars().count() > 100 {
        return Err(DomainError::Validation {
            message: "Task title cannot be longer than 100 characters".to_string()
        });
    }
    Ok(())
}
