/// Command handlers for habits, tasks, tags and settings
///
/// Each handler takes a parameter struct, performs one user action against
/// the stores or the check-in engine and returns a serializable response with
/// a human-readable message.

pub mod habit;
pub mod check_in;
pub mod task;
pub mod tag;
pub mod today;
pub mod search;
pub mod settings;

// Re-export tool functions for easy access
pub use habit::*;
pub use check_in::*;
pub use task::*;
pub use tag::*;
pub use today::*;
pub use search::*;
pub use settings::*;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use crate::domain::DomainError;

/// Parse a "YYYY-MM-DD" date
pub fn parse_date(input: &str) -> Result<NaiveDate, DomainError> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| DomainError::InvalidDate(format!("'{}' is not a YYYY-MM-DD date", input.trim())))
}

/// Parse a due time given as "YYYY-MM-DD HH:MM" or a bare date
///
/// A bare date is due at midnight.
pub fn parse_due_date(input: &str) -> Result<NaiveDateTime, DomainError> {
    let trimmed = input.trim();
    if let Ok(at) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M") {
        return Ok(at);
    }
    parse_date(trimmed)
        .map(|day| day.and_time(NaiveTime::MIN))
        .map_err(|_| DomainError::InvalidDate(format!("'{}' is not a YYYY-MM-DD [HH:MM] due date", trimmed)))
}

/// Empty text clears an optional field
fn optional_text(input: Option<String>) -> Option<Option<String>> {
    input.map(|text| {
        let trimmed = text.trim();
        if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
    })
}

fn plural(count: usize, one: &str, many: &str) -> String {
    format!("{} {}", count, if count == 1 { one } else { many })
}
