/// Habit management commands
///
/// Create, list, show, edit and delete habits. Edits never touch the streak
/// or the last check-in; those only change through the check-in engine.

use serde::{Deserialize, Serialize};
use crate::agenda::{tag_habits, Tagged};
use crate::domain::{Frequency, Habit, HabitId, NewHabit, Tag};
use crate::storage::{CheckInStore, HabitStore, StorageError, TagStore};
use crate::tools::{get_or_create_tag, optional_text, parse_date};
use crate::AppError;

/// Parameters for creating a new habit
#[derive(Debug, Deserialize)]
pub struct CreateHabitParams {
    pub name: String,
    pub description: Option<String>,
    pub frequency: String,
    /// "YYYY-MM-DD"; anchors weekly and monthly schedules
    pub start_date: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Response from creating a habit
#[derive(Debug, Serialize)]
pub struct CreateHabitResponse {
    pub habit: Habit,
    pub tags: Vec<Tag>,
    pub message: String,
}

/// Create a new habit and attach its tags
pub async fn create_habit<S: HabitStore + TagStore>(
    storage: &S,
    params: CreateHabitParams,
) -> Result<CreateHabitResponse, AppError> {
    let frequency = Frequency::parse_strict(&params.frequency)?;
    let start_date = params.start_date.as_deref().map(parse_date).transpose()?;
    let description = optional_text(params.description).flatten();

    let new_habit = NewHabit::new(params.name, description, frequency, start_date)?;

    // Tag names are checked before anything is saved
    for name in &params.tags {
        Tag::validate_name(name)?;
    }

    let habit = storage.insert_habit(&new_habit).await?;

    let mut tags = Vec::with_capacity(params.tags.len());
    for name in &params.tags {
        let tag = get_or_create_tag(storage, name).await?;
        if !tags.contains(&tag) {
            storage.assign_tag_to_habit(habit.id, tag.id).await?;
            tags.push(tag);
        }
    }

    let message = format!("Created {} habit '{}'", habit.frequency, habit.name);
    Ok(CreateHabitResponse { habit, tags, message })
}

#[derive(Debug, Serialize)]
pub struct ListHabitsResponse {
    pub habits: Vec<Tagged<Habit>>,
    pub message: String,
}

/// All habits with their tags, newest first
pub async fn list_habits<S: HabitStore + TagStore>(storage: &S) -> Result<ListHabitsResponse, AppError> {
    let habits = tag_habits(storage, storage.list_habits().await?).await?;

    let message = if habits.is_empty() {
        "No habits yet. Create one to start a streak!".to_string()
    } else {
        super::plural(habits.len(), "habit", "habits")
    };
    Ok(ListHabitsResponse { habits, message })
}

#[derive(Debug, Serialize)]
pub struct ShowHabitResponse {
    pub habit: Habit,
    pub tags: Vec<Tag>,
    pub total_check_ins: usize,
    pub message: String,
}

/// One habit with its tags and check-in count
pub async fn show_habit<S>(storage: &S, habit_id: HabitId) -> Result<ShowHabitResponse, AppError>
where
    S: HabitStore + CheckInStore + TagStore,
{
    let habit = require_habit(storage, habit_id).await?;
    let tags = storage.tags_for_habit(habit_id).await?;
    let total_check_ins = storage.check_ins_for_habit(habit_id).await?.len();

    let message = format!(
        "'{}': {} streak of {}",
        habit.name,
        habit.frequency,
        habit.streak_count
    );
    Ok(ShowHabitResponse { habit, tags, total_check_ins, message })
}

/// Parameters for updating an existing habit
///
/// An empty description or start date clears the field.
#[derive(Debug, Deserialize)]
pub struct UpdateHabitParams {
    pub habit_id: HabitId,
    pub name: Option<String>,
    pub description: Option<String>,
    pub frequency: Option<String>,
    pub start_date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UpdateHabitResponse {
    pub habit: Habit,
    pub message: String,
}

/// Update an existing habit's editable fields
pub async fn update_habit<S: HabitStore>(
    storage: &S,
    params: UpdateHabitParams,
) -> Result<UpdateHabitResponse, AppError> {
    let mut habit = require_habit(storage, params.habit_id).await?;

    let frequency = params.frequency.as_deref().map(Frequency::parse_strict).transpose()?;
    let start_date = match optional_text(params.start_date) {
        Some(Some(text)) => Some(Some(parse_date(&text)?)),
        Some(None) => Some(None),
        None => None,
    };

    habit.update(params.name, optional_text(params.description), frequency, start_date)?;
    storage.update_habit(&habit).await?;

    let message = format!("Updated habit '{}'", habit.name);
    Ok(UpdateHabitResponse { habit, message })
}

#[derive(Debug, Serialize)]
pub struct DeleteHabitResponse {
    pub success: bool,
    pub message: String,
}

/// Delete a habit with its check-ins and tag links
pub async fn delete_habit<S: HabitStore>(storage: &S, habit_id: HabitId) -> Result<DeleteHabitResponse, AppError> {
    let habit = require_habit(storage, habit_id).await?;
    storage.delete_habit(habit_id).await?;

    Ok(DeleteHabitResponse {
        success: true,
        message: format!("Deleted habit '{}'", habit.name),
    })
}

pub(crate) async fn require_habit<S: HabitStore>(storage: &S, habit_id: HabitId) -> Result<Habit, AppError> {
    storage
        .get_habit(habit_id)
        .await?
        .ok_or_else(|| StorageError::HabitNotFound { habit_id }.into())
}
