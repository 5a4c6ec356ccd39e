/// Tag commands
///
/// Tags are created on first use and looked up by name without regard to
/// case, so "Health" and "health" are the same tag.

use serde::{Deserialize, Serialize};
use crate::domain::{HabitId, Tag, TaskId};
use crate::storage::{HabitStore, StorageError, TagStore, TaskStore};
use crate::AppError;

/// What a tag is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "id")]
pub enum TagTarget {
    Habit(HabitId),
    Task(TaskId),
}

/// Parameters for linking or unlinking a tag
#[derive(Debug, Deserialize)]
pub struct TagLinkParams {
    pub target: TagTarget,
    pub tag: String,
}

#[derive(Debug, Serialize)]
pub struct TagResponse {
    pub tag: Tag,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ListTagsResponse {
    pub tags: Vec<Tag>,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct TagLinkResponse {
    pub success: bool,
    pub message: String,
}

/// Find a tag by name, creating it when missing
pub async fn get_or_create_tag<S: TagStore>(storage: &S, name: &str) -> Result<Tag, AppError> {
    let name = Tag::validate_name(name)?;
    if let Some(existing) = storage.find_tag_by_name(&name).await? {
        return Ok(existing);
    }
    Ok(storage.insert_tag(&name).await?)
}

/// Create a tag, or return the existing one with that name
pub async fn create_tag<S: TagStore>(storage: &S, name: &str) -> Result<TagResponse, AppError> {
    let existed = storage.find_tag_by_name(name).await?.is_some();
    let tag = get_or_create_tag(storage, name).await?;

    let message = if existed {
        format!("Tag '{}' already exists", tag.name)
    } else {
        format!("Created tag '{}'", tag.name)
    };
    Ok(TagResponse { tag, message })
}

pub async fn list_tags<S: TagStore>(storage: &S) -> Result<ListTagsResponse, AppError> {
    let tags = storage.list_tags().await?;
    let message = if tags.is_empty() {
        "No tags yet".to_string()
    } else {
        super::plural(tags.len(), "tag", "tags")
    };
    Ok(ListTagsResponse { tags, message })
}

/// Delete a tag by name along with all its links
pub async fn delete_tag<S: TagStore>(storage: &S, name: &str) -> Result<TagResponse, AppError> {
    let tag = find_existing(storage, name).await?;
    storage.delete_tag(tag.id).await?;

    let message = format!("Deleted tag '{}'", tag.name);
    Ok(TagResponse { tag, message })
}

/// Attach a tag to a habit or task, creating the tag if needed
pub async fn assign_tag<S>(storage: &S, params: TagLinkParams) -> Result<TagLinkResponse, AppError>
where
    S: TagStore + HabitStore + TaskStore,
{
    let label = ensure_target(storage, params.target).await?;
    let tag = get_or_create_tag(storage, &params.tag).await?;

    match params.target {
        TagTarget::Habit(habit_id) => storage.assign_tag_to_habit(habit_id, tag.id).await?,
        TagTarget::Task(task_id) => storage.assign_tag_to_task(task_id, tag.id).await?,
    }

    Ok(TagLinkResponse {
        success: true,
        message: format!("Tagged {} with '{}'", label, tag.name),
    })
}

/// Detach a tag from a habit or task
pub async fn unassign_tag<S>(storage: &S, params: TagLinkParams) -> Result<TagLinkResponse, AppError>
where
    S: TagStore + HabitStore + TaskStore,
{
    let label = ensure_target(storage, params.target).await?;
    let tag = find_existing(storage, &params.tag).await?;

    match params.target {
        TagTarget::Habit(habit_id) => storage.remove_tag_from_habit(habit_id, tag.id).await?,
        TagTarget::Task(task_id) => storage.remove_tag_from_task(task_id, tag.id).await?,
    }

    Ok(TagLinkResponse {
        success: true,
        message: format!("Removed tag '{}' from {}", tag.name, label),
    })
}

async fn find_existing<S: TagStore>(storage: &S, name: &str) -> Result<Tag, AppError> {
    storage.find_tag_by_name(name).await?.ok_or_else(|| {
        AppError::Domain(crate::domain::DomainError::Validation {
            message: format!("No tag named '{}'", name.trim()),
        })
    })
}

async fn ensure_target<S: HabitStore + TaskStore>(storage: &S, target: TagTarget) -> Result<String, AppError> {
    match target {
        TagTarget::Habit(habit_id) => match storage.get_habit(habit_id).await? {
            Some(habit) => Ok(format!("habit '{}'", habit.name)),
            None => Err(StorageError::HabitNotFound { habit_id }.into()),
        },
        TagTarget::Task(task_id) => match storage.get_task(task_id).await? {
            Some(task) => Ok(format!("task '{}'", task.title)),
            None => Err(StorageError::TaskNotFound { task_id }.into()),
        },
    }
}
