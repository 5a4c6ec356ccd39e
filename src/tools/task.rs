/// Task commands

use serde::{Deserialize, Serialize};
use crate::agenda::{tag_tasks, Tagged};
use crate::domain::{NewTask, Tag, Task, TaskId};
use crate::storage::{StorageError, TagStore, TaskStore};
use crate::tools::{get_or_create_tag, optional_text, parse_due_date};
use crate::AppError;

/// Parameters for creating a task
#[derive(Debug, Deserialize)]
pub struct CreateTaskParams {
    pub title: String,
    pub description: Option<String>,
    /// "YYYY-MM-DD HH:MM" or "YYYY-MM-DD"
    pub due_date: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub task: Task,
    pub message: String,
}

pub async fn create_task<S: TaskStore + TagStore>(
    storage: &S,
    params: CreateTaskParams,
) -> Result<TaskResponse, AppError> {
    let due_date = params.due_date.as_deref().map(parse_due_date).transpose()?;
    let new_task = NewTask::new(params.title, optional_text(params.description).flatten(), due_date)?;
    for name in &params.tags {
        Tag::validate_name(name)?;
    }

    let task = storage.insert_task(&new_task).await?;
    for name in &params.tags {
        let tag = get_or_create_tag(storage, name).await?;
        storage.assign_tag_to_task(task.id, tag.id).await?;
    }

    let message = match task.due_date {
        Some(due) => format!("Created task '{}' due {}", task.title, due.format("%Y-%m-%d %H:%M")),
        None => format!("Created task '{}'", task.title),
    };
    Ok(TaskResponse { task, message })
}

#[derive(Debug, Serialize)]
pub struct ListTasksResponse {
    pub tasks: Vec<Tagged<Task>>,
    pub message: String,
}

/// All tasks by due date, with their tags
pub async fn list_tasks<S: TaskStore + TagStore>(
    storage: &S,
    include_completed: bool,
) -> Result<ListTasksResponse, AppError> {
    let tasks: Vec<Task> = storage
        .list_tasks()
        .await?
        .into_iter()
        .filter(|task| include_completed || !task.is_completed)
        .collect();
    let tasks = tag_tasks(storage, tasks).await?;

    let message = if tasks.is_empty() {
        "No tasks".to_string()
    } else {
        super::plural(tasks.len(), "task", "tasks")
    };
    Ok(ListTasksResponse { tasks, message })
}

/// Parameters for editing a task; an empty description or due date clears it
#[derive(Debug, Deserialize)]
pub struct UpdateTaskParams {
    pub task_id: TaskId,
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<String>,
}

pub async fn update_task<S: TaskStore>(storage: &S, params: UpdateTaskParams) -> Result<TaskResponse, AppError> {
    let mut task = require_task(storage, params.task_id).await?;

    let due_date = match optional_text(params.due_date) {
        Some(Some(text)) => Some(Some(parse_due_date(&text)?)),
        Some(None) => Some(None),
        None => None,
    };
    task.update(params.title, optional_text(params.description), due_date)?;
    storage.update_task(&task).await?;

    let message = format!("Updated task '{}'", task.title);
    Ok(TaskResponse { task, message })
}

/// Mark a task done or not done
pub async fn set_task_completed<S: TaskStore>(
    storage: &S,
    task_id: TaskId,
    completed: bool,
) -> Result<TaskResponse, AppError> {
    let mut task = require_task(storage, task_id).await?;
    task.is_completed = completed;
    storage.update_task(&task).await?;

    let message = if completed {
        format!("✅ Completed '{}'", task.title)
    } else {
        format!("Reopened '{}'", task.title)
    };
    Ok(TaskResponse { task, message })
}

pub async fn delete_task<S: TaskStore>(storage: &S, task_id: TaskId) -> Result<TaskResponse, AppError> {
    let task = require_task(storage, task_id).await?;
    storage.delete_task(task_id).await?;

    let message = format!("Deleted task '{}'", task.title);
    Ok(TaskResponse { task, message })
}

async fn require_task<S: TaskStore>(storage: &S, task_id: TaskId) -> Result<Task, AppError> {
    storage
        .get_task(task_id)
        .await?
        .ok_or_else(|| StorageError::TaskNotFound { task_id }.into())
}
