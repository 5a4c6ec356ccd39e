/// Search across habits and tasks

use serde::{Deserialize, Serialize};
use crate::agenda::{search, tag_habits, tag_tasks, SearchResults};
use crate::domain::Tag;
use crate::storage::{HabitStore, TagStore, TaskStore};
use crate::AppError;

/// Parameters for a search
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: String,
    /// Tag names that every result must carry
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    #[serde(flatten)]
    pub results: SearchResults,
    pub message: String,
}

/// Fuzzy search by name, filtered by tags
///
/// Naming a tag that does not exist yields no results.
pub async fn search_items<S>(storage: &S, params: SearchParams) -> Result<SearchResponse, AppError>
where
    S: HabitStore + TaskStore + TagStore,
{
    let mut selected: Vec<Tag> = Vec::with_capacity(params.tags.len());
    for name in &params.tags {
        match storage.find_tag_by_name(name).await? {
            Some(tag) => selected.push(tag),
            None => {
                return Ok(SearchResponse {
                    results: SearchResults { habits: Vec::new(), tasks: Vec::new() },
                    message: format!("No tag named '{}'", name.trim()),
                });
            }
        }
    }

    let habits = tag_habits(storage, storage.list_habits().await?).await?;
    let tasks = tag_tasks(storage, storage.list_tasks().await?).await?;
    let results = search(habits, tasks, params.query.trim(), &selected);

    let message = format!(
        "Found {} and {}",
        super::plural(results.habits.len(), "habit", "habits"),
        super::plural(results.tasks.len(), "task", "tasks")
    );
    Ok(SearchResponse { results, message })
}
