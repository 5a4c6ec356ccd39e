/// The "today" overview
///
/// Lists habits scheduled for today and tasks due today, plus the two badge
/// counts of what is still left.

use chrono::NaiveDate;
use serde::Serialize;
use crate::agenda::{habits_due_today, habits_left_today, tasks_left_today};
use crate::domain::{Habit, Task};
use crate::storage::{HabitStore, TaskStore};
use crate::AppError;

/// Information about a habit scheduled for today
#[derive(Debug, Serialize)]
pub struct HabitToday {
    pub habit: Habit,
    pub done: bool,
}

#[derive(Debug, Serialize)]
pub struct TodayResponse {
    pub date: NaiveDate,
    pub habits: Vec<HabitToday>,
    pub tasks: Vec<Task>,
    pub habits_left: usize,
    pub tasks_left: usize,
    pub message: String,
}

/// Build the overview for `today`
pub async fn today_overview<S: HabitStore + TaskStore>(
    storage: &S,
    today: NaiveDate,
) -> Result<TodayResponse, AppError> {
    let all_habits = storage.list_habits().await?;
    let all_tasks = storage.list_tasks().await?;

    let habits: Vec<HabitToday> = habits_due_today(&all_habits, today)
        .into_iter()
        .map(|habit| HabitToday {
            done: habit.is_checked_in_on(today),
            habit: habit.clone(),
        })
        .collect();
    let tasks: Vec<Task> = all_tasks
        .iter()
        .filter(|task| task.is_due_on(today))
        .cloned()
        .collect();

    let habits_left = habits_left_today(&all_habits, today);
    let tasks_left = tasks_left_today(&all_tasks, today);

    let message = if habits_left == 0 && tasks_left == 0 {
        "🎉 All done for today!".to_string()
    } else {
        format!(
            "{} and {} left today",
            super::plural(habits_left, "habit", "habits"),
            super::plural(tasks_left, "task", "tasks")
        )
    };

    Ok(TodayResponse {
        date: today,
        habits,
        tasks,
        habits_left,
        tasks_left,
        message,
    })
}
