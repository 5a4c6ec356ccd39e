/// Today's agenda and search
///
/// Pure views over habits, tasks and check-ins: what is due today, what is
/// still left, a per-day check-in calendar and fuzzy search with tag filters.

use chrono::{Datelike, Duration, NaiveDate};
use futures::future::try_join_all;
use serde::Serialize;

use crate::domain::{CheckIn, Frequency, Habit, Tag, Task};
use crate::storage::{StorageError, TagStore};

/// Habits scheduled for `today`
///
/// Weekly habits fall on their start date's weekday and monthly habits on its
/// day of month. Without a start date today stands in as the anchor, so such
/// habits are always due.
pub fn habits_due_today(habits: &[Habit], today: NaiveDate) -> Vec<&Habit> {
    habits.iter().filter(|habit| is_due_on(habit, today)).collect()
}

fn is_due_on(habit: &Habit, today: NaiveDate) -> bool {
    match habit.frequency {
        Frequency::Daily => true,
        Frequency::Weekly => {
            let anchor = habit.start_date.unwrap_or(today);
            anchor.weekday() == today.weekday()
        }
        Frequency::Monthly => habit.start_date.unwrap_or(today).day() == today.day(),
        Frequency::Other(_) => false,
    }
}

/// Habits not yet checked in today
pub fn habits_left_today(habits: &[Habit], today: NaiveDate) -> usize {
    habits
        .iter()
        .filter(|habit| habit.last_check_in.map_or(true, |last| last < today))
        .count()
}

/// Incomplete tasks due today
pub fn tasks_left_today(tasks: &[Task], today: NaiveDate) -> usize {
    tasks
        .iter()
        .filter(|task| !task.is_completed && task.is_due_on(today))
        .count()
}

/// One cell of the check-in calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub checked_in: bool,
}

/// The last `days` days ending with `today`, oldest first
///
/// Days before the earliest representable date are left out.
pub fn check_in_calendar(check_ins: &[CheckIn], today: NaiveDate, days: u32) -> Vec<CalendarDay> {
    (0..i64::from(days))
        .rev()
        .filter_map(|offset| today.checked_sub_signed(Duration::days(offset)))
        .map(|date| CalendarDay {
            date,
            checked_in: check_ins.iter().any(|c| c.check_in_date == date),
        })
        .collect()
}

/// Case-insensitive subsequence match
///
/// Every character of `query` must appear in `text` in order, so "rdbk"
/// matches "Read a book". An empty query matches everything.
pub fn fuzzy_match(text: &str, query: &str) -> bool {
    let mut haystack = text.chars().flat_map(char::to_lowercase);
    query
        .chars()
        .flat_map(char::to_lowercase)
        .all(|needle| haystack.any(|c| c == needle))
}

/// An item with the tags assigned to it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tagged<T> {
    #[serde(flatten)]
    pub item: T,
    pub tags: Vec<Tag>,
}

impl<T> Tagged<T> {
    /// Whether every tag in `selected` is assigned
    pub fn has_all_tags(&self, selected: &[Tag]) -> bool {
        selected
            .iter()
            .all(|wanted| self.tags.iter().any(|tag| tag.id == wanted.id))
    }
}

/// Search results split by kind
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResults {
    pub habits: Vec<Tagged<Habit>>,
    pub tasks: Vec<Tagged<Task>>,
}

/// Items whose name fuzzily matches `query` and that carry every selected tag
pub fn search(
    habits: Vec<Tagged<Habit>>,
    tasks: Vec<Tagged<Task>>,
    query: &str,
    selected: &[Tag],
) -> SearchResults {
    SearchResults {
        habits: habits
            .into_iter()
            .filter(|h| fuzzy_match(&h.item.name, query) && h.has_all_tags(selected))
            .collect(),
        tasks: tasks
            .into_iter()
            .filter(|t| fuzzy_match(&t.item.title, query) && t.has_all_tags(selected))
            .collect(),
    }
}

/// Attach each habit's tags
pub async fn tag_habits<S: TagStore>(store: &S, habits: Vec<Habit>) -> Result<Vec<Tagged<Habit>>, StorageError> {
    let tags = try_join_all(habits.iter().map(|h| store.tags_for_habit(h.id))).await?;
    Ok(habits
        .into_iter()
        .zip(tags)
        .map(|(item, tags)| Tagged { item, tags })
        .collect())
}

/// Attach each task's tags
pub async fn tag_tasks<S: TagStore>(store: &S, tasks: Vec<Task>) -> Result<Vec<Tagged<Task>>, StorageError> {
    let tags = try_join_all(tasks.iter().map(|t| store.tags_for_task(t.id))).await?;
    Ok(tasks
        .into_iter()
        .zip(tags)
        .map(|(item, tags)| Tagged { item, tags })
        .collect())
}
