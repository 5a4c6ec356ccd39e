/// SQLite implementation of the storage interfaces
///
/// This module provides the concrete SQLite implementation for storing
/// and retrieving habits, check-ins, tasks, tags and preferences. It handles
/// all SQL queries and data conversion.

use std::path::PathBuf;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tokio::sync::Mutex;

use crate::domain::{
    CheckIn, CheckInId, Frequency, Habit, HabitId, NewHabit, NewTask, Tag, TagId, Task, TaskId,
};
use crate::storage::{
    migrations, CheckInLedger, CheckInStore, HabitStore, PreferenceStore, PreferenceValue,
    StorageError, StreakChange, TagStore, TaskStore,
};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const HABIT_COLUMNS: &str =
    "id, name, description, frequency, streak_count, last_check_in, start_date";

const TASK_COLUMNS: &str = "id, title, description, due_date, is_completed";

/// SQLite-based storage implementation
///
/// The connection sits behind an async mutex; each operation holds the lock
/// only for the statements it runs.
pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    /// Create a new SQLite storage instance
    ///
    /// This opens the database file and runs any necessary migrations
    /// to ensure the schema is up to date.
    pub fn new(db_path: PathBuf) -> Result<Self, StorageError> {
        let conn = Connection::open(&db_path)
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;

        let storage = Self::from_connection(conn)?;
        tracing::info!("SQLite storage initialized at: {:?}", db_path);
        Ok(storage)
    }

    /// Create a throwaway database that lives only in memory
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, StorageError> {
        // Cascading deletes rely on foreign key enforcement
        conn.execute("PRAGMA foreign_keys = ON", [])
            .map_err(|e| StorageError::Connection(format!("Failed to enable foreign keys: {}", e)))?;

        migrations::initialize_database(&conn)?;

        Ok(Self { conn: Mutex::new(conn) })
    }
}

fn invalid_column(idx: usize, what: &str) -> rusqlite::Error {
    rusqlite::Error::InvalidColumnType(idx, what.to_string(), rusqlite::types::Type::Text)
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_date(idx: usize, value: Option<String>) -> rusqlite::Result<Option<NaiveDate>> {
    value
        .map(|s| NaiveDate::parse_from_str(&s, DATE_FORMAT).map_err(|_| invalid_column(idx, "Invalid date")))
        .transpose()
}

fn parse_date_time(idx: usize, value: Option<String>) -> rusqlite::Result<Option<NaiveDateTime>> {
    value
        .map(|s| {
            NaiveDateTime::parse_from_str(&s, DATE_TIME_FORMAT)
                .map_err(|_| invalid_column(idx, "Invalid datetime"))
        })
        .transpose()
}

fn habit_from_row(row: &Row<'_>) -> rusqlite::Result<Habit> {
    let frequency: String = row.get(3)?;

    Ok(Habit::from_existing(
        HabitId(row.get(0)?),
        row.get(1)?, // name
        row.get(2)?, // description
        Frequency::from(frequency),
        row.get(4)?, // streak_count
        parse_date(5, row.get(5)?)?,
        parse_date(6, row.get(6)?)?,
    ))
}

fn check_in_from_row(row: &Row<'_>) -> rusqlite::Result<CheckIn> {
    let date = parse_date(2, Some(row.get(2)?))?.ok_or_else(|| invalid_column(2, "Missing date"))?;
    Ok(CheckIn::from_existing(CheckInId(row.get(0)?), HabitId(row.get(1)?), date))
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: TaskId(row.get(0)?),
        title: row.get(1)?,
        description: row.get(2)?,
        due_date: parse_date_time(3, row.get(3)?)?,
        is_completed: row.get(4)?,
    })
}

fn tag_from_row(row: &Row<'_>) -> rusqlite::Result<Tag> {
    Ok(Tag {
        id: TagId(row.get(0)?),
        name: row.get(1)?,
    })
}

fn set_check_in_columns(
    conn: &Connection,
    habit_id: HabitId,
    last_check_in: Option<NaiveDate>,
    streak: u32,
) -> Result<(), StorageError> {
    let rows_affected = conn.execute(
        "UPDATE habits SET last_check_in = ?2, streak_count = ?3 WHERE id = ?1",
        params![habit_id.0, last_check_in.map(format_date), streak],
    )?;

    if rows_affected == 0 {
        return Err(StorageError::HabitNotFound { habit_id });
    }
    Ok(())
}

#[async_trait]
impl HabitStore for SqliteStorage {
    async fn insert_habit(&self, habit: &NewHabit) -> Result<Habit, StorageError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO habits (name, description, frequency, streak_count, last_check_in, start_date)
             VALUES (?1, ?2, ?3, 0, NULL, ?4)",
            params![
                habit.name,
                habit.description,
                habit.frequency.as_str(),
                habit.start_date.map(format_date),
            ],
        )?;
        let id = HabitId(conn.last_insert_rowid());

        tracing::debug!("Created habit: {} ({})", habit.name, id);
        Ok(Habit::from_existing(
            id,
            habit.name.clone(),
            habit.description.clone(),
            habit.frequency.clone(),
            0,
            None,
            habit.start_date,
        ))
    }

    async fn get_habit(&self, habit_id: HabitId) -> Result<Option<Habit>, StorageError> {
        let conn = self.conn.lock().await;
        let habit = conn
            .query_row(
                &format!("SELECT {} FROM habits WHERE id = ?1", HABIT_COLUMNS),
                params![habit_id.0],
                habit_from_row,
            )
            .optional()?;
        Ok(habit)
    }

    async fn update_habit(&self, habit: &Habit) -> Result<(), StorageError> {
        let conn = self.conn.lock().await;
        let rows_affected = conn.execute(
            "UPDATE habits SET
                name = ?2,
                description = ?3,
                frequency = ?4,
                start_date = ?5
             WHERE id = ?1",
            params![
                habit.id.0,
                habit.name,
                habit.description,
                habit.frequency.as_str(),
                habit.start_date.map(format_date),
            ],
        )?;

        if rows_affected == 0 {
            return Err(StorageError::HabitNotFound { habit_id: habit.id });
        }

        tracing::debug!("Updated habit: {} ({})", habit.name, habit.id);
        Ok(())
    }

    async fn delete_habit(&self, habit_id: HabitId) -> Result<(), StorageError> {
        let conn = self.conn.lock().await;
        let rows_affected = conn.execute("DELETE FROM habits WHERE id = ?1", params![habit_id.0])?;

        if rows_affected == 0 {
            return Err(StorageError::HabitNotFound { habit_id });
        }

        tracing::debug!("Deleted habit: {}", habit_id);
        Ok(())
    }

    async fn list_habits(&self) -> Result<Vec<Habit>, StorageError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&format!("SELECT {} FROM habits ORDER BY id DESC", HABIT_COLUMNS))?;
        let habits = stmt
            .query_map([], habit_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(habits)
    }

    async fn update_check_in(
        &self,
        habit_id: HabitId,
        last_check_in: Option<NaiveDate>,
        streak: u32,
    ) -> Result<(), StorageError> {
        let conn = self.conn.lock().await;
        set_check_in_columns(&conn, habit_id, last_check_in, streak)
    }
}

#[async_trait]
impl CheckInStore for SqliteStorage {
    async fn insert_check_in(&self, habit_id: HabitId, date: NaiveDate) -> Result<(), StorageError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT OR REPLACE INTO habit_check_ins (habit_id, check_in_date) VALUES (?1, ?2)",
            params![habit_id.0, format_date(date)],
        )?;
        Ok(())
    }

    async fn delete_check_in(&self, habit_id: HabitId, date: NaiveDate) -> Result<bool, StorageError> {
        let conn = self.conn.lock().await;
        let removed = conn.execute(
            "DELETE FROM habit_check_ins WHERE habit_id = ?1 AND check_in_date = ?2",
            params![habit_id.0, format_date(date)],
        )?;
        Ok(removed > 0)
    }

    async fn check_ins_for_habit(&self, habit_id: HabitId) -> Result<Vec<CheckIn>, StorageError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, habit_id, check_in_date FROM habit_check_ins
             WHERE habit_id = ?1
             ORDER BY check_in_date ASC",
        )?;
        let check_ins = stmt
            .query_map(params![habit_id.0], check_in_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(check_ins)
    }

    async fn is_checked_in_on(&self, habit_id: HabitId, date: NaiveDate) -> Result<bool, StorageError> {
        let conn = self.conn.lock().await;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM habit_check_ins WHERE habit_id = ?1 AND check_in_date = ?2",
            params![habit_id.0, format_date(date)],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}

#[async_trait]
impl CheckInLedger for SqliteStorage {
    async fn apply(&self, change: &StreakChange) -> Result<(), StorageError> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;

        // Returning early drops `tx`, which rolls it back
        match change {
            StreakChange::Record { habit_id, date, streak } => {
                set_check_in_columns(&tx, *habit_id, Some(*date), *streak)?;
                tx.execute(
                    "INSERT OR REPLACE INTO habit_check_ins (habit_id, check_in_date) VALUES (?1, ?2)",
                    params![habit_id.0, format_date(*date)],
                )?;
            }
            StreakChange::Revert { habit_id, date, restored_last, streak } => {
                let removed = tx.execute(
                    "DELETE FROM habit_check_ins WHERE habit_id = ?1 AND check_in_date = ?2",
                    params![habit_id.0, format_date(*date)],
                )?;
                if removed == 0 {
                    return Err(StorageError::CheckInNotFound { habit_id: *habit_id, date: *date });
                }
                set_check_in_columns(&tx, *habit_id, *restored_last, *streak)?;
            }
        }

        tx.commit()?;
        tracing::debug!("Applied streak change: {:?}", change);
        Ok(())
    }
}

#[async_trait]
impl TaskStore for SqliteStorage {
    async fn insert_task(&self, task: &NewTask) -> Result<Task, StorageError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO tasks (title, description, due_date, is_completed) VALUES (?1, ?2, ?3, 0)",
            params![
                task.title,
                task.description,
                task.due_date.map(|d| d.format(DATE_TIME_FORMAT).to_string()),
            ],
        )?;
        let id = TaskId(conn.last_insert_rowid());

        tracing::debug!("Created task: {} ({})", task.title, id);
        Ok(Task {
            id,
            title: task.title.clone(),
            description: task.description.clone(),
            due_date: task.due_date,
            is_completed: false,
        })
    }

    async fn get_task(&self, task_id: TaskId) -> Result<Option<Task>, StorageError> {
        let conn = self.conn.lock().await;
        let task = conn
            .query_row(
                &format!("SELECT {} FROM tasks WHERE id = ?1", TASK_COLUMNS),
                params![task_id.0],
                task_from_row,
            )
            .optional()?;
        Ok(task)
    }

    async fn update_task(&self, task: &Task) -> Result<(), StorageError> {
        let conn = self.conn.lock().await;
        let rows_affected = conn.execute(
            "UPDATE tasks SET title = ?2, description = ?3, due_date = ?4, is_completed = ?5
             WHERE id = ?1",
            params![
                task.id.0,
                task.title,
                task.description,
                task.due_date.map(|d| d.format(DATE_TIME_FORMAT).to_string()),
                task.is_completed,
            ],
        )?;

        if rows_affected == 0 {
            return Err(StorageError::TaskNotFound { task_id: task.id });
        }

        tracing::debug!("Updated task: {} ({})", task.title, task.id);
        Ok(())
    }

    async fn delete_task(&self, task_id: TaskId) -> Result<(), StorageError> {
        let conn = self.conn.lock().await;
        let rows_affected = conn.execute("DELETE FROM tasks WHERE id = ?1", params![task_id.0])?;

        if rows_affected == 0 {
            return Err(StorageError::TaskNotFound { task_id });
        }

        tracing::debug!("Deleted task: {}", task_id);
        Ok(())
    }

    async fn list_tasks(&self) -> Result<Vec<Task>, StorageError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM tasks ORDER BY due_date IS NULL, due_date ASC, id ASC",
            TASK_COLUMNS
        ))?;
        let tasks = stmt
            .query_map([], task_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tasks)
    }
}

#[async_trait]
impl TagStore for SqliteStorage {
    async fn insert_tag(&self, name: &str) -> Result<Tag, StorageError> {
        let conn = self.conn.lock().await;
        conn.execute("INSERT INTO tags (name) VALUES (?1)", params![name])?;
        let tag = Tag {
            id: TagId(conn.last_insert_rowid()),
            name: name.to_string(),
        };

        tracing::debug!("Created tag: {} ({})", tag.name, tag.id);
        Ok(tag)
    }

    async fn get_tag(&self, tag_id: TagId) -> Result<Option<Tag>, StorageError> {
        let conn = self.conn.lock().await;
        let tag = conn
            .query_row("SELECT id, name FROM tags WHERE id = ?1", params![tag_id.0], tag_from_row)
            .optional()?;
        Ok(tag)
    }

    async fn list_tags(&self) -> Result<Vec<Tag>, StorageError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare("SELECT id, name FROM tags ORDER BY id ASC")?;
        let tags = stmt
            .query_map([], tag_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tags)
    }

    async fn find_tag_by_name(&self, name: &str) -> Result<Option<Tag>, StorageError> {
        // SQLite's NOCASE only folds ASCII, so compare in Rust
        let tags = self.list_tags().await?;
        Ok(tags.into_iter().find(|tag| tag.has_name(name)))
    }

    async fn delete_tag(&self, tag_id: TagId) -> Result<(), StorageError> {
        let conn = self.conn.lock().await;
        let rows_affected = conn.execute("DELETE FROM tags WHERE id = ?1", params![tag_id.0])?;

        if rows_affected == 0 {
            return Err(StorageError::TagNotFound { tag_id });
        }

        tracing::debug!("Deleted tag: {}", tag_id);
        Ok(())
    }

    async fn assign_tag_to_habit(&self, habit_id: HabitId, tag_id: TagId) -> Result<(), StorageError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT OR REPLACE INTO habit_tags (habit_id, tag_id) VALUES (?1, ?2)",
            params![habit_id.0, tag_id.0],
        )?;
        Ok(())
    }

    async fn remove_tag_from_habit(&self, habit_id: HabitId, tag_id: TagId) -> Result<(), StorageError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "DELETE FROM habit_tags WHERE habit_id = ?1 AND tag_id = ?2",
            params![habit_id.0, tag_id.0],
        )?;
        Ok(())
    }

    async fn tags_for_habit(&self, habit_id: HabitId) -> Result<Vec<Tag>, StorageError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT t.id, t.name FROM tags t
             INNER JOIN habit_tags ht ON t.id = ht.tag_id
             WHERE ht.habit_id = ?1
             ORDER BY t.id ASC",
        )?;
        let tags = stmt
            .query_map(params![habit_id.0], tag_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tags)
    }

    async fn habits_for_tag(&self, tag_id: TagId) -> Result<Vec<Habit>, StorageError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT h.id, h.name, h.description, h.frequency, h.streak_count, h.last_check_in, h.start_date
             FROM habits h
             INNER JOIN habit_tags ht ON h.id = ht.habit_id
             WHERE ht.tag_id = ?1
             ORDER BY h.id DESC",
        )?;
        let habits = stmt
            .query_map(params![tag_id.0], habit_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(habits)
    }

    async fn assign_tag_to_task(&self, task_id: TaskId, tag_id: TagId) -> Result<(), StorageError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT OR REPLACE INTO task_tags (task_id, tag_id) VALUES (?1, ?2)",
            params![task_id.0, tag_id.0],
        )?;
        Ok(())
    }

    async fn remove_tag_from_task(&self, task_id: TaskId, tag_id: TagId) -> Result<(), StorageError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "DELETE FROM task_tags WHERE task_id = ?1 AND tag_id = ?2",
            params![task_id.0, tag_id.0],
        )?;
        Ok(())
    }

    async fn tags_for_task(&self, task_id: TaskId) -> Result<Vec<Tag>, StorageError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT t.id, t.name FROM tags t
             INNER JOIN task_tags tt ON t.id = tt.tag_id
             WHERE tt.task_id = ?1
             ORDER BY t.id ASC",
        )?;
        let tags = stmt
            .query_map(params![task_id.0], tag_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tags)
    }

    async fn tasks_for_tag(&self, tag_id: TagId) -> Result<Vec<Task>, StorageError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT ta.id, ta.title, ta.description, ta.due_date, ta.is_completed
             FROM tasks ta
             INNER JOIN task_tags tt ON ta.id = tt.task_id
             WHERE tt.tag_id = ?1
             ORDER BY ta.due_date IS NULL, ta.due_date ASC, ta.id ASC",
        )?;
        let tasks = stmt
            .query_map(params![tag_id.0], task_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tasks)
    }
}

#[async_trait]
impl PreferenceStore for SqliteStorage {
    async fn get_preference(
        &self,
        namespace: &str,
        key: &str,
    ) -> Result<Option<PreferenceValue>, StorageError> {
        let conn = self.conn.lock().await;
        let raw: Option<String> = conn
            .query_row(
                "SELECT value FROM preferences WHERE namespace = ?1 AND key = ?2",
                params![namespace, key],
                |row| row.get(0),
            )
            .optional()?;

        Ok(raw.map(|s| serde_json::from_str(&s)).transpose()?)
    }

    async fn set_preferences(
        &self,
        namespace: &str,
        values: &[(&str, PreferenceValue)],
    ) -> Result<(), StorageError> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        for (key, value) in values {
            tx.execute(
                "INSERT OR REPLACE INTO preferences (namespace, key, value) VALUES (?1, ?2, ?3)",
                params![namespace, key, serde_json::to_string(value)?],
            )?;
        }
        tx.commit()?;

        tracing::debug!("Saved {} preference(s) in '{}'", values.len(), namespace);
        Ok(())
    }

    async fn clear_preferences(&self, namespace: &str) -> Result<(), StorageError> {
        let conn = self.conn.lock().await;
        conn.execute("DELETE FROM preferences WHERE namespace = ?1", params![namespace])?;
        Ok(())
    }
}
