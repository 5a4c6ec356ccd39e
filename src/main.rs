/// Main entry point for the Ascend command line
///
/// This file sets up logging, parses command line arguments, opens the
/// database and dispatches one command against it.

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

use ascend::tools::{self, CalendarParams, CreateHabitParams, CreateTaskParams, SearchParams, TagLinkParams, TagTarget, UpdateHabitParams, UpdateTaskParams};
use ascend::{AppError, AscendApp, Clock, HabitId, LogNotifier, ReminderKind, ReminderTime, TaskId};

/// Get the default database path with robust fallback strategy
fn get_default_database_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
    // Try various locations in order of preference
    let potential_paths = [
        // 1. User's home directory (preferred)
        dirs::home_dir().map(|mut p| {
            p.push(".ascend");
            p
        }),
        // 2. User's data directory (platform-specific)
        dirs::data_dir().map(|mut p| {
            p.push("ascend");
            p
        }),
        // 3. User's config directory
        dirs::config_dir().map(|mut p| {
            p.push("ascend");
            p
        }),
        // 4. Current working directory (last resort)
        std::env::current_dir().ok().map(|mut p| {
            p.push(".ascend");
            p
        }),
    ];

    for potential_path in potential_paths.iter().flatten() {
        if std::fs::create_dir_all(potential_path).is_ok() {
            // Only use a directory we can actually write to
            let test_file = potential_path.join(".test_write");
            if std::fs::write(&test_file, "test").is_ok() {
                let _ = std::fs::remove_file(&test_file);
                return Ok(potential_path.join("ascend.db"));
            }
        }
    }

    let mut temp_path = std::env::temp_dir();
    temp_path.push("ascend");
    std::fs::create_dir_all(&temp_path)?;
    temp_path.push("ascend.db");

    tracing::warn!("Using temporary directory for database: {}", temp_path.display());
    Ok(temp_path)
}

/// Offline habit and task tracker with streaks, tags and reminders
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the SQLite database file
    /// If not provided, uses a default location in the user's home directory
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Enable verbose output (implies debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print responses as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage habits and check in
    #[command(subcommand)]
    Habit(HabitCommand),
    /// Manage one-off tasks
    #[command(subcommand)]
    Task(TaskCommand),
    /// Manage tags
    #[command(subcommand)]
    Tag(TagCommand),
    /// Habits and tasks for today
    Today,
    /// Fuzzy search habits and tasks
    Search {
        /// Letters to match in order, e.g. "rdbk" finds "Read a book"
        #[arg(default_value = "")]
        query: String,
        /// Only show items carrying this tag (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// Daily reminders
    #[command(subcommand)]
    Reminder(ReminderCommand),
    /// Show or switch the color theme
    Theme {
        #[arg(value_enum)]
        mode: Option<ThemeMode>,
    },
    /// Show or record whether onboarding was seen
    Onboarding {
        #[arg(long, conflicts_with = "reset")]
        done: bool,
        #[arg(long)]
        reset: bool,
    },
}

#[derive(ClapArgs, Debug)]
struct HabitFields {
    #[arg(long)]
    description: Option<String>,
    /// Anchor day (YYYY-MM-DD) for weekly and monthly schedules
    #[arg(long)]
    start_date: Option<String>,
}

#[derive(Subcommand, Debug)]
enum HabitCommand {
    /// Create a habit
    Add {
        name: String,
        /// daily, weekly or monthly
        #[arg(short, long, default_value = "daily")]
        frequency: String,
        #[command(flatten)]
        fields: HabitFields,
        /// Tag to attach (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// List all habits
    List,
    /// Show one habit
    Show { id: i64 },
    /// Edit a habit; pass an empty string to clear a field
    Edit {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(short, long)]
        frequency: Option<String>,
        #[command(flatten)]
        fields: HabitFields,
    },
    /// Delete a habit and its history
    Delete { id: i64 },
    /// Check a habit in for today
    CheckIn { id: i64 },
    /// Undo today's check-in
    Undo { id: i64 },
    /// Show recent check-in days
    Calendar {
        id: i64,
        #[arg(long)]
        days: Option<u32>,
    },
}

#[derive(Subcommand, Debug)]
enum TaskCommand {
    /// Create a task
    Add {
        title: String,
        #[arg(long)]
        description: Option<String>,
        /// "YYYY-MM-DD HH:MM" or "YYYY-MM-DD"
        #[arg(long)]
        due: Option<String>,
        /// Tag to attach (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// List tasks
    List {
        /// Include completed tasks
        #[arg(short, long)]
        all: bool,
    },
    /// Edit a task; pass an empty string to clear a field
    Edit {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        due: Option<String>,
    },
    /// Mark a task complete
    Done { id: i64 },
    /// Mark a task not complete
    Undone { id: i64 },
    /// Delete a task
    Delete { id: i64 },
}

#[derive(Subcommand, Debug)]
enum TagCommand {
    /// Create a tag
    Add { name: String },
    /// List tags
    List,
    /// Delete a tag and its links
    Delete { name: String },
    /// Attach a tag to a habit or task
    Assign {
        #[arg(value_enum)]
        kind: ItemKind,
        id: i64,
        tag: String,
    },
    /// Detach a tag from a habit or task
    Unassign {
        #[arg(value_enum)]
        kind: ItemKind,
        id: i64,
        tag: String,
    },
}

#[derive(Subcommand, Debug)]
enum ReminderCommand {
    /// Remind daily at HH:MM
    Set {
        #[arg(value_enum)]
        kind: ItemKind,
        time: String,
    },
    /// Turn a reminder off
    Cancel {
        #[arg(value_enum)]
        kind: ItemKind,
    },
    /// Show reminder settings
    Show,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ItemKind {
    Habit,
    Task,
}

impl From<ItemKind> for ReminderKind {
    fn from(kind: ItemKind) -> Self {
        match kind {
            ItemKind::Habit => ReminderKind::Habit,
            ItemKind::Task => ReminderKind::Task,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ThemeMode {
    Light,
    Dark,
}

/// Print a response as JSON or as its message plus detail lines
fn emit<T: Serialize>(json: bool, response: &T, message: &str, details: Vec<String>) -> Result<(), AppError> {
    if json {
        println!("{}", serde_json::to_string_pretty(response)?);
    } else {
        for line in details {
            println!("{}", line);
        }
        println!("{}", message);
    }
    Ok(())
}

async fn run(app: AscendApp, command: Command, json: bool) -> Result<(), AppError> {
    let storage = app.storage().as_ref();

    match command {
        Command::Habit(command) => match command {
            HabitCommand::Add { name, frequency, fields, tags } => {
                let response = tools::create_habit(
                    storage,
                    CreateHabitParams {
                        name,
                        description: fields.description,
                        frequency,
                        start_date: fields.start_date,
                        tags,
                    },
                )
                .await?;
                emit(json, &response, &response.message, vec![])
            }
            HabitCommand::List => {
                let response = tools::list_habits(storage).await?;
                let details = response
                    .habits
                    .iter()
                    .map(|h| {
                        format!(
                            "#{} {} [{}] streak {}{}",
                            h.item.id,
                            h.item.name,
                            h.item.frequency,
                            h.item.streak_count,
                            tag_suffix(h.tags.iter().map(|t| t.name.as_str()))
                        )
                    })
                    .collect();
                emit(json, &response, &response.message, details)
            }
            HabitCommand::Show { id } => {
                let response = tools::show_habit(storage, HabitId(id)).await?;
                let habit = &response.habit;
                let details = vec![
                    format!("Description: {}", habit.description.as_deref().unwrap_or("-")),
                    format!("Last check-in: {}", habit.last_check_in.map(|d| d.to_string()).unwrap_or_else(|| "never".to_string())),
                    format!("Start date: {}", habit.start_date.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())),
                    format!("Total check-ins: {}{}", response.total_check_ins, tag_suffix(response.tags.iter().map(|t| t.name.as_str()))),
                ];
                emit(json, &response, &response.message, details)
            }
            HabitCommand::Edit { id, name, frequency, fields } => {
                let response = tools::update_habit(
                    storage,
                    UpdateHabitParams {
                        habit_id: HabitId(id),
                        name,
                        description: fields.description,
                        frequency,
                        start_date: fields.start_date,
                    },
                )
                .await?;
                emit(json, &response, &response.message, vec![])
            }
            HabitCommand::Delete { id } => {
                let response = tools::delete_habit(storage, HabitId(id)).await?;
                emit(json, &response, &response.message, vec![])
            }
            HabitCommand::CheckIn { id } => {
                let response = tools::check_in_habit(app.engine(), HabitId(id)).await?;
                emit(json, &response, &response.message, vec![])
            }
            HabitCommand::Undo { id } => {
                let response = tools::undo_check_in(app.engine(), HabitId(id)).await?;
                emit(json, &response, &response.message, vec![])
            }
            HabitCommand::Calendar { id, days } => {
                let response = tools::habit_calendar(app.engine(), CalendarParams { habit_id: HabitId(id), days }).await?;
                let row: String = response.days.iter().map(|d| if d.checked_in { '■' } else { '·' }).collect();
                emit(json, &response, &response.message, vec![row])
            }
        },
        Command::Task(command) => match command {
            TaskCommand::Add { title, description, due, tags } => {
                let response = tools::create_task(
                    storage,
                    CreateTaskParams { title, description, due_date: due, tags },
                )
                .await?;
                emit(json, &response, &response.message, vec![])
            }
            TaskCommand::List { all } => {
                let response = tools::list_tasks(storage, all).await?;
                let details = response
                    .tasks
                    .iter()
                    .map(|t| {
                        format!(
                            "#{} [{}] {}{}{}",
                            t.item.id,
                            if t.item.is_completed { "x" } else { " " },
                            t.item.title,
                            t.item.due_date.map(|d| format!(" (due {})", d.format("%Y-%m-%d %H:%M"))).unwrap_or_default(),
                            tag_suffix(t.tags.iter().map(|tag| tag.name.as_str()))
                        )
                    })
                    .collect();
                emit(json, &response, &response.message, details)
            }
            TaskCommand::Edit { id, title, description, due } => {
                let response = tools::update_task(
                    storage,
                    UpdateTaskParams { task_id: TaskId(id), title, description, due_date: due },
                )
                .await?;
                emit(json, &response, &response.message, vec![])
            }
            TaskCommand::Done { id } => {
                let response = tools::set_task_completed(storage, TaskId(id), true).await?;
                emit(json, &response, &response.message, vec![])
            }
            TaskCommand::Undone { id } => {
                let response = tools::set_task_completed(storage, TaskId(id), false).await?;
                emit(json, &response, &response.message, vec![])
            }
            TaskCommand::Delete { id } => {
                let response = tools::delete_task(storage, TaskId(id)).await?;
                emit(json, &response, &response.message, vec![])
            }
        },
        Command::Tag(command) => match command {
            TagCommand::Add { name } => {
                let response = tools::create_tag(storage, &name).await?;
                emit(json, &response, &response.message, vec![])
            }
            TagCommand::List => {
                let response = tools::list_tags(storage).await?;
                let details = response.tags.iter().map(|t| format!("#{} {}", t.id, t.name)).collect();
                emit(json, &response, &response.message, details)
            }
            TagCommand::Delete { name } => {
                let response = tools::delete_tag(storage, &name).await?;
                emit(json, &response, &response.message, vec![])
            }
            TagCommand::Assign { kind, id, tag } => {
                let response = tools::assign_tag(storage, TagLinkParams { target: target(kind, id), tag }).await?;
                emit(json, &response, &response.message, vec![])
            }
            TagCommand::Unassign { kind, id, tag } => {
                let response = tools::unassign_tag(storage, TagLinkParams { target: target(kind, id), tag }).await?;
                emit(json, &response, &response.message, vec![])
            }
        },
        Command::Today => {
            let response = tools::today_overview(storage, app.clock().today()).await?;
            let mut details: Vec<String> = response
                .habits
                .iter()
                .map(|h| format!("[{}] #{} {}", if h.done { "x" } else { " " }, h.habit.id, h.habit.name))
                .collect();
            details.extend(response.tasks.iter().map(|t| {
                format!(
                    "[{}] task #{} {} at {}",
                    if t.is_completed { "x" } else { " " },
                    t.id,
                    t.title,
                    t.due_date.map(|d| d.format("%H:%M").to_string()).unwrap_or_default()
                )
            }));
            emit(json, &response, &response.message, details)
        }
        Command::Search { query, tags } => {
            let response = tools::search_items(storage, SearchParams { query, tags }).await?;
            let mut details: Vec<String> = response
                .results
                .habits
                .iter()
                .map(|h| format!("habit #{} {}", h.item.id, h.item.name))
                .collect();
            details.extend(response.results.tasks.iter().map(|t| format!("task #{} {}", t.item.id, t.item.title)));
            emit(json, &response, &response.message, details)
        }
        Command::Reminder(command) => {
            let scheduler = app.reminders(LogNotifier);
            match command {
                ReminderCommand::Set { kind, time } => {
                    let time = ReminderTime::parse(&time)?;
                    let response = tools::set_reminder(&scheduler, kind.into(), time).await?;
                    emit(json, &response, &response.message, vec![])
                }
                ReminderCommand::Cancel { kind } => {
                    let response = tools::cancel_reminder(&scheduler, kind.into()).await?;
                    emit(json, &response, &response.message, vec![])
                }
                ReminderCommand::Show => {
                    let response = tools::show_reminders(&scheduler).await?;
                    emit(json, &response, &response.message, vec![])
                }
            }
        }
        Command::Theme { mode } => {
            let dark = mode.map(|m| matches!(m, ThemeMode::Dark));
            let response = tools::theme(&app.theme(), dark).await?;
            emit(json, &response, &response.message, vec![])
        }
        Command::Onboarding { done, reset } => {
            let seen = if done { Some(true) } else if reset { Some(false) } else { None };
            let response = tools::onboarding(&app.onboarding(), seen).await?;
            emit(json, &response, &response.message, vec![])
        }
    }
}

fn target(kind: ItemKind, id: i64) -> TagTarget {
    match kind {
        ItemKind::Habit => TagTarget::Habit(HabitId(id)),
        ItemKind::Task => TagTarget::Task(TaskId(id)),
    }
}

fn tag_suffix<'a>(names: impl Iterator<Item = &'a str>) -> String {
    let names: Vec<&str> = names.collect();
    if names.is_empty() {
        String::new()
    } else {
        format!(" #{}", names.join(" #"))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Set up logging based on command line flags
    let log_level = if args.verbose {
        "debug"
    } else if args.debug {
        "info"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(format!("ascend={}", log_level))
        .with_writer(std::io::stderr) // Keep stdout for command output
        .init();

    let db_path = match args.database {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            path
        }
        None => get_default_database_path()?,
    };

    info!("Using database at: {}", db_path.display());

    let app = AscendApp::new(db_path).await?;

    // Reminders saved in earlier sessions are planned again on every start
    let planned = app.reminders(LogNotifier).reschedule_all().await?;
    info!("Rescheduled {} reminder(s)", planned.len());

    run(app, args.command, args.json).await?;
    Ok(())
}
