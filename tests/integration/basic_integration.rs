/// Basic integration tests
use ascend::*;
use ascend::tools::{self, CreateHabitParams, CreateTaskParams, TagLinkParams, TagTarget};
use std::sync::Arc;
use tempfile::NamedTempFile;

#[cfg(test)]
mod basic_integration_tests {
    use super::*;

    fn habit_params(name: &str, tags: &[&str]) -> CreateHabitParams {
        CreateHabitParams {
            name: name.to_string(),
            description: None,
            frequency: "daily".to_string(),
            start_date: None,
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_app_opens_database() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let app = tokio_test::assert_ok!(AscendApp::new(temp_file.path().to_path_buf()).await);

        assert!(app.storage().list_habits().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_database_persistence() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let db_path = temp_file.path().to_path_buf();

        {
            let app = AscendApp::new(db_path.clone()).await.expect("Failed to open first app");
            tools::create_habit(app.storage().as_ref(), habit_params("Journal", &["evening"]))
                .await
                .unwrap();
            app.theme().set_dark_theme(true).await.unwrap();
        }

        let app = AscendApp::new(db_path).await.expect("Failed to reopen app");
        let habits = app.storage().list_habits().await.unwrap();
        assert_eq!(habits.len(), 1);
        assert_eq!(habits[0].name, "Journal");
        assert_eq!(app.storage().tags_for_habit(habits[0].id).await.unwrap()[0].name, "evening");
        assert!(app.theme().is_dark_theme().await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_habit_cascades_to_history_and_tags() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let storage = Arc::new(SqliteStorage::new(temp_file.path().to_path_buf()).unwrap());
        let app = AscendApp::from_storage(storage, FixedClock::on(chrono::NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()));
        let store = app.storage().as_ref();

        let habit = tools::create_habit(store, habit_params("Stretch", &["health"])).await.unwrap().habit;
        tools::check_in_habit(app.engine(), habit.id).await.unwrap();
        let tag = store.find_tag_by_name("health").await.unwrap().unwrap();

        tools::delete_habit(store, habit.id).await.unwrap();

        assert!(store.check_ins_for_habit(habit.id).await.unwrap().is_empty());
        assert!(store.habits_for_tag(tag.id).await.unwrap().is_empty());
        // The tag itself survives
        assert!(store.get_tag(tag.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_deleting_tag_unlinks_tasks() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let app = AscendApp::new(temp_file.path().to_path_buf()).await.unwrap();
        let store = app.storage().as_ref();

        let task = tools::create_task(
            store,
            CreateTaskParams { title: "Pack bags".to_string(), description: None, due_date: None, tags: vec![] },
        )
        .await
        .unwrap()
        .task;
        tools::assign_tag(store, TagLinkParams { target: TagTarget::Task(task.id), tag: "Travel".to_string() })
            .await
            .unwrap();
        assert_eq!(store.tags_for_task(task.id).await.unwrap().len(), 1);

        tools::delete_tag(store, "travel").await.unwrap();

        assert!(store.tags_for_task(task.id).await.unwrap().is_empty());
        assert!(store.get_task(task.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_reminders_survive_restart() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let db_path = temp_file.path().to_path_buf();
        let now = chrono::NaiveDate::from_ymd_opt(2024, 6, 10).unwrap().and_hms_opt(21, 0, 0).unwrap();

        {
            let storage = Arc::new(SqliteStorage::new(db_path.clone()).unwrap());
            let app = AscendApp::from_storage(storage, FixedClock(now));
            app.reminders(LogNotifier)
                .schedule(ReminderKind::Habit, ReminderTime::new(20, 15).unwrap())
                .await
                .unwrap();
        }

        let storage = Arc::new(SqliteStorage::new(db_path).unwrap());
        let app = AscendApp::from_storage(storage, FixedClock(now));
        let planned = app.reminders(LogNotifier).reschedule_all().await.unwrap();

        let tomorrow = chrono::NaiveDate::from_ymd_opt(2024, 6, 11).unwrap().and_hms_opt(20, 15, 0).unwrap();
        assert_eq!(planned, vec![(ReminderKind::Habit, tomorrow)]);
    }
}
