/// End-to-end check-in and undo scenarios on an on-disk database
use ascend::*;
use chrono::NaiveDate;
use std::sync::Arc;
use tempfile::NamedTempFile;

#[cfg(test)]
mod check_in_flow_tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    struct Fixture {
        _file: NamedTempFile,
        storage: Arc<SqliteStorage>,
    }

    impl Fixture {
        fn new() -> Self {
            let file = NamedTempFile::new().expect("Failed to create temp file");
            let storage = Arc::new(SqliteStorage::new(file.path().to_path_buf()).expect("Failed to open storage"));
            Self { _file: file, storage }
        }

        fn engine_on(&self, day: NaiveDate) -> CheckInEngine<SqliteStorage, FixedClock> {
            CheckInEngine::with_clock(self.storage.clone(), FixedClock::on(day))
        }

        /// A habit whose row and history say it was last checked in on `last`
        async fn habit(&self, frequency: Frequency, streak: u32, last: Option<NaiveDate>) -> Habit {
            let habit = self
                .storage
                .insert_habit(&NewHabit::new("Practice piano".to_string(), None, frequency, None).unwrap())
                .await
                .unwrap();
            if let Some(day) = last {
                self.storage
                    .apply(&StreakChange::Record { habit_id: habit.id, date: day, streak })
                    .await
                    .unwrap();
            }
            self.storage.get_habit(habit.id).await.unwrap().unwrap()
        }
    }

    #[tokio::test]
    async fn test_same_day_check_in_is_idempotent() {
        let fixture = Fixture::new();
        let today = date(2024, 6, 10);
        let mut habit = fixture.habit(Frequency::Daily, 1, Some(today)).await;
        let engine = fixture.engine_on(today);

        let outcome = tokio_test::assert_ok!(engine.check_in(&mut habit).await);

        assert!(!outcome.checked_in);
        assert_eq!(outcome.streak, 1);
        assert_eq!(fixture.storage.check_ins_for_habit(habit.id).await.unwrap().len(), 1);
        let stored = fixture.storage.get_habit(habit.id).await.unwrap().unwrap();
        assert_eq!((stored.streak_count, stored.last_check_in), (1, Some(today)));
    }

    #[tokio::test]
    async fn test_daily_continuation() {
        let fixture = Fixture::new();
        let mut habit = fixture.habit(Frequency::Daily, 5, Some(date(2024, 6, 9))).await;

        let outcome = fixture.engine_on(date(2024, 6, 10)).check_in(&mut habit).await.unwrap();

        assert_eq!(outcome, CheckInOutcome { checked_in: true, streak: 6 });
        assert_eq!(habit.last_check_in, Some(date(2024, 6, 10)));
    }

    #[tokio::test]
    async fn test_daily_break_after_three_days() {
        let fixture = Fixture::new();
        let mut habit = fixture.habit(Frequency::Daily, 5, Some(date(2024, 6, 7))).await;

        let outcome = fixture.engine_on(date(2024, 6, 10)).check_in(&mut habit).await.unwrap();

        assert_eq!(outcome.streak, 1);
    }

    #[tokio::test]
    async fn test_first_check_in_for_every_frequency() {
        let fixture = Fixture::new();
        let today = date(2024, 6, 10);
        for frequency in [Frequency::Daily, Frequency::Weekly, Frequency::Monthly] {
            let mut habit = fixture.habit(frequency, 0, None).await;
            let outcome = fixture.engine_on(today).check_in(&mut habit).await.unwrap();
            assert_eq!(outcome, CheckInOutcome { checked_in: true, streak: 1 });
        }
    }

    #[tokio::test]
    async fn test_weekly_year_wrap() {
        let fixture = Fixture::new();
        let mut habit = fixture.habit(Frequency::Weekly, 3, Some(date(2023, 12, 25))).await;

        let outcome = fixture.engine_on(date(2024, 1, 1)).check_in(&mut habit).await.unwrap();

        assert_eq!(outcome.streak, 4);
    }

    #[tokio::test]
    async fn test_monthly_year_wrap() {
        let fixture = Fixture::new();
        let mut habit = fixture.habit(Frequency::Monthly, 2, Some(date(2023, 12, 31))).await;

        let outcome = fixture.engine_on(date(2024, 1, 1)).check_in(&mut habit).await.unwrap();

        assert_eq!(outcome.streak, 3);
    }

    #[tokio::test]
    async fn test_undo_symmetry_on_fresh_habit() {
        let fixture = Fixture::new();
        let today = date(2024, 6, 10);
        let engine = fixture.engine_on(today);
        let mut habit = fixture.habit(Frequency::Daily, 0, None).await;

        engine.check_in(&mut habit).await.unwrap();
        assert!(engine.undo_today_check_in(&mut habit).await.unwrap());

        let stored = fixture.storage.get_habit(habit.id).await.unwrap().unwrap();
        assert_eq!(stored.streak_count, 0);
        assert_eq!(stored.last_check_in, None);
        assert!(fixture.storage.check_ins_for_habit(habit.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_undo_is_noop_without_check_in_today() {
        let fixture = Fixture::new();
        let mut habit = fixture.habit(Frequency::Daily, 2, Some(date(2024, 6, 9))).await;

        let undone = fixture.engine_on(date(2024, 6, 10)).undo_today_check_in(&mut habit).await.unwrap();

        assert!(!undone);
        let stored = fixture.storage.get_habit(habit.id).await.unwrap().unwrap();
        assert_eq!((stored.streak_count, stored.last_check_in), (2, Some(date(2024, 6, 9))));
        assert_eq!(fixture.storage.check_ins_for_habit(habit.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_undo_after_consecutive_days() {
        let fixture = Fixture::new();
        let mut habit = fixture.habit(Frequency::Daily, 0, None).await;

        for day in 6..=10 {
            let outcome = fixture.engine_on(date(2024, 6, day)).check_in(&mut habit).await.unwrap();
            assert_eq!(outcome.streak, day - 5);
        }

        let engine = fixture.engine_on(date(2024, 6, 10));
        assert!(engine.undo_today_check_in(&mut habit).await.unwrap());

        assert_eq!(habit.streak_count, 4);
        assert_eq!(habit.last_check_in, Some(date(2024, 6, 9)));
        let history: Vec<NaiveDate> = fixture
            .storage
            .check_ins_for_habit(habit.id)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.check_in_date)
            .collect();
        assert_eq!(history, (6..=9).map(|d| date(2024, 6, d)).collect::<Vec<_>>());

        // Checking in again restores the streak
        let outcome = engine.check_in(&mut habit).await.unwrap();
        assert_eq!(outcome.streak, 5);
    }

    #[tokio::test]
    async fn test_deleted_habit_is_not_found() {
        let fixture = Fixture::new();
        let mut habit = fixture.habit(Frequency::Daily, 0, None).await;
        fixture.storage.delete_habit(habit.id).await.unwrap();

        let result = fixture.engine_on(date(2024, 6, 10)).check_in(&mut habit).await;

        assert!(matches!(result, Err(CheckInError::NotFound { habit_id }) if habit_id == habit.id));
    }
}
