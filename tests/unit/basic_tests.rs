/// Basic unit tests to verify core functionality
use ascend::*;
use ascend::agenda::{fuzzy_match, habits_left_today};
use chrono::NaiveDate;

#[cfg(test)]
mod basic_unit_tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_new_habit_validation() {
        let habit = NewHabit::new(
            "  Drink water ".to_string(),
            Some("8 glasses".to_string()),
            Frequency::Daily,
            None,
        );
        assert_eq!(habit.unwrap().name, "Drink water");

        assert!(NewHabit::new("   ".to_string(), None, Frequency::Daily, None).is_err());
        assert!(NewHabit::new("x".repeat(101), None, Frequency::Daily, None).is_err());
        assert!(NewHabit::new("Ok".to_string(), Some("x".repeat(501)), Frequency::Daily, None).is_err());
        assert!(NewHabit::new("Ok".to_string(), None, Frequency::from("fortnightly"), None).is_err());
    }

    #[test]
    fn test_frequency_parsing() {
        assert_eq!(Frequency::from(" Weekly "), Frequency::Weekly);
        assert_eq!(Frequency::from("hourly"), Frequency::Other("hourly".to_string()));
        assert!(!Frequency::from("hourly").is_known());
        assert!(Frequency::parse_strict("monthly").is_ok());
        assert!(Frequency::parse_strict("yearly").is_err());
    }

    #[test]
    fn test_habit_update_is_all_or_nothing() {
        let mut habit = Habit::from_existing(HabitId(1), "Read".to_string(), None, Frequency::Daily, 3, None, None);

        let result = habit.update(Some("Read more".to_string()), None, Some(Frequency::from("hourly")), None);

        assert!(result.is_err());
        assert_eq!(habit.name, "Read");
        assert_eq!(habit.frequency, Frequency::Daily);
    }

    #[test]
    fn test_fixed_clock_today() {
        let clock = FixedClock::on(date(2024, 2, 29));
        assert_eq!(clock.today(), date(2024, 2, 29));
    }

    #[test]
    fn test_reminder_time_bounds() {
        assert_eq!(ReminderTime::new(0, 0).unwrap().to_string(), "00:00");
        assert!(ReminderTime::new(24, 0).is_err());
        assert_eq!(ReminderKind::Habit.default_time(), ReminderTime::new(8, 0).unwrap());
        assert_eq!(ReminderKind::Task.message(), "Don't forget your tasks today!");
    }

    #[test]
    fn test_agenda_helpers() {
        let today = date(2024, 6, 10);
        let habits = vec![
            Habit::from_existing(HabitId(1), "Walk".to_string(), None, Frequency::Daily, 1, Some(today), None),
            Habit::from_existing(HabitId(2), "Yoga".to_string(), None, Frequency::Daily, 0, None, None),
        ];
        assert_eq!(habits_left_today(&habits, today), 1);
        assert!(fuzzy_match("Evening yoga", "eyg"));
    }

    #[tokio::test]
    async fn test_in_memory_storage() {
        let storage = tokio_test::assert_ok!(SqliteStorage::in_memory());
        assert!(tokio_test::assert_ok!(storage.list_habits().await).is_empty());
    }
}
