/// Streak continuation rules across period boundaries
use ascend::*;
use chrono::NaiveDate;

#[cfg(test)]
mod streak_rule_tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_first_check_in_is_one_for_every_frequency() {
        let today = date(2024, 6, 10);
        for frequency in [
            Frequency::Daily,
            Frequency::Weekly,
            Frequency::Monthly,
            Frequency::Other("custom".to_string()),
        ] {
            assert_eq!(next_streak(&frequency, 0, None, today), 1);
        }
    }

    #[test]
    fn test_daily_rules() {
        let today = date(2024, 3, 1);
        // Leap day is the day before March 1st
        assert_eq!(next_streak(&Frequency::Daily, 5, Some(date(2024, 2, 29)), today), 6);
        assert_eq!(next_streak(&Frequency::Daily, 5, Some(date(2024, 2, 27)), today), 1);
        assert_eq!(next_streak(&Frequency::Daily, 5, Some(today), today), 5);
    }

    #[test]
    fn test_weekly_rules() {
        let weekly = Frequency::Weekly;
        // Monday of ISO week 23 to Sunday of week 24
        assert_eq!(next_streak(&weekly, 2, Some(date(2024, 6, 3)), date(2024, 6, 16)), 3);
        // Skipped week 24
        assert_eq!(next_streak(&weekly, 2, Some(date(2024, 6, 3)), date(2024, 6, 17)), 1);
        // 2023 has 52 ISO weeks
        assert_eq!(next_streak(&weekly, 3, Some(date(2023, 12, 25)), date(2024, 1, 1)), 4);
        // Week 52 wraps into week 1 even in a 53-week year
        assert_eq!(next_streak(&weekly, 3, Some(date(2020, 12, 21)), date(2021, 1, 4)), 4);
        // Week 53 never wraps
        assert_eq!(next_streak(&weekly, 3, Some(date(2020, 12, 28)), date(2021, 1, 4)), 1);
    }

    #[test]
    fn test_monthly_rules() {
        let monthly = Frequency::Monthly;
        assert_eq!(next_streak(&monthly, 1, Some(date(2024, 1, 31)), date(2024, 2, 1)), 2);
        assert_eq!(next_streak(&monthly, 4, Some(date(2023, 12, 15)), date(2024, 1, 2)), 5);
        assert_eq!(next_streak(&monthly, 4, Some(date(2023, 11, 15)), date(2024, 1, 2)), 1);
        // Same month a year later is not a continuation
        assert_eq!(next_streak(&monthly, 4, Some(date(2023, 1, 15)), date(2024, 2, 2)), 1);
    }

    #[test]
    fn test_unknown_frequency_always_restarts() {
        let other = Frequency::Other("hourly".to_string());
        assert_eq!(next_streak(&other, 9, Some(date(2024, 6, 9)), date(2024, 6, 10)), 1);
        assert_eq!(continuation(&other, date(2024, 6, 9), date(2024, 6, 10)), Continuation::Broken);
    }

    #[test]
    fn test_streak_after_undo() {
        let today = date(2024, 6, 10);
        assert_eq!(streak_after_undo(&Frequency::Daily, 5, Some(date(2024, 6, 9)), today), 4);
        assert_eq!(streak_after_undo(&Frequency::Daily, 1, Some(date(2024, 6, 1)), today), 0);
        assert_eq!(streak_after_undo(&Frequency::Daily, 1, None, today), 0);
    }
}
