use crate::model::rows::DayType;
use crate::scheduler::calendar::{HolidayCalendar, MonthCalendar, day_type, is_weekend, plan_period, previous_month};
use chrono::NaiveDate;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

#[test]
fn test_month_expansion() {
    let calendar = MonthCalendar::new(2025, 3).unwrap();
    assert_eq!(calendar.day_count(), 31);
    assert_eq!(calendar.days()[0], date(2025, 3, 1));
    assert_eq!(calendar.days()[30], date(2025, 3, 31));
    assert_eq!(calendar.plan_period(), "2025-03");

    let february = MonthCalendar::new(2024, 2).unwrap();
    assert_eq!(february.day_count(), 29); // leap year

    assert!(MonthCalendar::new(2025, 13).is_none());
    assert!(MonthCalendar::new(2025, 0).is_none());
}

#[test]
fn test_weekend_classification() {
    // 2025-03-01 is a Saturday.
    assert!(is_weekend(date(2025, 3, 1)));
    assert!(is_weekend(date(2025, 3, 2)));
    assert!(!is_weekend(date(2025, 3, 3)));
    assert_eq!(day_type(date(2025, 3, 1)), DayType::Weekend);
    assert_eq!(day_type(date(2025, 3, 5)), DayType::Weekday);
}

#[test]
fn test_previous_month_wraps_year() {
    assert_eq!(previous_month(2025, 3), (2025, 2));
    assert_eq!(previous_month(2025, 1), (2024, 12));
}

#[test]
fn test_plan_period_zero_padded() {
    assert_eq!(plan_period(2025, 3), "2025-03");
    assert_eq!(plan_period(2025, 11), "2025-11");
}

#[test]
fn test_holiday_calendar_parses_dates() {
    let holidays = HolidayCalendar::load_from_json(r#"["2025-04-23", "2025-05-01", "bogus"]"#);
    assert_eq!(holidays.len(), 2);
    assert!(holidays.contains(date(2025, 4, 23)));
    assert!(!holidays.contains(date(2025, 4, 24)));
}

#[test]
fn test_holiday_calendar_degrades_to_empty() {
    // Unreadable sources and malformed JSON both mean "no holidays".
    assert!(HolidayCalendar::load_from_file("/nonexistent/holidays.json").is_empty());
    assert!(HolidayCalendar::load_from_json("{not json").is_empty());
}
