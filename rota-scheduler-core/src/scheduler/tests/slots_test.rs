use crate::model::slot::DutyKind;
use crate::scheduler::calendar::{HolidayCalendar, MonthCalendar};
use crate::scheduler::planning::PlanType;
use crate::scheduler::slots::build_slots;
use crate::scheduler::tests::platform_mock::{clinic_row, duty_type_row};
use chrono::{NaiveDate, Timelike};
use std::collections::HashMap;

fn march_2025() -> MonthCalendar {
    MonthCalendar::new(2025, 3).unwrap()
}

#[test]
fn test_clinic_slots_cover_working_days_only() {
    let clinics = vec![clinic_row(1, "Derm", 1, "daily")];
    let slots = build_slots(&clinics, &[], &march_2025(), &HolidayCalendar::empty(), PlanType::Clinic, &HashMap::new());

    // March 2025 has 21 weekdays.
    assert_eq!(slots.len(), 21);
    for slot in &slots {
        assert_eq!(slot.duty_type, DutyKind::Clinic);
        assert_eq!(slot.start.hour(), 8);
        assert_eq!(slot.duration_hours, 8);
        assert!(slot.identifier.starts_with("clinic_1_"));
        // Singleton groups carry no position suffix.
        assert_eq!(slot.identifier.split('_').count(), 3);
    }
    assert_eq!(slots[0].start.date(), NaiveDate::from_ymd_opt(2025, 3, 3).unwrap());
}

#[test]
fn test_clinic_slots_expand_positions() {
    let clinics = vec![clinic_row(2, "Cardio", 3, "daily")];
    let slots = build_slots(&clinics, &[], &march_2025(), &HolidayCalendar::empty(), PlanType::Clinic, &HashMap::new());
    assert_eq!(slots.len(), 21 * 3);
    assert_eq!(slots[0].identifier, "clinic_2_2025-03-03_1");
    assert_eq!(slots[1].identifier, "clinic_2_2025-03-03_2");
    assert_eq!(slots[2].identifier, "clinic_2_2025-03-03_3");
    assert!(slots[0].label.ends_with("#1"));
}

#[test]
fn test_holidays_excluded_from_clinic_slots() {
    let clinics = vec![clinic_row(1, "Derm", 1, "daily")];
    let holidays = HolidayCalendar::from_dates([NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()]);
    let slots = build_slots(&clinics, &[], &march_2025(), &holidays, PlanType::Clinic, &HashMap::new());
    assert_eq!(slots.len(), 20);
    assert!(!slots.iter().any(|slot| slot.identifier.contains("2025-03-03")));
}

#[test]
fn test_mesa_duties_only_in_clinic_plans() {
    let duties = vec![duty_type_row(5, "triage", 8, "mesa", 1)];
    let clinic_slots = build_slots(&[], &duties, &march_2025(), &HolidayCalendar::empty(), PlanType::Clinic, &HashMap::new());
    assert_eq!(clinic_slots.len(), 21);
    assert!(clinic_slots.iter().all(|slot| slot.duty_type == DutyKind::Duty));

    let nobet_slots = build_slots(&[], &duties, &march_2025(), &HolidayCalendar::empty(), PlanType::Nobet, &HashMap::new());
    assert!(nobet_slots.is_empty());
}

#[test]
fn test_nobet_duties_cover_every_day() {
    let duties = vec![duty_type_row(7, "gece", 16, "nobet", 1)];
    let slots = build_slots(&[], &duties, &march_2025(), &HolidayCalendar::empty(), PlanType::Nobet, &HashMap::new());
    assert_eq!(slots.len(), 31);
    // 16 hour duties start at (8 - 16) mod 24 = 16:00 and end at 08:00.
    for slot in &slots {
        assert_eq!(slot.start.hour(), 16);
        assert!(slot.requires_extended_rest());
    }
}

#[test]
fn test_nobet_24h_duty_starts_at_08() {
    let duties = vec![duty_type_row(8, "full", 24, "nobet", 1)];
    let slots = build_slots(&[], &duties, &march_2025(), &HolidayCalendar::empty(), PlanType::Nobet, &HashMap::new());
    assert_eq!(slots[0].start.hour(), 8);
}

#[test]
fn test_short_nobet_duty_starts_at_08_and_needs_no_rest() {
    let duties = vec![duty_type_row(9, "evening", 8, "nobet", 2)];
    let slots = build_slots(&[], &duties, &march_2025(), &HolidayCalendar::empty(), PlanType::Nobet, &HashMap::new());
    assert_eq!(slots.len(), 31 * 2);
    assert_eq!(slots[0].start.hour(), 8);
    assert!(!slots[0].requires_extended_rest());
    assert_eq!(slots[0].identifier, "duty_9_2025-03-01_1");
    assert_eq!(slots[1].identifier, "duty_9_2025-03-01_2");
}

#[test]
fn test_clinic_display_names_flow_into_labels() {
    let clinics = vec![clinic_row(4, "Derm", 1, "daily")];
    let display_names = HashMap::from([(4, "Derm (responsible: Dr. Ucar)".to_string())]);
    let slots = build_slots(&clinics, &[], &march_2025(), &HolidayCalendar::empty(), PlanType::Clinic, &display_names);
    assert!(slots[0].label.starts_with("Derm (responsible: Dr. Ucar) - "));
}
