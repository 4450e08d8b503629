//! Slot synthesis: expand clinic and duty definitions into the concrete
//! schedulable slots of one month.

use crate::model::rows::{ClinicRow, DutyCategory, DutyTypeRow};
use crate::model::slot::{DutyKind, DutySlot, EXTENDED_REST_THRESHOLD_HOURS, format_clinic_slot_id, format_duty_slot_id};
use crate::scheduler::calendar::{HolidayCalendar, MonthCalendar, is_weekend};
use crate::scheduler::planning::PlanType;
use chrono::{NaiveDate, NaiveTime};
use std::collections::HashMap;

const CLINIC_SHIFT_START_HOUR: u32 = 8;
const CLINIC_SHIFT_HOURS: u32 = 8;

/// Generate the duty slots of a month for the given plan type.
///
/// Clinic slots and `mesa` duties exist on working days only (neither weekend
/// nor holiday) and start at 08:00. `nobet` duties cover every day of the
/// month; long ones start so that they end near 08:00 the next morning.
///
/// The returned vector follows clinic/duty declaration order and day order;
/// callers needing a specific order must sort on the identifiers themselves.
pub fn build_slots(
    clinics: &[ClinicRow],
    duty_types: &[DutyTypeRow],
    calendar: &MonthCalendar,
    holidays: &HolidayCalendar,
    plan_type: PlanType,
    clinic_display_names: &HashMap<i64, String>,
) -> Vec<DutySlot> {
    let mut slots = Vec::new();

    let working_day = |day: NaiveDate| !is_weekend(day) && !holidays.contains(day);

    if plan_type == PlanType::Clinic {
        for clinic in clinics {
            let required = clinic.required_assistants.max(1) as u32;
            let display_name = clinic_display_names
                .get(&clinic.id)
                .cloned()
                .unwrap_or_else(|| clinic.name.clone());
            for day in calendar.days() {
                if !working_day(*day) {
                    continue;
                }
                let start = day.and_time(NaiveTime::from_hms_opt(CLINIC_SHIFT_START_HOUR, 0, 0).unwrap());
                for position in 1..=required {
                    let mut label = format!("{} - {}", display_name, day.format("%Y-%m-%d"));
                    if required > 1 {
                        label = format!("{} #{}", label, position);
                    }
                    slots.push(DutySlot {
                        identifier: format_clinic_slot_id(clinic.id, *day, position, required),
                        duty_type: DutyKind::Clinic,
                        start,
                        duration_hours: CLINIC_SHIFT_HOURS,
                        label,
                    });
                }
            }
        }
    }

    for duty in duty_types {
        let category = duty.category();
        match plan_type {
            PlanType::Clinic if category != DutyCategory::Mesa => continue,
            PlanType::Nobet if category != DutyCategory::Nobet => continue,
            _ => {}
        }
        let duration = u32::try_from(duty.duration_hours).unwrap_or(8).max(1);
        let start_hour = if duration >= EXTENDED_REST_THRESHOLD_HOURS {
            // Long duties land their end time near 08:00 the next day.
            (8i64 - duration as i64).rem_euclid(24) as u32
        } else {
            8
        };
        let required = duty.required_staff_count.max(1) as u32;

        for day in calendar.days() {
            if category == DutyCategory::Mesa && !working_day(*day) {
                continue;
            }
            let start = day.and_time(NaiveTime::from_hms_opt(start_hour, 0, 0).unwrap());
            for position in 1..=required {
                let mut label = format!("{} - {}", duty.name, day.format("%Y-%m-%d"));
                if required > 1 {
                    label = format!("{} #{}", label, position);
                }
                slots.push(DutySlot {
                    identifier: format_duty_slot_id(duty.id, *day, position, required),
                    duty_type: DutyKind::Duty,
                    start,
                    duration_hours: duration,
                    label,
                });
            }
        }
    }

    slots
}
