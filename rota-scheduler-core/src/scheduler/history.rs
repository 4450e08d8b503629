//! Projections of persisted state into solver inputs, and the reverse
//! transformation of an accepted plan into history rows.
//!
//! History feeds two independent code paths: the clinic repeat penalty and
//! the night-duty weekend fairness. Both are loaded here, up front, and
//! handed to the model builder as immutable maps; the builder never touches
//! the platform.

use crate::model::person::{Person, parse_staff_identifier, staff_identifier};
use crate::model::rows::{DayType, HistoryRow, LeaveRow};
use crate::model::slot::parse_clinic_slot_id;
use crate::platform::PlatformTrait;
use crate::scheduler::PlanError;
use crate::scheduler::calendar::{day_type, plan_period, previous_month};
use crate::scheduler::planning::PlanType;
use crate::scheduler::scheduling::PlanAssignment;
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Leave windows keyed by staff id, canonicalised so start <= end. Every
/// window is retained, inverted ones included.
pub fn leave_windows_by_staff(rows: &[LeaveRow]) -> HashMap<i64, Vec<(NaiveDate, NaiveDate)>> {
    let mut windows: HashMap<i64, Vec<(NaiveDate, NaiveDate)>> = HashMap::new();
    for row in rows {
        let (start, end) = if row.end_date < row.start_date {
            (row.end_date, row.start_date)
        } else {
            (row.start_date, row.end_date)
        };
        windows.entry(row.staff_id).or_default().push((start, end));
    }
    windows
}

/// The same windows re-keyed by person identifier, restricted to the given
/// people.
pub fn leave_windows_by_identifier(
    people: &[Person],
    by_staff: &HashMap<i64, Vec<(NaiveDate, NaiveDate)>>,
) -> HashMap<String, Vec<(NaiveDate, NaiveDate)>> {
    people
        .iter()
        .filter_map(|person| {
            let staff_id = person.staff_id()?;
            let windows = by_staff.get(&staff_id)?;
            if windows.is_empty() {
                return None;
            }
            Some((person.identifier.clone(), windows.clone()))
        })
        .collect()
}

/// Clinic repeat sets of the previous month: for each clinic, the people who
/// staffed it then. Used for clinic plans only.
pub fn clinic_repeat_history<T: PlatformTrait>(
    platform: &T,
    year: i32,
    month: u32,
) -> Result<HashMap<i64, HashSet<String>>, PlanError> {
    let (previous_year, previous_month) = previous_month(year, month);
    let period = plan_period(previous_year, previous_month);
    let rows = platform.list_assignment_history(Some(&period))?;

    let mut history: HashMap<i64, BTreeSet<String>> = HashMap::new();
    for row in rows {
        let Some(clinic_id) = row.clinic_id else {
            continue;
        };
        history.entry(clinic_id).or_default().insert(staff_identifier(row.staff_id));
    }
    Ok(history
        .into_iter()
        .filter(|(_clinic_id, people)| !people.is_empty())
        .map(|(clinic_id, people)| (clinic_id, people.into_iter().collect()))
        .collect())
}

/// Weekend duty counts per person over the trailing history window. Used for
/// night-duty plans only.
pub fn weekend_history_counts<T: PlatformTrait>(
    platform: &T,
    year: i32,
    month: u32,
) -> Result<HashMap<String, u32>, PlanError> {
    let months = platform.get_configuration().weekend_history_months;
    let mut counts: HashMap<String, u32> = HashMap::new();
    let mut history_year = year;
    let mut history_month = month;
    for _ in 0..months {
        (history_year, history_month) = previous_month(history_year, history_month);
        if history_year < 1 {
            break;
        }
        let period = plan_period(history_year, history_month);
        for row in platform.list_assignment_history(Some(&period))? {
            if row.day_type != DayType::Weekend {
                continue;
            }
            *counts.entry(staff_identifier(row.staff_id)).or_insert(0) += 1;
        }
    }
    Ok(counts)
}

/// Transform an accepted plan's assignments into the history rows of its
/// period. Clinic plans keep clinic slots and carry the clinic id; night
/// plans keep duty slots with no clinic id. Anything else is skipped.
pub fn derive_history_rows(assignments: &[PlanAssignment], plan_type: PlanType, period: &str) -> Vec<HistoryRow> {
    let mut rows = Vec::new();
    for assignment in assignments {
        let clinic_id = match plan_type {
            PlanType::Clinic => {
                let Some((clinic_id, _position)) = parse_clinic_slot_id(&assignment.slot_id) else {
                    continue;
                };
                Some(clinic_id)
            }
            PlanType::Nobet => {
                if !assignment.slot_id.starts_with("duty_") {
                    continue;
                }
                None
            }
        };
        let Some(person) = &assignment.person else {
            continue;
        };
        let Some(staff_id) = parse_staff_identifier(&person.identifier) else {
            continue;
        };
        let assignment_date = assignment.start.date();
        rows.push(HistoryRow {
            staff_id,
            clinic_id,
            assignment_date,
            plan_period: period.to_string(),
            day_type: day_type(assignment_date),
        });
    }
    rows
}

/// Rows of the period that the incoming plan must not overwrite: clinic
/// plans preserve the night rows (NULL clinic) and vice versa.
pub fn preserved_history_rows(existing: Vec<HistoryRow>, plan_type: PlanType) -> Vec<HistoryRow> {
    existing
        .into_iter()
        .filter(|row| match plan_type {
            PlanType::Clinic => row.clinic_id.is_none(),
            PlanType::Nobet => row.clinic_id.is_some(),
        })
        .collect()
}
