/*
 * Copyright (c) 2025 Clément GRENNERAT
 *
 * This program is free software: you can redistribute it and/or modify it under the terms of the
 * GNU General Public License as published by the Free Software Foundation, version 3.
 * This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without
 * even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
 * See the GNU General Public License for more details.
 * You should have received a copy of the GNU General Public License along with this program.
 * If not, see https://www.gnu.org/licenses/.
 *
 */

//! Deterministic round-robin builder for the single-specialist "cap"
//! rotation. No solver involved: a rotating pointer walks the specialist
//! list day by day, skipping anyone on leave.

use crate::model::configuration::Configuration;
use crate::model::person::Person;
use crate::model::rows::DutyTypeRow;
use crate::model::slot::format_duty_slot_id;
use crate::scheduler::PlanError;
use crate::scheduler::calendar::{MonthCalendar, is_weekend};
use crate::scheduler::scheduling::{AssignedPerson, PlanAssignment};
use chrono::{NaiveDate, NaiveTime};
use indexmap::IndexMap;
use log::info;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize)]
pub struct CapLoad {
    pub person_id: String,
    pub person_name: String,
    pub title: Option<String>,
    pub assigned_days: u32,
    pub weekday_days: u32,
    pub weekend_days: u32,
    pub total_hours: u32,
}

#[derive(Debug)]
pub struct CapPlan {
    pub assignments: Vec<PlanAssignment>,
    /// Per-specialist distribution, ordered by display name.
    pub loads: Vec<CapLoad>,
}

impl CapPlan {
    pub fn format_text(&self, day_count: usize) -> String {
        let mut lines = vec![
            "=== Cap Rotation Plan ===".to_string(),
            format!("Specialists: {}", self.loads.len()),
            format!("Days covered: {}", day_count),
            String::new(),
            "Distribution:".to_string(),
        ];
        let mut any = false;
        for load in &self.loads {
            if load.assigned_days == 0 {
                continue;
            }
            any = true;
            lines.push(format!(
                "- {}: {} days ({} weekday, {} weekend), {} hours total",
                load.person_name, load.assigned_days, load.weekday_days, load.weekend_days, load.total_hours,
            ));
        }
        if !any {
            lines.push("- No specialists were assigned.".to_string());
        }
        lines.join("\n")
    }
}

/// Assign the cap duty across every day of the month.
///
/// Specialists rotate in case-insensitive display-name order. For each day
/// the pointer scans forward at most one full cycle for someone not on
/// leave; finding nobody is a hard failure carrying the date. Assigned hours
/// ignore the stored duty duration: weekdays and weekends use the configured
/// override hours.
pub fn build_cap_plan(
    people: &[Person],
    cap_duty: &DutyTypeRow,
    calendar: &MonthCalendar,
    leave_windows: &HashMap<i64, Vec<(NaiveDate, NaiveDate)>>,
    config: &Configuration,
) -> Result<CapPlan, PlanError> {
    let mut specialists: Vec<&Person> = people.iter().filter(|person| person.is_specialist()).collect();
    if specialists.is_empty() {
        return Err(PlanError::NoSpecialists);
    }
    specialists.sort_by_key(|person| person.display_name.to_lowercase());

    let duty_name = {
        let trimmed = cap_duty.name.trim();
        if trimmed.is_empty() { "cap" } else { trimmed }
    };

    // Leave windows keyed by numeric staff id; resolve them per specialist.
    let specialist_windows: HashMap<&str, &Vec<(NaiveDate, NaiveDate)>> = specialists
        .iter()
        .filter_map(|person| {
            let staff_id = person.staff_id()?;
            leave_windows.get(&staff_id).map(|windows| (person.identifier.as_str(), windows))
        })
        .collect();
    let on_leave = |person: &Person, day: NaiveDate| {
        specialist_windows
            .get(person.identifier.as_str())
            .is_some_and(|windows| windows.iter().any(|(start, end)| *start <= day && day <= *end))
    };

    let mut loads: IndexMap<&str, CapLoad> = specialists
        .iter()
        .map(|person| {
            (
                person.identifier.as_str(),
                CapLoad {
                    person_id: person.identifier.clone(),
                    person_name: person.display_name.clone(),
                    title: person.title.clone(),
                    assigned_days: 0,
                    weekday_days: 0,
                    weekend_days: 0,
                    total_hours: 0,
                },
            )
        })
        .collect();

    let mut assignments = Vec::with_capacity(calendar.day_count());
    let count = specialists.len();
    let mut pointer = 0usize;

    for day in calendar.days() {
        let mut assigned: Option<&Person> = None;
        for offset in 0..count {
            let candidate = specialists[(pointer + offset) % count];
            if on_leave(candidate, *day) {
                continue;
            }
            assigned = Some(candidate);
            pointer = (pointer + offset + 1) % count;
            break;
        }
        let Some(specialist) = assigned else {
            return Err(PlanError::AllSpecialistsOnLeave(*day));
        };

        let weekend = is_weekend(*day);
        let hours = if weekend { config.cap_weekend_hours } else { config.cap_weekday_hours };
        assignments.push(PlanAssignment {
            slot_id: format_duty_slot_id(cap_duty.id, *day, 1, 1),
            duty_type: duty_name.to_string(),
            label: format!("{} - {}", duty_name, day.format("%Y-%m-%d")),
            start: day.and_time(NaiveTime::MIN),
            duration_hours: hours,
            requires_extended_rest: false,
            person: Some(AssignedPerson::from(specialist)),
        });

        let entry = loads.get_mut(specialist.identifier.as_str()).unwrap();
        entry.assigned_days += 1;
        if weekend {
            entry.weekend_days += 1;
        } else {
            entry.weekday_days += 1;
        }
        entry.total_hours += hours;
    }

    info!(
        "Cap rotation built: {} days over {} specialists",
        assignments.len(),
        count
    );

    let mut loads: Vec<CapLoad> = loads.into_values().collect();
    loads.sort_by_key(|load| load.person_name.to_lowercase());
    Ok(CapPlan { assignments, loads })
}
