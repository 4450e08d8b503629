//! Plan orchestration: preconditions, projection loading, the clinic
//! relaxation cascade, the two-part night plan, and the assembled result.

use crate::model::person::{Person, Seniority};
use crate::model::rows::{ClinicRow, DutyCategory, DutyTypeRow, SeniorityRuleRow, StaffRow};
use crate::platform::PlatformTrait;
use crate::scheduler::PlanError;
use crate::scheduler::calendar::{HolidayCalendar, MonthCalendar, plan_period};
use crate::scheduler::history;
use crate::scheduler::oncall::{CapLoad, build_cap_plan};
use crate::scheduler::scheduling::{
    AssignmentProblem, ObjectiveMode, PlanAssignment, PersonLoad, ScheduleOutcome,
};
use crate::scheduler::slots::build_slots;
use crate::scheduler::solver::SolverBudget;
use chrono::NaiveDate;
use indexmap::IndexMap;
use log::{info, warn};
use prettytable::{Cell, Table, row};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanType {
    #[default]
    Clinic,
    Nobet,
}

impl PlanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanType::Clinic => "clinic",
            PlanType::Nobet => "nobet",
        }
    }
    /// Unknown values normalise to the clinic plan.
    pub fn parse(value: &str) -> PlanType {
        if value.trim().eq_ignore_ascii_case("nobet") { PlanType::Nobet } else { PlanType::Clinic }
    }
}

/// Night-duty load enriched with the weekday/weekend summary derived from
/// the merged assignment list.
#[derive(Debug, Clone, Serialize)]
pub struct NightLoad {
    pub person_id: String,
    pub person_name: String,
    pub title: Option<String>,
    pub seniority: Seniority,
    pub assigned_slots: u32,
    pub weekday_slots: u32,
    pub weekend_slots: u32,
    pub total_hours: u32,
    pub target_slots: i64,
    pub deviation: i64,
    pub history_weekend_slots: u32,
    pub min_limit: Option<u32>,
    pub max_limit: Option<u32>,
}

#[derive(Debug)]
pub enum PlanLoads {
    Clinic(Vec<PersonLoad>),
    Nobet { cap: Vec<CapLoad>, night: Vec<NightLoad> },
}

/// A computed month plan, ready for display or approval.
#[derive(Debug)]
pub struct Plan {
    pub status_label: String,
    pub objective_value: f64,
    pub assignments: Vec<PlanAssignment>,
    pub loads: PlanLoads,
    pub text: String,
    /// Relaxation notes accumulated while searching for a feasible plan.
    pub notes: Vec<String>,
    pub selected_year: i32,
    pub selected_month: u32,
    pub plan_type: PlanType,
    pub plan_period: String,
}

pub const NOTE_REPEAT_RELAXED: &str = "repeat penalty disabled; consecutive assignments possible";
pub const NOTE_SENIORITY_RELAXED: &str = "seniority requirements relaxed; review staffing manually";
pub const NOTE_WEEKEND_RELAXED: &str = "weekend history relaxed";

/// Compute the plan of one month for the platform's unit.
///
/// The platform is only read; persisting an accepted plan is a separate
/// step, see the history helpers.
pub fn compute_plan<T: PlatformTrait>(
    platform: &T,
    year: i32,
    month: u32,
    plan_type: PlanType,
) -> Result<Plan, PlanError> {
    let calendar = MonthCalendar::new(year, month).ok_or(PlanError::InvalidPeriod { year, month })?;
    let config = platform.get_configuration().clone();
    let holidays = config
        .holidays_conf_file
        .as_deref()
        .map(HolidayCalendar::load_from_file)
        .unwrap_or_default();

    let staff_rows = platform.list_staff()?;
    if staff_rows.is_empty() {
        return Err(PlanError::NoStaff);
    }
    let people = Person::from_staff_rows(&staff_rows);
    let staff_names = staff_name_map(&staff_rows);

    let leave_by_staff = history::leave_windows_by_staff(&platform.list_leave_requests()?);
    let duty_types = platform.list_duty_types()?;

    let mut plan = match plan_type {
        PlanType::Clinic => {
            let clinics = platform.list_clinics()?;
            let rule_map = seniority_rule_map(&platform.list_clinic_seniority_rules()?);
            let repeat_history = history::clinic_repeat_history(platform, year, month)?;
            build_clinic_plan(ClinicPlanInputs {
                calendar: &calendar,
                holidays: &holidays,
                people: &people,
                clinics: &clinics,
                duty_types: &duty_types,
                staff_names: &staff_names,
                rule_map,
                repeat_history,
                leave_by_staff: &leave_by_staff,
                platform,
            })?
        }
        PlanType::Nobet => {
            let weekend_history = history::weekend_history_counts(platform, year, month)?;
            build_nobet_plan(&calendar, &people, &duty_types, &leave_by_staff, weekend_history, platform)?
        }
    };

    plan.selected_year = year;
    plan.selected_month = month;
    plan.plan_type = plan_type;
    plan.plan_period = plan_period(year, month);
    Ok(plan)
}

struct ClinicPlanInputs<'a, T: PlatformTrait> {
    calendar: &'a MonthCalendar,
    holidays: &'a HolidayCalendar,
    people: &'a [Person],
    clinics: &'a [ClinicRow],
    duty_types: &'a [DutyTypeRow],
    staff_names: &'a HashMap<i64, String>,
    rule_map: HashMap<i64, IndexMap<Seniority, u32>>,
    repeat_history: HashMap<i64, HashSet<String>>,
    leave_by_staff: &'a HashMap<i64, Vec<(NaiveDate, NaiveDate)>>,
    platform: &'a T,
}

/// Clinic path: full model first, then the fixed relaxation ladder. Only
/// solver failures trigger the next rung; every other error propagates.
fn build_clinic_plan<T: PlatformTrait>(inputs: ClinicPlanInputs<'_, T>) -> Result<Plan, PlanError> {
    let config = inputs.platform.get_configuration();
    let mesa_duties: Vec<DutyTypeRow> = inputs
        .duty_types
        .iter()
        .filter(|duty| duty.category() == DutyCategory::Mesa)
        .cloned()
        .collect();
    if inputs.clinics.is_empty() && mesa_duties.is_empty() {
        return Err(PlanError::NoWorkToPlan);
    }

    let display_names = clinic_display_names(inputs.clinics, inputs.staff_names);
    let slots = build_slots(
        inputs.clinics,
        &mesa_duties,
        inputs.calendar,
        inputs.holidays,
        PlanType::Clinic,
        &display_names,
    );
    if slots.is_empty() {
        return Err(PlanError::NoSlotsGenerated);
    }

    let rotation_days: HashMap<i64, u32> = inputs
        .clinics
        .iter()
        .map(|clinic| {
            let period = crate::model::rows::RotationPeriod::parse(clinic.rotation_period.as_deref());
            (clinic.id, period.block_days())
        })
        .collect();
    let leave_windows = history::leave_windows_by_identifier(inputs.people, inputs.leave_by_staff);

    // The relaxation ladder: full constraints, then without the repeat
    // history, then additionally without the seniority rules.
    let attempts: [(bool, bool, Option<&str>); 3] = [
        (true, true, None),
        (false, true, Some(NOTE_REPEAT_RELAXED)),
        (false, false, Some(NOTE_SENIORITY_RELAXED)),
    ];

    let budget = SolverBudget {
        wall_seconds: config.solver_wall_seconds,
        workers: config.solver_workers,
    };
    let mut notes: Vec<String> = Vec::new();
    let mut last_error: Option<PlanError> = None;

    for (use_repeat, use_rules, note) in attempts {
        if let Some(note) = note {
            notes.push(note.to_string());
        }
        let problem = AssignmentProblem::builder(inputs.people.to_vec(), slots.clone())
            .rest_buffer_hours(config.rest_buffer_hours)
            .clinic_rotation_days(rotation_days.clone())
            .clinic_seniority_rules(if use_rules { inputs.rule_map.clone() } else { HashMap::new() })
            .clinic_repeat_history(if use_repeat { inputs.repeat_history.clone() } else { HashMap::new() })
            .leave_windows(leave_windows.clone())
            .objective_mode(ObjectiveMode::Seniority)
            .weekend_penalty_weight(config.weekend_penalty_weight)
            .repeat_penalty_weight(config.repeat_penalty_weight)
            .build();

        match problem.solve(&budget) {
            Ok(outcome) => {
                return Ok(clinic_plan_from_outcome(outcome, notes));
            }
            Err(PlanError::SolverFailed(status)) => {
                warn!("Clinic plan attempt failed with solver status {}, relaxing further", status);
                last_error = Some(PlanError::SolverFailed(status));
            }
            Err(other) => return Err(other),
        }
    }
    Err(last_error.unwrap_or(PlanError::SolverFailed(crate::scheduler::solver::SolveStatus::Abandoned)))
}

fn clinic_plan_from_outcome(outcome: ScheduleOutcome, notes: Vec<String>) -> Plan {
    let text = outcome.format_solution();
    Plan {
        status_label: outcome.status.as_str().to_string(),
        objective_value: outcome.objective_value,
        assignments: outcome.assignments,
        loads: PlanLoads::Clinic(outcome.loads),
        text,
        notes,
        selected_year: 0,
        selected_month: 0,
        plan_type: PlanType::Clinic,
        plan_period: String::new(),
    }
}

/// Night path: the deterministic cap rotation plus the balanced resident
/// solve, merged into one assignment list.
fn build_nobet_plan<T: PlatformTrait>(
    calendar: &MonthCalendar,
    people: &[Person],
    duty_types: &[DutyTypeRow],
    leave_by_staff: &HashMap<i64, Vec<(NaiveDate, NaiveDate)>>,
    weekend_history: HashMap<String, u32>,
    platform: &T,
) -> Result<Plan, PlanError> {
    let config = platform.get_configuration();
    let nobet_duties: Vec<&DutyTypeRow> = duty_types
        .iter()
        .filter(|duty| duty.category() == DutyCategory::Nobet)
        .collect();
    let cap_duty = nobet_duties
        .iter()
        .find(|duty| duty.is_cap())
        .copied()
        .ok_or(PlanError::MissingCapDuty)?;
    let night_duties: Vec<DutyTypeRow> = nobet_duties
        .iter()
        .filter(|duty| duty.id != cap_duty.id)
        .map(|duty| (*duty).clone())
        .collect();

    let cap_plan = build_cap_plan(people, cap_duty, calendar, leave_by_staff, config)?;
    let cap_text = cap_plan.format_text(calendar.day_count());

    let night = build_night_section(calendar, people, &night_duties, leave_by_staff, weekend_history, platform)?;

    let mut assignments = cap_plan.assignments;
    assignments.extend(night.assignments.iter().cloned());
    assignments.sort_by_key(|assignment| assignment.start);

    let text_sections: Vec<&str> = [cap_text.as_str(), night.text.as_str()]
        .into_iter()
        .filter(|section| !section.is_empty())
        .collect();

    Ok(Plan {
        status_label: if night.status_label.is_empty() { "OK".to_string() } else { night.status_label.clone() },
        objective_value: night.objective_value,
        assignments,
        loads: PlanLoads::Nobet { cap: cap_plan.loads, night: night.loads },
        text: text_sections.join("\n\n"),
        notes: night.notes,
        selected_year: 0,
        selected_month: 0,
        plan_type: PlanType::Nobet,
        plan_period: String::new(),
    })
}

struct NightSection {
    assignments: Vec<PlanAssignment>,
    loads: Vec<NightLoad>,
    text: String,
    status_label: String,
    objective_value: f64,
    notes: Vec<String>,
}

fn empty_night_section(text: &str) -> NightSection {
    NightSection {
        assignments: Vec::new(),
        loads: Vec::new(),
        text: text.to_string(),
        status_label: "EMPTY".to_string(),
        objective_value: 0.0,
        notes: Vec::new(),
    }
}

/// Residents' night duties: balanced objective, per-person limits enforced,
/// weekend history driving fairness. Infeasibility is retried once with the
/// weekend history dropped.
fn build_night_section<T: PlatformTrait>(
    calendar: &MonthCalendar,
    people: &[Person],
    night_duties: &[DutyTypeRow],
    leave_by_staff: &HashMap<i64, Vec<(NaiveDate, NaiveDate)>>,
    weekend_history: HashMap<String, u32>,
    platform: &T,
) -> Result<NightSection, PlanError> {
    if night_duties.is_empty() {
        return Ok(empty_night_section("No night duty definitions."));
    }

    let config = platform.get_configuration();
    let residents: Vec<Person> = people
        .iter()
        .filter(|person| {
            person
                .title
                .as_deref()
                .unwrap_or("")
                .trim()
                .to_ascii_lowercase()
                .starts_with("asst")
        })
        .cloned()
        .collect();
    for resident in &residents {
        if let (Some(min), Some(max)) = (resident.min_night_duties, resident.max_night_duties) {
            if min > max {
                return Err(PlanError::InvalidLimits(resident.display_name.clone()));
            }
        }
    }
    if residents.is_empty() {
        return Err(PlanError::NoResidents);
    }

    let slots = build_slots(
        &[],
        night_duties,
        calendar,
        &HolidayCalendar::empty(),
        PlanType::Nobet,
        &HashMap::new(),
    );
    if slots.is_empty() {
        return Ok(empty_night_section("No night duty slots were generated."));
    }

    let leave_windows = history::leave_windows_by_identifier(&residents, leave_by_staff);
    let budget = SolverBudget {
        wall_seconds: config.solver_wall_seconds,
        workers: config.solver_workers,
    };

    let solve_once = |history_counts: HashMap<String, u32>| -> Result<ScheduleOutcome, PlanError> {
        AssignmentProblem::builder(residents.clone(), slots.clone())
            .rest_buffer_hours(config.rest_buffer_hours)
            .enforce_person_limits(true)
            .leave_windows(leave_windows.clone())
            .weekend_history_counts(history_counts)
            .objective_mode(ObjectiveMode::Balanced)
            .weekend_penalty_weight(config.weekend_penalty_weight)
            .repeat_penalty_weight(config.repeat_penalty_weight)
            .build()
            .solve(&budget)
    };

    let mut notes = Vec::new();
    let outcome = match solve_once(weekend_history) {
        Ok(outcome) => outcome,
        Err(PlanError::SolverFailed(status)) => {
            warn!("Night plan infeasible with weekend history (status {}), retrying without it", status);
            notes.push(NOTE_WEEKEND_RELAXED.to_string());
            solve_once(HashMap::new())?
        }
        Err(other) => return Err(other),
    };

    info!("Night plan solved with status {}", outcome.status);
    let loads = night_loads(&residents, &outcome);
    let text = format_night_text(&residents, &outcome.assignments, &loads);
    Ok(NightSection {
        assignments: outcome.assignments,
        loads,
        text,
        status_label: outcome.status.as_str().to_string(),
        objective_value: outcome.objective_value,
        notes,
    })
}

fn night_loads(residents: &[Person], outcome: &ScheduleOutcome) -> Vec<NightLoad> {
    struct Tally {
        assigned: u32,
        weekday: u32,
        weekend: u32,
        hours: u32,
    }
    let mut tallies: HashMap<&str, Tally> = HashMap::new();
    for assignment in &outcome.assignments {
        let Some(person) = &assignment.person else {
            continue;
        };
        let entry = tallies
            .entry(person.identifier.as_str())
            .or_insert(Tally { assigned: 0, weekday: 0, weekend: 0, hours: 0 });
        entry.assigned += 1;
        if ScheduleOutcome::assignment_is_weekend(assignment) {
            entry.weekend += 1;
        } else {
            entry.weekday += 1;
        }
        entry.hours += assignment.duration_hours;
    }

    let solver_loads: HashMap<&str, &PersonLoad> =
        outcome.loads.iter().map(|load| (load.person_id.as_str(), load)).collect();

    residents
        .iter()
        .map(|person| {
            let tally = tallies.get(person.identifier.as_str());
            let solver_load = solver_loads.get(person.identifier.as_str());
            NightLoad {
                person_id: person.identifier.clone(),
                person_name: person.display_name.clone(),
                title: person.title.clone(),
                seniority: person.seniority,
                assigned_slots: tally.map_or(0, |t| t.assigned),
                weekday_slots: tally.map_or(0, |t| t.weekday),
                weekend_slots: tally.map_or(0, |t| t.weekend),
                total_hours: tally.map_or(0, |t| t.hours),
                target_slots: solver_load.map_or(0, |load| load.target_slots),
                deviation: solver_load.map_or(0, |load| load.deviation),
                history_weekend_slots: solver_load.map_or(0, |load| load.weekend_history),
                min_limit: person.min_night_duties,
                max_limit: person.max_night_duties,
            }
        })
        .collect()
}

fn format_night_text(residents: &[Person], assignments: &[PlanAssignment], loads: &[NightLoad]) -> String {
    let mut lines = vec![
        "=== Night Duty Plan ===".to_string(),
        format!("Residents: {}", residents.len()),
        format!("Assignments: {}", assignments.len()),
        String::new(),
        "Distribution:".to_string(),
    ];
    let mut any = false;
    for load in loads {
        if load.assigned_slots == 0 {
            continue;
        }
        any = true;
        lines.push(format!(
            "- {}: {} duties ({} weekday, {} weekend), {} hours total",
            load.person_name, load.assigned_slots, load.weekday_slots, load.weekend_slots, load.total_hours,
        ));
    }
    if !any {
        lines.push("- No residents were assigned.".to_string());
    }
    lines.join("\n")
}

fn staff_name_map(staff_rows: &[StaffRow]) -> HashMap<i64, String> {
    staff_rows.iter().map(|row| (row.id, row.name.clone())).collect()
}

/// Clinic display labels, with the responsible specialist appended when set.
fn clinic_display_names(clinics: &[ClinicRow], staff_names: &HashMap<i64, String>) -> HashMap<i64, String> {
    clinics
        .iter()
        .map(|clinic| {
            let name = clinic
                .responsible_specialist_id
                .and_then(|id| staff_names.get(&id))
                .map(|responsible| format!("{} (responsible: {})", clinic.name, responsible))
                .unwrap_or_else(|| clinic.name.clone());
            (clinic.id, name)
        })
        .collect()
}

fn seniority_rule_map(rules: &[SeniorityRuleRow]) -> HashMap<i64, IndexMap<Seniority, u32>> {
    let mut map: HashMap<i64, IndexMap<Seniority, u32>> = HashMap::new();
    for rule in rules {
        let Some(seniority) = Seniority::parse(&rule.required_seniority) else {
            continue;
        };
        let Ok(count) = u32::try_from(rule.required_count) else {
            continue;
        };
        map.entry(rule.clinic_id).or_default().insert(seniority, count);
    }
    map
}

impl Plan {
    /// Month table: one row per day, one column per clinic (clinic plans) or
    /// per assigned duty type (night plans), cells holding assignee names.
    pub fn to_table(&self, clinics: &[ClinicRow], duty_types: &[DutyTypeRow], staff_names: &HashMap<i64, String>) -> Table {
        enum ColumnKey {
            Clinic(i64),
            Duty(i64),
        }

        let mut columns: Vec<(String, ColumnKey)> = Vec::new();
        if self.plan_type == PlanType::Clinic {
            let mut sorted_clinics: Vec<&ClinicRow> = clinics.iter().collect();
            sorted_clinics.sort_by_key(|clinic| (clinic.display_order.is_none(), clinic.display_order.unwrap_or(clinic.id), clinic.id));
            let display_names = clinic_display_names(clinics, staff_names);
            for clinic in sorted_clinics {
                let header = display_names.get(&clinic.id).cloned().unwrap_or_else(|| clinic.name.clone());
                columns.push((header, ColumnKey::Clinic(clinic.id)));
            }
        } else {
            // Night plans only list the duty types that actually received
            // assignments; the cap rotation always qualifies.
            let assigned_duty_ids: HashSet<i64> = self
                .assignments
                .iter()
                .filter_map(|assignment| crate::model::slot::parse_duty_slot_id(&assignment.slot_id))
                .collect();
            let mut sorted_duties: Vec<&DutyTypeRow> = duty_types
                .iter()
                .filter(|duty| duty.category() == DutyCategory::Nobet)
                .filter(|duty| assigned_duty_ids.is_empty() || assigned_duty_ids.contains(&duty.id))
                .collect();
            sorted_duties.sort_by_key(|duty| duty.id);
            for duty in sorted_duties {
                columns.push((duty.name.clone(), ColumnKey::Duty(duty.id)));
            }
        }

        let mut lookup: HashMap<(NaiveDate, i64, bool), Vec<String>> = HashMap::new();
        for assignment in &self.assignments {
            let Some(person) = &assignment.person else {
                continue;
            };
            let day = assignment.start.date();
            let key = if let Some((clinic_id, _position)) = crate::model::slot::parse_clinic_slot_id(&assignment.slot_id) {
                (day, clinic_id, true)
            } else if let Some(duty_id) = crate::model::slot::parse_duty_slot_id(&assignment.slot_id) {
                (day, duty_id, false)
            } else {
                continue;
            };
            let display = match &person.title {
                Some(title) => format!("{} {}", title, person.display_name),
                None => person.display_name.clone(),
            };
            lookup.entry(key).or_default().push(display);
        }

        let mut table = Table::new();
        let mut header_cells = vec![Cell::new("Date")];
        header_cells.extend(columns.iter().map(|(header, _key)| Cell::new(header)));
        table.add_row(prettytable::Row::new(header_cells));

        if let Some(calendar) = MonthCalendar::new(self.selected_year, self.selected_month) {
            for day in calendar.days() {
                let mut cells = vec![Cell::new(&day.format("%Y-%m-%d").to_string())];
                for (_header, key) in &columns {
                    let lookup_key = match key {
                        ColumnKey::Clinic(id) => (*day, *id, true),
                        ColumnKey::Duty(id) => (*day, *id, false),
                    };
                    let value = lookup.get(&lookup_key).map(|names| names.join(", ")).unwrap_or_default();
                    cells.push(Cell::new(&value));
                }
                table.add_row(prettytable::Row::new(cells));
            }
        }
        table
    }

    /// Cap rotation summary table; empty for clinic plans.
    pub fn cap_summary_table(&self) -> Table {
        let mut table = Table::new();
        table.add_row(row!["Person", "Title", "Assigned Days", "Weekday Days", "Weekend Days", "Total Hours"]);
        if let PlanLoads::Nobet { cap, .. } = &self.loads {
            for load in cap {
                if load.assigned_days == 0 {
                    continue;
                }
                table.add_row(row![
                    load.person_name,
                    load.title.as_deref().unwrap_or("-"),
                    load.assigned_days,
                    load.weekday_days,
                    load.weekend_days,
                    load.total_hours
                ]);
            }
        }
        table
    }

    /// Night duty summary table; empty for clinic plans.
    pub fn night_summary_table(&self) -> Table {
        let mut table = Table::new();
        table.add_row(row!["Person", "Title", "Assigned", "Weekday", "Weekend", "Total Hours", "Min Limit", "Max Limit"]);
        if let PlanLoads::Nobet { night, .. } = &self.loads {
            for load in night {
                if load.assigned_slots == 0 {
                    continue;
                }
                table.add_row(row![
                    load.person_name,
                    load.title.as_deref().unwrap_or("-"),
                    load.assigned_slots,
                    load.weekday_slots,
                    load.weekend_slots,
                    load.total_hours,
                    load.min_limit.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string()),
                    load.max_limit.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
                ]);
            }
        }
        table
    }
}
