//! Assignment model construction and solving: eligibility-gated boolean
//! variables, coverage, conflict and rest rows, rotation-block linking,
//! seniority composition with fallback, the two objective modes, and the
//! extraction of assignments and per-person loads.

use crate::model::person::{Person, Seniority};
use crate::model::slot::{DutyKind, DutySlot, parse_clinic_slot_id, parse_duty_slot_id};
use crate::scheduler::PlanError;
use crate::scheduler::calendar::is_weekend;
use crate::scheduler::solver::{CbcSolver, MilpModel, MilpSolution, MilpSolver, SolverBudget, Var};
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use indexmap::IndexMap;
use log::info;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObjectiveMode {
    /// Steer per-person loads towards the seniority-preferred targets.
    #[default]
    Seniority,
    /// Equalise duty counts and hours across the pool.
    Balanced,
}

/// One assignment problem: immutable inputs, ready to be lowered into a MILP
/// model. Build through [`AssignmentProblemBuilder`].
pub struct AssignmentProblem {
    people: Vec<Person>,
    slots: Vec<DutySlot>,
    rest_buffer_hours: i64,
    enforce_person_limits: bool,
    clinic_rotation_days: HashMap<i64, u32>,
    clinic_seniority_rules: HashMap<i64, IndexMap<Seniority, u32>>,
    clinic_forbidden_people: HashMap<i64, HashSet<String>>,
    duty_seniority_rules: HashMap<i64, IndexMap<Seniority, u32>>,
    clinic_repeat_history: HashMap<i64, HashSet<String>>,
    weekend_history_counts: HashMap<String, u32>,
    leave_windows: HashMap<String, Vec<(NaiveDate, NaiveDate)>>,
    objective_mode: ObjectiveMode,
    weekend_penalty_weight: i64,
    repeat_penalty_weight: i64,
    /// Indices of night-duty slots falling on weekends; drives the fairness terms.
    weekend_slot_indices: HashSet<usize>,
}

pub struct AssignmentProblemBuilder {
    problem: AssignmentProblem,
}

impl AssignmentProblemBuilder {
    pub fn new(people: Vec<Person>, slots: Vec<DutySlot>) -> Self {
        let weekend_slot_indices = slots
            .iter()
            .enumerate()
            .filter(|(_idx, slot)| slot.duty_type == DutyKind::Duty && is_weekend(slot.start.date()))
            .map(|(idx, _slot)| idx)
            .collect();
        AssignmentProblemBuilder {
            problem: AssignmentProblem {
                people,
                slots,
                rest_buffer_hours: 48,
                enforce_person_limits: false,
                clinic_rotation_days: HashMap::new(),
                clinic_seniority_rules: HashMap::new(),
                clinic_forbidden_people: HashMap::new(),
                duty_seniority_rules: HashMap::new(),
                clinic_repeat_history: HashMap::new(),
                weekend_history_counts: HashMap::new(),
                leave_windows: HashMap::new(),
                objective_mode: ObjectiveMode::Seniority,
                weekend_penalty_weight: 3,
                repeat_penalty_weight: 5,
                weekend_slot_indices,
            },
        }
    }

    pub fn rest_buffer_hours(mut self, hours: i64) -> Self {
        self.problem.rest_buffer_hours = hours;
        self
    }
    pub fn enforce_person_limits(mut self, enforce: bool) -> Self {
        self.problem.enforce_person_limits = enforce;
        self
    }
    pub fn clinic_rotation_days(mut self, rotation_days: HashMap<i64, u32>) -> Self {
        self.problem.clinic_rotation_days = rotation_days;
        self
    }
    pub fn clinic_seniority_rules(mut self, rules: HashMap<i64, IndexMap<Seniority, u32>>) -> Self {
        self.problem.clinic_seniority_rules = rules;
        self
    }
    pub fn clinic_forbidden_people(mut self, forbidden: HashMap<i64, HashSet<String>>) -> Self {
        self.problem.clinic_forbidden_people = forbidden;
        self
    }
    pub fn duty_seniority_rules(mut self, rules: HashMap<i64, IndexMap<Seniority, u32>>) -> Self {
        self.problem.duty_seniority_rules = rules;
        self
    }
    /// Per-clinic sets of people who staffed that clinic in the previous
    /// period; their assignments get the repeat penalty.
    pub fn clinic_repeat_history(mut self, history: HashMap<i64, HashSet<String>>) -> Self {
        self.problem.clinic_repeat_history = history;
        self
    }
    /// Weekend duty counts from the trailing history window. Zero counts are
    /// dropped; they carry no information the fairness terms need.
    pub fn weekend_history_counts(mut self, counts: HashMap<String, u32>) -> Self {
        self.problem.weekend_history_counts = counts.into_iter().filter(|(_id, count)| *count > 0).collect();
        self
    }
    /// Inclusive leave windows keyed by person identifier. Inverted windows
    /// are canonicalised, never discarded.
    pub fn leave_windows(mut self, windows: HashMap<String, Vec<(NaiveDate, NaiveDate)>>) -> Self {
        self.problem.leave_windows = windows
            .into_iter()
            .map(|(id, windows)| {
                let normalized = windows
                    .into_iter()
                    .map(|(start, end)| if end < start { (end, start) } else { (start, end) })
                    .collect();
                (id, normalized)
            })
            .collect();
        self
    }
    pub fn objective_mode(mut self, mode: ObjectiveMode) -> Self {
        self.problem.objective_mode = mode;
        self
    }
    pub fn weekend_penalty_weight(mut self, weight: i64) -> Self {
        self.problem.weekend_penalty_weight = weight;
        self
    }
    pub fn repeat_penalty_weight(mut self, weight: i64) -> Self {
        self.problem.repeat_penalty_weight = weight;
        self
    }

    pub fn build(self) -> AssignmentProblem {
        self.problem
    }
}

/// Working state of one model lowering pass.
struct ModelContext {
    assignment_vars: IndexMap<(usize, usize), Var>,
    repeat_penalty_vars: Vec<Var>,
    fallback_penalty_vars: Vec<Var>,
}

struct PersonTotals {
    load_vars: Vec<Var>,
    hour_vars: Vec<Var>,
    weekend_vars: Vec<Var>,
    total_slots: i64,
    total_hours: i64,
}

impl AssignmentProblem {
    pub fn builder(people: Vec<Person>, slots: Vec<DutySlot>) -> AssignmentProblemBuilder {
        AssignmentProblemBuilder::new(people, slots)
    }

    /// Lower the problem into a MILP model, solve it with the default CBC
    /// backend and extract the outcome.
    pub fn solve(&self, budget: &SolverBudget) -> Result<ScheduleOutcome, PlanError> {
        self.solve_with(&CbcSolver, budget)
    }

    pub fn solve_with(&self, solver: &dyn MilpSolver, budget: &SolverBudget) -> Result<ScheduleOutcome, PlanError> {
        if self.people.is_empty() {
            return Err(PlanError::NoStaff);
        }
        if self.slots.is_empty() {
            return Err(PlanError::NoSlotsGenerated);
        }

        let mut model = MilpModel::new();
        let mut ctx = ModelContext {
            assignment_vars: IndexMap::new(),
            repeat_penalty_vars: Vec::new(),
            fallback_penalty_vars: Vec::new(),
        };

        self.build_assignment_variables(&mut model, &mut ctx);
        self.enforce_slot_coverage(&mut model, &ctx)?;
        self.enforce_clinic_rotation_and_seniority(&mut model, &mut ctx);
        self.enforce_duty_seniority_rules(&mut model, &mut ctx);
        self.enforce_non_overlap_and_rest(&mut model, &ctx);
        self.enforce_person_limits(&mut model, &ctx);
        let totals = self.build_person_totals(&mut model, &ctx);

        match self.objective_mode {
            ObjectiveMode::Seniority => self.add_seniority_objective(&mut model, &ctx, &totals),
            ObjectiveMode::Balanced => self.add_balanced_objective(&mut model, &ctx, &totals),
        }

        let solution = solver.solve(&model, budget);
        if !solution.status.is_success() {
            return Err(PlanError::SolverFailed(solution.status));
        }

        info!(
            "Assignment solved: {} slots over {} people, objective {}",
            self.slots.len(),
            self.people.len(),
            solution.objective_value
        );
        Ok(self.extract_outcome(&ctx, &solution))
    }

    /// True when the slot falls within one of the person's leave windows.
    /// Window days count in full, from 00:00 of the first to the last instant
    /// of the final day.
    fn person_on_leave_during_slot(&self, identifier: &str, slot: &DutySlot) -> bool {
        let Some(windows) = self.leave_windows.get(identifier) else {
            return false;
        };
        windows.iter().any(|(start, end)| {
            let leave_start = start.and_time(NaiveTime::MIN);
            let leave_end = leave_end_of_day(*end);
            slot.start <= leave_end && slot.end() >= leave_start
        })
    }

    fn clinic_assignment_repeat(&self, identifier: &str, slot: &DutySlot) -> bool {
        if slot.duty_type != DutyKind::Clinic {
            return false;
        }
        let Some((clinic_id, _position)) = parse_clinic_slot_id(&slot.identifier) else {
            return false;
        };
        self.clinic_repeat_history
            .get(&clinic_id)
            .is_some_and(|people| people.contains(identifier))
    }

    /// Create one boolean per eligible (person, slot) pair. Clinic slots only
    /// admit specialists when the clinic's own rules ask for one; everyone
    /// else must be a resident. Forbidden lists and leave windows prune pairs
    /// before any variable exists.
    fn build_assignment_variables(&self, model: &mut MilpModel, ctx: &mut ModelContext) {
        for (p_idx, person) in self.people.iter().enumerate() {
            for (s_idx, slot) in self.slots.iter().enumerate() {
                if !person.allows_duty_type(slot.duty_type.as_str()) {
                    continue;
                }
                if slot.duty_type == DutyKind::Clinic {
                    let parsed = parse_clinic_slot_id(&slot.identifier);
                    let mut allow_specialist = false;
                    if let Some((clinic_id, _position)) = parsed {
                        allow_specialist = self
                            .clinic_seniority_rules
                            .get(&clinic_id)
                            .and_then(|rules| rules.get(&Seniority::Uzman))
                            .is_some_and(|count| *count > 0);
                        if self
                            .clinic_forbidden_people
                            .get(&clinic_id)
                            .is_some_and(|forbidden| forbidden.contains(&person.identifier))
                        {
                            continue;
                        }
                    }
                    if !allow_specialist && !person.is_assistant() {
                        continue;
                    }
                }
                if self.person_on_leave_during_slot(&person.identifier, slot) {
                    continue;
                }
                let var = model.add_bool();
                ctx.assignment_vars.insert((p_idx, s_idx), var);
                if self.clinic_assignment_repeat(&person.identifier, slot) {
                    ctx.repeat_penalty_vars.push(var);
                }
            }
        }
    }

    /// Every slot is covered by exactly one person. A slot with no candidate
    /// variables is unsatisfiable by construction and reported immediately.
    fn enforce_slot_coverage(&self, model: &mut MilpModel, ctx: &ModelContext) -> Result<(), PlanError> {
        for (s_idx, slot) in self.slots.iter().enumerate() {
            let candidates: Vec<(Var, i64)> = (0..self.people.len())
                .filter_map(|p_idx| ctx.assignment_vars.get(&(p_idx, s_idx)).map(|var| (*var, 1)))
                .collect();
            if candidates.is_empty() {
                return Err(PlanError::NoEligibleStaff(slot.identifier.clone()));
            }
            model.add_eq(candidates, 1);
        }
        Ok(())
    }

    /// Group clinic slots by clinic id and position index, chronologically
    /// sorted per position.
    fn collect_clinic_slot_groups(&self) -> IndexMap<i64, IndexMap<u32, Vec<usize>>> {
        let mut groups: IndexMap<i64, IndexMap<u32, Vec<usize>>> = IndexMap::new();
        for (s_idx, slot) in self.slots.iter().enumerate() {
            if slot.duty_type != DutyKind::Clinic {
                continue;
            }
            let Some((clinic_id, position)) = parse_clinic_slot_id(&slot.identifier) else {
                continue;
            };
            groups.entry(clinic_id).or_default().entry(position).or_default().push(s_idx);
        }
        for position_map in groups.values_mut() {
            for slot_list in position_map.values_mut() {
                slot_list.sort_by_key(|s_idx| self.slots[*s_idx].start);
            }
        }
        groups
    }

    fn collect_duty_slot_groups(&self) -> IndexMap<i64, IndexMap<NaiveDate, Vec<usize>>> {
        let mut groups: IndexMap<i64, IndexMap<NaiveDate, Vec<usize>>> = IndexMap::new();
        for (s_idx, slot) in self.slots.iter().enumerate() {
            if slot.duty_type != DutyKind::Duty {
                continue;
            }
            let Some(duty_id) = parse_duty_slot_id(&slot.identifier) else {
                continue;
            };
            groups.entry(duty_id).or_default().entry(slot.start.date()).or_default().push(s_idx);
        }
        groups
    }

    /// Rotation blocks keep one occupant per position across all their days,
    /// linked through the chronologically earliest slot of each block. On top
    /// of the block representatives, clinic seniority rules are enforced as a
    /// hard composition with a penalised fallback count.
    fn enforce_clinic_rotation_and_seniority(&self, model: &mut MilpModel, ctx: &mut ModelContext) {
        if self.clinic_rotation_days.is_empty() && self.clinic_seniority_rules.is_empty() {
            return;
        }
        let grouped = self.collect_clinic_slot_groups();

        for (clinic_id, position_map) in &grouped {
            let rotation_days = *self.clinic_rotation_days.get(clinic_id).unwrap_or(&1);
            // Anchor the rotation grid on the clinic's earliest dated slot.
            let Some(base_date) = position_map
                .values()
                .flatten()
                .map(|s_idx| self.slots[*s_idx].start.date())
                .min()
            else {
                continue;
            };

            let mut block_representatives: IndexMap<i64, Vec<usize>> = IndexMap::new();

            for slot_list in position_map.values() {
                let mut blocks: IndexMap<i64, Vec<usize>> = IndexMap::new();
                for s_idx in slot_list {
                    let block_key = if rotation_days == 0 {
                        0
                    } else {
                        let delta_days = (self.slots[*s_idx].start.date() - base_date).num_days();
                        delta_days / rotation_days as i64
                    };
                    blocks.entry(block_key).or_default().push(*s_idx);
                }

                for (block_key, mut grouped_slots) in blocks {
                    grouped_slots.sort_by_key(|s_idx| self.slots[*s_idx].start);
                    let representative = grouped_slots[0];
                    block_representatives.entry(block_key).or_default().push(representative);
                    for s_idx in grouped_slots.iter().skip(1) {
                        for p_idx in 0..self.people.len() {
                            let var_rep = ctx.assignment_vars.get(&(p_idx, representative));
                            let var_other = ctx.assignment_vars.get(&(p_idx, *s_idx));
                            if let (Some(var_rep), Some(var_other)) = (var_rep, var_other) {
                                model.add_eq(vec![(*var_other, 1), (*var_rep, -1)], 0);
                            }
                        }
                    }
                }
            }

            let Some(clinic_rules) = self.clinic_seniority_rules.get(clinic_id) else {
                continue;
            };
            for representatives in block_representatives.values() {
                self.enforce_composition_rules(model, ctx, clinic_rules, representatives);
            }
        }
    }

    /// Seniority requirements for duty slots, grouped per duty type and day.
    fn enforce_duty_seniority_rules(&self, model: &mut MilpModel, ctx: &mut ModelContext) {
        if self.duty_seniority_rules.is_empty() {
            return;
        }
        let grouped = self.collect_duty_slot_groups();
        for (duty_id, date_map) in &grouped {
            let Some(duty_rules) = self.duty_seniority_rules.get(duty_id) else {
                continue;
            };
            for slot_indices in date_map.values() {
                self.enforce_composition_rules(model, ctx, duty_rules, slot_indices);
            }
        }
    }

    /// `E + F = c` for each required seniority: exact matches plus resident
    /// fallbacks cover the requirement; the fallback count is tracked in its
    /// own penalised variable. No candidates at all makes the row `0 = c`,
    /// i.e. trivially infeasible.
    fn enforce_composition_rules(
        &self,
        model: &mut MilpModel,
        ctx: &mut ModelContext,
        rules: &IndexMap<Seniority, u32>,
        slot_indices: &[usize],
    ) {
        if slot_indices.is_empty() {
            return;
        }
        for (seniority, required_count) in rules {
            if *required_count == 0 {
                continue;
            }
            let required = *required_count as i64;
            let mut exact_vars: Vec<Var> = Vec::new();
            let mut fallback_vars: Vec<Var> = Vec::new();
            for s_idx in slot_indices {
                for (p_idx, person) in self.people.iter().enumerate() {
                    let Some(var) = ctx.assignment_vars.get(&(p_idx, *s_idx)) else {
                        continue;
                    };
                    if person.seniority == *seniority {
                        exact_vars.push(*var);
                    } else if person.is_assistant() {
                        fallback_vars.push(*var);
                    }
                }
            }
            if exact_vars.is_empty() && fallback_vars.is_empty() {
                model.add_eq(Vec::new(), required);
                continue;
            }
            let total_terms: Vec<(Var, i64)> = exact_vars.iter().chain(&fallback_vars).map(|var| (*var, 1)).collect();
            model.add_eq(total_terms, required);

            let fallback_usage = model.add_int(0, required);
            let mut fallback_terms: Vec<(Var, i64)> = vec![(fallback_usage, 1)];
            fallback_terms.extend(exact_vars.iter().map(|var| (*var, 1)));
            model.add_eq(fallback_terms, required);
            ctx.fallback_penalty_vars.push(fallback_usage);
        }
    }

    /// Conflicting slot pairs can not be held by one person: overlapping
    /// intervals, and extended-rest duties separated by less than the rest
    /// buffer between the earlier end and the later start.
    fn compute_conflicting_slot_pairs(&self) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for i in 0..self.slots.len() {
            for j in (i + 1)..self.slots.len() {
                let slot_a = &self.slots[i];
                let slot_b = &self.slots[j];
                if slot_a.overlaps(slot_b) || self.violates_rest(slot_a, slot_b) {
                    pairs.push((i, j));
                }
            }
        }
        pairs
    }

    fn violates_rest(&self, slot_a: &DutySlot, slot_b: &DutySlot) -> bool {
        if !(slot_a.requires_extended_rest() && slot_b.requires_extended_rest()) {
            return false;
        }
        let (earlier, later) = if slot_a.start <= slot_b.start { (slot_a, slot_b) } else { (slot_b, slot_a) };
        later.start < earlier.end() + chrono::Duration::hours(self.rest_buffer_hours)
    }

    fn enforce_non_overlap_and_rest(&self, model: &mut MilpModel, ctx: &ModelContext) {
        let pairs = self.compute_conflicting_slot_pairs();
        for p_idx in 0..self.people.len() {
            for (s_a, s_b) in &pairs {
                let var_a = ctx.assignment_vars.get(&(p_idx, *s_a));
                let var_b = ctx.assignment_vars.get(&(p_idx, *s_b));
                if let (Some(var_a), Some(var_b)) = (var_a, var_b) {
                    model.add_le(vec![(*var_a, 1), (*var_b, 1)], 1);
                }
            }
        }
    }

    fn enforce_person_limits(&self, model: &mut MilpModel, ctx: &ModelContext) {
        if !self.enforce_person_limits {
            return;
        }
        for (p_idx, person) in self.people.iter().enumerate() {
            let person_terms: Vec<(Var, i64)> = (0..self.slots.len())
                .filter_map(|s_idx| ctx.assignment_vars.get(&(p_idx, s_idx)).map(|var| (*var, 1)))
                .collect();
            if person_terms.is_empty() {
                continue;
            }
            if let Some(min) = person.min_night_duties {
                model.add_ge(person_terms.clone(), min as i64);
            }
            if let Some(max) = person.max_night_duties {
                model.add_le(person_terms.clone(), max as i64);
            }
        }
    }

    /// Auxiliary integers tracking per-person slot counts, hours and weekend
    /// duty counts; the objectives are built over these.
    fn build_person_totals(&self, model: &mut MilpModel, ctx: &ModelContext) -> PersonTotals {
        let total_slots = self.slots.len() as i64;
        let total_hours: i64 = self.slots.iter().map(|slot| slot.duration_hours as i64).sum();
        let mut load_vars = Vec::with_capacity(self.people.len());
        let mut hour_vars = Vec::with_capacity(self.people.len());
        let mut weekend_vars = Vec::with_capacity(self.people.len());

        for p_idx in 0..self.people.len() {
            let paired: Vec<usize> = (0..self.slots.len())
                .filter(|s_idx| ctx.assignment_vars.contains_key(&(p_idx, *s_idx)))
                .collect();

            let load_var = model.add_int(0, total_slots);
            let mut load_terms: Vec<(Var, i64)> = vec![(load_var, 1)];
            load_terms.extend(paired.iter().map(|s_idx| (ctx.assignment_vars[&(p_idx, *s_idx)], -1)));
            model.add_eq(load_terms, 0);
            load_vars.push(load_var);

            let hour_var = model.add_int(0, total_hours);
            let mut hour_terms: Vec<(Var, i64)> = vec![(hour_var, 1)];
            hour_terms.extend(
                paired
                    .iter()
                    .map(|s_idx| (ctx.assignment_vars[&(p_idx, *s_idx)], -(self.slots[*s_idx].duration_hours as i64))),
            );
            model.add_eq(hour_terms, 0);
            hour_vars.push(hour_var);

            let weekend_var = model.add_int(0, self.weekend_slot_indices.len() as i64);
            let mut weekend_terms: Vec<(Var, i64)> = vec![(weekend_var, 1)];
            weekend_terms.extend(
                paired
                    .iter()
                    .filter(|s_idx| self.weekend_slot_indices.contains(s_idx))
                    .map(|s_idx| (ctx.assignment_vars[&(p_idx, *s_idx)], -1)),
            );
            model.add_eq(weekend_terms, 0);
            weekend_vars.push(weekend_var);
        }

        PersonTotals { load_vars, hour_vars, weekend_vars, total_slots, total_hours }
    }

    /// `abs_var >= ±(expr - target)`: under minimisation with a non-negative
    /// weight the variable settles on the absolute deviation.
    fn add_abs_deviation(model: &mut MilpModel, var: Var, coefficient: i64, target: i64, bound: i64) -> Var {
        let abs_var = model.add_int(0, bound);
        model.add_ge(vec![(abs_var, 1), (var, -coefficient)], -target);
        model.add_ge(vec![(abs_var, 1), (var, coefficient)], target);
        abs_var
    }

    fn add_seniority_objective(&self, model: &mut MilpModel, ctx: &ModelContext, totals: &PersonTotals) {
        for (p_idx, person) in self.people.iter().enumerate() {
            let abs_var = Self::add_abs_deviation(model, totals.load_vars[p_idx], 1, person.preferred_load(), totals.total_slots);
            model.add_objective_term(abs_var, person.weight());
        }
        self.add_weekend_fairness_terms(model, totals);
        self.add_penalty_terms(model, ctx);
    }

    fn add_balanced_objective(&self, model: &mut MilpModel, ctx: &ModelContext, totals: &PersonTotals) {
        let num_people = self.people.len() as i64;
        let total_slots = totals.total_slots.max(0);
        let total_hours = totals.total_hours.max(0);
        let average_duration = if total_slots > 0 { (total_hours / total_slots.max(1)).max(1) } else { 1 };
        let count_weight = average_duration.max(1);

        let slot_bound = total_slots * num_people;
        let hour_bound = total_hours * num_people.max(1);

        for p_idx in 0..self.people.len() {
            let slot_abs = Self::add_abs_deviation(model, totals.load_vars[p_idx], num_people, total_slots, slot_bound);
            model.add_objective_term(slot_abs, count_weight);

            let hour_abs = Self::add_abs_deviation(model, totals.hour_vars[p_idx], num_people, total_hours, hour_bound);
            model.add_objective_term(hour_abs, 1);
        }
        self.add_weekend_fairness_terms(model, totals);
        self.add_penalty_terms(model, ctx);
    }

    /// Deviation of each person's projected weekend total (history plus new
    /// weekend duties, scaled by the pool size) from the pool-wide total.
    fn add_weekend_fairness_terms(&self, model: &mut MilpModel, totals: &PersonTotals) {
        if self.weekend_slot_indices.is_empty() || self.people.is_empty() {
            return;
        }
        let num_people = self.people.len() as i64;
        let total_history: i64 = self
            .people
            .iter()
            .map(|person| *self.weekend_history_counts.get(&person.identifier).unwrap_or(&0) as i64)
            .sum();
        let total_final = total_history + self.weekend_slot_indices.len() as i64;
        if total_final == 0 {
            return;
        }
        let bound = total_final * num_people.max(1);
        for (p_idx, person) in self.people.iter().enumerate() {
            let history = *self.weekend_history_counts.get(&person.identifier).unwrap_or(&0) as i64;
            // diff = (history + weekend) * N - total_final
            let target = total_final - history * num_people;
            let abs_var = Self::add_abs_deviation(model, totals.weekend_vars[p_idx], num_people, target, bound);
            model.add_objective_term(abs_var, self.weekend_penalty_weight);
        }
    }

    fn add_penalty_terms(&self, model: &mut MilpModel, ctx: &ModelContext) {
        let fallback_weight = (self.slots.len() as i64).max(10);
        for var in &ctx.fallback_penalty_vars {
            model.add_objective_term(*var, fallback_weight);
        }
        for var in &ctx.repeat_penalty_vars {
            model.add_objective_term(*var, self.repeat_penalty_weight);
        }
    }

    fn extract_outcome(&self, ctx: &ModelContext, solution: &MilpSolution) -> ScheduleOutcome {
        let assignments = self
            .slots
            .iter()
            .enumerate()
            .map(|(s_idx, slot)| {
                let assigned = self.people.iter().enumerate().find_map(|(p_idx, person)| {
                    ctx.assignment_vars
                        .get(&(p_idx, s_idx))
                        .filter(|var| solution.bool_value(**var))
                        .map(|_var| AssignedPerson::from(person))
                });
                PlanAssignment {
                    slot_id: slot.identifier.clone(),
                    duty_type: slot.duty_type.as_str().to_string(),
                    label: slot.label.clone(),
                    start: slot.start,
                    duration_hours: slot.duration_hours,
                    requires_extended_rest: slot.requires_extended_rest(),
                    person: assigned,
                }
            })
            .collect();

        let loads = self
            .people
            .iter()
            .enumerate()
            .map(|(p_idx, person)| {
                let mut assigned_slots = 0u32;
                let mut assigned_hours = 0u32;
                let mut weekend_assigned = 0u32;
                for (s_idx, slot) in self.slots.iter().enumerate() {
                    let held = ctx
                        .assignment_vars
                        .get(&(p_idx, s_idx))
                        .is_some_and(|var| solution.bool_value(*var));
                    if held {
                        assigned_slots += 1;
                        assigned_hours += slot.duration_hours;
                        if self.weekend_slot_indices.contains(&s_idx) {
                            weekend_assigned += 1;
                        }
                    }
                }
                let target = person.preferred_load();
                PersonLoad {
                    person_id: person.identifier.clone(),
                    person_name: person.display_name.clone(),
                    title: person.title.clone(),
                    seniority: person.seniority,
                    assigned_slots,
                    target_slots: target,
                    deviation: assigned_slots as i64 - target,
                    assigned_hours,
                    weekend_assigned,
                    weekend_history: *self.weekend_history_counts.get(&person.identifier).unwrap_or(&0),
                    min_limit: person.min_night_duties,
                    max_limit: person.max_night_duties,
                }
            })
            .collect();

        ScheduleOutcome {
            status: solution.status,
            objective_value: solution.objective_value,
            assignments,
            loads,
        }
    }
}

fn leave_end_of_day(day: NaiveDate) -> NaiveDateTime {
    day.and_time(NaiveTime::from_hms_opt(23, 59, 59).unwrap())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignedPerson {
    pub identifier: String,
    pub display_name: String,
    pub title: Option<String>,
    pub seniority: Seniority,
}

impl From<&Person> for AssignedPerson {
    fn from(person: &Person) -> Self {
        AssignedPerson {
            identifier: person.identifier.clone(),
            display_name: person.display_name.clone(),
            title: person.title.clone(),
            seniority: person.seniority,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanAssignment {
    pub slot_id: String,
    /// Slot kind for solver output; the cap rotation reuses this field for
    /// the duty's display name.
    pub duty_type: String,
    pub label: String,
    pub start: NaiveDateTime,
    pub duration_hours: u32,
    pub requires_extended_rest: bool,
    pub person: Option<AssignedPerson>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PersonLoad {
    pub person_id: String,
    pub person_name: String,
    pub title: Option<String>,
    pub seniority: Seniority,
    pub assigned_slots: u32,
    pub target_slots: i64,
    pub deviation: i64,
    pub assigned_hours: u32,
    pub weekend_assigned: u32,
    pub weekend_history: u32,
    pub min_limit: Option<u32>,
    pub max_limit: Option<u32>,
}

#[derive(Debug)]
pub struct ScheduleOutcome {
    pub status: crate::scheduler::solver::SolveStatus,
    pub objective_value: f64,
    pub assignments: Vec<PlanAssignment>,
    pub loads: Vec<PersonLoad>,
}

impl ScheduleOutcome {
    /// Plain-text rendering of the schedule and the per-person loads.
    pub fn format_solution(&self) -> String {
        let mut lines = vec!["=== Schedule ===".to_string()];
        for assignment in &self.assignments {
            match &assignment.person {
                None => lines.push(format!("- {} ({}): unassigned", assignment.slot_id, assignment.label)),
                Some(person) => lines.push(format!(
                    "- {} ({}, {}, {}h, {}) -> {} [{}]",
                    assignment.slot_id,
                    assignment.duty_type,
                    assignment.start.format("%Y-%m-%d %H:%M"),
                    assignment.duration_hours,
                    assignment.label,
                    person.display_name,
                    person.seniority,
                )),
            }
        }
        lines.push(String::new());
        lines.push("=== Load By Person ===".to_string());
        for load in &self.loads {
            lines.push(format!(
                "- {:15} | title={:9} | seniority={:7} | assigned={} | target={} | deviation={:+} | hours={} | weekend={} history={}",
                load.person_name,
                load.title.as_deref().unwrap_or("-"),
                load.seniority.as_str(),
                load.assigned_slots,
                load.target_slots,
                load.deviation,
                load.assigned_hours,
                load.weekend_assigned,
                load.weekend_history,
            ));
        }
        lines.join("\n")
    }

    /// Weekday of `start` decides the summary bucket of an assignment.
    pub fn assignment_is_weekend(assignment: &PlanAssignment) -> bool {
        assignment.start.weekday().num_days_from_monday() >= 5
    }
}
