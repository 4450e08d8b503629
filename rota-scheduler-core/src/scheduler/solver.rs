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

//! Thin facade over the MILP backend: integer variables, linear rows, a
//! linear minimisation objective and a wall-clock budget. Model construction
//! elsewhere only talks to this module, so the backend can be swapped without
//! touching the scheduling code.

use coin_cbc::raw::Status;
use coin_cbc::{Col, Model, Sense};
use log::info;
use std::fmt;

/// CBC reports this magnitude as the objective when no incumbent exists.
const NO_INCUMBENT_OBJECTIVE: f64 = 1e30;

/// Handle to a model variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Var(usize);

#[derive(Debug, Clone, Copy)]
enum VarDomain {
    Bool,
    Int { lower: i64, upper: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowSense {
    Eq,
    Le,
    Ge,
}

#[derive(Debug)]
struct Row {
    terms: Vec<(Var, i64)>,
    sense: RowSense,
    rhs: i64,
}

/// A mixed-integer model under construction. All coefficients are integral;
/// the backend works in floats internally.
#[derive(Debug, Default)]
pub struct MilpModel {
    variables: Vec<VarDomain>,
    rows: Vec<Row>,
    objective: Vec<(Var, i64)>,
}

impl MilpModel {
    pub fn new() -> MilpModel {
        MilpModel::default()
    }

    pub fn add_bool(&mut self) -> Var {
        self.variables.push(VarDomain::Bool);
        Var(self.variables.len() - 1)
    }

    pub fn add_int(&mut self, lower: i64, upper: i64) -> Var {
        self.variables.push(VarDomain::Int { lower, upper });
        Var(self.variables.len() - 1)
    }

    pub fn add_eq(&mut self, terms: Vec<(Var, i64)>, rhs: i64) {
        self.rows.push(Row { terms, sense: RowSense::Eq, rhs });
    }

    pub fn add_le(&mut self, terms: Vec<(Var, i64)>, rhs: i64) {
        self.rows.push(Row { terms, sense: RowSense::Le, rhs });
    }

    pub fn add_ge(&mut self, terms: Vec<(Var, i64)>, rhs: i64) {
        self.rows.push(Row { terms, sense: RowSense::Ge, rhs });
    }

    /// Add `weight * var` to the minimised objective. Repeated calls for the
    /// same variable accumulate.
    pub fn add_objective_term(&mut self, var: Var, weight: i64) {
        if weight != 0 {
            self.objective.push((var, weight));
        }
    }

    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Wall-clock and parallelism budget of one solve call.
#[derive(Debug, Clone, Copy)]
pub struct SolverBudget {
    pub wall_seconds: u32,
    pub workers: u32,
}

impl Default for SolverBudget {
    fn default() -> Self {
        SolverBudget { wall_seconds: 10, workers: 8 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    Optimal,
    /// An incumbent was found but optimality was not proven within the budget.
    Feasible,
    Infeasible,
    /// Wall-clock expiry without any incumbent.
    Timeout,
    Abandoned,
}

impl SolveStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::Feasible)
    }
    pub fn as_str(&self) -> &'static str {
        match self {
            SolveStatus::Optimal => "OPTIMAL",
            SolveStatus::Feasible => "FEASIBLE",
            SolveStatus::Infeasible => "INFEASIBLE",
            SolveStatus::Timeout => "TIMEOUT",
            SolveStatus::Abandoned => "ABANDONED",
        }
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Solved values, indexed by [`Var`].
#[derive(Debug)]
pub struct MilpSolution {
    pub status: SolveStatus,
    pub objective_value: f64,
    values: Vec<f64>,
}

impl MilpSolution {
    pub fn value(&self, var: Var) -> i64 {
        self.values[var.0].round() as i64
    }
    pub fn bool_value(&self, var: Var) -> bool {
        self.values[var.0] > 0.5
    }
}

/// Backend abstraction; see [`CbcSolver`] for the default implementation.
pub trait MilpSolver {
    fn solve(&self, model: &MilpModel, budget: &SolverBudget) -> MilpSolution;
}

/// CBC branch-and-cut backend.
#[derive(Debug, Default)]
pub struct CbcSolver;

impl MilpSolver for CbcSolver {
    fn solve(&self, model: &MilpModel, budget: &SolverBudget) -> MilpSolution {
        let mut cbc = Model::default();

        let cols: Vec<Col> = model
            .variables
            .iter()
            .map(|domain| match domain {
                VarDomain::Bool => cbc.add_binary(),
                VarDomain::Int { lower, upper } => {
                    let col = cbc.add_integer();
                    cbc.set_col_lower(col, *lower as f64);
                    cbc.set_col_upper(col, *upper as f64);
                    col
                }
            })
            .collect();

        for row in &model.rows {
            let cbc_row = cbc.add_row();
            match row.sense {
                RowSense::Eq => cbc.set_row_equal(cbc_row, row.rhs as f64),
                RowSense::Le => cbc.set_row_upper(cbc_row, row.rhs as f64),
                RowSense::Ge => cbc.set_row_lower(cbc_row, row.rhs as f64),
            }
            for (var, coefficient) in &row.terms {
                cbc.set_weight(cbc_row, cols[var.0], *coefficient as f64);
            }
        }

        cbc.set_obj_sense(Sense::Minimize);
        for (var, weight) in &model.objective {
            cbc.set_obj_coeff(cols[var.0], *weight as f64);
        }

        cbc.set_parameter("logLevel", "0");
        cbc.set_parameter("seconds", &budget.wall_seconds.to_string());
        cbc.set_parameter("threads", &budget.workers.to_string());

        info!(
            "Solving MILP model: {} variables, {} rows, budget {}s / {} workers",
            model.variable_count(),
            model.row_count(),
            budget.wall_seconds,
            budget.workers
        );

        let solution = cbc.solve();
        let raw = solution.raw();

        let status = match raw.status() {
            Status::Finished => {
                if raw.is_proven_infeasible() {
                    SolveStatus::Infeasible
                } else if raw.is_proven_optimal() {
                    SolveStatus::Optimal
                } else {
                    SolveStatus::Feasible
                }
            }
            Status::Stopped => {
                // Budget expiry keeps the best incumbent when one was found.
                if raw.obj_value().abs() < NO_INCUMBENT_OBJECTIVE {
                    SolveStatus::Feasible
                } else {
                    SolveStatus::Timeout
                }
            }
            _ => SolveStatus::Abandoned,
        };

        let values = cols.iter().map(|col| solution.col(*col)).collect();
        let objective_value = raw.obj_value();
        info!("Solver finished with status {} (objective {})", status, objective_value);

        MilpSolution { status, objective_value, values }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_assignment_model() {
        // Two slots, two candidates each, one candidate shared: the shared
        // exclusivity row forces one distinct person per slot.
        let mut model = MilpModel::new();
        let a1 = model.add_bool();
        let a2 = model.add_bool();
        let b1 = model.add_bool();
        let b2 = model.add_bool();
        model.add_eq(vec![(a1, 1), (a2, 1)], 1);
        model.add_eq(vec![(b1, 1), (b2, 1)], 1);
        model.add_le(vec![(a1, 1), (b1, 1)], 1);
        // Prefer person 2 everywhere.
        model.add_objective_term(a1, 2);
        model.add_objective_term(b1, 2);

        let solution = CbcSolver.solve(&model, &SolverBudget::default());
        assert_eq!(solution.status, SolveStatus::Optimal);
        assert!(solution.bool_value(a2));
        assert!(solution.bool_value(b2));
        assert!(!solution.bool_value(a1));
    }

    #[test]
    fn test_infeasible_model_reported() {
        let mut model = MilpModel::new();
        let x = model.add_bool();
        model.add_eq(vec![(x, 1)], 1);
        model.add_eq(vec![(x, 1)], 0);
        let solution = CbcSolver.solve(&model, &SolverBudget::default());
        assert_eq!(solution.status, SolveStatus::Infeasible);
    }

    #[test]
    fn test_integer_bounds_respected() {
        let mut model = MilpModel::new();
        let load = model.add_int(2, 5);
        model.add_objective_term(load, 1);
        let solution = CbcSolver.solve(&model, &SolverBudget::default());
        assert_eq!(solution.status, SolveStatus::Optimal);
        assert_eq!(solution.value(load), 2);
    }
}
