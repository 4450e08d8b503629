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

pub mod calendar;
pub mod history;
pub mod oncall;
pub mod planning;
pub mod scheduling;
pub mod slots;
pub mod solver;

mod tests;

use crate::platform::PlatformError;
use crate::scheduler::solver::SolveStatus;
use chrono::NaiveDate;
use thiserror::Error;

/// Failures of a plan computation. Only `SolverFailed` is recovered locally,
/// through the relaxation cascade of the orchestrator; every other kind
/// propagates to the caller unchanged.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("no staff available for planning")]
    NoStaff,
    #[error("no duty type named \"cap\" found in the nobet category")]
    MissingCapDuty,
    #[error("nothing to plan: add at least one clinic or one mesa duty")]
    NoWorkToPlan,
    #[error("no slots could be generated from the clinic and duty definitions")]
    NoSlotsGenerated,
    #[error("no eligible staff for slot '{0}'")]
    NoEligibleStaff(String),
    #[error("all specialists are on leave on {0}")]
    AllSpecialistsOnLeave(NaiveDate),
    #[error("the cap rotation requires at least one specialist")]
    NoSpecialists,
    #[error("night duties require at least one resident")]
    NoResidents,
    #[error("invalid night duty limits for {0}: minimum exceeds maximum")]
    InvalidLimits(String),
    #[error("solver failed with status {0}")]
    SolverFailed(SolveStatus),
    #[error("invalid plan period {year}-{month}")]
    InvalidPeriod { year: i32, month: u32 },
    #[error(transparent)]
    Platform(#[from] PlatformError),
}
