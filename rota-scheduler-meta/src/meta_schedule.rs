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

use crate::platform::Platform;
use log::info;
use rota_scheduler_core::scheduler::PlanError;
use rota_scheduler_core::scheduler::history::{derive_history_rows, preserved_history_rows};
use rota_scheduler_core::scheduler::planning::{Plan, PlanType, compute_plan};
use rota_scheduler_core::platform::PlatformTrait;

/// Compute the plan of a month without touching stored history.
pub fn plan_month(platform: &Platform, year: i32, month: u32, plan_type: PlanType) -> Result<Plan, PlanError> {
    compute_plan(platform, year, month, plan_type)
}

/// Approve a plan: recompute it from current data, derive its history rows
/// and atomically replace the period's rows, keeping the rows of the other
/// plan kind untouched. Cached plans are never trusted here; approval always
/// re-solves.
pub fn approve_plan(platform: &mut Platform, year: i32, month: u32, plan_type: PlanType) -> Result<Plan, PlanError> {
    let plan = compute_plan(platform, year, month, plan_type)?;

    let new_rows = derive_history_rows(&plan.assignments, plan_type, &plan.plan_period);
    let existing = platform.list_assignment_history(Some(&plan.plan_period))?;
    let mut combined = preserved_history_rows(existing, plan_type);
    let preserved_count = combined.len();
    combined.extend(new_rows);

    platform.replace_assignment_history(&plan.plan_period, combined)?;
    info!(
        "Approved {} plan for {}: {} assignment rows stored ({} preserved from the other plan kind)",
        plan_type.as_str(),
        plan.plan_period,
        plan.assignments.len(),
        preserved_count
    );
    Ok(plan)
}
