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

pub mod assignment_history;
pub mod clinics;
pub mod duty_types;
pub mod leave_requests;
pub mod staff;

pub use assignment_history::HistoryDatabaseRequests;
pub use clinics::{ClinicDatabaseRequests, SeniorityRuleDatabaseRequests};
pub use duty_types::DutyTypeDatabaseRequests;
pub use leave_requests::LeaveDatabaseRequests;
pub use staff::StaffDatabaseRequests;
