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

use rota_scheduler_core::model::configuration::Configuration;
use rota_scheduler_core::model::rows::{ClinicRow, DutyTypeRow, HistoryRow, LeaveRow, SeniorityRuleRow, StaffRow};
use rota_scheduler_core::platform::{PlatformError, PlatformResult, PlatformTrait};
use rota_scheduler_db::model::{
    ClinicDatabaseRequests, DutyTypeDatabaseRequests, HistoryDatabaseRequests, LeaveDatabaseRequests,
    SeniorityRuleDatabaseRequests, StaffDatabaseRequests,
};
use rota_scheduler_db::{DbError, Session};

/// Database-backed platform, scoped to one unit.
pub struct Platform {
    unit_id: i64,
    session: Session,
    configuration: Configuration,
}

fn db_error(error: DbError) -> PlatformError {
    PlatformError::Backend(error.to_string())
}

impl Platform {
    pub fn from_database(session: Session, unit_id: i64, configuration: Configuration) -> Self {
        Platform { unit_id, session, configuration }
    }
    pub fn session(&self) -> &Session {
        &self.session
    }
    pub fn unit_id(&self) -> i64 {
        self.unit_id
    }
}

impl PlatformTrait for Platform {
    fn get_configuration(&self) -> &Configuration {
        &self.configuration
    }
    fn list_staff(&self) -> PlatformResult<Vec<StaffRow>> {
        StaffRow::get_all(&self.session, self.unit_id).map_err(db_error)
    }
    fn list_clinics(&self) -> PlatformResult<Vec<ClinicRow>> {
        ClinicRow::get_all(&self.session, self.unit_id).map_err(db_error)
    }
    fn list_clinic_seniority_rules(&self) -> PlatformResult<Vec<SeniorityRuleRow>> {
        SeniorityRuleRow::get_all(&self.session, self.unit_id).map_err(db_error)
    }
    fn list_duty_types(&self) -> PlatformResult<Vec<DutyTypeRow>> {
        DutyTypeRow::get_all(&self.session, self.unit_id).map_err(db_error)
    }
    fn list_leave_requests(&self) -> PlatformResult<Vec<LeaveRow>> {
        LeaveRow::get_all(&self.session, self.unit_id).map_err(db_error)
    }
    fn list_assignment_history(&self, period: Option<&str>) -> PlatformResult<Vec<HistoryRow>> {
        HistoryRow::get_all(&self.session, self.unit_id, period).map_err(db_error)
    }
    fn replace_assignment_history(&mut self, period: &str, rows: Vec<HistoryRow>) -> PlatformResult<()> {
        HistoryRow::replace_period(&self.session, self.unit_id, period, &rows).map_err(db_error)
    }
}
