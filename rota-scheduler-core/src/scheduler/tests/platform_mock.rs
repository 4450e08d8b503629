use crate::model::configuration::Configuration;
use crate::model::rows::{ClinicRow, DutyTypeRow, HistoryRow, LeaveRow, SeniorityRuleRow, StaffRow};
use crate::platform::{PlatformResult, PlatformTrait};

/// In-memory platform for scheduler tests; rows are plain vectors.
#[derive(Default)]
pub struct PlatformMock {
    pub configuration: Configuration,
    pub staff: Vec<StaffRow>,
    pub clinics: Vec<ClinicRow>,
    pub rules: Vec<SeniorityRuleRow>,
    pub duty_types: Vec<DutyTypeRow>,
    pub leave: Vec<LeaveRow>,
    pub history: Vec<HistoryRow>,
}

impl PlatformTrait for PlatformMock {
    fn get_configuration(&self) -> &Configuration {
        &self.configuration
    }
    fn list_staff(&self) -> PlatformResult<Vec<StaffRow>> {
        Ok(self.staff.clone())
    }
    fn list_clinics(&self) -> PlatformResult<Vec<ClinicRow>> {
        let mut clinics = self.clinics.clone();
        clinics.sort_by_key(|clinic| (clinic.display_order.is_none(), clinic.display_order.unwrap_or(clinic.id), clinic.id));
        Ok(clinics)
    }
    fn list_clinic_seniority_rules(&self) -> PlatformResult<Vec<SeniorityRuleRow>> {
        Ok(self.rules.clone())
    }
    fn list_duty_types(&self) -> PlatformResult<Vec<DutyTypeRow>> {
        Ok(self.duty_types.clone())
    }
    fn list_leave_requests(&self) -> PlatformResult<Vec<LeaveRow>> {
        Ok(self.leave.clone())
    }
    fn list_assignment_history(&self, period: Option<&str>) -> PlatformResult<Vec<HistoryRow>> {
        Ok(self
            .history
            .iter()
            .filter(|row| period.is_none_or(|p| row.plan_period == p))
            .cloned()
            .collect())
    }
    fn replace_assignment_history(&mut self, period: &str, rows: Vec<HistoryRow>) -> PlatformResult<()> {
        self.history.retain(|row| row.plan_period != period);
        self.history.extend(rows);
        Ok(())
    }
}

pub fn staff_row(id: i64, name: &str, title: &str, seniority: Option<&str>) -> StaffRow {
    StaffRow {
        id,
        name: name.to_string(),
        title: Some(title.to_string()),
        seniority: seniority.map(str::to_string),
        min_night_duties_per_month: None,
        max_night_duties_per_month: None,
        education_year: None,
        night_duty_exempt: false,
    }
}

pub fn assistant(id: i64, name: &str, seniority: &str) -> StaffRow {
    staff_row(id, name, "Asst. Dr.", Some(seniority))
}

pub fn specialist(id: i64, name: &str) -> StaffRow {
    staff_row(id, name, "Uzm. Dr.", None)
}

pub fn clinic_row(id: i64, name: &str, required_assistants: i64, rotation_period: &str) -> ClinicRow {
    ClinicRow {
        id,
        name: name.to_string(),
        display_order: Some(id),
        required_assistants,
        rotation_period: Some(rotation_period.to_string()),
        responsible_specialist_id: None,
    }
}

pub fn duty_type_row(id: i64, name: &str, duration_hours: i64, category: &str, required_staff: i64) -> DutyTypeRow {
    DutyTypeRow {
        id,
        name: name.to_string(),
        duration_hours,
        duty_category: Some(category.to_string()),
        required_staff_count: required_staff,
    }
}

pub fn cap_duty_row(id: i64) -> DutyTypeRow {
    duty_type_row(id, "cap", 24, "nobet", 1)
}
