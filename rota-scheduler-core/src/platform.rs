use crate::model::configuration::Configuration;
use crate::model::rows::{ClinicRow, DutyTypeRow, HistoryRow, LeaveRow, SeniorityRuleRow, StaffRow};
use thiserror::Error;

/// Error surfaced by a platform implementation. The core does not know the
/// backing store; storage failures are carried opaquely.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("storage backend error: {0}")]
    Backend(String),
}

pub type PlatformResult<T> = Result<T, PlatformError>;

/// Repository contract consumed by the scheduler. One platform instance is
/// scoped to a single unit; all queries are implicitly filtered to it.
///
/// Implementations must not be called while solver state is held: the
/// orchestrator loads every projection up front and hands immutable data to
/// the model builder.
pub trait PlatformTrait {
    fn get_configuration(&self) -> &Configuration;

    /// All staff of the unit, ordered by id.
    fn list_staff(&self) -> PlatformResult<Vec<StaffRow>>;

    /// All clinics of the unit, ordered by display_order then id.
    fn list_clinics(&self) -> PlatformResult<Vec<ClinicRow>>;

    /// Seniority composition rules across all clinics of the unit.
    fn list_clinic_seniority_rules(&self) -> PlatformResult<Vec<SeniorityRuleRow>>;

    fn list_duty_types(&self) -> PlatformResult<Vec<DutyTypeRow>>;

    fn list_leave_requests(&self) -> PlatformResult<Vec<LeaveRow>>;

    /// Assignment history rows, optionally restricted to one `YYYY-MM` period.
    fn list_assignment_history(&self, period: Option<&str>) -> PlatformResult<Vec<HistoryRow>>;

    /// Atomically replace the history rows of a period with the provided set.
    /// Delete and insert must happen inside one storage transaction.
    fn replace_assignment_history(&mut self, period: &str, rows: Vec<HistoryRow>) -> PlatformResult<()>;
}
