use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Raw staff record as stored by the repository. Projection into a solver
/// [`Person`](crate::model::person::Person) happens in the core, not in the storage layer.
#[derive(Debug, Clone, PartialEq)]
pub struct StaffRow {
    pub id: i64,
    pub name: String,
    pub title: Option<String>,
    pub seniority: Option<String>,
    pub min_night_duties_per_month: Option<i64>,
    pub max_night_duties_per_month: Option<i64>,
    pub education_year: Option<i64>,
    pub night_duty_exempt: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClinicRow {
    pub id: i64,
    pub name: String,
    pub display_order: Option<i64>,
    pub required_assistants: i64,
    pub rotation_period: Option<String>,
    pub responsible_specialist_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeniorityRuleRow {
    pub id: i64,
    pub clinic_id: i64,
    pub required_seniority: String,
    pub required_count: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DutyTypeRow {
    pub id: i64,
    pub name: String,
    pub duration_hours: i64,
    pub duty_category: Option<String>,
    pub required_staff_count: i64,
}

impl DutyTypeRow {
    /// Unset or unknown categories count as `nobet`, matching the storage default.
    pub fn category(&self) -> DutyCategory {
        match self.duty_category.as_deref().map(str::trim) {
            Some(value) if value.eq_ignore_ascii_case("mesa") => DutyCategory::Mesa,
            _ => DutyCategory::Nobet,
        }
    }
    /// The single-specialist rotation is the `nobet` duty literally named "cap".
    pub fn is_cap(&self) -> bool {
        self.category() == DutyCategory::Nobet && self.name.trim().eq_ignore_ascii_case("cap")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DutyCategory {
    /// Day shift, scheduled on working days only.
    Mesa,
    /// Night/on-call duty, scheduled every day of the month.
    Nobet,
}

/// Leave window, inclusive on both ends. Canonicalisation (start <= end) is the
/// core's job, see [`crate::scheduler::history`].
#[derive(Debug, Clone, PartialEq)]
pub struct LeaveRow {
    pub id: i64,
    pub staff_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRow {
    pub staff_id: i64,
    /// Present for clinic plans, absent for night-duty plans. The two kinds of
    /// rows share the table and must not overwrite each other.
    pub clinic_id: Option<i64>,
    pub assignment_date: NaiveDate,
    /// `YYYY-MM`, zero-padded month.
    pub plan_period: String,
    pub day_type: DayType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayType {
    Weekday,
    Weekend,
}

impl DayType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DayType::Weekday => "weekday",
            DayType::Weekend => "weekend",
        }
    }
    pub fn parse(value: &str) -> DayType {
        if value.trim().eq_ignore_ascii_case("weekend") {
            DayType::Weekend
        } else {
            DayType::Weekday
        }
    }
}

/// Rotation period of a clinic, expressed as a block size in days.
/// `Monthly` collapses the whole month into a single block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationPeriod {
    #[default]
    Daily,
    Weekly,
    Biweekly,
    Monthly,
}

impl RotationPeriod {
    pub fn block_days(&self) -> u32 {
        match self {
            RotationPeriod::Daily => 1,
            RotationPeriod::Weekly => 7,
            RotationPeriod::Biweekly => 14,
            RotationPeriod::Monthly => 0,
        }
    }
    /// Unknown or missing values normalise to daily.
    pub fn parse(value: Option<&str>) -> RotationPeriod {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("daily") => RotationPeriod::Daily,
            Some("weekly") => RotationPeriod::Weekly,
            Some("biweekly") => RotationPeriod::Biweekly,
            Some("monthly") => RotationPeriod::Monthly,
            _ => RotationPeriod::Daily,
        }
    }
    pub fn as_str(&self) -> &'static str {
        match self {
            RotationPeriod::Daily => "daily",
            RotationPeriod::Weekly => "weekly",
            RotationPeriod::Biweekly => "biweekly",
            RotationPeriod::Monthly => "monthly",
        }
    }
}
