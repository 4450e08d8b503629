//! Demo dataset: one unit with a small mixed staff, two clinics and the
//! usual duty types. Intended for local runs and integration tests.

use crate::Session;
use crate::model::{
    ClinicDatabaseRequests, DutyTypeDatabaseRequests, LeaveDatabaseRequests, SeniorityRuleDatabaseRequests,
    StaffDatabaseRequests,
};
use chrono::NaiveDate;
use log::info;
use rota_scheduler_core::model::rows::{ClinicRow, DutyTypeRow, LeaveRow, StaffRow};
use sqlx::Error;

pub const EXAMPLE_UNIT_ID: i64 = 1;

fn staff(id: i64, name: &str, title: &str, seniority: Option<&str>) -> StaffRow {
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

/// Populate the example unit. The schema must already exist.
pub fn seed_example_data(session: &Session) -> Result<(), Error> {
    let staff_rows = vec![
        staff(1, "Dr. Aksoy", "Uzm. Dr.", None),
        staff(2, "Dr. Bal", "Uzm. Dr.", None),
        staff(3, "Dr. Arslan", "Asst. Dr.", Some("kidemli")),
        staff(4, "Dr. Ceylan", "Asst. Dr.", Some("ara")),
        staff(5, "Dr. Demir", "Asst. Dr.", Some("ara")),
        staff(6, "Dr. Erden", "Asst. Dr.", Some("comez")),
        staff(7, "Dr. Firat", "Asst. Dr.", Some("comez")),
    ];
    for row in &staff_rows {
        row.insert(session, EXAMPLE_UNIT_ID)?;
    }

    let clinics = vec![
        ClinicRow {
            id: 1,
            name: "Dermatoloji".to_string(),
            display_order: None,
            required_assistants: 1,
            rotation_period: Some("weekly".to_string()),
            responsible_specialist_id: Some(1),
        },
        ClinicRow {
            id: 2,
            name: "Kardiyoloji".to_string(),
            display_order: None,
            required_assistants: 2,
            rotation_period: Some("daily".to_string()),
            responsible_specialist_id: Some(2),
        },
    ];
    for clinic in &clinics {
        clinic.insert(session, EXAMPLE_UNIT_ID)?;
    }
    // Kardiyoloji wants both of its daily assistants to be kidemli; with a
    // single senior resident seeded, one position is covered by fallback.
    rota_scheduler_core::model::rows::SeniorityRuleRow::upsert(session, 2, "kidemli", 2)?;

    let duty_types = vec![
        DutyTypeRow {
            id: 1,
            name: "cap".to_string(),
            duration_hours: 24,
            duty_category: Some("nobet".to_string()),
            required_staff_count: 1,
        },
        DutyTypeRow {
            id: 2,
            name: "Gece Nobeti".to_string(),
            duration_hours: 16,
            duty_category: Some("nobet".to_string()),
            required_staff_count: 1,
        },
        DutyTypeRow {
            id: 3,
            name: "Triyaj".to_string(),
            duration_hours: 8,
            duty_category: Some("mesa".to_string()),
            required_staff_count: 1,
        },
    ];
    for duty in &duty_types {
        duty.insert(session, EXAMPLE_UNIT_ID)?;
    }

    LeaveRow {
        id: 1,
        staff_id: 4,
        start_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
        reason: Some("yillik izin".to_string()),
    }
    .insert(session)?;

    info!(
        "Seeded example unit {}: {} staff, {} clinics, {} duty types",
        EXAMPLE_UNIT_ID,
        staff_rows.len(),
        clinics.len(),
        duty_types.len()
    );
    Ok(())
}
