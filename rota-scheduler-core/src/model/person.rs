use crate::model::rows::StaffRow;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Seniority levels, ordered from most to least senior resident, with the
/// specialist level last. Eligibility, objective weights and preferred loads
/// all key off this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Seniority {
    Kidemli,
    Ara,
    Comez,
    Uzman,
}

pub const SENIORITY_LEVELS: [Seniority; 4] = [Seniority::Kidemli, Seniority::Ara, Seniority::Comez, Seniority::Uzman];

impl Seniority {
    pub fn parse(value: &str) -> Option<Seniority> {
        match value.trim().to_ascii_lowercase().as_str() {
            "kidemli" => Some(Seniority::Kidemli),
            "ara" => Some(Seniority::Ara),
            "comez" => Some(Seniority::Comez),
            "uzman" => Some(Seniority::Uzman),
            _ => None,
        }
    }
    pub fn as_str(&self) -> &'static str {
        match self {
            Seniority::Kidemli => "kidemli",
            Seniority::Ara => "ara",
            Seniority::Comez => "comez",
            Seniority::Uzman => "uzman",
        }
    }
    /// Objective weight of one slot of deviation from the preferred load.
    pub fn weight(&self) -> i64 {
        match self {
            Seniority::Kidemli => 1,
            Seniority::Ara => 2,
            Seniority::Comez => 3,
            Seniority::Uzman => 0,
        }
    }
    /// Preferred number of assigned slots in the seniority objective mode.
    pub fn preferred_load(&self) -> i64 {
        match self {
            Seniority::Kidemli => 2,
            Seniority::Ara => 1,
            Seniority::Comez => 1,
            Seniority::Uzman => 0,
        }
    }
}

impl fmt::Display for Seniority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A staff member as seen by the solver. Residents and specialists are not a
/// type hierarchy; the `title` field discriminates and the predicate helpers
/// below gate variable creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Person {
    /// Stable identifier, `staff_<N>` for repository-backed staff.
    pub identifier: String,
    pub display_name: String,
    pub title: Option<String>,
    pub seniority: Seniority,
    /// Duty type tags this person may cover; `*` covers everything.
    pub allowed_duty_types: Vec<String>,
    pub min_night_duties: Option<u32>,
    pub max_night_duties: Option<u32>,
    pub education_year: Option<u32>,
    pub night_duty_exempt: bool,
}

impl Person {
    /// Project a raw staff row into a solver person.
    ///
    /// A title beginning with "Uzm" forces the specialist seniority. Otherwise
    /// the stored seniority is taken when valid, defaulting to `ara`. Night
    /// duty limits are dropped as a pair when min exceeds max; negative or
    /// unparsable optional values are dropped individually.
    pub fn from_staff_row(row: &StaffRow) -> Person {
        let title = row.title.as_deref().map(str::trim).filter(|t| !t.is_empty());
        let seniority = if title.is_some_and(|t| t.starts_with("Uzm")) {
            Seniority::Uzman
        } else {
            row.seniority
                .as_deref()
                .and_then(Seniority::parse)
                .unwrap_or(Seniority::Ara)
        };
        let mut min_limit = row.min_night_duties_per_month.and_then(|v| u32::try_from(v).ok());
        let mut max_limit = row.max_night_duties_per_month.and_then(|v| u32::try_from(v).ok());
        if let (Some(min), Some(max)) = (min_limit, max_limit) {
            if min > max {
                min_limit = None;
                max_limit = None;
            }
        }
        Person {
            identifier: staff_identifier(row.id),
            display_name: row.name.clone(),
            title: title.map(str::to_string),
            seniority,
            allowed_duty_types: vec!["*".to_string()],
            min_night_duties: min_limit,
            max_night_duties: max_limit,
            education_year: row.education_year.and_then(|v| u32::try_from(v).ok()),
            night_duty_exempt: row.night_duty_exempt,
        }
    }

    pub fn from_staff_rows(rows: &[StaffRow]) -> Vec<Person> {
        rows.iter().map(Person::from_staff_row).collect()
    }

    pub fn weight(&self) -> i64 {
        self.seniority.weight()
    }
    pub fn preferred_load(&self) -> i64 {
        self.seniority.preferred_load()
    }

    /// Residents are identified by an "Asst" title or a recorded education year.
    pub fn is_assistant(&self) -> bool {
        let title = self.title.as_deref().unwrap_or("").trim().to_ascii_lowercase();
        title.starts_with("asst") || self.education_year.is_some()
    }
    /// Specialists are identified by their title only.
    pub fn is_specialist(&self) -> bool {
        let title = self.title.as_deref().unwrap_or("").trim().to_ascii_lowercase();
        title.starts_with("uzm")
    }

    pub fn allows_duty_type(&self, duty_type: &str) -> bool {
        self.allowed_duty_types.iter().any(|t| t == "*" || t == duty_type)
    }

    /// Numeric staff id for `staff_<N>` identifiers.
    pub fn staff_id(&self) -> Option<i64> {
        parse_staff_identifier(&self.identifier)
    }
}

pub fn staff_identifier(staff_id: i64) -> String {
    format!("staff_{}", staff_id)
}

pub fn parse_staff_identifier(identifier: &str) -> Option<i64> {
    identifier.strip_prefix("staff_")?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn staff_row(title: &str, seniority: Option<&str>) -> StaffRow {
        StaffRow {
            id: 7,
            name: "Dr. Deniz".into(),
            title: Some(title.into()),
            seniority: seniority.map(str::to_string),
            min_night_duties_per_month: None,
            max_night_duties_per_month: None,
            education_year: None,
            night_duty_exempt: false,
        }
    }

    #[test]
    fn test_specialist_title_forces_uzman() {
        let person = Person::from_staff_row(&staff_row("Uzm. Dr.", Some("kidemli")));
        assert_eq!(person.seniority, Seniority::Uzman);
        assert!(person.is_specialist());
        assert!(!person.is_assistant());
    }

    #[test]
    fn test_unknown_seniority_defaults_to_ara() {
        let person = Person::from_staff_row(&staff_row("Asst. Dr.", Some("cok kidemli")));
        assert_eq!(person.seniority, Seniority::Ara);
        assert!(person.is_assistant());
    }

    #[test]
    fn test_night_limits_nullified_as_pair_when_inverted() {
        let mut row = staff_row("Asst. Dr.", Some("comez"));
        row.min_night_duties_per_month = Some(5);
        row.max_night_duties_per_month = Some(2);
        let person = Person::from_staff_row(&row);
        assert_eq!(person.min_night_duties, None);
        assert_eq!(person.max_night_duties, None);
    }

    #[test]
    fn test_negative_limit_dropped_alone() {
        let mut row = staff_row("Asst. Dr.", Some("comez"));
        row.min_night_duties_per_month = Some(-1);
        row.max_night_duties_per_month = Some(4);
        let person = Person::from_staff_row(&row);
        assert_eq!(person.min_night_duties, None);
        assert_eq!(person.max_night_duties, Some(4));
    }

    #[test]
    fn test_staff_identifier_round_trip() {
        assert_eq!(staff_identifier(42), "staff_42");
        assert_eq!(parse_staff_identifier("staff_42"), Some(42));
        assert_eq!(parse_staff_identifier("personnel_42"), None);
        assert_eq!(parse_staff_identifier("staff_"), None);
    }

    #[test]
    fn test_education_year_marks_assistant() {
        let mut row = staff_row("", None);
        row.title = None;
        row.education_year = Some(3);
        let person = Person::from_staff_row(&row);
        assert!(person.is_assistant());
        assert_eq!(person.title, None);
    }
}
