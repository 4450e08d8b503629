use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::fmt;

/// Hours at or above which a duty demands the extended rest buffer afterwards.
pub const EXTENDED_REST_THRESHOLD_HOURS: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DutyKind {
    Clinic,
    Duty,
}

impl DutyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DutyKind::Clinic => "clinic",
            DutyKind::Duty => "duty",
        }
    }
}

impl fmt::Display for DutyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An atomic schedulable unit. The identifier encodes the slot's origin, see
/// [`format_clinic_slot_id`] and [`format_duty_slot_id`] for the grammar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DutySlot {
    pub identifier: String,
    pub duty_type: DutyKind,
    pub start: NaiveDateTime,
    pub duration_hours: u32,
    pub label: String,
}

impl DutySlot {
    pub fn end(&self) -> NaiveDateTime {
        self.start + Duration::hours(self.duration_hours as i64)
    }
    /// Only long duties demand the 48-hour rest period afterwards.
    pub fn requires_extended_rest(&self) -> bool {
        self.duration_hours >= EXTENDED_REST_THRESHOLD_HOURS
    }
    pub fn overlaps(&self, other: &DutySlot) -> bool {
        let latest_start = self.start.max(other.start);
        let earliest_end = self.end().min(other.end());
        latest_start < earliest_end
    }
}

/// `clinic_<id>_<YYYY-MM-DD>[_<pos>]`; the position suffix starts at 1 and is
/// omitted when the clinic needs a single assistant.
pub fn format_clinic_slot_id(clinic_id: i64, day: NaiveDate, position: u32, group_size: u32) -> String {
    if group_size > 1 {
        format!("clinic_{}_{}_{}", clinic_id, day.format("%Y-%m-%d"), position)
    } else {
        format!("clinic_{}_{}", clinic_id, day.format("%Y-%m-%d"))
    }
}

/// `duty_<id>_<YYYY-MM-DD>[_<pos>]`, same position rule as clinic slots.
pub fn format_duty_slot_id(duty_id: i64, day: NaiveDate, position: u32, group_size: u32) -> String {
    if group_size > 1 {
        format!("duty_{}_{}_{}", duty_id, day.format("%Y-%m-%d"), position)
    } else {
        format!("duty_{}_{}", duty_id, day.format("%Y-%m-%d"))
    }
}

/// Extract clinic id and position index from a clinic slot identifier.
/// A missing or malformed position defaults to 1; both suffixed and
/// unsuffixed forms are accepted.
pub fn parse_clinic_slot_id(identifier: &str) -> Option<(i64, u32)> {
    if !identifier.starts_with("clinic_") {
        return None;
    }
    let parts: Vec<&str> = identifier.split('_').collect();
    if parts.len() < 3 {
        return None;
    }
    let clinic_id: i64 = parts[1].parse().ok()?;
    let position = if parts.len() >= 4 { parts[3].parse().unwrap_or(1) } else { 1 };
    Some((clinic_id, position))
}

/// Extract the duty type id from a duty slot identifier.
pub fn parse_duty_slot_id(identifier: &str) -> Option<i64> {
    if !identifier.starts_with("duty_") {
        return None;
    }
    let parts: Vec<&str> = identifier.splitn(3, '_').collect();
    if parts.len() < 2 {
        return None;
    }
    parts[1].parse().ok()
}

/// The calendar day embedded in a slot identifier.
pub fn parse_slot_date(identifier: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = identifier.split('_').collect();
    if parts.len() < 3 {
        return None;
    }
    NaiveDate::parse_from_str(parts[2], "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn slot(start: NaiveDateTime, hours: u32) -> DutySlot {
        DutySlot {
            identifier: "duty_1_2025-03-01".into(),
            duty_type: DutyKind::Duty,
            start,
            duration_hours: hours,
            label: "test".into(),
        }
    }

    fn dt(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap().and_hms_opt(hour, 0, 0).unwrap()
    }

    #[test]
    fn test_identifier_format_parse_identity() {
        let day = NaiveDate::from_ymd_opt(2025, 3, 4).unwrap();
        let id = format_clinic_slot_id(12, day, 2, 3);
        assert_eq!(id, "clinic_12_2025-03-04_2");
        assert_eq!(parse_clinic_slot_id(&id), Some((12, 2)));
        assert_eq!(parse_slot_date(&id), Some(day));

        let singleton = format_clinic_slot_id(12, day, 1, 1);
        assert_eq!(singleton, "clinic_12_2025-03-04");
        assert_eq!(parse_clinic_slot_id(&singleton), Some((12, 1)));

        let duty = format_duty_slot_id(7, day, 1, 1);
        assert_eq!(duty, "duty_7_2025-03-04");
        assert_eq!(parse_duty_slot_id(&duty), Some(7));
        assert_eq!(parse_clinic_slot_id(&duty), None);
    }

    #[test]
    fn test_malformed_identifiers_rejected() {
        assert_eq!(parse_clinic_slot_id("clinic_x_2025-03-04"), None);
        assert_eq!(parse_clinic_slot_id("clinic_5"), None);
        assert_eq!(parse_duty_slot_id("cap_2025-03-04"), None);
    }

    #[test]
    fn test_extended_rest_threshold() {
        assert!(!slot(dt(1, 8), 8).requires_extended_rest());
        assert!(slot(dt(1, 16), 16).requires_extended_rest());
        assert!(slot(dt(1, 8), 24).requires_extended_rest());
    }

    #[test]
    fn test_overlap_detection() {
        let a = slot(dt(1, 8), 24);
        let b = slot(dt(2, 0), 8);
        let c = slot(dt(2, 8), 8);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        // Touching intervals do not overlap.
        assert_eq!(a.end(), c.start);
    }
}
