use crate::platform::Platform;
use crate::test::setup_for_tests;
use rota_scheduler_core::platform::PlatformTrait;
use rota_scheduler_core::scheduler::PlanError;
use rota_scheduler_core::scheduler::planning::{PlanLoads, PlanType, compute_plan};
use rota_scheduler_db::example::EXAMPLE_UNIT_ID;

#[test]
fn test_seeded_unit_round_trips_through_queries() {
    let (session, config) = setup_for_tests(true);
    let platform = Platform::from_database(session, EXAMPLE_UNIT_ID, config);

    let staff = platform.list_staff().unwrap();
    assert_eq!(staff.len(), 7);
    assert!(staff.windows(2).all(|pair| pair[0].id < pair[1].id));

    let clinics = platform.list_clinics().unwrap();
    assert_eq!(clinics.len(), 2);
    assert_eq!(clinics[0].name, "Dermatoloji");
    assert_eq!(clinics[0].display_order, Some(1));

    let rules = platform.list_clinic_seniority_rules().unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].clinic_id, 2);
    assert_eq!(rules[0].required_count, 2);

    let duty_types = platform.list_duty_types().unwrap();
    assert_eq!(duty_types.len(), 3);
    assert!(duty_types.iter().any(|duty| duty.is_cap()));

    let leave = platform.list_leave_requests().unwrap();
    assert_eq!(leave.len(), 1);
    assert_eq!(leave[0].staff_id, 4);
}

#[test]
fn test_clinic_plan_from_database() {
    let (session, config) = setup_for_tests(true);
    let platform = Platform::from_database(session, EXAMPLE_UNIT_ID, config);

    let plan = compute_plan(&platform, 2025, 3, PlanType::Clinic).unwrap();
    assert_eq!(plan.plan_period, "2025-03");
    // 21 working days: Derm (1) + Kardiyoloji (2) + Triyaj mesa duty (1).
    assert_eq!(plan.assignments.len(), 21 * 4);
    assert!(plan.assignments.iter().all(|a| a.person.is_some()));

    // Dr. Ceylan (staff_4) is on leave 2025-03-10..14 and must hold nothing
    // in that window.
    for assignment in &plan.assignments {
        let day = assignment.start.date().format("%Y-%m-%d").to_string();
        if ("2025-03-10".."2025-03-15").contains(&day.as_str()) {
            assert_ne!(assignment.person.as_ref().unwrap().identifier, "staff_4");
        }
    }
}

#[test]
fn test_nobet_plan_from_database() {
    let (session, config) = setup_for_tests(true);
    let platform = Platform::from_database(session, EXAMPLE_UNIT_ID, config);

    let plan = compute_plan(&platform, 2025, 3, PlanType::Nobet).unwrap();
    // Cap every day plus one night duty every day.
    assert_eq!(plan.assignments.len(), 62);
    let PlanLoads::Nobet { cap, night } = &plan.loads else {
        panic!("expected nobet loads");
    };
    // Both specialists rotate; only residents carry night duties.
    assert!(cap.iter().all(|load| load.assigned_days > 0));
    assert_eq!(night.iter().map(|load| load.assigned_slots).sum::<u32>(), 31);
}

#[test]
fn test_empty_unit_has_no_staff() {
    let (session, config) = setup_for_tests(false);
    let platform = Platform::from_database(session, EXAMPLE_UNIT_ID, config);
    assert!(matches!(compute_plan(&platform, 2025, 3, PlanType::Clinic), Err(PlanError::NoStaff)));
}

#[test]
fn test_other_units_are_invisible() {
    let (session, config) = setup_for_tests(true);
    let platform = Platform::from_database(session, 99, config);
    assert!(platform.list_staff().unwrap().is_empty());
    assert!(platform.list_clinics().unwrap().is_empty());
    assert!(platform.list_leave_requests().unwrap().is_empty());
}
