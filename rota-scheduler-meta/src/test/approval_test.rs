use crate::meta_schedule::approve_plan;
use crate::platform::Platform;
use crate::test::setup_for_tests;
use rota_scheduler_core::platform::PlatformTrait;
use rota_scheduler_core::scheduler::planning::PlanType;
use rota_scheduler_db::example::EXAMPLE_UNIT_ID;

#[test]
fn test_approve_clinic_plan_stores_history_rows() {
    let (session, config) = setup_for_tests(true);
    let mut platform = Platform::from_database(session, EXAMPLE_UNIT_ID, config);

    let plan = approve_plan(&mut platform, 2025, 3, PlanType::Clinic).unwrap();
    let stored = platform.list_assignment_history(Some("2025-03")).unwrap();

    // Only clinic slots become rows; the Triyaj mesa duty is not persisted.
    assert_eq!(stored.len(), 21 * 3);
    assert!(stored.iter().all(|row| row.clinic_id.is_some()));
    assert!(stored.iter().all(|row| row.plan_period == plan.plan_period));
}

#[test]
fn test_approve_both_plan_kinds_keeps_them_orthogonal() {
    let (session, config) = setup_for_tests(true);
    let mut platform = Platform::from_database(session, EXAMPLE_UNIT_ID, config);

    approve_plan(&mut platform, 2025, 3, PlanType::Clinic).unwrap();
    approve_plan(&mut platform, 2025, 3, PlanType::Nobet).unwrap();

    let stored = platform.list_assignment_history(Some("2025-03")).unwrap();
    let clinic_rows = stored.iter().filter(|row| row.clinic_id.is_some()).count();
    let night_rows = stored.iter().filter(|row| row.clinic_id.is_none()).count();
    assert_eq!(clinic_rows, 21 * 3);
    // 31 cap days + 31 night duties.
    assert_eq!(night_rows, 62);

    // Re-approving the clinic plan replaces clinic rows but never the night rows.
    approve_plan(&mut platform, 2025, 3, PlanType::Clinic).unwrap();
    let stored = platform.list_assignment_history(Some("2025-03")).unwrap();
    assert_eq!(stored.iter().filter(|row| row.clinic_id.is_none()).count(), 62);
    assert_eq!(stored.len(), 21 * 3 + 62);
}

#[test]
fn test_approved_history_feeds_next_month_weekend_counts() {
    let (session, config) = setup_for_tests(true);
    let mut platform = Platform::from_database(session, EXAMPLE_UNIT_ID, config);

    approve_plan(&mut platform, 2025, 3, PlanType::Nobet).unwrap();

    let history = rota_scheduler_core::scheduler::history::weekend_history_counts(&platform, 2025, 4).unwrap();
    // March 2025 has 10 weekend days, each producing one cap and one night
    // weekend row.
    let total: u32 = history.values().sum();
    assert_eq!(total, 20);
}
