use capacity_core::{
    config::PlannerConfig,
    mode::OptimizationMode,
    reporter::{compute_feasibility, FeasibilityReporter, FeasibilityVerdict},
    simulator::SimulationParams,
    snapshot::{CapacitySnapshot, Demand, ProposalTerms, StaffMember},
};
use chrono::NaiveDate;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn member(id: &str, office: &str, hours: f64) -> StaffMember {
    StaffMember {
        id: id.into(),
        label: format!("Staff {id}"),
        job_title: None,
        office_id: Some(office.into()),
        office_name: Some(office.to_uppercase()),
        weekly_capacity_hours: hours,
    }
}

/// Thu 2025-03-06 to Wed 2025-03-19: 2 + 5 + 3 working days.
fn snapshot(demand: Demand) -> CapacitySnapshot {
    CapacitySnapshot {
        tenant_id: "t1".into(),
        proposal: ProposalTerms {
            proposal_id: "p1".into(),
            name: "Depot Survey".into(),
            start: d(2025, 3, 6),
            end: d(2025, 3, 19),
            demand,
        },
        staff: vec![
            member("s1", "lon", 40.0),
            member("s2", "lon", 30.0),
            member("s3", "syd", 37.5),
        ],
        projects: Vec::new(),
        assignments: Vec::new(),
        leave: Vec::new(),
    }
}

#[test]
fn per_week_rate_totals_the_rounded_weekly_values() {
    let result = compute_feasibility(
        &snapshot(Demand::HoursPerWeek(33.3)),
        OptimizationMode::MaxFeasibility,
        false,
        120,
        false,
    )
    .unwrap();
    assert_eq!(result.weeks.len(), 3);
    let weekly: f64 = result.weeks.iter().map(|w| w.required_hours).sum();
    assert!((result.total_required - weekly).abs() < 1e-9);
    assert_eq!(result.weeks[0].required_hours, 13.3);
    assert_eq!(result.feasibility_percent, 100.0);
    assert_eq!(result.verdict, FeasibilityVerdict::FullyFeasible);
}

#[test]
fn total_hours_estimate_is_reported_as_given() {
    let result = compute_feasibility(
        &snapshot(Demand::TotalHours(100.0)),
        OptimizationMode::MaxFeasibility,
        false,
        120,
        false,
    )
    .unwrap();
    assert_eq!(result.total_required, 100.0);
    assert!(result.total_achievable <= result.total_required);
    assert_eq!(result.weeks[1].required_hours, 50.0);
}

#[test]
fn shortfall_lowers_the_verdict_and_explains_itself() {
    // Capacity is 107.5h per full week; ask for three times that.
    let result = compute_feasibility(
        &snapshot(Demand::HoursPerWeek(330.0)),
        OptimizationMode::MaxFeasibility,
        false,
        120,
        false,
    )
    .unwrap();
    assert!(result.feasibility_percent < 50.0);
    assert_eq!(result.verdict, FeasibilityVerdict::InsufficientCapacity);
    assert!(result.insight.contains("Shortfall of"), "{}", result.insight);
    assert!(result.worst_week_percent.unwrap() < 50.0);
}

#[test]
fn sufficient_capacity_insight() {
    let result = compute_feasibility(
        &snapshot(Demand::HoursPerWeek(20.0)),
        OptimizationMode::MaxFeasibility,
        false,
        120,
        false,
    )
    .unwrap();
    assert!(result
        .insight
        .starts_with("Staff have sufficient capacity to absorb this project."));
    assert_eq!(result.worst_week_percent, Some(100.0));
}

#[test]
fn recommended_staff_are_sorted_by_hours() {
    let result = compute_feasibility(
        &snapshot(Demand::HoursPerWeek(60.0)),
        OptimizationMode::MaxFeasibility,
        false,
        120,
        false,
    )
    .unwrap();
    assert_eq!(result.staff_used_count, result.recommended_staff.len());
    assert!(result
        .recommended_staff
        .windows(2)
        .all(|pair| pair[0].total_hours >= pair[1].total_hours));
    assert_eq!(result.recommended_staff[0].staff_id, "s1");
    assert_eq!(result.staff_in_scope, 3);
    assert_eq!(result.office_names, vec!["LON".to_string(), "SYD".to_string()]);
}

#[test]
fn comparisons_skip_the_primary_mode() {
    let result = compute_feasibility(
        &snapshot(Demand::HoursPerWeek(60.0)),
        OptimizationMode::MaxFeasibility,
        false,
        120,
        true,
    )
    .unwrap();
    let rows = result.comparisons.unwrap();
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| r.mode != OptimizationMode::MaxFeasibility));

    let result = compute_feasibility(
        &snapshot(Demand::HoursPerWeek(60.0)),
        OptimizationMode::MultiOfficeBalanced,
        false,
        120,
        true,
    )
    .unwrap();
    assert_eq!(result.comparisons.unwrap().len(), 4);
}

#[test]
fn comparisons_are_absent_unless_requested() {
    let config = PlannerConfig::default_test();
    let result = FeasibilityReporter::new(&config)
        .report(&snapshot(Demand::HoursPerWeek(60.0)), config.default_params(), false)
        .unwrap();
    assert!(result.comparisons.is_none());
}

#[test]
fn cap_outside_range_is_clamped_in_the_report() {
    let config = PlannerConfig::default_test();
    let params = SimulationParams {
        mode: OptimizationMode::MinOverallocation,
        allow_overallocation: true,
        overallocation_cap_percent: 400,
    };
    let result = FeasibilityReporter::new(&config)
        .report(&snapshot(Demand::HoursPerWeek(60.0)), params, false)
        .unwrap();
    assert_eq!(result.overallocation_cap_percent, 200);
}

#[test]
fn fully_covered_total_hours_proposal_is_one_hundred_percent() {
    // 100h over three full weeks splits into 33.3h a week after rounding.
    let mut s = snapshot(Demand::TotalHours(100.0));
    s.proposal.start = d(2025, 3, 3);
    s.proposal.end = d(2025, 3, 21);
    s.staff.truncate(1);
    let result = compute_feasibility(&s, OptimizationMode::MaxFeasibility, false, 120, false).unwrap();
    assert!(result.weeks.iter().all(|w| w.required_hours == 33.3));
    assert_eq!(result.total_required, 100.0);
    assert_eq!(result.total_achievable, 100.0);
    assert_eq!(result.feasibility_percent, 100.0);
}
