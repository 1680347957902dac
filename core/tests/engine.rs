use capacity_core::{
    engine::{FeasibilityRequest, PlannerEngine},
    error::PlannerError,
    mode::OptimizationMode,
    reporter::FeasibilityVerdict,
};

#[test]
fn demo_rate_proposal_analyses_end_to_end() {
    let (engine, demo) = PlannerEngine::build_test(42).unwrap();
    let result = engine
        .analyse(&FeasibilityRequest::new(&demo.tenant_id, &demo.rate_proposal_id))
        .unwrap();

    assert_eq!(result.proposal_id, demo.rate_proposal_id);
    assert_eq!(result.mode, OptimizationMode::MaxFeasibility);
    assert_eq!(result.staff_in_scope, 20);
    assert_eq!(result.office_names.len(), 3);
    // Wed 2025-02-19 through Fri 2025-05-30.
    assert_eq!(result.weeks.len(), 15);
    assert_eq!(result.weeks[0].working_days, 3);
    assert!(result.total_achievable <= result.total_required);
    assert!(result.feasibility_percent > 0.0 && result.feasibility_percent <= 100.0);
    assert!(!result.insight.is_empty());
    assert!(result.comparisons.is_none());
}

#[test]
fn total_hours_proposal_reports_its_estimate() {
    let (engine, demo) = PlannerEngine::build_test(42).unwrap();
    let result = engine
        .analyse(&FeasibilityRequest::new(&demo.tenant_id, &demo.total_proposal_id))
        .unwrap();
    assert_eq!(result.total_required, 900.0);
}

#[test]
fn office_override_replaces_the_stored_scope() {
    let (engine, demo) = PlannerEngine::build_test(42).unwrap();
    let mut request = FeasibilityRequest::new(&demo.tenant_id, &demo.total_proposal_id);
    request.office_ids = Some(vec![demo.office_ids[1].clone()]);
    let result = engine.analyse(&request).unwrap();
    assert_eq!(result.office_names, vec!["Singapore Office".to_string()]);
}

#[test]
fn overallocation_never_lowers_feasibility() {
    let (engine, demo) = PlannerEngine::build_test(42).unwrap();
    let mut request = FeasibilityRequest::new(&demo.tenant_id, &demo.rate_proposal_id);
    let strict = engine.analyse(&request).unwrap();

    request.allow_overallocation = Some(true);
    request.overallocation_cap_percent = Some(150);
    let relaxed = engine.analyse(&request).unwrap();
    assert!(relaxed.total_achievable >= strict.total_achievable);
    assert!(relaxed.allow_overallocation);
}

#[test]
fn comparisons_cover_the_other_modes() {
    let (engine, demo) = PlannerEngine::build_test(42).unwrap();
    let mut request = FeasibilityRequest::new(&demo.tenant_id, &demo.rate_proposal_id);
    request.include_comparisons = true;
    let result = engine.analyse(&request).unwrap();
    let rows = result.comparisons.unwrap();
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| r.mode != result.mode));
}

#[test]
fn undated_proposal_is_rejected() {
    let (engine, demo) = PlannerEngine::build_test(42).unwrap();
    let err = engine
        .analyse(&FeasibilityRequest::new(&demo.tenant_id, &demo.undated_proposal_id))
        .unwrap_err();
    assert!(matches!(err, PlannerError::InvalidProposal { .. }));
}

#[test]
fn unknown_proposal_and_foreign_tenant_are_not_found() {
    let (engine, demo) = PlannerEngine::build_test(42).unwrap();
    let err = engine
        .analyse(&FeasibilityRequest::new(&demo.tenant_id, "no-such-proposal"))
        .unwrap_err();
    assert!(matches!(err, PlannerError::NotFound { .. }));

    let err = engine
        .analyse(&FeasibilityRequest::new("another-tenant", &demo.rate_proposal_id))
        .unwrap_err();
    assert!(matches!(err, PlannerError::NotFound { .. }));
}

#[test]
fn demo_proposals_are_listed() {
    let (engine, demo) = PlannerEngine::build_test(42).unwrap();
    let names: Vec<String> = engine
        .proposals(&demo.tenant_id)
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names, vec!["Campus Masterplan", "Harbour Tunnel Bid", "Wind Farm EOI"]);
}

#[test]
fn request_deserializes_with_defaults() {
    let request: FeasibilityRequest =
        serde_json::from_str(r#"{ "tenant_id": "t1", "proposal_id": "p1", "mode": "min_overallocation" }"#)
            .unwrap();
    assert_eq!(request.mode, Some(OptimizationMode::MinOverallocation));
    assert!(request.office_ids.is_none());
    assert!(!request.include_comparisons);
}

#[test]
fn verdict_matches_the_percent() {
    let (engine, demo) = PlannerEngine::build_test(42).unwrap();
    let result = engine
        .analyse(&FeasibilityRequest::new(&demo.tenant_id, &demo.rate_proposal_id))
        .unwrap();
    let expected = if result.feasibility_percent >= 90.0 {
        FeasibilityVerdict::FullyFeasible
    } else if result.feasibility_percent >= 50.0 {
        FeasibilityVerdict::PartiallyFeasible
    } else {
        FeasibilityVerdict::InsufficientCapacity
    };
    assert_eq!(result.verdict, expected);
}
