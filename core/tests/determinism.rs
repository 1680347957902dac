//! THE MOST IMPORTANT TEST IN THE PROJECT.
//!
//! Same snapshot, same parameters: byte-identical reports.
//! Same demo seed: identical tenants and identical analyses.
//! Any divergence is a blocker. Do not merge until fixed.

use capacity_core::{
    engine::{FeasibilityRequest, PlannerEngine},
    mode::OptimizationMode,
    reporter::compute_feasibility,
    snapshot::SnapshotSource,
};

const SEED: u64 = 0xDEAD_BEEF_CAFE_1234;

#[test]
fn same_snapshot_produces_identical_reports() {
    let (engine, demo) = PlannerEngine::build_test(SEED).expect("demo engine");
    let snapshot = engine
        .store()
        .load_feasibility_snapshot(&demo.tenant_id, &demo.rate_proposal_id, None)
        .expect("snapshot");

    for mode in OptimizationMode::ALL {
        let a = compute_feasibility(&snapshot, mode, true, 130, true).expect("run a");
        let b = compute_feasibility(&snapshot, mode, true, 130, true).expect("run b");
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap(),
            "{mode} diverged between runs"
        );
    }
}

#[test]
fn same_seed_produces_identical_analyses() {
    let (engine_a, demo_a) = PlannerEngine::build_test(SEED).expect("engine a");
    let (engine_b, demo_b) = PlannerEngine::build_test(SEED).expect("engine b");
    assert_eq!(demo_a, demo_b, "demo tenants differ for the same seed");

    for proposal_id in [&demo_a.rate_proposal_id, &demo_a.total_proposal_id] {
        let mut request = FeasibilityRequest::new(&demo_a.tenant_id, proposal_id);
        request.include_comparisons = true;
        let a = engine_a.analyse(&request).expect("analyse a");
        let b = engine_b.analyse(&request).expect("analyse b");
        assert_eq!(a, b, "analysis of {proposal_id} diverged");
    }
}

#[test]
fn snapshot_survives_a_json_round_trip_unchanged() {
    let (engine, demo) = PlannerEngine::build_test(SEED).expect("demo engine");
    let snapshot = engine
        .store()
        .load_feasibility_snapshot(&demo.tenant_id, &demo.total_proposal_id, None)
        .expect("snapshot");
    let json = serde_json::to_string(&snapshot).unwrap();
    let restored = serde_json::from_str(&json).unwrap();

    let a = compute_feasibility(&snapshot, OptimizationMode::MultiOfficeBalanced, false, 120, false).unwrap();
    let b = compute_feasibility(&restored, OptimizationMode::MultiOfficeBalanced, false, 120, false).unwrap();
    assert_eq!(a, b);
}
