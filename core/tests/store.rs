//! Snapshot loading through the SQLite store.

use capacity_core::{
    error::PlannerError,
    mode::OptimizationMode,
    snapshot::{Assignment, Demand, ProposalRecord, ProposalStatus, SnapshotSource},
    store::{LeaveRow, OfficeRow, PlannerStore, ProjectRow, StaffRow, TenantRow},
};
use chrono::NaiveDate;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn tenant(store: &PlannerStore, id: &str) {
    store
        .insert_tenant(&TenantRow {
            tenant_id: id.into(),
            name: format!("Tenant {id}"),
            industry: None,
            default_currency: None,
        })
        .unwrap();
}

fn office(store: &PlannerStore, tenant_id: &str, id: &str, name: &str) {
    store
        .insert_office(
            tenant_id,
            &OfficeRow {
                office_id: id.into(),
                name: name.into(),
                country: "UK".into(),
                timezone: "Europe/London".into(),
                weekly_working_hours: 40.0,
            },
        )
        .unwrap();
}

fn staff(store: &PlannerStore, tenant_id: &str, id: &str, office_id: &str) {
    store
        .insert_staff(
            tenant_id,
            &StaffRow {
                staff_id: id.into(),
                display_name: format!("Person {id}"),
                email: format!("{id}@example.com"),
                role: "staff".into(),
                job_title: Some("Engineer".into()),
                office_id: Some(office_id.into()),
                weekly_capacity_hours: 40.0,
            },
        )
        .unwrap();
}

fn project(store: &PlannerStore, tenant_id: &str, id: &str, start: NaiveDate, end: NaiveDate, status: &str) {
    store
        .insert_project(
            tenant_id,
            &ProjectRow {
                project_id: id.into(),
                name: format!("Project {id}"),
                client_name: None,
                estimated_hours: Some(100.0),
                start_date: Some(start),
                end_date: Some(end),
                status: status.into(),
            },
        )
        .unwrap();
}

fn leave(store: &PlannerStore, tenant_id: &str, id: &str, staff_id: &str, status: &str) {
    store
        .insert_leave(
            tenant_id,
            &LeaveRow {
                leave_id: id.into(),
                staff_id: staff_id.into(),
                start_date: d(2025, 3, 11),
                end_date: d(2025, 3, 12),
                leave_type: "Annual".into(),
                status: status.into(),
            },
        )
        .unwrap();
}

fn proposal(tenant_id: &str, id: &str) -> ProposalRecord {
    ProposalRecord {
        id: id.into(),
        tenant_id: tenant_id.into(),
        name: format!("Proposal {id}"),
        client_name: Some("Client".into()),
        proposed_start_date: Some(d(2025, 3, 3)),
        proposed_end_date: Some(d(2025, 3, 28)),
        estimated_hours: Some(200.0),
        estimated_hours_per_week: Some(50.0),
        office_scope: None,
        status: ProposalStatus::Submitted,
        optimization_mode: OptimizationMode::MaxFeasibility,
    }
}

/// Two tenants. t1 has offices lon and syd with three staff, projects in
/// every interesting state, and both approved and pending leave.
fn seeded_store() -> PlannerStore {
    let store = PlannerStore::in_memory().unwrap();
    store.migrate().unwrap();

    tenant(&store, "t1");
    office(&store, "t1", "lon", "London");
    office(&store, "t1", "syd", "Sydney");
    staff(&store, "t1", "s1", "lon");
    staff(&store, "t1", "s2", "lon");
    staff(&store, "t1", "s3", "syd");

    project(&store, "t1", "active-in", d(2025, 3, 1), d(2025, 3, 31), "active");
    project(&store, "t1", "active-out", d(2025, 5, 1), d(2025, 5, 31), "active");
    project(&store, "t1", "done-in", d(2025, 3, 1), d(2025, 3, 31), "completed");
    for (project_id, staff_id) in [("active-in", "s1"), ("active-in", "s3"), ("done-in", "s2")] {
        store
            .insert_assignment(&Assignment {
                project_id: project_id.into(),
                staff_id: staff_id.into(),
                allocation_percent: 50.0,
            })
            .unwrap();
    }
    leave(&store, "t1", "l1", "s1", "approved");
    leave(&store, "t1", "l2", "s2", "pending");
    store.insert_proposal(&proposal("t1", "p1")).unwrap();

    tenant(&store, "t2");
    office(&store, "t2", "t2-office", "Elsewhere");
    staff(&store, "t2", "t2-staff", "t2-office");
    store.insert_proposal(&proposal("t2", "p2")).unwrap();

    store
}

#[test]
fn snapshot_holds_only_overlapping_active_commitments() {
    let store = seeded_store();
    let snapshot = store.load_feasibility_snapshot("t1", "p1", None).unwrap();

    assert_eq!(snapshot.staff.len(), 3);
    let project_ids: Vec<&str> = snapshot.projects.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(project_ids, vec!["active-in"]);
    assert_eq!(snapshot.assignments.len(), 2);
    assert!(snapshot.assignments.iter().all(|a| a.project_id == "active-in"));
}

#[test]
fn only_approved_leave_is_loaded() {
    let store = seeded_store();
    let snapshot = store.load_feasibility_snapshot("t1", "p1", None).unwrap();
    assert_eq!(snapshot.leave.len(), 1);
    assert_eq!(snapshot.leave[0].staff_id, "s1");
}

#[test]
fn per_week_rate_wins_over_total_hours() {
    let store = seeded_store();
    let snapshot = store.load_feasibility_snapshot("t1", "p1", None).unwrap();
    assert_eq!(snapshot.proposal.demand, Demand::HoursPerWeek(50.0));
}

#[test]
fn office_filter_limits_staff_and_their_commitments() {
    let store = seeded_store();
    let offices = vec!["syd".to_string()];
    let snapshot = store.load_feasibility_snapshot("t1", "p1", Some(offices.as_slice())).unwrap();
    assert_eq!(snapshot.staff.len(), 1);
    assert_eq!(snapshot.staff[0].id, "s3");
    assert_eq!(snapshot.staff[0].office_name.as_deref(), Some("Sydney"));
    assert_eq!(snapshot.assignments.len(), 1);
    assert!(snapshot.leave.is_empty());
}

#[test]
fn empty_office_filter_means_every_office() {
    let store = seeded_store();
    let none: Vec<String> = Vec::new();
    let snapshot = store.load_feasibility_snapshot("t1", "p1", Some(none.as_slice())).unwrap();
    assert_eq!(snapshot.staff.len(), 3);
}

#[test]
fn other_tenants_proposals_are_not_found() {
    let store = seeded_store();
    let err = store.load_feasibility_snapshot("t1", "p2", None).unwrap_err();
    assert!(matches!(err, PlannerError::NotFound { ref proposal_id } if proposal_id == "p2"));

    let err = store.load_feasibility_snapshot("t1", "missing", None).unwrap_err();
    assert!(matches!(err, PlannerError::NotFound { .. }));
}

#[test]
fn tenants_never_see_each_others_staff() {
    let store = seeded_store();
    let snapshot = store.load_feasibility_snapshot("t2", "p2", None).unwrap();
    assert_eq!(snapshot.staff.len(), 1);
    assert_eq!(snapshot.staff[0].id, "t2-staff");
    assert!(snapshot.projects.is_empty());
}

#[test]
fn proposal_without_dates_is_invalid() {
    let store = seeded_store();
    let mut p = proposal("t1", "undated");
    p.status = ProposalStatus::Draft;
    p.proposed_end_date = None;
    store.insert_proposal(&p).unwrap();

    let err = store.load_feasibility_snapshot("t1", "undated", None).unwrap_err();
    assert!(matches!(err, PlannerError::InvalidProposal { .. }));
}

#[test]
fn proposal_ending_before_it_starts_is_invalid() {
    let store = seeded_store();
    let mut p = proposal("t1", "backwards");
    p.proposed_start_date = Some(d(2025, 4, 1));
    p.proposed_end_date = Some(d(2025, 3, 1));
    store.insert_proposal(&p).unwrap();

    let err = store.load_feasibility_snapshot("t1", "backwards", None).unwrap_err();
    assert!(matches!(err, PlannerError::InvalidProposal { .. }));
}

#[test]
fn proposal_without_a_usable_estimate_is_rejected() {
    let store = seeded_store();
    let mut p = proposal("t1", "no-hours");
    p.estimated_hours = Some(0.0);
    p.estimated_hours_per_week = None;
    store.insert_proposal(&p).unwrap();

    let err = store.load_feasibility_snapshot("t1", "no-hours", None).unwrap_err();
    assert!(matches!(err, PlannerError::MissingEstimate { .. }));
}

#[test]
fn office_with_no_staff_is_an_error() {
    let store = seeded_store();
    office(&store, "t1", "empty", "Empty Office");
    let offices = vec!["empty".to_string()];
    let err = store.load_feasibility_snapshot("t1", "p1", Some(offices.as_slice())).unwrap_err();
    assert!(matches!(err, PlannerError::NoStaffInScope));
}

#[test]
fn stored_scope_and_mode_round_trip() {
    let store = seeded_store();
    let mut p = proposal("t1", "scoped");
    p.office_scope = Some(vec!["lon".into()]);
    p.optimization_mode = OptimizationMode::SingleOfficePreferred;
    store.insert_proposal(&p).unwrap();

    let loaded = store.proposal("t1", "scoped").unwrap().unwrap();
    assert_eq!(loaded, p);
    assert!(store.proposal("t2", "scoped").unwrap().is_none());
}

#[test]
fn snapshot_for_record_needs_no_stored_proposal_row() {
    let store = seeded_store();
    let stored = store.load_feasibility_snapshot("t1", "p1", None).unwrap();
    assert_eq!(store.snapshot_for_record(&proposal("t1", "p1"), None).unwrap(), stored);

    // Never inserted: the snapshot comes from the record alone.
    let unsaved = proposal("t1", "p1-unsaved");
    assert!(store.proposal("t1", &unsaved.id).unwrap().is_none());
    let built = store.snapshot_for_record(&unsaved, None).unwrap();
    assert_eq!(built.proposal.proposal_id, "p1-unsaved");
    assert_eq!(built.staff, stored.staff);
    assert_eq!(built.leave, stored.leave);
}

#[test]
fn file_store_opens_and_migrates_more_than_once() {
    let path = std::env::temp_dir().join(format!("capacity-store-{}.db", std::process::id()));
    let _ = std::fs::remove_file(&path);
    let path_str = path.to_str().unwrap();

    let store = PlannerStore::open(path_str).unwrap();
    store.migrate().unwrap();
    tenant(&store, "t1");
    office(&store, "t1", "lon", "London");
    drop(store);

    let store = PlannerStore::open(path_str).unwrap();
    store.migrate().unwrap();
    assert_eq!(store.offices("t1").unwrap().len(), 1);
    drop(store);
    let _ = std::fs::remove_file(&path);
}
