//! Deterministic demo tenant.
//!
//! Populates a store with an engineering consultancy: three offices,
//! twenty staff, five active projects plus one completed one, existing
//! assignments, leave, and three proposals. The same seed always yields
//! the same ids, names and leave.

use crate::{
    error::PlannerResult,
    mode::OptimizationMode,
    name_generator::NameGenerator,
    rng::{DemoSlot, RngBank},
    snapshot::{Assignment, ProposalRecord, ProposalStatus},
    store::{LeaveRow, OfficeRow, PlannerStore, ProjectRow, StaffRow, TenantRow},
    types::{OfficeId, ProjectId, ProposalId, StaffId, TenantId},
};
use chrono::{Duration, NaiveDate};

const EMAIL_DOMAIN: &str = "acme.example";

/// Ids of everything the seeder created, for tests and the runner.
#[derive(Debug, Clone, PartialEq)]
pub struct DemoTenant {
    pub tenant_id: TenantId,
    pub office_ids: Vec<OfficeId>,
    pub staff_ids: Vec<StaffId>,
    pub project_ids: Vec<ProjectId>,
    /// Per-week rate, all offices.
    pub rate_proposal_id: ProposalId,
    /// Total-hours estimate, scoped to two offices, balanced mode.
    pub total_proposal_id: ProposalId,
    /// Draft without dates; feasibility analysis rejects it.
    pub undated_proposal_id: ProposalId,
}

struct StaffTemplate {
    role: &'static str,
    office: usize,
    title: &'static str,
    capacity: f64,
}

const fn tpl(role: &'static str, office: usize, title: &'static str, capacity: f64) -> StaffTemplate {
    StaffTemplate {
        role,
        office,
        title,
        capacity,
    }
}

const CORE_STAFF: [StaffTemplate; 12] = [
    tpl("administrator", 0, "CEO", 40.0),
    tpl("manager", 0, "Director", 40.0),
    tpl("manager", 0, "Project Manager", 40.0),
    tpl("staff", 0, "Senior Engineer", 40.0),
    tpl("staff", 0, "Engineer", 40.0),
    tpl("staff", 0, "Engineer", 40.0),
    tpl("staff", 1, "Engineer", 40.0),
    tpl("staff", 1, "Engineer", 40.0),
    tpl("staff", 1, "Graduate Engineer", 40.0),
    tpl("staff", 2, "Engineer", 37.5),
    tpl("staff", 2, "Engineer", 37.5),
    tpl("staff", 0, "Consultant", 20.0),
];
const EXTRA_ENGINEERS: usize = 8;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    // Literal calendar dates below are all valid.
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN)
}

/// Seed the demo tenant into an already-migrated store.
pub fn seed_demo_tenant(store: &PlannerStore, seed: u64) -> PlannerResult<DemoTenant> {
    let bank = RngBank::new(seed);

    // ── Tenant and offices ────────────────────────────────────────
    let tenant_id = bank.for_slot(DemoSlot::Tenant).next_uuid().to_string();
    store.insert_tenant(&TenantRow {
        tenant_id: tenant_id.clone(),
        name: "Acme Engineering Consultants".into(),
        industry: Some("Engineering".into()),
        default_currency: Some("USD".into()),
    })?;

    let mut office_rng = bank.for_slot(DemoSlot::Office);
    let offices = [
        ("London HQ", "UK", "Europe/London", 40.0),
        ("Singapore Office", "Singapore", "Asia/Singapore", 40.0),
        ("Sydney Office", "Australia", "Australia/Sydney", 37.5),
    ];
    let mut office_ids = Vec::with_capacity(offices.len());
    for (name, country, timezone, hours) in offices {
        let office_id = office_rng.next_uuid().to_string();
        store.insert_office(
            &tenant_id,
            &OfficeRow {
                office_id: office_id.clone(),
                name: name.into(),
                country: country.into(),
                timezone: timezone.into(),
                weekly_working_hours: hours,
            },
        )?;
        office_ids.push(office_id);
    }

    // ── Staff ─────────────────────────────────────────────────────
    let mut staff_rng = bank.for_slot(DemoSlot::Staff);
    let extras = (0..EXTRA_ENGINEERS).map(|i| tpl("staff", i % 3, "Engineer", 40.0));
    let templates: Vec<StaffTemplate> = CORE_STAFF.into_iter().chain(extras).collect();
    let mut staff_ids = Vec::with_capacity(templates.len());
    for (i, t) in templates.iter().enumerate() {
        let staff_id = staff_rng.next_uuid().to_string();
        let display_name = NameGenerator::generate_full_name(&mut staff_rng);
        store.insert_staff(
            &tenant_id,
            &StaffRow {
                staff_id: staff_id.clone(),
                email: NameGenerator::email_for(&display_name, EMAIL_DOMAIN, i),
                display_name,
                role: t.role.into(),
                job_title: Some(t.title.into()),
                office_id: Some(office_ids[t.office].clone()),
                weekly_capacity_hours: t.capacity,
            },
        )?;
        staff_ids.push(staff_id);
    }

    // ── Projects ──────────────────────────────────────────────────
    let mut project_rng = bank.for_slot(DemoSlot::Project);
    let projects = [
        ("Bridge Design Phase 1", "City Council", 400.0, date(2025, 1, 1), date(2025, 6, 30), "active"),
        ("HVAC Retrofit Study", "Property Corp", 120.0, date(2025, 2, 1), date(2025, 4, 30), "active"),
        ("Structural Assessment", "Insurance Co", 80.0, date(2025, 1, 15), date(2025, 3, 15), "active"),
        ("MEP Design Package", "Developer Ltd", 600.0, date(2024, 11, 1), date(2025, 8, 31), "active"),
        ("Feasibility Study", "New Client Inc", 50.0, date(2025, 2, 10), date(2025, 3, 10), "active"),
        ("Archive Digitisation", "City Council", 90.0, date(2025, 1, 6), date(2025, 12, 19), "completed"),
    ];
    let mut project_ids = Vec::with_capacity(projects.len());
    for (name, client, hours, start, end, status) in projects {
        let project_id = project_rng.next_uuid().to_string();
        store.insert_project(
            &tenant_id,
            &ProjectRow {
                project_id: project_id.clone(),
                name: name.into(),
                client_name: Some(client.into()),
                estimated_hours: Some(hours),
                start_date: Some(start),
                end_date: Some(end),
                status: status.into(),
            },
        )?;
        project_ids.push(project_id);
    }

    // ── Assignments ───────────────────────────────────────────────
    // The first twelve staff sit on one active project at 50%; the first
    // five carry a second one too. The completed project keeps a stale
    // assignment that must never count.
    let mut assignment_rng = bank.for_slot(DemoSlot::Assignment);
    let active = 5;
    for (i, staff_id) in staff_ids.iter().take(12).enumerate() {
        store.insert_assignment(&Assignment {
            project_id: project_ids[i % active].clone(),
            staff_id: staff_id.clone(),
            allocation_percent: 50.0,
        })?;
        if i < 5 {
            store.insert_assignment(&Assignment {
                project_id: project_ids[(i + 1) % active].clone(),
                staff_id: staff_id.clone(),
                allocation_percent: 50.0,
            })?;
        }
    }
    let stale = assignment_rng.pick(&staff_ids[12..]).clone();
    store.insert_assignment(&Assignment {
        project_id: project_ids[active].clone(),
        staff_id: stale,
        allocation_percent: 100.0,
    })?;

    // ── Leave ─────────────────────────────────────────────────────
    let mut leave_rng = bank.for_slot(DemoSlot::Leave);
    let fixed_leave = [
        (3, date(2025, 3, 1), date(2025, 3, 5), "Annual", "approved"),
        (5, date(2025, 3, 10), date(2025, 3, 12), "Sick", "approved"),
        (7, date(2025, 4, 1), date(2025, 4, 14), "Annual", "approved"),
        (9, date(2025, 3, 17), date(2025, 3, 21), "Annual", "pending"),
    ];
    for (staff, start, end, leave_type, status) in fixed_leave {
        store.insert_leave(
            &tenant_id,
            &LeaveRow {
                leave_id: leave_rng.next_uuid().to_string(),
                staff_id: staff_ids[staff].clone(),
                start_date: start,
                end_date: end,
                leave_type: leave_type.into(),
                status: status.into(),
            },
        )?;
    }
    // Random short breaks for the later hires, somewhere in Mar–May 2025.
    for staff_id in &staff_ids[12..] {
        if !leave_rng.chance(0.4) {
            continue;
        }
        let start = date(2025, 3, 3) + Duration::days(leave_rng.next_u64_below(84) as i64);
        let end = start + Duration::days(leave_rng.next_u64_below(5) as i64);
        store.insert_leave(
            &tenant_id,
            &LeaveRow {
                leave_id: leave_rng.next_uuid().to_string(),
                staff_id: staff_id.clone(),
                start_date: start,
                end_date: end,
                leave_type: "Annual".into(),
                status: "approved".into(),
            },
        )?;
    }

    // ── Proposals ─────────────────────────────────────────────────
    let mut proposal_rng = bank.for_slot(DemoSlot::Proposal);
    let rate_proposal_id = proposal_rng.next_uuid().to_string();
    store.insert_proposal(&ProposalRecord {
        id: rate_proposal_id.clone(),
        tenant_id: tenant_id.clone(),
        name: "Harbour Tunnel Bid".into(),
        client_name: Some("Port Authority".into()),
        proposed_start_date: Some(date(2025, 2, 19)),
        proposed_end_date: Some(date(2025, 5, 30)),
        estimated_hours: None,
        estimated_hours_per_week: Some(160.0),
        office_scope: None,
        status: ProposalStatus::Submitted,
        optimization_mode: OptimizationMode::MaxFeasibility,
    })?;

    let total_proposal_id = proposal_rng.next_uuid().to_string();
    store.insert_proposal(&ProposalRecord {
        id: total_proposal_id.clone(),
        tenant_id: tenant_id.clone(),
        name: "Campus Masterplan".into(),
        client_name: Some("State University".into()),
        proposed_start_date: Some(date(2025, 3, 5)),
        proposed_end_date: Some(date(2025, 4, 18)),
        estimated_hours: Some(900.0),
        estimated_hours_per_week: None,
        office_scope: Some(vec![office_ids[0].clone(), office_ids[2].clone()]),
        status: ProposalStatus::Draft,
        optimization_mode: OptimizationMode::MultiOfficeBalanced,
    })?;

    let undated_proposal_id = proposal_rng.next_uuid().to_string();
    store.insert_proposal(&ProposalRecord {
        id: undated_proposal_id.clone(),
        tenant_id: tenant_id.clone(),
        name: "Wind Farm EOI".into(),
        client_name: None,
        proposed_start_date: None,
        proposed_end_date: None,
        estimated_hours: Some(300.0),
        estimated_hours_per_week: None,
        office_scope: None,
        status: ProposalStatus::Draft,
        optimization_mode: OptimizationMode::MaxFeasibility,
    })?;

    log::info!(
        "seeded demo tenant {tenant_id}: {} offices, {} staff, {} projects",
        office_ids.len(),
        staff_ids.len(),
        project_ids.len()
    );

    Ok(DemoTenant {
        tenant_id,
        office_ids,
        staff_ids,
        project_ids,
        rate_proposal_id,
        total_proposal_id,
        undated_proposal_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(seed: u64) -> (PlannerStore, DemoTenant) {
        let store = PlannerStore::in_memory().unwrap();
        store.migrate().unwrap();
        let demo = seed_demo_tenant(&store, seed).unwrap();
        (store, demo)
    }

    #[test]
    fn same_seed_yields_same_ids() {
        let (_, a) = seeded(42);
        let (_, b) = seeded(42);
        assert_eq!(a, b);
    }

    #[test]
    fn different_seeds_yield_different_ids() {
        let (_, a) = seeded(42);
        let (_, b) = seeded(43);
        assert_ne!(a.tenant_id, b.tenant_id);
    }

    #[test]
    fn demo_tenant_has_expected_shape() {
        let (store, demo) = seeded(7);
        assert_eq!(demo.office_ids.len(), 3);
        assert_eq!(demo.staff_ids.len(), 20);
        assert_eq!(store.offices(&demo.tenant_id).unwrap().len(), 3);
        assert_eq!(store.proposals(&demo.tenant_id).unwrap().len(), 3);
    }
}
