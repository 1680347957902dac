//! SQLite persistence layer.
//!
//! RULE: Only store/ talks to the database.
//! The planner reads one snapshot per request
//! and never writes. The insert helpers exist for seeding and tests.

use crate::{
    error::{PlannerError, PlannerResult},
    snapshot::{CapacitySnapshot, ProposalRecord, ProposalTerms, SnapshotSource},
    types::OfficeId,
};
use rusqlite::{Connection, ToSql};

mod commitments;
mod directory;
mod proposal;

pub use commitments::{LeaveRow, ProjectRow};
pub use directory::{OfficeRow, StaffRow, TenantRow};

pub struct PlannerStore {
    conn: Connection,
}

impl PlannerStore {
    pub fn open(path: &str) -> PlannerResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (shared-memory and :memory: ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> PlannerResult<Self> {
        let conn = Connection::open(":memory:")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> PlannerResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_foundation.sql"))?;
        Ok(())
    }
}

/// `?first, ?first+1, ...` for a dynamic `IN (...)` list.
fn placeholders(first: usize, count: usize) -> String {
    (first..first + count)
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Bind a leading set of fixed parameters followed by a list of ids.
fn bind_list<'a>(fixed: &[&'a dyn ToSql], ids: &'a [String]) -> Vec<&'a dyn ToSql> {
    let mut values: Vec<&dyn ToSql> = fixed.to_vec();
    values.extend(ids.iter().map(|id| id as &dyn ToSql));
    values
}

impl PlannerStore {
    /// Build a snapshot from an already-loaded proposal record. The
    /// proposal row is not read again.
    pub fn snapshot_for_record(
        &self,
        record: &ProposalRecord,
        office_ids: Option<&[OfficeId]>,
    ) -> PlannerResult<CapacitySnapshot> {
        let tenant_id = record.tenant_id.as_str();
        let terms = ProposalTerms::from_record(record)?;

        let office_filter = office_ids.filter(|ids| !ids.is_empty());
        let staff = self.staff_in_scope(tenant_id, office_filter)?;
        if staff.is_empty() {
            return Err(PlannerError::NoStaffInScope);
        }
        let staff_ids: Vec<String> = staff.iter().map(|s| s.id.clone()).collect();

        let projects = self.overlapping_active_projects(tenant_id, terms.start, terms.end)?;
        let project_ids: Vec<String> = projects.iter().map(|p| p.id.clone()).collect();
        let assignments = self.assignments_for(&project_ids, &staff_ids)?;
        let leave = self.approved_leave(tenant_id, &staff_ids, terms.start, terms.end)?;

        log::debug!(
            "snapshot for proposal {}: {} staff, {} projects, {} assignments, {} leave records",
            record.id,
            staff.len(),
            projects.len(),
            assignments.len(),
            leave.len()
        );

        Ok(CapacitySnapshot {
            tenant_id: tenant_id.to_string(),
            proposal: terms,
            staff,
            projects,
            assignments,
            leave,
        })
    }
}

impl SnapshotSource for PlannerStore {
    fn load_feasibility_snapshot(
        &self,
        tenant_id: &str,
        proposal_id: &str,
        office_ids: Option<&[OfficeId]>,
    ) -> PlannerResult<CapacitySnapshot> {
        let record = self
            .proposal(tenant_id, proposal_id)?
            .ok_or_else(|| PlannerError::NotFound {
                proposal_id: proposal_id.to_string(),
            })?;
        self.snapshot_for_record(&record, office_ids)
    }
}
