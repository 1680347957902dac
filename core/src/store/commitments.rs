use super::{bind_list, placeholders, PlannerStore};
use crate::{
    error::PlannerResult,
    snapshot::{Assignment, CommittedProject, LeaveRecord},
    types::Hours,
};
use chrono::NaiveDate;
use rusqlite::params;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectRow {
    pub project_id: String,
    pub name: String,
    pub client_name: Option<String>,
    pub estimated_hours: Option<Hours>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: String, // "active" | "completed" | "on_hold" ...
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveRow {
    pub leave_id: String,
    pub staff_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub leave_type: String,
    pub status: String, // "pending" | "approved" | "rejected"
}

impl PlannerStore {
    // ── Project ───────────────────────────────────────────────────

    pub fn insert_project(&self, tenant_id: &str, p: &ProjectRow) -> PlannerResult<()> {
        self.conn.execute(
            "INSERT INTO project (
                project_id, tenant_id, name, client_name, estimated_hours,
                start_date, end_date, status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                &p.project_id,
                tenant_id,
                &p.name,
                &p.client_name,
                p.estimated_hours,
                p.start_date,
                p.end_date,
                &p.status
            ],
        )?;
        Ok(())
    }

    /// Active projects with both dates set whose range touches
    /// `[start, end]` inclusive.
    pub fn overlapping_active_projects(
        &self,
        tenant_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> PlannerResult<Vec<CommittedProject>> {
        let mut stmt = self.conn.prepare(
            "SELECT project_id, name, start_date, end_date
             FROM project
             WHERE tenant_id = ?1 AND status = 'active'
               AND start_date IS NOT NULL AND end_date IS NOT NULL
               AND start_date <= ?3 AND end_date >= ?2
             ORDER BY project_id ASC",
        )?;
        let rows = stmt.query_map(params![tenant_id, start, end], |row| {
            Ok(CommittedProject {
                id: row.get(0)?,
                name: row.get(1)?,
                start: row.get(2)?,
                end: row.get(3)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    // ── Assignment ────────────────────────────────────────────────

    pub fn insert_assignment(&self, a: &Assignment) -> PlannerResult<()> {
        self.conn.execute(
            "INSERT INTO project_assignment (project_id, staff_id, allocation_percentage)
             VALUES (?1, ?2, ?3)",
            params![&a.project_id, &a.staff_id, a.allocation_percent],
        )?;
        Ok(())
    }

    /// Assignments tying any of `project_ids` to any of `staff_ids`.
    pub fn assignments_for(
        &self,
        project_ids: &[String],
        staff_ids: &[String],
    ) -> PlannerResult<Vec<Assignment>> {
        if project_ids.is_empty() || staff_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT project_id, staff_id, allocation_percentage
             FROM project_assignment
             WHERE project_id IN ({}) AND staff_id IN ({})
             ORDER BY project_id ASC, staff_id ASC",
            placeholders(1, project_ids.len()),
            placeholders(1 + project_ids.len(), staff_ids.len())
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut values = bind_list(&[], project_ids);
        values.extend(bind_list(&[], staff_ids));
        let rows = stmt.query_map(values.as_slice(), |row| {
            Ok(Assignment {
                project_id: row.get(0)?,
                staff_id: row.get(1)?,
                allocation_percent: row.get(2)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    // ── Leave ─────────────────────────────────────────────────────

    pub fn insert_leave(&self, tenant_id: &str, l: &LeaveRow) -> PlannerResult<()> {
        self.conn.execute(
            "INSERT INTO leave_request (
                leave_id, tenant_id, staff_id, start_date, end_date, leave_type, status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                &l.leave_id,
                tenant_id,
                &l.staff_id,
                l.start_date,
                l.end_date,
                &l.leave_type,
                &l.status
            ],
        )?;
        Ok(())
    }

    /// Approved leave for `staff_ids` touching `[start, end]` inclusive.
    pub fn approved_leave(
        &self,
        tenant_id: &str,
        staff_ids: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> PlannerResult<Vec<LeaveRecord>> {
        if staff_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT staff_id, start_date, end_date
             FROM leave_request
             WHERE tenant_id = ?1 AND status = 'approved'
               AND start_date <= ?3 AND end_date >= ?2
               AND staff_id IN ({})
             ORDER BY staff_id ASC, start_date ASC",
            placeholders(4, staff_ids.len())
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let values = bind_list(&[&tenant_id, &start, &end], staff_ids);
        let rows = stmt.query_map(values.as_slice(), |row| {
            Ok(LeaveRecord {
                staff_id: row.get(0)?,
                start: row.get(1)?,
                end: row.get(2)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
