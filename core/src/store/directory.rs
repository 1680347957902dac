use super::{bind_list, placeholders, PlannerStore};
use crate::{error::PlannerResult, snapshot::StaffMember, types::Hours};
use rusqlite::params;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantRow {
    pub tenant_id: String,
    pub name: String,
    pub industry: Option<String>,
    pub default_currency: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfficeRow {
    pub office_id: String,
    pub name: String,
    pub country: String,
    pub timezone: String,
    pub weekly_working_hours: Hours,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffRow {
    pub staff_id: String,
    pub display_name: String,
    pub email: String,
    pub role: String, // "administrator" | "manager" | "staff"
    pub job_title: Option<String>,
    pub office_id: Option<String>,
    pub weekly_capacity_hours: Hours,
}

impl PlannerStore {
    // ── Tenant ────────────────────────────────────────────────────

    pub fn insert_tenant(&self, t: &TenantRow) -> PlannerResult<()> {
        self.conn.execute(
            "INSERT INTO tenant (tenant_id, name, industry, default_currency)
             VALUES (?1, ?2, ?3, ?4)",
            params![&t.tenant_id, &t.name, &t.industry, &t.default_currency],
        )?;
        Ok(())
    }

    // ── Office ────────────────────────────────────────────────────

    pub fn insert_office(&self, tenant_id: &str, o: &OfficeRow) -> PlannerResult<()> {
        self.conn.execute(
            "INSERT INTO office (office_id, tenant_id, name, country, timezone, weekly_working_hours)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                &o.office_id,
                tenant_id,
                &o.name,
                &o.country,
                &o.timezone,
                o.weekly_working_hours
            ],
        )?;
        Ok(())
    }

    pub fn offices(&self, tenant_id: &str) -> PlannerResult<Vec<OfficeRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT office_id, name, country, timezone, weekly_working_hours
             FROM office WHERE tenant_id = ?1
             ORDER BY name ASC, office_id ASC",
        )?;
        let rows = stmt.query_map(params![tenant_id], |row| {
            Ok(OfficeRow {
                office_id: row.get(0)?,
                name: row.get(1)?,
                country: row.get(2)?,
                timezone: row.get(3)?,
                weekly_working_hours: row.get(4)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    // ── Staff ─────────────────────────────────────────────────────

    pub fn insert_staff(&self, tenant_id: &str, s: &StaffRow) -> PlannerResult<()> {
        self.conn.execute(
            "INSERT INTO staff (
                staff_id, tenant_id, display_name, email, role, job_title,
                office_id, weekly_capacity_hours
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                &s.staff_id,
                tenant_id,
                &s.display_name,
                &s.email,
                &s.role,
                &s.job_title,
                &s.office_id,
                s.weekly_capacity_hours
            ],
        )?;
        Ok(())
    }

    /// Staff of the tenant, optionally limited to `office_ids`, ordered by id.
    pub fn staff_in_scope(
        &self,
        tenant_id: &str,
        office_ids: Option<&[String]>,
    ) -> PlannerResult<Vec<StaffMember>> {
        let ids = office_ids.unwrap_or(&[]);
        let office_clause = if ids.is_empty() {
            String::new()
        } else {
            format!("AND s.office_id IN ({})", placeholders(2, ids.len()))
        };
        let sql = format!(
            "SELECT s.staff_id, s.display_name, s.job_title, s.office_id, o.name,
                    s.weekly_capacity_hours
             FROM staff s LEFT JOIN office o ON o.office_id = s.office_id
             WHERE s.tenant_id = ?1 {office_clause}
             ORDER BY s.staff_id ASC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let values = bind_list(&[&tenant_id], ids);
        let rows = stmt.query_map(values.as_slice(), |row| {
            Ok(StaffMember {
                id: row.get(0)?,
                label: row.get(1)?,
                job_title: row.get(2)?,
                office_id: row.get(3)?,
                office_name: row.get(4)?,
                weekly_capacity_hours: row.get(5)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
