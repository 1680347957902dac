use super::PlannerStore;
use crate::{
    error::PlannerResult,
    mode::OptimizationMode,
    snapshot::{ProposalRecord, ProposalStatus},
};
use rusqlite::{params, OptionalExtension, Row};

const PROPOSAL_COLUMNS: &str = "proposal_id, tenant_id, name, client_name, proposed_start_date,
     proposed_end_date, estimated_hours, estimated_hours_per_week, office_scope, status,
     optimization_mode";

/// Columns come back raw; decoding happens in `decode_proposal` so a bad
/// scope or status string does not abort the whole query.
type RawProposal = (ProposalRecord, Option<String>, String, String);

fn read_proposal(row: &Row<'_>) -> rusqlite::Result<RawProposal> {
    let record = ProposalRecord {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        name: row.get(2)?,
        client_name: row.get(3)?,
        proposed_start_date: row.get(4)?,
        proposed_end_date: row.get(5)?,
        estimated_hours: row.get(6)?,
        estimated_hours_per_week: row.get(7)?,
        office_scope: None,
        status: ProposalStatus::Draft,
        optimization_mode: OptimizationMode::default(),
    };
    Ok((record, row.get(8)?, row.get(9)?, row.get(10)?))
}

fn decode_proposal((mut record, scope, status, mode): RawProposal) -> ProposalRecord {
    record.office_scope = match scope.as_deref() {
        None | Some("") => None,
        Some(json) => match serde_json::from_str::<Vec<String>>(json) {
            Ok(ids) if ids.is_empty() => None,
            Ok(ids) => Some(ids),
            Err(e) => {
                log::warn!(
                    "proposal {}: unreadable office_scope {json:?} ({e}); using all offices",
                    record.id
                );
                None
            }
        },
    };
    record.status = ProposalStatus::parse(&status).unwrap_or_else(|| {
        log::warn!("proposal {}: unknown status {status:?}; treating as draft", record.id);
        ProposalStatus::Draft
    });
    record.optimization_mode = OptimizationMode::normalize(&mode);
    record
}

impl PlannerStore {
    // ── Proposal ──────────────────────────────────────────────────

    pub fn insert_proposal(&self, p: &ProposalRecord) -> PlannerResult<()> {
        let scope = match &p.office_scope {
            Some(ids) if !ids.is_empty() => Some(serde_json::to_string(ids)?),
            _ => None,
        };
        self.conn.execute(
            "INSERT INTO proposal (
                proposal_id, tenant_id, name, client_name, proposed_start_date,
                proposed_end_date, estimated_hours, estimated_hours_per_week,
                office_scope, status, optimization_mode
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                &p.id,
                &p.tenant_id,
                &p.name,
                &p.client_name,
                p.proposed_start_date,
                p.proposed_end_date,
                p.estimated_hours,
                p.estimated_hours_per_week,
                scope,
                p.status.as_str(),
                p.optimization_mode.as_str()
            ],
        )?;
        Ok(())
    }

    /// A proposal, only if it belongs to `tenant_id`.
    pub fn proposal(&self, tenant_id: &str, proposal_id: &str) -> PlannerResult<Option<ProposalRecord>> {
        let sql = format!(
            "SELECT {PROPOSAL_COLUMNS} FROM proposal WHERE tenant_id = ?1 AND proposal_id = ?2"
        );
        let raw = self
            .conn
            .query_row(&sql, params![tenant_id, proposal_id], read_proposal)
            .optional()?;
        Ok(raw.map(decode_proposal))
    }

    pub fn proposals(&self, tenant_id: &str) -> PlannerResult<Vec<ProposalRecord>> {
        let sql = format!(
            "SELECT {PROPOSAL_COLUMNS} FROM proposal WHERE tenant_id = ?1
             ORDER BY name ASC, proposal_id ASC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![tenant_id], read_proposal)?;
        let raw = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(raw.into_iter().map(decode_proposal).collect())
    }
}
