//! Capacity snapshot: the read-only input to every feasibility run.
//!
//! A snapshot is loaded once per request and shared by every simulated
//! week and every compared mode. It captures the proposal terms, the
//! staff in scope, the overlapping active projects with their
//! assignments, and approved leave. Nothing downstream mutates it.

use crate::{
    error::{PlannerError, PlannerResult},
    mode::OptimizationMode,
    types::{Hours, OfficeId, ProjectId, ProposalId, StaffId, TenantId},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    #[default]
    Draft,
    Submitted,
    Won,
    Lost,
}

impl ProposalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Submitted => "submitted",
            Self::Won => "won",
            Self::Lost => "lost",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(Self::Draft),
            "submitted" => Some(Self::Submitted),
            "won" => Some(Self::Won),
            "lost" => Some(Self::Lost),
            _ => None,
        }
    }

    /// Leaving draft requires both proposed dates. The planner never
    /// enforces this; form validation upstream does.
    pub fn requires_dates(&self) -> bool {
        !matches!(self, Self::Draft)
    }
}

/// A proposal exactly as stored. Every planning field is optional here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProposalRecord {
    pub id: ProposalId,
    pub tenant_id: TenantId,
    pub name: String,
    pub client_name: Option<String>,
    pub proposed_start_date: Option<NaiveDate>,
    pub proposed_end_date: Option<NaiveDate>,
    pub estimated_hours: Option<Hours>,
    pub estimated_hours_per_week: Option<Hours>,
    /// `None` means every office in the tenant.
    pub office_scope: Option<Vec<OfficeId>>,
    pub status: ProposalStatus,
    pub optimization_mode: OptimizationMode,
}

/// What drives the weekly demand. A per-week rate wins when both are set.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", content = "hours", rename_all = "snake_case")]
pub enum Demand {
    HoursPerWeek(Hours),
    TotalHours(Hours),
}

/// Validated proposal terms: both dates present and ordered, and a
/// usable hours figure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProposalTerms {
    pub proposal_id: ProposalId,
    pub name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub demand: Demand,
}

impl ProposalTerms {
    pub fn from_record(record: &ProposalRecord) -> PlannerResult<Self> {
        let (start, end) = match (record.proposed_start_date, record.proposed_end_date) {
            (Some(start), Some(end)) => (start, end),
            _ => {
                return Err(PlannerError::InvalidProposal {
                    reason: "proposal must have a start and end date for feasibility analysis"
                        .into(),
                })
            }
        };
        if end < start {
            return Err(PlannerError::InvalidProposal {
                reason: format!("end date {end} is before start date {start}"),
            });
        }

        // Zero or negative estimates are treated as absent.
        let usable = |v: Option<Hours>| v.filter(|h| h.is_finite() && *h > 0.0);
        let demand = match (
            usable(record.estimated_hours_per_week),
            usable(record.estimated_hours),
        ) {
            (Some(per_week), _) => Demand::HoursPerWeek(per_week),
            (None, Some(total)) => Demand::TotalHours(total),
            (None, None) => {
                return Err(PlannerError::MissingEstimate {
                    proposal_id: record.id.clone(),
                })
            }
        };

        Ok(Self {
            proposal_id: record.id.clone(),
            name: record.name.clone(),
            start,
            end,
            demand,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StaffMember {
    pub id: StaffId,
    pub label: String,
    pub job_title: Option<String>,
    pub office_id: Option<OfficeId>,
    pub office_name: Option<String>,
    pub weekly_capacity_hours: Hours,
}

/// An active project whose dates overlap the proposal window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommittedProject {
    pub id: ProjectId,
    pub name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Assignment {
    pub project_id: ProjectId,
    pub staff_id: StaffId,
    /// Share of weekly capacity, 0–100+.
    pub allocation_percent: f64,
}

/// An approved leave request. Ranges may span weekends.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeaveRecord {
    pub staff_id: StaffId,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CapacitySnapshot {
    pub tenant_id: TenantId,
    pub proposal: ProposalTerms,
    pub staff: Vec<StaffMember>,
    pub projects: Vec<CommittedProject>,
    pub assignments: Vec<Assignment>,
    pub leave: Vec<LeaveRecord>,
}

impl CapacitySnapshot {
    /// Check the invariants the simulator relies on. Snapshots from the
    /// store satisfy these already; hand-built ones may not.
    pub fn validate(&self) -> PlannerResult<()> {
        if self.proposal.end < self.proposal.start {
            return Err(PlannerError::InvalidProposal {
                reason: format!(
                    "end date {} is before start date {}",
                    self.proposal.end, self.proposal.start
                ),
            });
        }
        let demand_hours = match self.proposal.demand {
            Demand::HoursPerWeek(h) | Demand::TotalHours(h) => h,
        };
        if !(demand_hours.is_finite() && demand_hours > 0.0) {
            return Err(PlannerError::MissingEstimate {
                proposal_id: self.proposal.proposal_id.clone(),
            });
        }
        if self.staff.is_empty() {
            return Err(PlannerError::NoStaffInScope);
        }
        for member in &self.staff {
            if !(member.weekly_capacity_hours.is_finite() && member.weekly_capacity_hours >= 0.0) {
                return Err(PlannerError::InvalidParameter {
                    name: "weekly_capacity_hours",
                    reason: format!(
                        "staff '{}' has capacity {}",
                        member.id, member.weekly_capacity_hours
                    ),
                });
            }
        }
        for assignment in &self.assignments {
            if !(assignment.allocation_percent.is_finite() && assignment.allocation_percent >= 0.0)
            {
                return Err(PlannerError::InvalidParameter {
                    name: "allocation_percent",
                    reason: format!(
                        "assignment of '{}' to '{}' is {}",
                        assignment.staff_id, assignment.project_id, assignment.allocation_percent
                    ),
                });
            }
        }
        Ok(())
    }

    /// Distinct office names among the staff in scope, sorted.
    pub fn office_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .staff
            .iter()
            .filter_map(|s| s.office_name.clone())
            .collect();
        names.sort();
        names.dedup();
        names
    }
}

/// The data-access boundary. Implementations load everything a run needs
/// in one go; the computation never calls back into the source.
pub trait SnapshotSource {
    /// `office_ids` of `None` (or an empty slice) means every office in
    /// the tenant.
    fn load_feasibility_snapshot(
        &self,
        tenant_id: &str,
        proposal_id: &str,
        office_ids: Option<&[OfficeId]>,
    ) -> PlannerResult<CapacitySnapshot>;
}
