//! Weekly capacity simulator.
//!
//! Walks the proposal window one Monday-aligned week at a time. For every
//! week it rebuilds each staff member's capacity slice from the snapshot
//! (nothing carries over between weeks), works out the week's demand, and
//! hands both to the optimizer.
//!
//! Partial first/last weeks are scaled by their working-day fraction. The
//! same fraction scales demand, capacity and existing allocations so the
//! units stay consistent.

use crate::{
    calendar::{self, WeekWindow, WORKING_DAYS_PER_WEEK},
    error::{PlannerError, PlannerResult},
    mode::OptimizationMode,
    optimizer::{self, AllocationResult, StaffCapacitySlice},
    snapshot::{Assignment, CapacitySnapshot, CommittedProject, Demand, LeaveRecord, StaffMember},
    types::Hours,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const MIN_OVERALLOCATION_CAP: u32 = 100;
pub const MAX_OVERALLOCATION_CAP: u32 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationParams {
    pub mode: OptimizationMode,
    pub allow_overallocation: bool,
    /// Ceiling as a percentage of effective capacity, 100–200.
    pub overallocation_cap_percent: u32,
}

impl SimulationParams {
    pub fn new(mode: OptimizationMode, allow_overallocation: bool, cap_percent: u32) -> Self {
        Self {
            mode,
            allow_overallocation,
            overallocation_cap_percent: cap_percent,
        }
        .clamped()
    }

    /// Out-of-range caps are clamped, never rejected.
    pub fn clamped(self) -> Self {
        let cap = self
            .overallocation_cap_percent
            .clamp(MIN_OVERALLOCATION_CAP, MAX_OVERALLOCATION_CAP);
        if cap != self.overallocation_cap_percent {
            log::warn!(
                "overallocation cap {}% outside [{MIN_OVERALLOCATION_CAP}, {MAX_OVERALLOCATION_CAP}]; using {cap}%",
                self.overallocation_cap_percent
            );
        }
        Self {
            overallocation_cap_percent: cap,
            ..self
        }
    }

    pub fn with_mode(self, mode: OptimizationMode) -> Self {
        Self { mode, ..self }
    }

    /// Multiplier applied to effective capacity to get the ceiling.
    pub fn ceiling_factor(&self) -> f64 {
        if self.allow_overallocation {
            f64::from(self.overallocation_cap_percent) / 100.0
        } else {
            1.0
        }
    }
}

/// Raw (unrounded) outcome of one simulated week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatedWeek {
    pub window: WeekWindow,
    pub required_hours: Hours,
    pub free_capacity_at_100: Hours,
    pub free_capacity_at_cap: Hours,
    /// `min(required, capped capacity)`, the figure handed to the optimizer.
    pub target_hours: Hours,
    pub allocation: AllocationResult,
    pub active_project_count: usize,
}

/// Per-run lookups over the snapshot. Built once, read by every week.
struct CommitmentIndex<'a> {
    projects: HashMap<&'a str, &'a CommittedProject>,
    assignments: HashMap<&'a str, Vec<&'a Assignment>>,
    leave: HashMap<&'a str, Vec<&'a LeaveRecord>>,
}

impl<'a> CommitmentIndex<'a> {
    fn build(snapshot: &'a CapacitySnapshot) -> Self {
        let projects = snapshot
            .projects
            .iter()
            .map(|p| (p.id.as_str(), p))
            .collect();
        let mut assignments: HashMap<&str, Vec<&Assignment>> = HashMap::new();
        for a in &snapshot.assignments {
            assignments.entry(a.staff_id.as_str()).or_default().push(a);
        }
        let mut leave: HashMap<&str, Vec<&LeaveRecord>> = HashMap::new();
        for l in &snapshot.leave {
            leave.entry(l.staff_id.as_str()).or_default().push(l);
        }
        Self {
            projects,
            assignments,
            leave,
        }
    }

    /// Hours already promised to projects running at any point this week.
    fn allocated_hours(&self, member: &StaffMember, window: &WeekWindow) -> Hours {
        let Some(assignments) = self.assignments.get(member.id.as_str()) else {
            return 0.0;
        };
        assignments
            .iter()
            .filter(|a| {
                self.projects
                    .get(a.project_id.as_str())
                    .is_some_and(|p| window.touches(p.start, p.end))
            })
            .map(|a| (a.allocation_percent / 100.0) * member.weekly_capacity_hours * window.fraction())
            .sum()
    }

    /// Approved leave inside the clamped week, Monday to Friday only.
    /// Leave days before the proposal starts (or after it ends) in a boundary
    /// week are not counted, unlike a full Monday..Friday intersection.
    fn leave_hours(&self, member: &StaffMember, window: &WeekWindow) -> Hours {
        let Some(records) = self.leave.get(member.id.as_str()) else {
            return 0.0;
        };
        let last_day = window.clamp_end.min(window.friday());
        let days: u32 = records
            .iter()
            .filter_map(|l| calendar::clamp_range(l.start, l.end, window.clamp_start, last_day))
            .map(|(start, end)| calendar::working_days(start, end))
            .sum();
        f64::from(days) * member.weekly_capacity_hours / f64::from(WORKING_DAYS_PER_WEEK)
    }
}

/// Demand for one week under the proposal's demand rule.
fn required_hours(demand: Demand, window: &WeekWindow, total_working_days: u32) -> Hours {
    match demand {
        Demand::HoursPerWeek(per_week) => per_week * window.fraction(),
        // Pro-rated by working days rather than week count so short
        // boundary weeks get a proportionally small share.
        Demand::TotalHours(total) => {
            total * f64::from(window.working_days) / f64::from(total_working_days)
        }
    }
}

/// Build every staff member's capacity slice for one week.
fn staff_slices(
    snapshot: &CapacitySnapshot,
    index: &CommitmentIndex<'_>,
    window: &WeekWindow,
    params: &SimulationParams,
) -> Vec<StaffCapacitySlice> {
    let fraction = window.fraction();
    let ceiling = params.ceiling_factor();
    snapshot
        .staff
        .iter()
        .map(|member| {
            let effective_capacity = member.weekly_capacity_hours * fraction;
            let committed_hours =
                index.allocated_hours(member, window) + index.leave_hours(member, window);
            let free_at_100 = (effective_capacity - committed_hours).max(0.0);
            let free_at_cap = (effective_capacity * ceiling - committed_hours).max(0.0);
            StaffCapacitySlice {
                id: member.id.clone(),
                office_id: member.office_id.clone(),
                free_at_100,
                free_at_cap,
                effective_capacity,
                committed_hours,
            }
        })
        .collect()
}

/// Capacity slices for every week of the proposal, without allocating.
/// Useful for inspecting headroom independently of any mode.
pub fn weekly_slices(
    snapshot: &CapacitySnapshot,
    params: &SimulationParams,
) -> Vec<(WeekWindow, Vec<StaffCapacitySlice>)> {
    let index = CommitmentIndex::build(snapshot);
    calendar::weeks_between(snapshot.proposal.start, snapshot.proposal.end)
        .into_iter()
        .map(|window| {
            let slices = staff_slices(snapshot, &index, &window, params);
            (window, slices)
        })
        .collect()
}

/// Simulate the whole proposal window under `params`.
pub fn simulate(
    snapshot: &CapacitySnapshot,
    params: &SimulationParams,
) -> PlannerResult<Vec<SimulatedWeek>> {
    let proposal = &snapshot.proposal;
    let total_working_days = calendar::working_days(proposal.start, proposal.end);
    if matches!(proposal.demand, Demand::TotalHours(_)) && total_working_days == 0 {
        return Err(PlannerError::InvalidProposal {
            reason: "proposal window contains no working days to spread its total hours over"
                .into(),
        });
    }

    let index = CommitmentIndex::build(snapshot);
    let weeks = calendar::weeks_between(proposal.start, proposal.end);
    let mut simulated = Vec::with_capacity(weeks.len());

    for window in weeks {
        let slices = staff_slices(snapshot, &index, &window, params);
        let required = required_hours(proposal.demand, &window, total_working_days);

        let free_capacity_at_100: Hours = slices.iter().map(|s| s.free_at_100).sum();
        let free_capacity_at_cap: Hours = slices.iter().map(|s| s.free_at_cap).sum();
        let capped_total = if params.allow_overallocation {
            free_capacity_at_cap
        } else {
            free_capacity_at_100
        };
        let target_hours = required.min(capped_total);

        let allocation = optimizer::allocate_for_mode(
            params.mode,
            &slices,
            target_hours,
            params.allow_overallocation,
        );
        // Never report more than the week asked for.
        let allocation = AllocationResult {
            achievable_hours: allocation.achievable_hours.min(required),
            ..allocation
        };

        let active_project_count = snapshot
            .projects
            .iter()
            .filter(|p| window.touches(p.start, p.end))
            .count();

        log::debug!(
            "week {} [{}]: required {:.1}h, target {:.1}h, achieved {:.1}h with {} staff",
            window.week_start,
            params.mode,
            required,
            target_hours,
            allocation.achievable_hours,
            allocation.allocated_staff_count
        );

        simulated.push(SimulatedWeek {
            window,
            required_hours: required,
            free_capacity_at_100,
            free_capacity_at_cap,
            target_hours,
            allocation,
            active_project_count,
        });
    }

    Ok(simulated)
}
