//! Feasibility reporter: rolls simulated weeks up into the final report.
//!
//! Weekly figures are rounded to one decimal before they are summed.
//! Total required follows the demand rule: with a per-week rate it is the
//! sum of the rounded weekly values; with a total-hours estimate it is the
//! original total. Total achievable never exceeds total required, and a
//! proposal covered in every week achieves exactly its total required.

use crate::{
    config::{PlannerConfig, ReportThresholds},
    error::PlannerResult,
    mode::OptimizationMode,
    simulator::{self, SimulatedWeek, SimulationParams},
    snapshot::{CapacitySnapshot, Demand},
    types::{round1, Hours, OfficeId, ProposalId, StaffId},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One row per simulated week. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekFeasibility {
    /// Monday of the week.
    pub week_start: NaiveDate,
    /// Sunday of the week.
    pub week_end: NaiveDate,
    /// Working days inside the proposal window this week.
    pub working_days: u32,
    pub required_hours: Hours,
    pub achievable_hours: Hours,
    pub total_free_capacity: Hours,
    pub total_capacity_at_cap: Hours,
    pub staff_used_count: usize,
    pub overallocated_staff_count: usize,
    pub overallocated_staff_ids: Vec<StaffId>,
    pub overallocated_hours: Hours,
    pub active_project_count: usize,
}

impl WeekFeasibility {
    fn from_simulated(week: &SimulatedWeek) -> Self {
        Self {
            week_start: week.window.week_start,
            week_end: week.window.week_end,
            working_days: week.window.working_days,
            required_hours: round1(week.required_hours),
            achievable_hours: round1(week.allocation.achievable_hours),
            total_free_capacity: round1(week.free_capacity_at_100),
            total_capacity_at_cap: round1(week.free_capacity_at_cap),
            staff_used_count: week.allocation.allocated_staff_count,
            overallocated_staff_count: week.allocation.overallocated_staff_ids.len(),
            overallocated_staff_ids: week.allocation.overallocated_staff_ids.clone(),
            overallocated_hours: round1(week.allocation.overallocated_hours),
            active_project_count: week.active_project_count,
        }
    }

    /// Achievable over required; a week with no demand counts as covered.
    pub fn coverage_ratio(&self) -> f64 {
        if self.required_hours > 0.0 {
            self.achievable_hours / self.required_hours
        } else {
            1.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedStaff {
    pub staff_id: StaffId,
    pub label: String,
    pub job_title: Option<String>,
    pub office_id: Option<OfficeId>,
    pub office_name: Option<String>,
    pub total_hours: Hours,
    pub weeks_used: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeasibilityVerdict {
    FullyFeasible,
    PartiallyFeasible,
    InsufficientCapacity,
}

impl FeasibilityVerdict {
    pub fn from_percent(percent: f64, thresholds: &ReportThresholds) -> Self {
        if percent >= thresholds.fully_feasible_percent {
            Self::FullyFeasible
        } else if percent >= thresholds.partially_feasible_percent {
            Self::PartiallyFeasible
        } else {
            Self::InsufficientCapacity
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::FullyFeasible => "Fully feasible",
            Self::PartiallyFeasible => "Partially feasible",
            Self::InsufficientCapacity => "Insufficient capacity",
        }
    }
}

/// Aggregate stats for an alternate mode, shown next to the primary run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub mode: OptimizationMode,
    pub label: String,
    pub total_required: Hours,
    pub total_achievable: Hours,
    pub feasibility_percent: f64,
    pub staff_used_count: usize,
    pub total_overallocated_hours: Hours,
    pub worst_week_percent: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeasibilityResult {
    pub proposal_id: ProposalId,
    pub mode: OptimizationMode,
    pub allow_overallocation: bool,
    pub overallocation_cap_percent: u32,
    pub weeks: Vec<WeekFeasibility>,
    pub total_required: Hours,
    pub total_achievable: Hours,
    pub feasibility_percent: f64,
    pub staff_used_count: usize,
    pub staff_in_scope: usize,
    pub office_names: Vec<String>,
    pub total_overallocated_hours: Hours,
    /// Lowest weekly coverage among weeks with demand, as a percent.
    pub worst_week_percent: Option<f64>,
    pub recommended_staff: Vec<RecommendedStaff>,
    pub verdict: FeasibilityVerdict,
    pub insight: String,
    pub comparisons: Option<Vec<ComparisonResult>>,
}

/// Totals shared by the primary report and every comparison row.
struct Totals {
    required: Hours,
    achievable: Hours,
    percent: f64,
    overallocated: Hours,
    worst_week_percent: Option<f64>,
}

fn feasibility_percent(achievable: Hours, required: Hours) -> f64 {
    if required > 0.0 {
        (achievable / required * 1000.0).round() / 10.0
    } else {
        100.0
    }
}

fn totals(demand: Demand, weeks: &[WeekFeasibility]) -> Totals {
    let weekly_required: Hours = weeks.iter().map(|w| w.required_hours).sum();
    let required = match demand {
        Demand::HoursPerWeek(_) => round1(weekly_required),
        Demand::TotalHours(total) => round1(total),
    };
    // Per-week rounding can leave a fully covered total-hours proposal a
    // tenth short; a proposal covered in every week achieves its total.
    let fully_covered = weeks.iter().all(|w| w.achievable_hours >= w.required_hours);
    let achievable = if fully_covered {
        required
    } else {
        round1(weeks.iter().map(|w| w.achievable_hours).sum::<Hours>()).min(required)
    };
    let overallocated = round1(weeks.iter().map(|w| w.overallocated_hours).sum::<Hours>());
    let worst_week_percent = weeks
        .iter()
        .filter(|w| w.required_hours > 0.0)
        .map(|w| feasibility_percent(w.achievable_hours, w.required_hours))
        .min_by(|a, b| a.total_cmp(b));
    Totals {
        required,
        achievable,
        percent: feasibility_percent(achievable, required),
        overallocated,
        worst_week_percent,
    }
}

fn recommended_staff(snapshot: &CapacitySnapshot, simulated: &[SimulatedWeek]) -> Vec<RecommendedStaff> {
    let mut usage: BTreeMap<&str, (Hours, usize)> = BTreeMap::new();
    for week in simulated {
        for allocation in &week.allocation.allocations {
            let entry = usage.entry(allocation.staff_id.as_str()).or_insert((0.0, 0));
            entry.0 += allocation.hours;
            entry.1 += 1;
        }
    }

    let mut staff: Vec<RecommendedStaff> = snapshot
        .staff
        .iter()
        .filter_map(|member| {
            usage.get(member.id.as_str()).map(|&(hours, weeks)| RecommendedStaff {
                staff_id: member.id.clone(),
                label: member.label.clone(),
                job_title: member.job_title.clone(),
                office_id: member.office_id.clone(),
                office_name: member.office_name.clone(),
                total_hours: round1(hours),
                weeks_used: weeks,
            })
        })
        .collect();
    staff.sort_by(|a, b| {
        b.total_hours
            .total_cmp(&a.total_hours)
            .then_with(|| a.staff_id.cmp(&b.staff_id))
    });
    staff
}

/// One-paragraph summary of the report for display next to the chart.
pub fn insight(
    weeks: &[WeekFeasibility],
    total_required: Hours,
    total_achievable: Hours,
    percent: f64,
    thresholds: &ReportThresholds,
) -> String {
    let with_demand = || weeks.iter().filter(|w| w.required_hours > 0.0);
    let low_weeks = with_demand()
        .filter(|w| w.coverage_ratio() < thresholds.low_week_ratio)
        .count();
    let full_weeks = with_demand()
        .filter(|w| w.coverage_ratio() >= thresholds.full_week_ratio)
        .count();

    if percent >= thresholds.fully_feasible_percent {
        return format!(
            "Staff have sufficient capacity to absorb this project. {full_weeks} of {} weeks are fully covered.",
            weeks.len()
        );
    }

    let mut parts = vec![format!(
        "{percent:.1}% of required hours ({total_achievable}h of {total_required}h) are achievable with current staffing."
    )];
    let shortfall = (total_required - total_achievable).round();
    if shortfall > 0.0 {
        parts.push(format!("Shortfall of {shortfall}h across the project period."));
    }
    if low_weeks > 0 {
        let plural = if low_weeks > 1 { "s" } else { "" };
        parts.push(format!(
            "{low_weeks} week{plural} have less than {:.0}% capacity available, primarily driven by existing project commitments.",
            thresholds.low_week_ratio * 100.0
        ));
    }
    if full_weeks > 0 {
        let verb = if full_weeks > 1 { "s are" } else { " is" };
        parts.push(format!(
            "{full_weeks} week{verb} fully feasible as other projects reduce in overlap."
        ));
    }
    parts.join(" ")
}

pub struct FeasibilityReporter<'a> {
    config: &'a PlannerConfig,
}

impl<'a> FeasibilityReporter<'a> {
    pub fn new(config: &'a PlannerConfig) -> Self {
        Self { config }
    }

    /// Simulate `snapshot` under `params` and build the full report.
    /// Comparisons re-run the simulation against the same snapshot for
    /// each configured alternate mode.
    pub fn report(
        &self,
        snapshot: &CapacitySnapshot,
        params: SimulationParams,
        include_comparisons: bool,
    ) -> PlannerResult<FeasibilityResult> {
        snapshot.validate()?;
        let params = params.clamped();
        let thresholds = &self.config.thresholds;

        let simulated = simulator::simulate(snapshot, &params)?;
        let weeks: Vec<WeekFeasibility> = simulated.iter().map(WeekFeasibility::from_simulated).collect();
        let totals = totals(snapshot.proposal.demand, &weeks);
        let recommended = recommended_staff(snapshot, &simulated);

        let comparisons = if include_comparisons {
            Some(self.comparisons(snapshot, params)?)
        } else {
            None
        };

        let verdict = FeasibilityVerdict::from_percent(totals.percent, thresholds);
        let summary = insight(
            &weeks,
            totals.required,
            totals.achievable,
            totals.percent,
            thresholds,
        );

        log::info!(
            "proposal {} [{}]: {:.1}% feasible ({}h of {}h), {} staff recommended",
            snapshot.proposal.proposal_id,
            params.mode,
            totals.percent,
            totals.achievable,
            totals.required,
            recommended.len()
        );

        Ok(FeasibilityResult {
            proposal_id: snapshot.proposal.proposal_id.clone(),
            mode: params.mode,
            allow_overallocation: params.allow_overallocation,
            overallocation_cap_percent: params.overallocation_cap_percent,
            weeks,
            total_required: totals.required,
            total_achievable: totals.achievable,
            feasibility_percent: totals.percent,
            staff_used_count: recommended.len(),
            staff_in_scope: snapshot.staff.len(),
            office_names: snapshot.office_names(),
            total_overallocated_hours: totals.overallocated,
            worst_week_percent: totals.worst_week_percent,
            recommended_staff: recommended,
            verdict,
            insight: summary,
            comparisons,
        })
    }

    fn comparisons(
        &self,
        snapshot: &CapacitySnapshot,
        params: SimulationParams,
    ) -> PlannerResult<Vec<ComparisonResult>> {
        let mut rows = Vec::new();
        for &mode in &self.config.comparison_modes {
            if mode == params.mode || rows.iter().any(|r: &ComparisonResult| r.mode == mode) {
                continue;
            }
            let simulated = simulator::simulate(snapshot, &params.with_mode(mode))?;
            let weeks: Vec<WeekFeasibility> =
                simulated.iter().map(WeekFeasibility::from_simulated).collect();
            let totals = totals(snapshot.proposal.demand, &weeks);
            rows.push(ComparisonResult {
                mode,
                label: mode.label().to_string(),
                total_required: totals.required,
                total_achievable: totals.achievable,
                feasibility_percent: totals.percent,
                staff_used_count: recommended_staff(snapshot, &simulated).len(),
                total_overallocated_hours: totals.overallocated,
                worst_week_percent: totals.worst_week_percent,
            });
        }
        Ok(rows)
    }
}

/// Compute a feasibility report with the default thresholds and
/// comparison list.
pub fn compute_feasibility(
    snapshot: &CapacitySnapshot,
    mode: OptimizationMode,
    allow_overallocation: bool,
    overallocation_cap_percent: u32,
    include_comparisons: bool,
) -> PlannerResult<FeasibilityResult> {
    let config = PlannerConfig::default();
    FeasibilityReporter::new(&config).report(
        snapshot,
        SimulationParams::new(mode, allow_overallocation, overallocation_cap_percent),
        include_comparisons,
    )
}
