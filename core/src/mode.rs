//! Optimization modes: the closed set of allocation objectives.

use crate::error::{PlannerError, PlannerResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Objective governing how a week's hours are spread across staff.
/// Variants are persisted by name; never rename them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationMode {
    #[default]
    MaxFeasibility,
    MinStaffCount,
    SingleOfficePreferred,
    MultiOfficeBalanced,
    MinOverallocation,
    WorstWeekRobust,
}

impl OptimizationMode {
    pub const ALL: [OptimizationMode; 6] = [
        Self::MaxFeasibility,
        Self::MinStaffCount,
        Self::SingleOfficePreferred,
        Self::MultiOfficeBalanced,
        Self::MinOverallocation,
        Self::WorstWeekRobust,
    ];

    /// Modes reported side by side when comparisons are requested.
    pub const COMPARISON: [OptimizationMode; 4] = [
        Self::MaxFeasibility,
        Self::MinStaffCount,
        Self::SingleOfficePreferred,
        Self::MinOverallocation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MaxFeasibility => "max_feasibility",
            Self::MinStaffCount => "min_staff_count",
            Self::SingleOfficePreferred => "single_office_preferred",
            Self::MultiOfficeBalanced => "multi_office_balanced",
            Self::MinOverallocation => "min_overallocation",
            Self::WorstWeekRobust => "worst_week_robust",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::MaxFeasibility => "Max feasibility",
            Self::MinStaffCount => "Minimum staff allocated",
            Self::SingleOfficePreferred => "Single office preferred",
            Self::MultiOfficeBalanced => "Multi-office balanced",
            Self::MinOverallocation => "Minimum overallocation",
            Self::WorstWeekRobust => "Worst-week robust",
        }
    }

    /// Lenient parse for stored values: anything unrecognised falls back
    /// to the default mode.
    pub fn normalize(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }

    /// True for the modes that only spend half of each person's
    /// overallocation headroom before falling back.
    pub fn is_conservative(&self) -> bool {
        matches!(self, Self::MinOverallocation | Self::WorstWeekRobust)
    }
}

impl FromStr for OptimizationMode {
    type Err = PlannerError;

    fn from_str(s: &str) -> PlannerResult<Self> {
        let trimmed = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == trimmed)
            .ok_or_else(|| PlannerError::InvalidParameter {
                name: "optimization_mode",
                reason: format!("unknown mode '{trimmed}'"),
            })
    }
}

impl fmt::Display for OptimizationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
