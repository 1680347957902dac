use crate::mode::OptimizationMode;
use crate::simulator::{SimulationParams, MAX_OVERALLOCATION_CAP, MIN_OVERALLOCATION_CAP};
use serde::{Deserialize, Serialize};

/// Planner defaults and report thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    #[serde(default)]
    pub default_mode: OptimizationMode,
    #[serde(default)]
    pub allow_overallocation: bool,
    #[serde(default = "default_cap_percent")]
    pub overallocation_cap_percent: u32,
    #[serde(default = "default_comparison_modes")]
    pub comparison_modes: Vec<OptimizationMode>,
    #[serde(default)]
    pub thresholds: ReportThresholds,
}

/// Cut-offs for the verdict badge and the insight sentence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportThresholds {
    /// Overall percent at or above which the proposal is fully feasible.
    pub fully_feasible_percent: f64,
    /// Overall percent at or above which it is partially feasible.
    pub partially_feasible_percent: f64,
    /// Weekly achievable/required ratio below which a week counts as low.
    pub low_week_ratio: f64,
    /// Weekly ratio at or above which a week counts as fully covered.
    pub full_week_ratio: f64,
}

impl Default for ReportThresholds {
    fn default() -> Self {
        Self {
            fully_feasible_percent: 90.0,
            partially_feasible_percent: 50.0,
            low_week_ratio: 0.5,
            full_week_ratio: 0.9,
        }
    }
}

fn default_cap_percent() -> u32 {
    120
}

fn default_comparison_modes() -> Vec<OptimizationMode> {
    OptimizationMode::COMPARISON.to_vec()
}

impl PlannerConfig {
    /// Load from `{data_dir}/planner.json`.
    /// In tests, use PlannerConfig::default_test().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/planner.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        let cap = config.overallocation_cap_percent;
        if !(MIN_OVERALLOCATION_CAP..=MAX_OVERALLOCATION_CAP).contains(&cap) {
            log::warn!("{path}: overallocation_cap_percent {cap} will be clamped");
        }
        Ok(config)
    }

    pub fn default_test() -> Self {
        Self {
            default_mode: OptimizationMode::MaxFeasibility,
            allow_overallocation: false,
            overallocation_cap_percent: default_cap_percent(),
            comparison_modes: default_comparison_modes(),
            thresholds: ReportThresholds::default(),
        }
    }

    /// Simulation parameters from the configured defaults.
    pub fn default_params(&self) -> SimulationParams {
        SimulationParams::new(
            self.default_mode,
            self.allow_overallocation,
            self.overallocation_cap_percent,
        )
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self::default_test()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: PlannerConfig = serde_json::from_str(r#"{ "allow_overallocation": true }"#).unwrap();
        assert!(config.allow_overallocation);
        assert_eq!(config.overallocation_cap_percent, 120);
        assert_eq!(config.default_mode, OptimizationMode::MaxFeasibility);
        assert_eq!(config.comparison_modes, OptimizationMode::COMPARISON.to_vec());
        assert_eq!(config.thresholds.fully_feasible_percent, 90.0);
    }

    #[test]
    fn default_params_clamp_an_out_of_range_cap() {
        let config = PlannerConfig {
            overallocation_cap_percent: 350,
            ..PlannerConfig::default_test()
        };
        assert_eq!(config.default_params().overallocation_cap_percent, 200);
    }

    #[test]
    fn load_reports_a_missing_file() {
        let err = PlannerConfig::load("/nonexistent/planner-config-dir").unwrap_err();
        assert!(err.to_string().contains("planner.json"));
    }
}
