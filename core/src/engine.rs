//! The planner engine: one entry point per feasibility request.
//!
//! ORDER (fixed for every request):
//!   1. Resolve the proposal and its stored defaults.
//!   2. Resolve office scope, mode and overallocation parameters.
//!   3. Load one consistent snapshot from that record.
//!   4. Simulate, allocate and report. No further reads.
//!
//! RULES:
//!   - The engine never writes to the store while analysing.
//!   - Every tenant-scoped read carries the caller's tenant id.

use crate::{
    config::PlannerConfig,
    demo::{self, DemoTenant},
    error::{PlannerError, PlannerResult},
    mode::OptimizationMode,
    reporter::{FeasibilityReporter, FeasibilityResult},
    simulator::SimulationParams,
    snapshot::ProposalRecord,
    store::PlannerStore,
    types::{OfficeId, ProposalId, TenantId},
};
use serde::{Deserialize, Serialize};

/// What the caller asks for. `None` fields fall back to the proposal's
/// stored settings, then to the planner config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeasibilityRequest {
    pub tenant_id: TenantId,
    pub proposal_id: ProposalId,
    #[serde(default)]
    pub office_ids: Option<Vec<OfficeId>>,
    #[serde(default)]
    pub mode: Option<OptimizationMode>,
    #[serde(default)]
    pub allow_overallocation: Option<bool>,
    #[serde(default)]
    pub overallocation_cap_percent: Option<u32>,
    #[serde(default)]
    pub include_comparisons: bool,
}

impl FeasibilityRequest {
    pub fn new(tenant_id: impl Into<TenantId>, proposal_id: impl Into<ProposalId>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            proposal_id: proposal_id.into(),
            ..Self::default()
        }
    }
}

pub struct PlannerEngine {
    store: PlannerStore,
    pub config: PlannerConfig,
}

impl PlannerEngine {
    pub fn new(store: PlannerStore, config: PlannerConfig) -> Self {
        Self { store, config }
    }

    /// In-memory engine seeded with the demo tenant.
    pub fn build_test(seed: u64) -> PlannerResult<(Self, DemoTenant)> {
        let store = PlannerStore::in_memory()?;
        store.migrate()?;
        let demo = demo::seed_demo_tenant(&store, seed)?;
        Ok((Self::new(store, PlannerConfig::default_test()), demo))
    }

    pub fn store(&self) -> &PlannerStore {
        &self.store
    }

    pub fn proposals(&self, tenant_id: &str) -> PlannerResult<Vec<ProposalRecord>> {
        self.store.proposals(tenant_id)
    }

    /// Run one feasibility analysis.
    pub fn analyse(&self, request: &FeasibilityRequest) -> PlannerResult<FeasibilityResult> {
        let record = self
            .store
            .proposal(&request.tenant_id, &request.proposal_id)?
            .ok_or_else(|| PlannerError::NotFound {
                proposal_id: request.proposal_id.clone(),
            })?;

        let office_ids = request
            .office_ids
            .clone()
            .filter(|ids| !ids.is_empty())
            .or(record.office_scope.clone());
        let params = self.resolve_params(request, &record);

        log::debug!(
            "analysing proposal {} for tenant {} [{}], offices: {}",
            request.proposal_id,
            request.tenant_id,
            params.mode,
            office_ids
                .as_ref()
                .map_or_else(|| "all".to_string(), |ids| ids.join(","))
        );

        let snapshot = self.store.snapshot_for_record(&record, office_ids.as_deref())?;
        FeasibilityReporter::new(&self.config).report(&snapshot, params, request.include_comparisons)
    }

    fn resolve_params(&self, request: &FeasibilityRequest, record: &ProposalRecord) -> SimulationParams {
        SimulationParams::new(
            request.mode.unwrap_or(record.optimization_mode),
            request
                .allow_overallocation
                .unwrap_or(self.config.allow_overallocation),
            request
                .overallocation_cap_percent
                .unwrap_or(self.config.overallocation_cap_percent),
        )
    }
}
