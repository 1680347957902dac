//! Shared primitive types used across the planner.

/// Identifies a tenant. Every stored row belongs to exactly one.
pub type TenantId = String;

/// Stable identifier for a staff member.
pub type StaffId = String;

/// Stable identifier for an office.
pub type OfficeId = String;

/// Stable identifier for an existing project.
pub type ProjectId = String;

/// Stable identifier for a proposal.
pub type ProposalId = String;

/// Hours are tracked as fractional values at weekly resolution.
pub type Hours = f64;

/// Round to one decimal place, the resolution every report figure uses.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
