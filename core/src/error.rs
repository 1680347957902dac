use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Proposal '{proposal_id}' not found")]
    NotFound { proposal_id: String },

    #[error("Invalid proposal: {reason}")]
    InvalidProposal { reason: String },

    #[error("Proposal '{proposal_id}' has no hours estimate")]
    MissingEstimate { proposal_id: String },

    #[error("No staff found for the selected offices")]
    NoStaffInScope,

    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type PlannerResult<T> = Result<T, PlannerError>;
