use guardian_store::StoreError;
use guardian_types::{Amount, Capability, ProposalId, Timestamp};
use thiserror::Error;

use crate::ProposalStatus;

#[derive(Debug, Error)]
pub enum GovernanceError {
    #[error("proposal {0} not found")]
    NotFound(ProposalId),

    #[error("{principal} lacks the {needed} capability")]
    Unauthorized {
        principal: String,
        needed: Capability,
    },

    #[error("proposal {id} is {status:?}; operation not allowed")]
    InvalidState {
        id: ProposalId,
        status: ProposalStatus,
    },

    #[error("voting window of proposal {id} is still open until {ends_at}")]
    WindowNotClosed { id: ProposalId, ends_at: Timestamp },

    #[error("voting window of proposal {id} closed at {ended_at}")]
    WindowClosed { id: ProposalId, ended_at: Timestamp },

    #[error("{voter} has already voted on proposal {id}")]
    DuplicateVote { id: ProposalId, voter: String },

    #[error("{proposer} already has outstanding proposal {existing}")]
    ProposerHasActiveProposal {
        proposer: String,
        existing: ProposalId,
    },

    #[error("proposal {id} is timelocked until {executable_after}")]
    TimelockActive {
        id: ProposalId,
        executable_after: Timestamp,
    },

    #[error("proposal {id} expired at {expired_at}")]
    Expired { id: ProposalId, expired_at: Timestamp },

    #[error("insufficient treasury funds: have {have}, need {need}")]
    InsufficientFunds { have: Amount, need: Amount },

    #[error("action of proposal {id} failed: {reason}")]
    ExecutionFailed { id: ProposalId, reason: String },

    #[error("re-entrant call into the governance engine rejected")]
    Reentrant,

    #[error("invalid principal {0:?}")]
    InvalidPrincipal(String),

    #[error("deposit amount must be non-zero")]
    ZeroAmount,

    #[error("arithmetic overflow in {0}")]
    Overflow(&'static str),

    #[error("proposal codec error: {0}")]
    Codec(String),

    #[error("invalid governance parameters: {0}")]
    InvalidParams(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
