//! Events recorded for every accepted engine operation.

use guardian_types::{Amount, Principal, ProposalId, Timestamp, VoterClass};
use serde::{Deserialize, Serialize};

use crate::{ProposalKind, VoteValue};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GovernanceEvent {
    ProposalCreated {
        id: ProposalId,
        proposer: Principal,
        kind: ProposalKind,
        emergency: bool,
        voting_ends_at: Timestamp,
    },
    VoteCast {
        id: ProposalId,
        voter: Principal,
        class: VoterClass,
        value: VoteValue,
        /// Delegate weight counted; `None` for Guardian votes.
        weight: Option<u128>,
    },
    ProposalQueued {
        id: ProposalId,
        executable_after: Timestamp,
    },
    ProposalRejected {
        id: ProposalId,
    },
    ProposalExecuted {
        id: ProposalId,
        success: bool,
    },
    ProposalCancelled {
        id: ProposalId,
        by: Principal,
    },
    WeightSet {
        delegate: Principal,
        old_weight: u128,
        new_weight: u128,
        total_weight: u128,
    },
    DepositObserved {
        depositor: Principal,
        amount: Amount,
        balance: Amount,
    },
}

impl GovernanceEvent {
    /// The proposal this event concerns, if any.
    pub fn proposal_id(&self) -> Option<ProposalId> {
        match self {
            Self::ProposalCreated { id, .. }
            | Self::VoteCast { id, .. }
            | Self::ProposalQueued { id, .. }
            | Self::ProposalRejected { id }
            | Self::ProposalExecuted { id, .. }
            | Self::ProposalCancelled { id, .. } => Some(*id),
            Self::WeightSet { .. } | Self::DepositObserved { .. } => None,
        }
    }
}
