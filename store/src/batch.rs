//! Write batching: groups every mutation of one engine operation so the
//! backend can apply them in a single transaction.
//!
//! # Usage
//!
//! ```
//! # use guardian_store::GovernanceBatch;
//! # use guardian_types::{Principal, ProposalId, VoterClass};
//! let id = ProposalId::new(1);
//! let mut batch = GovernanceBatch::new();
//! batch
//!     .put_proposal(id, vec![1, 2, 3])
//!     .put_vote_marker(id, VoterClass::Guardian, Principal::new("g1"));
//! assert_eq!(batch.len(), 2);
//! ```

use crate::TreasuryRecord;
use guardian_types::{Principal, ProposalId, VoterClass};

/// A single store mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mutation {
    /// Insert or replace an encoded proposal.
    PutProposal { id: ProposalId, data: Vec<u8> },
    /// Record the highest assigned proposal id.
    SetLastProposalId(ProposalId),
    /// Record that `voter` voted on `id` in `class`. Markers are never removed.
    PutVoteMarker {
        id: ProposalId,
        class: VoterClass,
        voter: Principal,
    },
    /// Point the proposer's active-proposal index at `id`.
    SetActiveProposal { proposer: Principal, id: ProposalId },
    /// Drop the proposer's active-proposal index entry.
    ClearActiveProposal { proposer: Principal },
    /// Set a delegate's weight. A zero weight removes the entry.
    PutWeight { delegate: Principal, weight: u128 },
    /// Set the running total of delegate weight.
    SetTotalWeight(u128),
    /// Replace the treasury counters.
    PutTreasury(TreasuryRecord),
}

/// An ordered list of mutations applied atomically by
/// [`GovernanceStore::commit`](crate::GovernanceStore::commit).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GovernanceBatch {
    ops: Vec<Mutation>,
}

impl GovernanceBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_proposal(&mut self, id: ProposalId, data: Vec<u8>) -> &mut Self {
        self.ops.push(Mutation::PutProposal { id, data });
        self
    }

    pub fn set_last_proposal_id(&mut self, id: ProposalId) -> &mut Self {
        self.ops.push(Mutation::SetLastProposalId(id));
        self
    }

    pub fn put_vote_marker(
        &mut self,
        id: ProposalId,
        class: VoterClass,
        voter: Principal,
    ) -> &mut Self {
        self.ops.push(Mutation::PutVoteMarker { id, class, voter });
        self
    }

    pub fn set_active_proposal(&mut self, proposer: Principal, id: ProposalId) -> &mut Self {
        self.ops.push(Mutation::SetActiveProposal { proposer, id });
        self
    }

    pub fn clear_active_proposal(&mut self, proposer: Principal) -> &mut Self {
        self.ops.push(Mutation::ClearActiveProposal { proposer });
        self
    }

    pub fn put_weight(&mut self, delegate: Principal, weight: u128) -> &mut Self {
        self.ops.push(Mutation::PutWeight { delegate, weight });
        self
    }

    pub fn set_total_weight(&mut self, total: u128) -> &mut Self {
        self.ops.push(Mutation::SetTotalWeight(total));
        self
    }

    pub fn put_treasury(&mut self, record: TreasuryRecord) -> &mut Self {
        self.ops.push(Mutation::PutTreasury(record));
        self
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Mutation> {
        self.ops.iter()
    }

    pub fn into_ops(self) -> Vec<Mutation> {
        self.ops
    }
}
