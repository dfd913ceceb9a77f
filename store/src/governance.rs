//! Governance storage trait.

use crate::{GovernanceBatch, StoreError};
use guardian_types::{Amount, Principal, ProposalId, VoterClass};
use serde::{Deserialize, Serialize};

/// The treasury counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreasuryRecord {
    /// Spendable balance.
    pub balance: Amount,
    /// Lifetime total of observed deposits.
    pub total_deposited: Amount,
    /// Lifetime total transferred out by executed proposals.
    pub total_withdrawn: Amount,
}

/// Trait for storing governance state: proposals, vote markers, the
/// active-proposal index, delegate weights and the treasury.
///
/// Proposals are stored as opaque encoded records; the governance crate owns
/// their format.
pub trait GovernanceStore {
    /// Get an encoded proposal by id.
    fn get_proposal(&self, id: ProposalId) -> Result<Option<Vec<u8>>, StoreError>;

    /// All encoded proposals, in ascending id order.
    fn iter_proposals(&self) -> Result<Vec<(ProposalId, Vec<u8>)>, StoreError>;

    /// The highest id ever assigned ([`ProposalId::NONE`] when empty).
    fn last_proposal_id(&self) -> Result<ProposalId, StoreError>;

    /// Whether `voter` already has a marker for `id` in `class`.
    fn has_vote_marker(
        &self,
        id: ProposalId,
        class: VoterClass,
        voter: &Principal,
    ) -> Result<bool, StoreError>;

    /// The proposer's outstanding (Active or Queued) proposal, if any.
    fn active_proposal_of(&self, proposer: &Principal) -> Result<Option<ProposalId>, StoreError>;

    /// All non-zero delegate weight entries.
    fn iter_weights(&self) -> Result<Vec<(Principal, u128)>, StoreError>;

    /// The stored running total of delegate weight.
    fn total_weight(&self) -> Result<u128, StoreError>;

    /// Current treasury counters (all zero when never written).
    fn treasury(&self) -> Result<TreasuryRecord, StoreError>;

    /// Apply every mutation in `batch`, or none of them.
    fn commit(&self, batch: GovernanceBatch) -> Result<(), StoreError>;
}

impl<T: GovernanceStore + ?Sized> GovernanceStore for &T {
    fn get_proposal(&self, id: ProposalId) -> Result<Option<Vec<u8>>, StoreError> {
        (**self).get_proposal(id)
    }

    fn iter_proposals(&self) -> Result<Vec<(ProposalId, Vec<u8>)>, StoreError> {
        (**self).iter_proposals()
    }

    fn last_proposal_id(&self) -> Result<ProposalId, StoreError> {
        (**self).last_proposal_id()
    }

    fn has_vote_marker(
        &self,
        id: ProposalId,
        class: VoterClass,
        voter: &Principal,
    ) -> Result<bool, StoreError> {
        (**self).has_vote_marker(id, class, voter)
    }

    fn active_proposal_of(&self, proposer: &Principal) -> Result<Option<ProposalId>, StoreError> {
        (**self).active_proposal_of(proposer)
    }

    fn iter_weights(&self) -> Result<Vec<(Principal, u128)>, StoreError> {
        (**self).iter_weights()
    }

    fn total_weight(&self) -> Result<u128, StoreError> {
        (**self).total_weight()
    }

    fn treasury(&self) -> Result<TreasuryRecord, StoreError> {
        (**self).treasury()
    }

    fn commit(&self, batch: GovernanceBatch) -> Result<(), StoreError> {
        (**self).commit(batch)
    }
}
