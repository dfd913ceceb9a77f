//! Nullable store — thread-safe in-memory governance storage for testing.

use guardian_store::{GovernanceBatch, GovernanceStore, Mutation, StoreError, TreasuryRecord};
use guardian_types::{Principal, ProposalId, VoterClass};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;

#[derive(Clone, Default)]
struct State {
    proposals: BTreeMap<ProposalId, Vec<u8>>,
    last_proposal_id: Option<ProposalId>,
    markers: HashSet<(ProposalId, VoterClass, Principal)>,
    active: HashMap<Principal, ProposalId>,
    weights: BTreeMap<Principal, u128>,
    total_weight: u128,
    treasury: TreasuryRecord,
}

impl State {
    fn apply(&mut self, op: Mutation) {
        match op {
            Mutation::PutProposal { id, data } => {
                self.proposals.insert(id, data);
            }
            Mutation::SetLastProposalId(id) => self.last_proposal_id = Some(id),
            Mutation::PutVoteMarker { id, class, voter } => {
                self.markers.insert((id, class, voter));
            }
            Mutation::SetActiveProposal { proposer, id } => {
                self.active.insert(proposer, id);
            }
            Mutation::ClearActiveProposal { proposer } => {
                self.active.remove(&proposer);
            }
            Mutation::PutWeight { delegate, weight } => {
                if weight == 0 {
                    self.weights.remove(&delegate);
                } else {
                    self.weights.insert(delegate, weight);
                }
            }
            Mutation::SetTotalWeight(total) => self.total_weight = total,
            Mutation::PutTreasury(record) => self.treasury = record,
        }
    }
}

/// An in-memory [`GovernanceStore`] for testing.
///
/// Batches are applied to a copy of the state and swapped in whole, so a
/// commit is all-or-nothing. `fail_next_commits` injects backend failures.
#[derive(Default)]
pub struct NullGovernanceStore {
    state: Mutex<State>,
    failures_pending: Mutex<u32>,
    commits: Mutex<u64>,
}

impl NullGovernanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` commits fail with a backend error, writing nothing.
    pub fn fail_next_commits(&self, n: u32) {
        *self.failures_pending.lock().unwrap() = n;
    }

    /// Number of successful commits so far.
    pub fn commit_count(&self) -> u64 {
        *self.commits.lock().unwrap()
    }

    /// Write weight rows directly, bypassing the engine. Used to seed
    /// start-up state, including inconsistent state.
    pub fn seed_weights(&self, entries: &[(Principal, u128)], total: u128) {
        let mut state = self.state.lock().unwrap();
        for (delegate, weight) in entries {
            state.apply(Mutation::PutWeight {
                delegate: delegate.clone(),
                weight: *weight,
            });
        }
        state.total_weight = total;
    }
}

impl GovernanceStore for NullGovernanceStore {
    fn get_proposal(&self, id: ProposalId) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.state.lock().unwrap().proposals.get(&id).cloned())
    }

    fn iter_proposals(&self) -> Result<Vec<(ProposalId, Vec<u8>)>, StoreError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .proposals
            .iter()
            .map(|(id, data)| (*id, data.clone()))
            .collect())
    }

    fn last_proposal_id(&self) -> Result<ProposalId, StoreError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .last_proposal_id
            .unwrap_or(ProposalId::NONE))
    }

    fn has_vote_marker(
        &self,
        id: ProposalId,
        class: VoterClass,
        voter: &Principal,
    ) -> Result<bool, StoreError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .markers
            .contains(&(id, class, voter.clone())))
    }

    fn active_proposal_of(&self, proposer: &Principal) -> Result<Option<ProposalId>, StoreError> {
        Ok(self.state.lock().unwrap().active.get(proposer).copied())
    }

    fn iter_weights(&self) -> Result<Vec<(Principal, u128)>, StoreError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .weights
            .iter()
            .map(|(p, w)| (p.clone(), *w))
            .collect())
    }

    fn total_weight(&self) -> Result<u128, StoreError> {
        Ok(self.state.lock().unwrap().total_weight)
    }

    fn treasury(&self) -> Result<TreasuryRecord, StoreError> {
        Ok(self.state.lock().unwrap().treasury)
    }

    fn commit(&self, batch: GovernanceBatch) -> Result<(), StoreError> {
        {
            let mut pending = self.failures_pending.lock().unwrap();
            if *pending > 0 {
                *pending -= 1;
                return Err(StoreError::Backend("injected commit failure".into()));
            }
        }
        let mut state = self.state.lock().unwrap();
        let mut next = state.clone();
        for op in batch.into_ops() {
            next.apply(op);
        }
        *state = next;
        *self.commits.lock().unwrap() += 1;
        Ok(())
    }
}
