//! Governance engine: the lifecycle controller.
//!
//! Every mutating operation follows the same shape: take the re-entrancy
//! guard, check authorization, load and validate, build one
//! [`GovernanceBatch`] and commit it, then update derived in-memory state and
//! record events. A failed check or commit leaves the store untouched.

use std::sync::{Mutex, MutexGuard, PoisonError};

use guardian_store::{GovernanceBatch, GovernanceStore, StoreError, TreasuryRecord};
use guardian_types::{Amount, Capability, GovernanceParams, Principal, ProposalId, VoterClass};

use crate::collaborators::{ActionExecutor, Authorization, Clock};
use crate::events::GovernanceEvent;
use crate::guard::ReentrancyGuard;
use crate::quorum::{self, QuorumStatus};
use crate::voting::{self, VoteValue};
use crate::weights::DelegateWeightTable;
use crate::{Action, GovernanceError, Proposal, ProposalKind, ProposalStatus, Tally};

pub struct GovernanceEngine<S, A, C> {
    store: S,
    auth: A,
    clock: C,
    params: GovernanceParams,
    weights: Mutex<DelegateWeightTable>,
    guard: ReentrancyGuard,
    events: Mutex<Vec<GovernanceEvent>>,
}

impl<S, A, C> GovernanceEngine<S, A, C>
where
    S: GovernanceStore,
    A: Authorization,
    C: Clock,
{
    /// Open an engine over `store`.
    ///
    /// Rebuilds the delegate weight table from the store, verifies it against
    /// the stored total, and grants the Delegate capability to every delegate
    /// with non-zero weight.
    pub fn new(store: S, auth: A, clock: C, params: GovernanceParams) -> Result<Self, GovernanceError> {
        params
            .validate()
            .map_err(|e| GovernanceError::InvalidParams(e.to_string()))?;

        let table = DelegateWeightTable::rebuild(store.iter_weights()?)?;
        let stored_total = store.total_weight()?;
        if table.total_weight() != stored_total {
            return Err(StoreError::Corruption(format!(
                "stored delegate weight total {stored_total} != sum of entries {}",
                table.total_weight()
            ))
            .into());
        }
        for (delegate, _) in table.iter() {
            auth.set_delegate(delegate, true);
        }

        tracing::info!(
            delegates = table.delegate_count(),
            total_weight = table.total_weight(),
            last_proposal = store.last_proposal_id()?.get(),
            "governance engine started"
        );

        Ok(Self {
            store,
            auth,
            clock,
            params,
            weights: Mutex::new(table),
            guard: ReentrancyGuard::new(),
            events: Mutex::new(Vec::new()),
        })
    }

    // ── Proposal creation ───────────────────────────────────────────────

    /// Submit a standard proposal. The proposer must hold Guardian or
    /// Delegate capability and have no outstanding proposal.
    ///
    /// A `kind` of [`ProposalKind::Emergency`] is informational here; only
    /// [`create_emergency`](Self::create_emergency) shortens the timelock.
    pub fn create(
        &self,
        proposer: &Principal,
        kind: ProposalKind,
        narrative: impl Into<String>,
        action: Action,
    ) -> Result<ProposalId, GovernanceError> {
        let _guard = self.guard.enter()?;
        check_principal(proposer)?;
        self.require_voter(proposer)?;
        self.open_proposal(proposer, kind, narrative.into(), action, false)
    }

    /// Submit an emergency proposal (shortened timelock, same quorum rules).
    ///
    /// Requires EmergencyIssuer on top of the standard proposer capability,
    /// and is subject to the same one-outstanding-proposal rule.
    pub fn create_emergency(
        &self,
        issuer: &Principal,
        narrative: impl Into<String>,
        action: Action,
    ) -> Result<ProposalId, GovernanceError> {
        let _guard = self.guard.enter()?;
        check_principal(issuer)?;
        self.require_voter(issuer)?;
        self.require(issuer, Capability::EmergencyIssuer)?;
        self.open_proposal(issuer, ProposalKind::Emergency, narrative.into(), action, true)
    }

    fn open_proposal(
        &self,
        proposer: &Principal,
        kind: ProposalKind,
        narrative: String,
        action: Action,
        emergency: bool,
    ) -> Result<ProposalId, GovernanceError> {
        if let Some(existing) = self.store.active_proposal_of(proposer)? {
            return Err(GovernanceError::ProposerHasActiveProposal {
                proposer: proposer.to_string(),
                existing,
            });
        }

        let now = self.clock.now();
        let id = self
            .store
            .last_proposal_id()?
            .next()
            .ok_or(GovernanceError::Overflow("proposal id"))?;
        let proposal = Proposal::new(
            id,
            kind,
            proposer.clone(),
            narrative,
            action,
            emergency,
            now,
            &self.params,
        )?;

        let mut batch = GovernanceBatch::new();
        batch
            .put_proposal(id, proposal.encode()?)
            .set_last_proposal_id(id)
            .set_active_proposal(proposer.clone(), id);
        self.store.commit(batch)?;

        tracing::info!(
            proposal = id.get(),
            %proposer,
            kind = kind.as_str(),
            emergency,
            voting_ends_at = proposal.voting_ends_at.as_secs(),
            "proposal created"
        );
        self.emit(GovernanceEvent::ProposalCreated {
            id,
            proposer: proposer.clone(),
            kind,
            emergency,
            voting_ends_at: proposal.voting_ends_at,
        });
        Ok(id)
    }

    // ── Delegate weights ────────────────────────────────────────────────

    /// Assign `delegate` a new weight (Admin only). Weight 0 revokes the
    /// Delegate capability; any other weight grants it.
    pub fn set_weight(
        &self,
        admin: &Principal,
        delegate: &Principal,
        weight: u128,
    ) -> Result<(), GovernanceError> {
        let _guard = self.guard.enter()?;
        self.require(admin, Capability::Admin)?;
        check_principal(delegate)?;

        let change = self.weights().preview(delegate, weight)?;

        let mut batch = GovernanceBatch::new();
        batch
            .put_weight(delegate.clone(), weight)
            .set_total_weight(change.new_total);
        self.store.commit(batch)?;

        self.weights().apply(&change);
        self.auth.set_delegate(delegate, weight > 0);

        tracing::info!(
            %delegate,
            old_weight = change.old_weight,
            new_weight = weight,
            total_weight = change.new_total,
            "delegate weight set"
        );
        self.emit(GovernanceEvent::WeightSet {
            delegate: delegate.clone(),
            old_weight: change.old_weight,
            new_weight: weight,
            total_weight: change.new_total,
        });
        Ok(())
    }

    // ── Voting ──────────────────────────────────────────────────────────

    /// Record one Guardian vote. Abstain uses up the Guardian's vote without
    /// moving any count.
    pub fn cast_guardian_vote(
        &self,
        voter: &Principal,
        id: ProposalId,
        value: VoteValue,
    ) -> Result<(), GovernanceError> {
        let _guard = self.guard.enter()?;
        check_principal(voter)?;
        self.require(voter, Capability::Guardian)?;
        let mut proposal = self.open_for_voting(id, VoterClass::Guardian, voter)?;

        voting::record_guardian(&mut proposal.tally, value)?;
        self.commit_vote(&proposal, VoterClass::Guardian, voter)?;

        tracing::debug!(proposal = id.get(), %voter, vote = value.as_str(), "guardian vote recorded");
        self.emit(GovernanceEvent::VoteCast {
            id,
            voter: voter.clone(),
            class: VoterClass::Guardian,
            value,
            weight: None,
        });
        Ok(())
    }

    /// Record one Delegate vote, weighted by the delegate's weight right now.
    pub fn cast_delegate_vote(
        &self,
        voter: &Principal,
        id: ProposalId,
        value: VoteValue,
    ) -> Result<(), GovernanceError> {
        let _guard = self.guard.enter()?;
        check_principal(voter)?;
        self.require(voter, Capability::Delegate)?;
        let weight = self.weights().weight(voter);
        if weight == 0 {
            return Err(GovernanceError::Unauthorized {
                principal: voter.to_string(),
                needed: Capability::Delegate,
            });
        }
        let mut proposal = self.open_for_voting(id, VoterClass::Delegate, voter)?;

        voting::record_delegate(&mut proposal.tally, value, weight)?;
        self.commit_vote(&proposal, VoterClass::Delegate, voter)?;

        tracing::debug!(
            proposal = id.get(),
            %voter,
            vote = value.as_str(),
            weight,
            "delegate vote recorded"
        );
        self.emit(GovernanceEvent::VoteCast {
            id,
            voter: voter.clone(),
            class: VoterClass::Delegate,
            value,
            weight: Some(weight),
        });
        Ok(())
    }

    /// Load a proposal that can take a vote from `voter` in `class`.
    fn open_for_voting(
        &self,
        id: ProposalId,
        class: VoterClass,
        voter: &Principal,
    ) -> Result<Proposal, GovernanceError> {
        let proposal = self.load(id)?;
        if proposal.status != ProposalStatus::Active {
            return Err(GovernanceError::InvalidState {
                id,
                status: proposal.status,
            });
        }
        if !proposal.is_voting_open(self.clock.now()) {
            return Err(GovernanceError::WindowClosed {
                id,
                ended_at: proposal.voting_ends_at,
            });
        }
        if self.store.has_vote_marker(id, class, voter)? {
            return Err(GovernanceError::DuplicateVote {
                id,
                voter: voter.to_string(),
            });
        }
        Ok(proposal)
    }

    /// Marker and tally land in the same batch.
    fn commit_vote(
        &self,
        proposal: &Proposal,
        class: VoterClass,
        voter: &Principal,
    ) -> Result<(), GovernanceError> {
        let mut batch = GovernanceBatch::new();
        batch
            .put_proposal(proposal.id, proposal.encode()?)
            .put_vote_marker(proposal.id, class, voter.clone());
        self.store.commit(batch)?;
        Ok(())
    }

    // ── Lifecycle ───────────────────────────────────────────────────────

    /// Close voting on a proposal whose window has ended. Anyone may call.
    ///
    /// Returns the new status: Queued (both quorums met, timelock started)
    /// or Rejected.
    pub fn finalize(&self, id: ProposalId) -> Result<ProposalStatus, GovernanceError> {
        let _guard = self.guard.enter()?;
        let mut proposal = self.load(id)?;
        if proposal.status != ProposalStatus::Active {
            return Err(GovernanceError::InvalidState {
                id,
                status: proposal.status,
            });
        }
        let now = self.clock.now();
        if proposal.is_voting_open(now) {
            return Err(GovernanceError::WindowNotClosed {
                id,
                ends_at: proposal.voting_ends_at,
            });
        }

        let total = self.weights().total_weight();
        let quorum = quorum::evaluate(&proposal.tally, total, &self.params);

        let mut batch = GovernanceBatch::new();
        let event = if quorum.passed() {
            let executable_after = now
                .checked_add_secs(self.params.timelock_for(proposal.emergency))
                .ok_or(GovernanceError::Overflow("executable-after time"))?;
            proposal.status = ProposalStatus::Queued;
            proposal.executable_after = Some(executable_after);
            batch.put_proposal(id, proposal.encode()?);
            GovernanceEvent::ProposalQueued {
                id,
                executable_after,
            }
        } else {
            proposal.status = ProposalStatus::Rejected;
            batch
                .put_proposal(id, proposal.encode()?)
                .clear_active_proposal(proposal.proposer.clone());
            GovernanceEvent::ProposalRejected { id }
        };
        self.store.commit(batch)?;

        tracing::info!(
            proposal = id.get(),
            status = proposal.status.as_str(),
            guardian_for = quorum.guardian_for,
            delegate_for = quorum.delegate_for,
            delegate_required = quorum.delegate_required,
            "proposal finalized"
        );
        self.emit(event);
        Ok(proposal.status)
    }

    /// Execute a queued proposal through `executor`. Anyone may call.
    ///
    /// Status becomes Executed, and the treasury is debited, in one commit
    /// before the executor runs. If the executor fails the debit is reversed
    /// but the status stays Executed, so a failed proposal cannot be retried.
    /// A refund that cannot be committed is logged and the call still
    /// reports [`GovernanceError::ExecutionFailed`].
    pub fn execute(&self, id: ProposalId, executor: &dyn ActionExecutor) -> Result<(), GovernanceError> {
        let _guard = self.guard.enter()?;
        let mut proposal = self.load(id)?;
        if proposal.status != ProposalStatus::Queued {
            return Err(GovernanceError::InvalidState {
                id,
                status: proposal.status,
            });
        }
        let now = self.clock.now();
        // Expiry first: waiting out the timelock cannot cure it.
        if proposal.is_expired(now) {
            return Err(GovernanceError::Expired {
                id,
                expired_at: proposal.expires_at,
            });
        }
        let executable_after = proposal.executable_after.ok_or_else(|| {
            StoreError::Corruption(format!("queued proposal {id} has no executable-after time"))
        })?;
        if now < executable_after {
            return Err(GovernanceError::TimelockActive {
                id,
                executable_after,
            });
        }

        let value = proposal.action.value;
        let treasury = self.store.treasury()?;
        let balance = treasury
            .balance
            .checked_sub(value)
            .ok_or(GovernanceError::InsufficientFunds {
                have: treasury.balance,
                need: value,
            })?;
        let debited = TreasuryRecord {
            balance,
            total_withdrawn: treasury
                .total_withdrawn
                .checked_add(value)
                .ok_or(GovernanceError::Overflow("treasury withdrawals"))?,
            ..treasury
        };

        proposal.status = ProposalStatus::Executed;
        let mut batch = GovernanceBatch::new();
        batch
            .put_proposal(id, proposal.encode()?)
            .clear_active_proposal(proposal.proposer.clone())
            .put_treasury(debited);
        self.store.commit(batch)?;

        tracing::info!(
            proposal = id.get(),
            target = %proposal.action.target,
            value = %value,
            payload_len = proposal.action.payload.len(),
            "executing proposal"
        );

        match executor.invoke(&proposal.action) {
            Ok(()) => {
                tracing::info!(proposal = id.get(), "proposal executed");
                self.emit(GovernanceEvent::ProposalExecuted { id, success: true });
                Ok(())
            }
            Err(failure) => {
                tracing::warn!(proposal = id.get(), reason = %failure, "proposal action failed");
                // The proposal is already Executed, so a failed refund must not
                // mask the action failure. The balance stays debited until an
                // operator reconciles it.
                if let Err(error) = self.refund(value) {
                    tracing::error!(
                        proposal = id.get(),
                        value = %value,
                        %error,
                        "refund after failed action was not committed"
                    );
                }
                self.emit(GovernanceEvent::ProposalExecuted { id, success: false });
                Err(GovernanceError::ExecutionFailed {
                    id,
                    reason: failure.to_string(),
                })
            }
        }
    }

    /// Reverse the debit of a failed execution.
    fn refund(&self, value: Amount) -> Result<(), GovernanceError> {
        let treasury = self.store.treasury()?;
        let refunded = TreasuryRecord {
            balance: treasury
                .balance
                .checked_add(value)
                .ok_or(GovernanceError::Overflow("treasury balance"))?,
            total_withdrawn: treasury.total_withdrawn.saturating_sub(value),
            ..treasury
        };
        let mut batch = GovernanceBatch::new();
        batch.put_treasury(refunded);
        self.store.commit(batch)?;
        Ok(())
    }

    /// Cancel an Active or Queued proposal. Only the proposer or an Admin
    /// may cancel.
    pub fn cancel(&self, caller: &Principal, id: ProposalId) -> Result<(), GovernanceError> {
        let _guard = self.guard.enter()?;
        let mut proposal = self.load(id)?;
        if *caller != proposal.proposer && !self.auth.has_capability(caller, Capability::Admin) {
            return Err(GovernanceError::Unauthorized {
                principal: caller.to_string(),
                needed: Capability::Admin,
            });
        }
        if !proposal.status.can_transition_to(ProposalStatus::Cancelled) {
            return Err(GovernanceError::InvalidState {
                id,
                status: proposal.status,
            });
        }

        proposal.status = ProposalStatus::Cancelled;
        proposal.executable_after = None;
        let mut batch = GovernanceBatch::new();
        batch
            .put_proposal(id, proposal.encode()?)
            .clear_active_proposal(proposal.proposer.clone());
        self.store.commit(batch)?;

        tracing::info!(proposal = id.get(), by = %caller, "proposal cancelled");
        self.emit(GovernanceEvent::ProposalCancelled {
            id,
            by: caller.clone(),
        });
        Ok(())
    }

    // ── Treasury ────────────────────────────────────────────────────────

    /// Record an observed deposit. Returns the new balance.
    pub fn deposit(&self, depositor: &Principal, amount: Amount) -> Result<Amount, GovernanceError> {
        let _guard = self.guard.enter()?;
        check_principal(depositor)?;
        if amount.is_zero() {
            return Err(GovernanceError::ZeroAmount);
        }
        let treasury = self.store.treasury()?;
        let updated = TreasuryRecord {
            balance: treasury
                .balance
                .checked_add(amount)
                .ok_or(GovernanceError::Overflow("treasury balance"))?,
            total_deposited: treasury
                .total_deposited
                .checked_add(amount)
                .ok_or(GovernanceError::Overflow("treasury deposits"))?,
            ..treasury
        };
        let mut batch = GovernanceBatch::new();
        batch.put_treasury(updated);
        self.store.commit(batch)?;

        tracing::info!(%depositor, amount = %amount, balance = %updated.balance, "deposit observed");
        self.emit(GovernanceEvent::DepositObserved {
            depositor: depositor.clone(),
            amount,
            balance: updated.balance,
        });
        Ok(updated.balance)
    }

    // ── Queries ─────────────────────────────────────────────────────────

    pub fn proposal(&self, id: ProposalId) -> Result<Proposal, GovernanceError> {
        self.load(id)
    }

    pub fn tally(&self, id: ProposalId) -> Result<Tally, GovernanceError> {
        Ok(self.load(id)?.tally)
    }

    /// Both quorum rules evaluated against the current weight total. Usable
    /// at any time as a live preview.
    pub fn quorum_preview(&self, id: ProposalId) -> Result<QuorumStatus, GovernanceError> {
        let proposal = self.load(id)?;
        let total = self.weights().total_weight();
        Ok(quorum::evaluate(&proposal.tally, total, &self.params))
    }

    /// Whether the proposal's hard expiry has passed. Status is not changed.
    pub fn is_expired(&self, id: ProposalId) -> Result<bool, GovernanceError> {
        Ok(self.load(id)?.is_expired(self.clock.now()))
    }

    pub fn has_voted(
        &self,
        id: ProposalId,
        class: VoterClass,
        voter: &Principal,
    ) -> Result<bool, GovernanceError> {
        Ok(self.store.has_vote_marker(id, class, voter)?)
    }

    pub fn active_proposal_of(&self, proposer: &Principal) -> Result<Option<ProposalId>, GovernanceError> {
        Ok(self.store.active_proposal_of(proposer)?)
    }

    pub fn proposal_count(&self) -> Result<u64, GovernanceError> {
        Ok(self.store.last_proposal_id()?.get())
    }

    /// Every proposal ever created, in id order.
    pub fn proposals(&self) -> Result<Vec<Proposal>, GovernanceError> {
        self.store
            .iter_proposals()?
            .into_iter()
            .map(|(_, bytes)| Proposal::decode(&bytes))
            .collect()
    }

    pub fn delegate_weight(&self, delegate: &Principal) -> u128 {
        self.weights().weight(delegate)
    }

    pub fn total_delegate_weight(&self) -> u128 {
        self.weights().total_weight()
    }

    pub fn treasury(&self) -> Result<TreasuryRecord, GovernanceError> {
        Ok(self.store.treasury()?)
    }

    pub fn treasury_balance(&self) -> Result<Amount, GovernanceError> {
        Ok(self.store.treasury()?.balance)
    }

    pub fn params(&self) -> &GovernanceParams {
        &self.params
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Take every event recorded since the last drain.
    pub fn drain_events(&self) -> Vec<GovernanceEvent> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(PoisonError::into_inner))
    }

    // ── Helpers ─────────────────────────────────────────────────────────

    fn load(&self, id: ProposalId) -> Result<Proposal, GovernanceError> {
        if id.is_none() {
            return Err(GovernanceError::NotFound(id));
        }
        let bytes = self
            .store
            .get_proposal(id)?
            .ok_or(GovernanceError::NotFound(id))?;
        Proposal::decode(&bytes)
    }

    fn require(&self, principal: &Principal, capability: Capability) -> Result<(), GovernanceError> {
        if self.auth.has_capability(principal, capability) {
            Ok(())
        } else {
            Err(GovernanceError::Unauthorized {
                principal: principal.to_string(),
                needed: capability,
            })
        }
    }

    /// Proposers must be Guardians or Delegates.
    fn require_voter(&self, principal: &Principal) -> Result<(), GovernanceError> {
        if self.auth.has_capability(principal, Capability::Guardian) {
            return Ok(());
        }
        self.require(principal, Capability::Delegate)
    }

    fn weights(&self) -> MutexGuard<'_, DelegateWeightTable> {
        self.weights.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: GovernanceEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

/// Principals become storage keys, so every backend must see the same
/// well-formed identities.
fn check_principal(principal: &Principal) -> Result<(), GovernanceError> {
    if principal.is_valid() {
        Ok(())
    } else {
        Err(GovernanceError::InvalidPrincipal(principal.to_string()))
    }
}
