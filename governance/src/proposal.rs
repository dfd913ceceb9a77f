//! Governance proposals and their lifecycle.

use guardian_types::{Amount, GovernanceParams, Principal, ProposalId, Timestamp};
use serde::{Deserialize, Serialize};

use crate::GovernanceError;

/// What a proposal is about. Surfaced to voters; never changes quorum math.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalKind {
    ParameterChange,
    TreasurySpend,
    Emergency,
    GuardianUpdate,
}

impl ProposalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ParameterChange => "parameter_change",
            Self::TreasurySpend => "treasury_spend",
            Self::Emergency => "emergency",
            Self::GuardianUpdate => "guardian_update",
        }
    }
}

/// Lifecycle status.
///
/// ```text
/// Active ──finalize──▶ Queued ──execute──▶ Executed
///   │  └──finalize──▶ Rejected
///   └──cancel──▶ Cancelled ◀──cancel── Queued
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    /// Voting window open (or closed but not yet finalized).
    Active,
    /// Passed both quorums; waiting for the timelock.
    Queued,
    Rejected,
    Executed,
    Cancelled,
}

impl ProposalStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Executed | Self::Cancelled)
    }

    /// Counts towards the one-outstanding-proposal-per-proposer rule.
    pub fn is_outstanding(&self) -> bool {
        matches!(self, Self::Active | Self::Queued)
    }

    /// Whether `next` is a legal successor of `self`.
    pub fn can_transition_to(&self, next: ProposalStatus) -> bool {
        use ProposalStatus::*;
        matches!(
            (self, next),
            (Active, Queued)
                | (Active, Rejected)
                | (Active, Cancelled)
                | (Queued, Executed)
                | (Queued, Cancelled)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Queued => "queued",
            Self::Rejected => "rejected",
            Self::Executed => "executed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// What runs when a proposal executes. An empty payload is a plain value
/// transfer to `target`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub target: Principal,
    pub value: Amount,
    pub payload: Vec<u8>,
}

impl Action {
    pub fn new(target: Principal, value: Amount, payload: Vec<u8>) -> Self {
        Self {
            target,
            value,
            payload,
        }
    }

    /// A payload-less transfer of `value` to `target`.
    pub fn transfer(target: Principal, value: Amount) -> Self {
        Self::new(target, value, Vec::new())
    }

    pub fn is_plain_transfer(&self) -> bool {
        self.payload.is_empty()
    }
}

/// Recorded votes. Only mutated while the proposal is Active.
///
/// Guardian abstentions consume the voter's slot but have no counter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub guardian_for: u32,
    pub guardian_against: u32,
    pub delegate_for: u128,
    pub delegate_against: u128,
    pub delegate_abstain: u128,
}

impl Tally {
    pub fn guardian_votes(&self) -> u32 {
        self.guardian_for.saturating_add(self.guardian_against)
    }

    pub fn delegate_weight_cast(&self) -> u128 {
        self.delegate_for
            .saturating_add(self.delegate_against)
            .saturating_add(self.delegate_abstain)
    }
}

/// A governance proposal. Never deleted; terminal proposals stay for audit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub kind: ProposalKind,
    pub proposer: Principal,
    /// Free-form description, opaque to the engine.
    pub narrative: String,
    pub action: Action,
    pub created_at: Timestamp,
    /// Last instant at which votes are accepted (inclusive).
    pub voting_ends_at: Timestamp,
    /// Set exactly when status is Queued or Executed.
    pub executable_after: Option<Timestamp>,
    /// Execution strictly after this instant fails.
    pub expires_at: Timestamp,
    pub tally: Tally,
    pub status: ProposalStatus,
    /// Fixed at creation; selects the shortened timelock.
    pub emergency: bool,
}

impl Proposal {
    /// A fresh Active proposal created at `now`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: ProposalId,
        kind: ProposalKind,
        proposer: Principal,
        narrative: String,
        action: Action,
        emergency: bool,
        now: Timestamp,
        params: &GovernanceParams,
    ) -> Result<Self, GovernanceError> {
        let voting_ends_at = now
            .checked_add_secs(params.voting_period_secs)
            .ok_or(GovernanceError::Overflow("voting window end"))?;
        let expires_at = now
            .checked_add_secs(params.expiry_period_secs)
            .ok_or(GovernanceError::Overflow("expiry time"))?;
        Ok(Self {
            id,
            kind,
            proposer,
            narrative,
            action,
            created_at: now,
            voting_ends_at,
            executable_after: None,
            expires_at,
            tally: Tally::default(),
            status: ProposalStatus::Active,
            emergency,
        })
    }

    pub fn is_voting_open(&self, now: Timestamp) -> bool {
        now <= self.voting_ends_at
    }

    /// Lazy expiry: a proposal past its expiry keeps its status.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        now > self.expires_at
    }

    pub fn encode(&self) -> Result<Vec<u8>, GovernanceError> {
        bincode::serialize(self).map_err(|e| GovernanceError::Codec(e.to_string()))
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, GovernanceError> {
        bincode::deserialize(bytes).map_err(|e| GovernanceError::Codec(e.to_string()))
    }
}
