//! Guardian governance engine.
//!
//! Guardians (a fixed roster, one vote each) and Delegates (weighted) vote on
//! proposals. A proposal passes only if both quorum rules hold:
//! - at least 7 Guardian For votes;
//! - delegate For weight of at least 51% of all assigned delegate weight.
//!
//! Passed proposals are queued behind a timelock (48h, or 24h for emergency
//! proposals) and may be executed until they expire 14 days after creation.
//! Expiry is evaluated lazily: nothing moves a proposal out of Queued except
//! `execute` or `cancel`.

pub mod collaborators;
pub mod engine;
pub mod error;
pub mod events;
pub mod guard;
pub mod proposal;
pub mod quorum;
pub mod voting;
pub mod weights;

pub use collaborators::{ActionExecutor, ActionFailure, Authorization, Clock, SystemClock};
pub use engine::GovernanceEngine;
pub use error::GovernanceError;
pub use events::GovernanceEvent;
pub use guard::ReentrancyGuard;
pub use proposal::{Action, Proposal, ProposalKind, ProposalStatus, Tally};
pub use quorum::QuorumStatus;
pub use voting::VoteValue;
pub use weights::{DelegateWeightTable, WeightChange};
