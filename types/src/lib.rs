//! Fundamental types for the Guardian governance engine.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! principals, amounts, timestamps, proposal identities, capabilities, and the
//! governance policy parameters.

pub mod amount;
pub mod capability;
pub mod error;
pub mod id;
pub mod params;
pub mod principal;
pub mod time;

pub use amount::Amount;
pub use capability::{Capability, VoterClass};
pub use error::TypesError;
pub use id::ProposalId;
pub use params::GovernanceParams;
pub use principal::Principal;
pub use time::Timestamp;
