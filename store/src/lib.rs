//! Abstract storage traits for the Guardian governance engine.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The engine depends only on the traits.
//!
//! Reads are individual calls; writes are grouped into a [`GovernanceBatch`]
//! and applied with [`GovernanceStore::commit`], which is all-or-nothing.

pub mod batch;
pub mod error;
pub mod governance;

pub use batch::{GovernanceBatch, Mutation};
pub use error::StoreError;
pub use governance::{GovernanceStore, TreasuryRecord};
