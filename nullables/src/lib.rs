//! Nullable infrastructure for deterministic testing.
//!
//! Inspired by the "A-frame architecture" pattern from RsNano.
//! Every external collaborator of the governance engine (clock,
//! authorization, action executor, storage) is abstracted behind a trait.
//! This crate provides test-friendly implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod authorization;
pub mod clock;
pub mod executor;
pub mod store;

pub use authorization::NullAuthorization;
pub use clock::NullClock;
pub use executor::NullExecutor;
pub use store::NullGovernanceStore;
