//! LMDB storage backend for the Guardian governance engine.
//!
//! Implements [`guardian_store::GovernanceStore`] using the `heed` LMDB
//! bindings. Each logical table maps to one named database within a single
//! environment, and every [`guardian_store::GovernanceBatch`] is applied in one
//! LMDB write transaction.

pub mod environment;
pub mod error;
pub mod governance;
pub mod integrity;
pub mod migration;

pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use governance::LmdbGovernanceStore;
pub use integrity::{check_data_dir, check_integrity, IntegrityReport};
pub use migration::CURRENT_SCHEMA_VERSION;
