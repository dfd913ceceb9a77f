//! LMDB environment setup.

use std::path::Path;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};

use crate::governance::LmdbGovernanceStore;
use crate::LmdbError;

/// Names of every database the governance store creates.
pub const DATABASE_NAMES: &[&str] = &["proposals", "vote_markers", "active_proposals", "weights", "meta"];

/// Wraps the LMDB environment and all database handles.
pub struct LmdbEnvironment {
    env: Env,
    pub(crate) proposals_db: Database<Bytes, Bytes>,
    pub(crate) markers_db: Database<Bytes, Bytes>,
    pub(crate) active_db: Database<Bytes, Bytes>,
    pub(crate) weights_db: Database<Bytes, Bytes>,
    pub(crate) meta_db: Database<Bytes, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given path.
    ///
    /// The directory is created if missing. `max_dbs` must be at least
    /// `DATABASE_NAMES.len()`.
    pub fn open(path: &Path, max_dbs: u32, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)?;

        // SAFETY: the environment is opened once per path by this process and
        // the memory map is never shared with code that truncates the file.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(max_dbs)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let proposals_db = env.create_database(&mut wtxn, Some("proposals"))?;
        let markers_db = env.create_database(&mut wtxn, Some("vote_markers"))?;
        let active_db = env.create_database(&mut wtxn, Some("active_proposals"))?;
        let weights_db = env.create_database(&mut wtxn, Some("weights"))?;
        let meta_db = env.create_database(&mut wtxn, Some("meta"))?;
        let schema_version = crate::migration::migrate(&mut wtxn, meta_db)?;
        wtxn.commit()?;

        tracing::info!(
            path = %path.display(),
            map_size,
            schema_version,
            "opened LMDB environment"
        );

        Ok(Self {
            env,
            proposals_db,
            markers_db,
            active_db,
            weights_db,
            meta_db,
        })
    }

    /// The raw heed environment.
    pub fn env(&self) -> &Env {
        &self.env
    }

    /// A governance store handle backed by this environment.
    pub fn governance_store(&self) -> LmdbGovernanceStore {
        LmdbGovernanceStore {
            env: self.env.clone(),
            proposals_db: self.proposals_db,
            markers_db: self.markers_db,
            active_db: self.active_db,
            weights_db: self.weights_db,
            meta_db: self.meta_db,
        }
    }
}
