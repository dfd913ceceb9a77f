//! Database schema versioning.
//!
//! Tracks a monotonically increasing schema version in the meta database and
//! runs sequential migration steps to bring an older database up to date.

use heed::types::Bytes;
use heed::{Database, RwTxn};

use crate::LmdbError;

/// The schema version that the current code expects.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

const SCHEMA_VERSION_KEY: &[u8] = b"schema_version";

/// Read the stored schema version (0 when none has been written).
pub fn stored_version(
    wtxn: &RwTxn<'_>,
    meta_db: Database<Bytes, Bytes>,
) -> Result<u32, LmdbError> {
    match meta_db.get(wtxn, SCHEMA_VERSION_KEY)? {
        Some(bytes) => {
            let buf: [u8; 4] = bytes
                .try_into()
                .map_err(|_| LmdbError::Serialization("invalid schema version bytes".into()))?;
            Ok(u32::from_be_bytes(buf))
        }
        None => Ok(0),
    }
}

/// Check the stored schema version and run any needed migrations inside
/// `wtxn`.
///
/// - Version 0 means a fresh database (no version stored yet).
/// - If the stored version matches [`CURRENT_SCHEMA_VERSION`], this is a no-op.
/// - If the stored version is *higher* than what this code supports, the
///   database was written by a newer release and we refuse to open it.
pub fn migrate(wtxn: &mut RwTxn<'_>, meta_db: Database<Bytes, Bytes>) -> Result<u32, LmdbError> {
    let current = stored_version(wtxn, meta_db)?;

    if current == CURRENT_SCHEMA_VERSION {
        tracing::debug!(version = current, "database schema is up to date");
        return Ok(current);
    }

    if current > CURRENT_SCHEMA_VERSION {
        return Err(LmdbError::SchemaTooNew {
            found: current,
            supported: CURRENT_SCHEMA_VERSION,
        });
    }

    for version in current..CURRENT_SCHEMA_VERSION {
        tracing::info!(from = version, to = version + 1, "running migration");
        run_migration(version, version + 1)?;
    }

    meta_db.put(wtxn, SCHEMA_VERSION_KEY, &CURRENT_SCHEMA_VERSION.to_be_bytes())?;
    tracing::info!(version = CURRENT_SCHEMA_VERSION, "migration complete");
    Ok(CURRENT_SCHEMA_VERSION)
}

fn run_migration(from: u32, to: u32) -> Result<(), LmdbError> {
    match (from, to) {
        // Initial schema: nothing to migrate from a blank slate.
        (0, 1) => Ok(()),
        _ => Err(LmdbError::Heed(format!("unknown migration: {from} -> {to}"))),
    }
}
