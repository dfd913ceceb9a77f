//! LMDB database integrity checks.
//!
//! Run on startup to detect corruption early, before the engine accepts any
//! operation.

use std::path::Path;

use guardian_store::GovernanceStore;

use crate::environment::DATABASE_NAMES;
use crate::{LmdbEnvironment, LmdbError};

/// Summary of an integrity check run.
#[derive(Debug, Default)]
pub struct IntegrityReport {
    pub databases_checked: u32,
    pub total_entries: u64,
    pub errors: Vec<String>,
}

impl IntegrityReport {
    /// Returns `true` if no errors were detected.
    pub fn is_healthy(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Check LMDB database integrity on startup.
///
/// Counts the entries of every governance database, then cross-checks the
/// derived records: the stored total delegate weight must equal the sum of
/// the weight entries, and every active-proposal index entry must point at a
/// stored proposal. Findings are recorded in the report rather than causing a
/// hard error.
pub fn check_integrity(lmdb: &LmdbEnvironment) -> Result<IntegrityReport, LmdbError> {
    let mut report = IntegrityReport::default();
    let env = lmdb.env();

    {
        let rtxn = env.read_txn()?;
        for &db_name in DATABASE_NAMES {
            match env.open_database::<heed::types::Bytes, heed::types::Bytes>(&rtxn, Some(db_name)) {
                Ok(Some(db)) => {
                    report.databases_checked += 1;
                    match db.len(&rtxn) {
                        Ok(count) => report.total_entries += count,
                        Err(e) => report
                            .errors
                            .push(format!("failed to read database '{db_name}': {e}")),
                    }
                }
                Ok(None) => report.errors.push(format!("database '{db_name}' is missing")),
                Err(e) => report
                    .errors
                    .push(format!("failed to open database '{db_name}': {e}")),
            }
        }
    }

    let store = lmdb.governance_store();
    match (store.iter_weights(), store.total_weight()) {
        (Ok(weights), Ok(total)) => {
            let sum = weights
                .iter()
                .try_fold(0u128, |acc, (_, w)| acc.checked_add(*w));
            if sum != Some(total) {
                report.errors.push(format!(
                    "stored total weight {total} does not match sum of entries {sum:?}"
                ));
            }
        }
        (Err(e), _) | (_, Err(e)) => report
            .errors
            .push(format!("failed to read delegate weights: {e}")),
    }

    let rtxn = env.read_txn()?;
    let iter = lmdb.active_db.iter(&rtxn)?;
    for entry in iter {
        let (proposer, id_bytes) = entry?;
        let proposer = String::from_utf8_lossy(proposer);
        let exists = lmdb.proposals_db.get(&rtxn, id_bytes)?.is_some();
        if !exists {
            report.errors.push(format!(
                "active proposal index for '{proposer}' points at a missing proposal"
            ));
        }
    }

    if report.is_healthy() {
        tracing::debug!(
            databases = report.databases_checked,
            entries = report.total_entries,
            "LMDB integrity check passed"
        );
    } else {
        tracing::warn!(errors = report.errors.len(), "LMDB integrity check found problems");
    }

    Ok(report)
}

/// Check if the LMDB data directory looks valid before opening.
///
/// Returns `Ok(())` for a fresh (nonexistent) directory. Returns an error
/// if the directory exists but `data.mdb` is missing, which suggests
/// corruption or misconfiguration.
pub fn check_data_dir(path: &Path) -> Result<(), String> {
    if !path.exists() {
        return Ok(());
    }
    let data_file = path.join("data.mdb");
    if !data_file.exists() {
        return Err(format!(
            "LMDB directory exists but data.mdb is missing at {}",
            path.display()
        ));
    }
    Ok(())
}
