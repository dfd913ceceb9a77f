//! LMDB implementation of GovernanceStore.

use heed::types::Bytes;
use heed::{Database, Env, RwTxn};

use guardian_store::{GovernanceBatch, GovernanceStore, Mutation, StoreError, TreasuryRecord};
use guardian_types::{Principal, ProposalId, VoterClass};

use crate::LmdbError;

const LAST_PROPOSAL_ID_KEY: &[u8] = b"last_proposal_id";
const TOTAL_WEIGHT_KEY: &[u8] = b"total_weight";
const TREASURY_KEY: &[u8] = b"treasury";

pub struct LmdbGovernanceStore {
    pub(crate) env: Env,
    pub(crate) proposals_db: Database<Bytes, Bytes>,
    pub(crate) markers_db: Database<Bytes, Bytes>,
    pub(crate) active_db: Database<Bytes, Bytes>,
    pub(crate) weights_db: Database<Bytes, Bytes>,
    pub(crate) meta_db: Database<Bytes, Bytes>,
}

/// `id (8 bytes BE) ++ class tag ++ voter`.
fn marker_key(id: ProposalId, class: VoterClass, voter: &Principal) -> Vec<u8> {
    let mut key = Vec::with_capacity(9 + voter.as_str().len());
    key.extend_from_slice(&id.to_be_bytes());
    key.push(class.tag());
    key.extend_from_slice(voter.as_str().as_bytes());
    key
}

fn decode_u64(bytes: &[u8], what: &str) -> Result<u64, LmdbError> {
    let buf: [u8; 8] = bytes
        .try_into()
        .map_err(|_| LmdbError::Serialization(format!("invalid {what} bytes length")))?;
    Ok(u64::from_be_bytes(buf))
}

fn decode_u128(bytes: &[u8], what: &str) -> Result<u128, LmdbError> {
    let buf: [u8; 16] = bytes
        .try_into()
        .map_err(|_| LmdbError::Serialization(format!("invalid {what} bytes length")))?;
    Ok(u128::from_be_bytes(buf))
}

impl LmdbGovernanceStore {
    fn apply(&self, wtxn: &mut RwTxn<'_>, op: &Mutation) -> Result<(), LmdbError> {
        match op {
            Mutation::PutProposal { id, data } => {
                self.proposals_db.put(wtxn, &id.to_be_bytes(), data)?;
            }
            Mutation::SetLastProposalId(id) => {
                self.meta_db
                    .put(wtxn, LAST_PROPOSAL_ID_KEY, &id.to_be_bytes())?;
            }
            Mutation::PutVoteMarker { id, class, voter } => {
                self.markers_db
                    .put(wtxn, &marker_key(*id, *class, voter), &[])?;
            }
            Mutation::SetActiveProposal { proposer, id } => {
                self.active_db
                    .put(wtxn, proposer.as_str().as_bytes(), &id.to_be_bytes())?;
            }
            Mutation::ClearActiveProposal { proposer } => {
                self.active_db.delete(wtxn, proposer.as_str().as_bytes())?;
            }
            Mutation::PutWeight { delegate, weight } => {
                let key = delegate.as_str().as_bytes();
                if *weight == 0 {
                    self.weights_db.delete(wtxn, key)?;
                } else {
                    self.weights_db.put(wtxn, key, &weight.to_be_bytes())?;
                }
            }
            Mutation::SetTotalWeight(total) => {
                self.meta_db.put(wtxn, TOTAL_WEIGHT_KEY, &total.to_be_bytes())?;
            }
            Mutation::PutTreasury(record) => {
                let bytes = bincode::serialize(record)
                    .map_err(|e| LmdbError::Serialization(e.to_string()))?;
                self.meta_db.put(wtxn, TREASURY_KEY, &bytes)?;
            }
        }
        Ok(())
    }
}

impl GovernanceStore for LmdbGovernanceStore {
    fn get_proposal(&self, id: ProposalId) -> Result<Option<Vec<u8>>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let value = self
            .proposals_db
            .get(&rtxn, &id.to_be_bytes())
            .map_err(LmdbError::from)?;
        Ok(value.map(|bytes| bytes.to_vec()))
    }

    fn iter_proposals(&self) -> Result<Vec<(ProposalId, Vec<u8>)>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let iter = self.proposals_db.iter(&rtxn).map_err(LmdbError::from)?;
        let mut results = Vec::new();
        for entry in iter {
            let (key, val) = entry.map_err(LmdbError::from)?;
            let id = ProposalId::new(decode_u64(key, "proposal id")?);
            results.push((id, val.to_vec()));
        }
        Ok(results)
    }

    fn last_proposal_id(&self) -> Result<ProposalId, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        match self
            .meta_db
            .get(&rtxn, LAST_PROPOSAL_ID_KEY)
            .map_err(LmdbError::from)?
        {
            Some(bytes) => Ok(ProposalId::new(decode_u64(bytes, "last proposal id")?)),
            None => Ok(ProposalId::NONE),
        }
    }

    fn has_vote_marker(
        &self,
        id: ProposalId,
        class: VoterClass,
        voter: &Principal,
    ) -> Result<bool, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let found = self
            .markers_db
            .get(&rtxn, &marker_key(id, class, voter))
            .map_err(LmdbError::from)?;
        Ok(found.is_some())
    }

    fn active_proposal_of(&self, proposer: &Principal) -> Result<Option<ProposalId>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        match self
            .active_db
            .get(&rtxn, proposer.as_str().as_bytes())
            .map_err(LmdbError::from)?
        {
            Some(bytes) => Ok(Some(ProposalId::new(decode_u64(bytes, "active proposal")?))),
            None => Ok(None),
        }
    }

    fn iter_weights(&self) -> Result<Vec<(Principal, u128)>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let iter = self.weights_db.iter(&rtxn).map_err(LmdbError::from)?;
        let mut results = Vec::new();
        for entry in iter {
            let (key, val) = entry.map_err(LmdbError::from)?;
            let name = std::str::from_utf8(key)
                .map_err(|e| LmdbError::Serialization(e.to_string()))?;
            results.push((Principal::new(name), decode_u128(val, "weight")?));
        }
        Ok(results)
    }

    fn total_weight(&self) -> Result<u128, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        match self
            .meta_db
            .get(&rtxn, TOTAL_WEIGHT_KEY)
            .map_err(LmdbError::from)?
        {
            Some(bytes) => Ok(decode_u128(bytes, "total weight")?),
            None => Ok(0),
        }
    }

    fn treasury(&self) -> Result<TreasuryRecord, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        match self.meta_db.get(&rtxn, TREASURY_KEY).map_err(LmdbError::from)? {
            Some(bytes) => bincode::deserialize(bytes)
                .map_err(|e| StoreError::Serialization(e.to_string())),
            None => Ok(TreasuryRecord::default()),
        }
    }

    fn commit(&self, batch: GovernanceBatch) -> Result<(), StoreError> {
        if batch.is_empty() {
            return Ok(());
        }
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        for op in batch.iter() {
            // An early return drops `wtxn`, which aborts the transaction.
            self.apply(&mut wtxn, op)?;
        }
        wtxn.commit().map_err(LmdbError::from)?;
        tracing::trace!(ops = batch.len(), "committed governance batch");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guardian_types::Amount;

    fn open_test_env() -> (tempfile::TempDir, crate::LmdbEnvironment) {
        let dir = tempfile::tempdir().unwrap();
        let env = crate::LmdbEnvironment::open(dir.path(), 8, 1 << 20).unwrap();
        (dir, env)
    }

    #[test]
    fn empty_store_reads_defaults() {
        let (_dir, env) = open_test_env();
        let store = env.governance_store();
        assert_eq!(store.last_proposal_id().unwrap(), ProposalId::NONE);
        assert_eq!(store.total_weight().unwrap(), 0);
        assert_eq!(store.treasury().unwrap(), TreasuryRecord::default());
        assert!(store.get_proposal(ProposalId::new(1)).unwrap().is_none());
        assert!(store.iter_weights().unwrap().is_empty());
    }

    #[test]
    fn batch_is_applied_together() {
        let (_dir, env) = open_test_env();
        let store = env.governance_store();
        let id = ProposalId::new(1);
        let alice = Principal::new("alice");

        let mut batch = GovernanceBatch::new();
        batch
            .put_proposal(id, b"encoded".to_vec())
            .set_last_proposal_id(id)
            .set_active_proposal(alice.clone(), id)
            .put_vote_marker(id, VoterClass::Guardian, alice.clone());
        store.commit(batch).unwrap();

        assert_eq!(store.get_proposal(id).unwrap().unwrap(), b"encoded");
        assert_eq!(store.last_proposal_id().unwrap(), id);
        assert_eq!(store.active_proposal_of(&alice).unwrap(), Some(id));
        assert!(store.has_vote_marker(id, VoterClass::Guardian, &alice).unwrap());
    }

    #[test]
    fn vote_marker_namespaces_are_independent() {
        let (_dir, env) = open_test_env();
        let store = env.governance_store();
        let id = ProposalId::new(3);
        let dual = Principal::new("dual_role");

        let mut batch = GovernanceBatch::new();
        batch.put_vote_marker(id, VoterClass::Guardian, dual.clone());
        store.commit(batch).unwrap();

        assert!(store.has_vote_marker(id, VoterClass::Guardian, &dual).unwrap());
        assert!(!store.has_vote_marker(id, VoterClass::Delegate, &dual).unwrap());
        assert!(!store
            .has_vote_marker(ProposalId::new(4), VoterClass::Guardian, &dual)
            .unwrap());
    }

    #[test]
    fn clearing_active_proposal_removes_index() {
        let (_dir, env) = open_test_env();
        let store = env.governance_store();
        let bob = Principal::new("bob");

        let mut batch = GovernanceBatch::new();
        batch.set_active_proposal(bob.clone(), ProposalId::new(9));
        store.commit(batch).unwrap();

        let mut batch = GovernanceBatch::new();
        batch.clear_active_proposal(bob.clone());
        store.commit(batch).unwrap();

        assert_eq!(store.active_proposal_of(&bob).unwrap(), None);
    }

    #[test]
    fn zero_weight_deletes_entry() {
        let (_dir, env) = open_test_env();
        let store = env.governance_store();
        let carol = Principal::new("carol");
        let dave = Principal::new("dave");

        let mut batch = GovernanceBatch::new();
        batch
            .put_weight(carol.clone(), 600)
            .put_weight(dave.clone(), 400)
            .set_total_weight(1000);
        store.commit(batch).unwrap();
        assert_eq!(store.iter_weights().unwrap().len(), 2);
        assert_eq!(store.total_weight().unwrap(), 1000);

        let mut batch = GovernanceBatch::new();
        batch.put_weight(carol, 0).set_total_weight(400);
        store.commit(batch).unwrap();

        assert_eq!(store.iter_weights().unwrap(), vec![(dave, 400)]);
        assert_eq!(store.total_weight().unwrap(), 400);
    }

    #[test]
    fn treasury_record_persists() {
        let (_dir, env) = open_test_env();
        let store = env.governance_store();
        let record = TreasuryRecord {
            balance: Amount::new(750),
            total_deposited: Amount::new(1000),
            total_withdrawn: Amount::new(250),
        };
        let mut batch = GovernanceBatch::new();
        batch.put_treasury(record);
        store.commit(batch).unwrap();
        assert_eq!(store.treasury().unwrap(), record);
    }

    #[test]
    fn proposals_iterate_in_id_order() {
        let (_dir, env) = open_test_env();
        let store = env.governance_store();
        let mut batch = GovernanceBatch::new();
        for raw in [3u64, 1, 256, 2] {
            batch.put_proposal(ProposalId::new(raw), vec![raw as u8]);
        }
        store.commit(batch).unwrap();

        let ids: Vec<u64> = store
            .iter_proposals()
            .unwrap()
            .into_iter()
            .map(|(id, _)| id.get())
            .collect();
        assert_eq!(ids, vec![1, 2, 3, 256]);
    }

    #[test]
    fn reopened_environment_keeps_state() {
        let dir = tempfile::tempdir().unwrap();
        let id = ProposalId::new(1);
        {
            let env = crate::LmdbEnvironment::open(dir.path(), 8, 1 << 20).unwrap();
            let store = env.governance_store();
            let mut batch = GovernanceBatch::new();
            batch.put_proposal(id, vec![7]).set_last_proposal_id(id);
            store.commit(batch).unwrap();
        }
        let env = crate::LmdbEnvironment::open(dir.path(), 8, 1 << 20).unwrap();
        let store = env.governance_store();
        assert_eq!(store.last_proposal_id().unwrap(), id);
        assert_eq!(store.get_proposal(id).unwrap(), Some(vec![7]));
    }
}
