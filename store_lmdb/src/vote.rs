//! LMDB implementation of VoteStore.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use crossgov_store::{StoreError, UpsertOutcome, VoteStore};
use crossgov_types::{Address, ProposalId, VoteRecord};

use crate::keys::{proposal_key, vote_key};
use crate::LmdbError;

pub struct LmdbVoteStore {
    pub(crate) env: Arc<Env>,
    pub(crate) votes_db: Database<Bytes, Bytes>,
}

impl VoteStore for LmdbVoteStore {
    fn upsert_vote(&self, record: &VoteRecord) -> Result<UpsertOutcome, StoreError> {
        let key = vote_key(&record.proposal_id, &record.voter);
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;

        let existing: Option<VoteRecord> = match self
            .votes_db
            .get(&wtxn, &key[..])
            .map_err(LmdbError::from)?
        {
            Some(bytes) => Some(bincode::deserialize(bytes).map_err(LmdbError::from)?),
            None => None,
        };

        if let Some(current) = existing {
            if current.nonce >= record.nonce {
                // Dropping the write txn aborts it; nothing was written.
                return Ok(UpsertOutcome::Stale {
                    stored_nonce: current.nonce,
                });
            }
        }

        let bytes = bincode::serialize(record).map_err(LmdbError::from)?;
        self.votes_db
            .put(&mut wtxn, &key[..], &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(UpsertOutcome::Stored)
    }

    fn get_vote(
        &self,
        proposal: &ProposalId,
        voter: &Address,
    ) -> Result<Option<VoteRecord>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let key = vote_key(proposal, voter);
        match self.votes_db.get(&rtxn, &key[..]).map_err(LmdbError::from)? {
            Some(bytes) => Ok(Some(bincode::deserialize(bytes).map_err(LmdbError::from)?)),
            None => Ok(None),
        }
    }

    fn votes_for(&self, proposal: &ProposalId) -> Result<Vec<VoteRecord>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let prefix = proposal_key(proposal);
        let iter = self
            .votes_db
            .prefix_iter(&rtxn, &prefix[..])
            .map_err(LmdbError::from)?;
        let mut votes = Vec::new();
        for result in iter {
            let (_, bytes) = result.map_err(LmdbError::from)?;
            votes.push(bincode::deserialize(bytes).map_err(LmdbError::from)?);
        }
        Ok(votes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LmdbEnvironment;
    use crossgov_types::{Bytes as SigBytes, Support, U256};

    fn temp_env() -> (tempfile::TempDir, LmdbEnvironment) {
        let dir = tempfile::tempdir().unwrap();
        let env = LmdbEnvironment::open(dir.path(), 16 << 20).unwrap();
        (dir, env)
    }

    fn vote(proposal: u64, voter: u8, nonce: u64, support: Support) -> VoteRecord {
        VoteRecord {
            proposal_id: U256::from(proposal),
            voter: Address::from([voter; 20]),
            power: U256::from(10),
            support,
            nonce: U256::from(nonce),
            deadline: U256::from(1_900_000_000u64),
            signature: SigBytes::from(vec![1u8; 65]),
        }
    }

    #[test]
    fn higher_nonce_replaces() {
        let (_dir, env) = temp_env();
        let store = env.vote_store();
        assert_eq!(store.upsert_vote(&vote(1, 0xAA, 1, Support::Yes)).unwrap(), UpsertOutcome::Stored);
        assert_eq!(store.upsert_vote(&vote(1, 0xAA, 2, Support::No)).unwrap(), UpsertOutcome::Stored);

        let votes = store.votes_for(&U256::from(1)).unwrap();
        assert_eq!(votes.len(), 1);
        assert_eq!(votes[0].support, Support::No);
        assert_eq!(votes[0].nonce, U256::from(2));
    }

    #[test]
    fn equal_or_lower_nonce_is_stale() {
        let (_dir, env) = temp_env();
        let store = env.vote_store();
        store.upsert_vote(&vote(1, 0xAA, 5, Support::Yes)).unwrap();

        for nonce in [5, 4] {
            assert_eq!(
                store.upsert_vote(&vote(1, 0xAA, nonce, Support::No)).unwrap(),
                UpsertOutcome::Stale { stored_nonce: U256::from(5) }
            );
        }
        let stored = store.get_vote(&U256::from(1), &Address::from([0xAA; 20])).unwrap().unwrap();
        assert_eq!(stored.support, Support::Yes);
    }

    #[test]
    fn votes_are_scoped_per_proposal() {
        let (_dir, env) = temp_env();
        let store = env.vote_store();
        store.upsert_vote(&vote(1, 0xAA, 1, Support::Yes)).unwrap();
        store.upsert_vote(&vote(1, 0xBB, 1, Support::No)).unwrap();
        store.upsert_vote(&vote(2, 0xAA, 1, Support::Yes)).unwrap();

        assert_eq!(store.votes_for(&U256::from(1)).unwrap().len(), 2);
        assert_eq!(store.votes_for(&U256::from(2)).unwrap().len(), 1);
        assert!(store.votes_for(&U256::from(3)).unwrap().is_empty());
    }

    #[test]
    fn votes_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let env = LmdbEnvironment::open(dir.path(), 16 << 20).unwrap();
            env.vote_store().upsert_vote(&vote(1, 0xAA, 3, Support::Yes)).unwrap();
        }
        let env = LmdbEnvironment::open(dir.path(), 16 << 20).unwrap();
        let stored = env.vote_store().get_vote(&U256::from(1), &Address::from([0xAA; 20])).unwrap();
        assert_eq!(stored.map(|v| v.nonce), Some(U256::from(3)));
    }
}
