//! LMDB implementation of ArtifactStore.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, RoTxn};

use crossgov_store::{ArtifactStore, Reservation, StoreError};
use crossgov_types::{MerkleArtifact, ProposalId, PublicationRecord};

use crate::keys::proposal_key;
use crate::LmdbError;

pub struct LmdbArtifactStore {
    pub(crate) env: Arc<Env>,
    pub(crate) artifacts_db: Database<Bytes, Bytes>,
    pub(crate) publications_db: Database<Bytes, Bytes>,
}

impl LmdbArtifactStore {
    fn put<T: serde::Serialize>(
        &self,
        db: Database<Bytes, Bytes>,
        proposal: &ProposalId,
        value: &T,
    ) -> Result<(), StoreError> {
        let bytes = bincode::serialize(value).map_err(LmdbError::from)?;
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        db.put(&mut wtxn, &proposal_key(proposal)[..], &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn get<T: serde::de::DeserializeOwned>(
        &self,
        db: Database<Bytes, Bytes>,
        proposal: &ProposalId,
    ) -> Result<Option<T>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        read(&rtxn, db, &proposal_key(proposal))
    }
}

/// Decode one entry inside an open transaction.
fn read<T: serde::de::DeserializeOwned>(
    txn: &RoTxn,
    db: Database<Bytes, Bytes>,
    key: &[u8],
) -> Result<Option<T>, StoreError> {
    match db.get(txn, key).map_err(LmdbError::from)? {
        Some(bytes) => Ok(Some(bincode::deserialize(bytes).map_err(LmdbError::from)?)),
        None => Ok(None),
    }
}

impl ArtifactStore for LmdbArtifactStore {
    fn put_artifact(&self, artifact: &MerkleArtifact) -> Result<(), StoreError> {
        self.put(self.artifacts_db, &artifact.proposal_id, artifact)
    }

    fn get_artifact(&self, proposal: &ProposalId) -> Result<Option<MerkleArtifact>, StoreError> {
        self.get(self.artifacts_db, proposal)
    }

    fn put_artifact_unless_published(
        &self,
        artifact: &MerkleArtifact,
    ) -> Result<Option<PublicationRecord>, StoreError> {
        let key = proposal_key(&artifact.proposal_id);
        let bytes = bincode::serialize(artifact).map_err(LmdbError::from)?;
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        if let Some(existing) = read::<PublicationRecord>(&wtxn, self.publications_db, &key)? {
            return Ok(Some(existing));
        }
        self.artifacts_db
            .put(&mut wtxn, &key[..], &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(None)
    }

    fn put_publication(&self, record: &PublicationRecord) -> Result<(), StoreError> {
        self.put(self.publications_db, &record.proposal_id, record)
    }

    fn get_publication(
        &self,
        proposal: &ProposalId,
    ) -> Result<Option<PublicationRecord>, StoreError> {
        self.get(self.publications_db, proposal)
    }

    fn reserve_publication(&self, record: &PublicationRecord) -> Result<Reservation, StoreError> {
        let key = proposal_key(&record.proposal_id);
        let bytes = bincode::serialize(record).map_err(LmdbError::from)?;
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        if let Some(existing) = read::<PublicationRecord>(&wtxn, self.publications_db, &key)? {
            return Ok(Reservation::Exists(existing));
        }
        match read::<MerkleArtifact>(&wtxn, self.artifacts_db, &key)? {
            None => return Ok(Reservation::NotFrozen),
            Some(artifact) if artifact.root != record.root => {
                return Ok(Reservation::RootChanged {
                    current: artifact.root,
                })
            }
            Some(_) => {}
        }
        self.publications_db
            .put(&mut wtxn, &key[..], &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(Reservation::Reserved)
    }

    fn release_publication(&self, proposal: &ProposalId) -> Result<(), StoreError> {
        let key = proposal_key(proposal);
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        match read::<PublicationRecord>(&wtxn, self.publications_db, &key)? {
            Some(record) if !record.is_on_chain_a() => {
                self.publications_db
                    .delete(&mut wtxn, &key[..])
                    .map_err(LmdbError::from)?;
                wtxn.commit().map_err(LmdbError::from)?;
            }
            _ => {}
        }
        Ok(())
    }
}
