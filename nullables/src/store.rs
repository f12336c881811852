//! Nullable store: thread-safe in-memory storage for testing.

use crossgov_store::{
    ArtifactStore, CheckpointStore, ExecutionStore, Reservation, StoreError, UpsertOutcome,
    VoteStore,
};
use crossgov_types::{
    Address, ExecutionRecord, MerkleArtifact, ProposalId, PublicationRecord, VoteRecord,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

/// An in-memory implementation of every store trait.
/// Thread-safe for use with tokio's multi-threaded runtime.
///
/// Operations touching both artifact maps lock `publications` first.
pub struct NullStore {
    votes: Mutex<HashMap<ProposalId, BTreeMap<Address, VoteRecord>>>,
    artifacts: Mutex<HashMap<ProposalId, MerkleArtifact>>,
    publications: Mutex<HashMap<ProposalId, PublicationRecord>>,
    executions: Mutex<HashMap<ProposalId, ExecutionRecord>>,
    checkpoint: Mutex<Option<u64>>,
}

impl NullStore {
    pub fn new() -> Self {
        Self {
            votes: Mutex::new(HashMap::new()),
            artifacts: Mutex::new(HashMap::new()),
            publications: Mutex::new(HashMap::new()),
            executions: Mutex::new(HashMap::new()),
            checkpoint: Mutex::new(None),
        }
    }

    /// Number of execution ledger entries.
    pub fn execution_count(&self) -> usize {
        self.executions.lock().unwrap().len()
    }
}

impl Default for NullStore {
    fn default() -> Self {
        Self::new()
    }
}

impl VoteStore for NullStore {
    fn upsert_vote(&self, record: &VoteRecord) -> Result<UpsertOutcome, StoreError> {
        let mut votes = self.votes.lock().unwrap();
        let per_proposal = votes.entry(record.proposal_id).or_default();
        if let Some(existing) = per_proposal.get(&record.voter) {
            if existing.nonce >= record.nonce {
                return Ok(UpsertOutcome::Stale {
                    stored_nonce: existing.nonce,
                });
            }
        }
        per_proposal.insert(record.voter, record.clone());
        Ok(UpsertOutcome::Stored)
    }

    fn get_vote(
        &self,
        proposal: &ProposalId,
        voter: &Address,
    ) -> Result<Option<VoteRecord>, StoreError> {
        Ok(self
            .votes
            .lock()
            .unwrap()
            .get(proposal)
            .and_then(|m| m.get(voter))
            .cloned())
    }

    fn votes_for(&self, proposal: &ProposalId) -> Result<Vec<VoteRecord>, StoreError> {
        Ok(self
            .votes
            .lock()
            .unwrap()
            .get(proposal)
            .map(|m| m.values().cloned().collect())
            .unwrap_or_default())
    }
}

impl ArtifactStore for NullStore {
    fn put_artifact(&self, artifact: &MerkleArtifact) -> Result<(), StoreError> {
        self.artifacts
            .lock()
            .unwrap()
            .insert(artifact.proposal_id, artifact.clone());
        Ok(())
    }

    fn get_artifact(&self, proposal: &ProposalId) -> Result<Option<MerkleArtifact>, StoreError> {
        Ok(self.artifacts.lock().unwrap().get(proposal).cloned())
    }

    fn put_artifact_unless_published(
        &self,
        artifact: &MerkleArtifact,
    ) -> Result<Option<PublicationRecord>, StoreError> {
        let publications = self.publications.lock().unwrap();
        if let Some(existing) = publications.get(&artifact.proposal_id) {
            return Ok(Some(existing.clone()));
        }
        self.artifacts
            .lock()
            .unwrap()
            .insert(artifact.proposal_id, artifact.clone());
        Ok(None)
    }

    fn put_publication(&self, record: &PublicationRecord) -> Result<(), StoreError> {
        self.publications
            .lock()
            .unwrap()
            .insert(record.proposal_id, record.clone());
        Ok(())
    }

    fn get_publication(
        &self,
        proposal: &ProposalId,
    ) -> Result<Option<PublicationRecord>, StoreError> {
        Ok(self.publications.lock().unwrap().get(proposal).cloned())
    }

    fn reserve_publication(&self, record: &PublicationRecord) -> Result<Reservation, StoreError> {
        let mut publications = self.publications.lock().unwrap();
        if let Some(existing) = publications.get(&record.proposal_id) {
            return Ok(Reservation::Exists(existing.clone()));
        }
        match self.artifacts.lock().unwrap().get(&record.proposal_id) {
            None => return Ok(Reservation::NotFrozen),
            Some(artifact) if artifact.root != record.root => {
                return Ok(Reservation::RootChanged {
                    current: artifact.root,
                })
            }
            Some(_) => {}
        }
        publications.insert(record.proposal_id, record.clone());
        Ok(Reservation::Reserved)
    }

    fn release_publication(&self, proposal: &ProposalId) -> Result<(), StoreError> {
        let mut publications = self.publications.lock().unwrap();
        if publications.get(proposal).is_some_and(|r| !r.is_on_chain_a()) {
            publications.remove(proposal);
        }
        Ok(())
    }
}

impl ExecutionStore for NullStore {
    fn get_execution(&self, proposal: &ProposalId) -> Result<Option<ExecutionRecord>, StoreError> {
        Ok(self.executions.lock().unwrap().get(proposal).cloned())
    }

    fn put_execution(&self, record: &ExecutionRecord) -> Result<(), StoreError> {
        self.executions
            .lock()
            .unwrap()
            .insert(record.proposal_id, record.clone());
        Ok(())
    }
}

impl CheckpointStore for NullStore {
    fn get_checkpoint(&self) -> Result<Option<u64>, StoreError> {
        Ok(*self.checkpoint.lock().unwrap())
    }

    fn put_checkpoint(&self, block: u64) -> Result<(), StoreError> {
        *self.checkpoint.lock().unwrap() = Some(block);
        Ok(())
    }
}
