//! Frozen artifact storage, keyed per proposal.
//!
//! Freezing and publishing may run in different processes against the same
//! database, so the check-then-write steps between them are store
//! operations that backends run as one transaction.

use crossgov_types::{MerkleArtifact, ProposalId, PublicationRecord, H256};

use crate::StoreError;

/// Outcome of [`ArtifactStore::reserve_publication`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reservation {
    /// The record was written; freezes of the proposal are now refused.
    Reserved,
    /// A publication is already reserved or complete.
    Exists(PublicationRecord),
    /// No artifact is stored for the proposal.
    NotFrozen,
    /// The stored artifact was re-frozen after the caller read it.
    RootChanged { current: H256 },
}

pub trait ArtifactStore: Send + Sync {
    fn put_artifact(&self, artifact: &MerkleArtifact) -> Result<(), StoreError>;

    fn get_artifact(&self, proposal: &ProposalId) -> Result<Option<MerkleArtifact>, StoreError>;

    /// Store `artifact` unless its proposal has a publication record.
    /// Returns that record, untouched, when one exists.
    fn put_artifact_unless_published(
        &self,
        artifact: &MerkleArtifact,
    ) -> Result<Option<PublicationRecord>, StoreError>;

    /// Record (or update) cross-chain publication progress.
    fn put_publication(&self, record: &PublicationRecord) -> Result<(), StoreError>;

    fn get_publication(
        &self,
        proposal: &ProposalId,
    ) -> Result<Option<PublicationRecord>, StoreError>;

    /// Write `record` only if no publication exists yet and the stored
    /// artifact still has `record.root`.
    fn reserve_publication(&self, record: &PublicationRecord) -> Result<Reservation, StoreError>;

    /// Drop a reservation that never reached Chain A. Records with a
    /// Chain A transaction are kept.
    fn release_publication(&self, proposal: &ProposalId) -> Result<(), StoreError>;
}
