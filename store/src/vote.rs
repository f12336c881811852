//! Vote ledger storage.

use crossgov_types::{Address, ProposalId, VoteRecord, U256};

use crate::StoreError;

/// Result of offering a vote to the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// The record was stored (first vote, or strictly higher nonce).
    Stored,
    /// A record with an equal or higher nonce already exists; nothing changed.
    Stale { stored_nonce: U256 },
}

/// One current vote per (proposal, voter).
///
/// Implementations must make [`VoteStore::upsert_vote`] atomic: the nonce
/// comparison and the replacement happen under one write lock or
/// transaction, and [`VoteStore::votes_for`] must never observe a
/// half-applied upsert.
pub trait VoteStore: Send + Sync {
    /// Store `record` unless the existing record for the same voter has a
    /// nonce greater than or equal to `record.nonce`.
    fn upsert_vote(&self, record: &VoteRecord) -> Result<UpsertOutcome, StoreError>;

    /// The current vote of `voter` on `proposal`, if any.
    fn get_vote(
        &self,
        proposal: &ProposalId,
        voter: &Address,
    ) -> Result<Option<VoteRecord>, StoreError>;

    /// Consistent snapshot of every current vote on `proposal`.
    fn votes_for(&self, proposal: &ProposalId) -> Result<Vec<VoteRecord>, StoreError>;
}
