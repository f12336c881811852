//! Relayer idempotency ledger.

use crossgov_types::{ExecutionRecord, ProposalId};

use crate::StoreError;

/// Persisted proposal id → executed mapping. Survives restarts.
pub trait ExecutionStore: Send + Sync {
    fn get_execution(&self, proposal: &ProposalId) -> Result<Option<ExecutionRecord>, StoreError>;

    fn put_execution(&self, record: &ExecutionRecord) -> Result<(), StoreError>;
}
