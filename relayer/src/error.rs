use crossgov_chain::ChainError;
use crossgov_store::StoreError;
use crossgov_types::{ProposalId, H256};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("proposal {0} has not been frozen")]
    NotFrozen(ProposalId),

    #[error("proposal {0} has no Chain A publication to resume from")]
    NotPublished(ProposalId),

    /// Phase 1 is reserved or done but Chain B has not been mirrored.
    #[error("proposal {proposal_id} has a publication in progress (Chain A tx {chain_a_tx:?}); resume it")]
    PendingMirror {
        proposal_id: ProposalId,
        chain_a_tx: Option<H256>,
    },

    /// The proposal was re-frozen between reading the artifact and
    /// reserving its publication, or Chain A holds another root.
    #[error("proposal {proposal_id} root changed from {expected:?} to {found:?}")]
    RootChanged {
        proposal_id: ProposalId,
        expected: H256,
        found: H256,
    },

    #[error("proposal {0} is already published on both chains")]
    AlreadyPublished(ProposalId),

    #[error("Chain A publishRoot reverted in {tx:?}")]
    ChainAPublishFailed { tx: H256 },

    /// `publishRoot` may or may not have landed. The reservation is kept.
    #[error("Chain A publishRoot for proposal {proposal_id} is unconfirmed: {reason}; resume to reconcile")]
    ChainAUnconfirmed {
        proposal_id: ProposalId,
        reason: String,
    },

    /// Root is on Chain A but not mirrored to Chain B.
    #[error("Chain B mirror failed after Chain A tx {chain_a_tx:?}: {reason}")]
    ChainBMirrorFailed {
        chain_a_tx: Option<H256>,
        reason: String,
    },

    #[error("chain: {0}")]
    Chain(#[from] ChainError),

    #[error("store: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum RelayError {
    /// The emitted hash differs from Chain A's record. Never executed.
    #[error(
        "action hash mismatch for proposal {proposal_id}: emitted {emitted:?}, Chain A has {authoritative:?}"
    )]
    HashMismatch {
        proposal_id: ProposalId,
        emitted: H256,
        authoritative: H256,
    },

    #[error("no action payload configured for proposal {0}")]
    UnknownAction(ProposalId),

    #[error(
        "configured payload for proposal {proposal_id} hashes to {configured:?}, Chain A has {authoritative:?}"
    )]
    PayloadHashMismatch {
        proposal_id: ProposalId,
        configured: H256,
        authoritative: H256,
    },

    #[error("commitAction reverted in {tx:?}")]
    CommitReverted { tx: H256 },

    #[error("executeIfAuthorized reverted in {tx:?}")]
    ExecutionReverted { tx: H256 },

    #[error("invalid action: {0}")]
    InvalidAction(String),

    #[error("chain: {0}")]
    Chain(#[from] ChainError),

    #[error("store: {0}")]
    Store(#[from] StoreError),
}

impl RelayError {
    /// Transient failures; the event range is replayed later.
    /// Everything else needs an operator and is not retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RelayError::Chain(_) | RelayError::Store(_))
    }
}
