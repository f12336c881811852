use crossgov_chain::ChainError;
use crossgov_crypto::SignatureError;
use crossgov_merkle::MerkleError;
use crossgov_store::StoreError;
use crossgov_types::{ProposalId, H256};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GovernanceError {
    /// Malformed or out-of-policy request. Never retried.
    #[error("{0}")]
    Validation(String),

    #[error("bad signature: {0}")]
    BadSignature(#[from] SignatureError),

    /// A chain read failed. The caller may retry.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("no votes recorded for proposal {0}")]
    NoVotes(ProposalId),

    #[error("proposal {0} has not been frozen")]
    NotFrozen(ProposalId),

    #[error("proposal {proposal_id} already published with root {root:?}")]
    AlreadyPublished { proposal_id: ProposalId, root: H256 },

    #[error("voting power overflow")]
    PowerOverflow,

    #[error("frozen artifact for proposal {0} does not match its leaves")]
    CorruptArtifact(ProposalId),

    #[error(
        "multiproof length mismatch: {flags} flags for {leaves} leaves and {proof} proof hashes"
    )]
    MultiproofLengthMismatch {
        leaves: usize,
        proof: usize,
        flags: usize,
    },

    #[error("merkle: {0}")]
    Merkle(#[from] MerkleError),

    #[error("store: {0}")]
    Store(#[from] StoreError),
}

impl From<ChainError> for GovernanceError {
    fn from(e: ChainError) -> Self {
        GovernanceError::UpstreamUnavailable(e.to_string())
    }
}
