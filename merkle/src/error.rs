use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MerkleError {
    #[error("cannot build a tree without leaves")]
    EmptyTree,

    #[error("no leaves requested")]
    EmptyBatch,

    #[error("leaf index {index} out of range for {leaf_count} leaves")]
    IndexOutOfRange { index: usize, leaf_count: usize },

    #[error("leaf indices must be strictly ascending")]
    UnorderedIndices,

    #[error("{indices} indices for {leaves} leaves")]
    LeafCountMismatch { indices: usize, leaves: usize },

    #[error("proof flags exhausted before reaching the root")]
    FlagsExhausted,

    #[error("proof hashes exhausted before reaching the root")]
    ProofExhausted,

    #[error("flag at step {step} does not match the batch layout")]
    FlagMismatch { step: usize },

    #[error("{unused_flags} flags and {unused_proof} proof hashes left unconsumed")]
    UnconsumedProof {
        unused_flags: usize,
        unused_proof: usize,
    },

    #[error("computed root does not match")]
    RootMismatch,
}
