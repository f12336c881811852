//! Abstract storage traits for CrossGov.
//!
//! Every backend (LMDB, in-memory for testing) implements these traits.
//! The rest of the codebase depends only on the traits.

pub mod artifact;
pub mod checkpoint;
pub mod error;
pub mod execution;
pub mod vote;

pub use artifact::{ArtifactStore, Reservation};
pub use checkpoint::CheckpointStore;
pub use error::StoreError;
pub use execution::ExecutionStore;
pub use vote::{UpsertOutcome, VoteStore};
