//! LMDB storage backend for CrossGov.
//!
//! Implements all storage traits from `crossgov-store` using the `heed`
//! LMDB bindings. Each logical store maps to one database within a single
//! environment. LMDB's single writer gives the vote upsert its atomic
//! compare-and-replace, and read transactions give freezes a consistent
//! snapshot.

pub mod artifact;
pub mod environment;
pub mod error;
pub mod execution;
pub mod keys;
pub mod meta;
pub mod vote;

pub use artifact::LmdbArtifactStore;
pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use execution::LmdbExecutionStore;
pub use meta::LmdbCheckpointStore;
pub use vote::LmdbVoteStore;
