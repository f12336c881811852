//! Nullable infrastructure for deterministic testing.
//!
//! Every external dependency of the pipeline (clock, storage, both chains)
//! sits behind a trait. This crate provides test-friendly implementations
//! that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Record the calls made against them
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod chain;
pub mod clock;
pub mod pausing;
pub mod store;

pub use chain::{NullChainA, NullChainB, PublishCall};
pub use clock::NullClock;
pub use pausing::{PauseHandle, PausingArtifacts};
pub use store::NullStore;
