//! Fundamental types for CrossGov.
//!
//! This crate defines the data model shared by every other crate in the
//! workspace: proposals as read from Chain A, signed vote records, frozen
//! Merkle artifacts, execution records, timestamps and the serde encodings
//! used on the wire (decimal strings for large integers, `0x` hex for hashes,
//! checksummed addresses).

pub mod artifact;
pub mod error;
pub mod execution;
pub mod proposal;
pub mod serde_helpers;
pub mod time;
pub mod vote;

pub use artifact::{FrozenVoter, MerkleArtifact, Tallies};
pub use error::TypeError;
pub use execution::{ExecutionRecord, PublicationRecord};
pub use proposal::{parse_proposal_id, ProposalId, ProposalRecord, Snapshot, VotingWindow};
pub use time::{Clock, Timestamp};
pub use vote::{Support, VoteRecord};

pub use ethers_core::types::{Address, Bytes, H256, U256, U512};

/// Fixed-point base of the snapshot exchange rate (1e18).
pub const EXCHANGE_RATE_SCALE: u64 = 1_000_000_000_000_000_000;
