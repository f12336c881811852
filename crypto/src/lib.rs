//! Cryptographic primitives for CrossGov.
//!
//! - **Keccak-256** for Merkle leaves, internal nodes and action hashes
//! - **EIP-712** typed-data hashing of the `Vote` struct under the
//!   `CrossGov` domain
//! - **secp256k1 recovery** of the vote signer

pub mod eip712;
pub mod error;
pub mod hash;

pub use eip712::{recover_signer, verify_vote, TypedVote, VoteDomain};
pub use error::SignatureError;
pub use hash::{keccak256, keccak256_multi, leaf_hash};
