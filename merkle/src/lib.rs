//! Binary Merkle tree over voting-power leaves.
//!
//! Internal nodes hash their children in position order,
//! `keccak256(left ‖ right)`, without sorting the pair. An odd trailing node
//! is promoted to the next level unchanged. Multiproofs use the flag/proof
//! queue layout of the standard multi-leaf algorithm, where every step
//! combines one queued node with either the next queued node (`true`) or the
//! next proof hash (`false`).

pub mod error;
pub mod multiproof;
pub mod tree;

pub use error::MerkleError;
pub use multiproof::{verify_multiproof, MultiProof};
pub use tree::{hash_pair, MerkleTree};
