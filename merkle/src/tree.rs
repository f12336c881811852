//! Layered Merkle tree.

use crossgov_crypto::keccak256_multi;
use ethers_core::types::H256;

use crate::multiproof::MultiProof;
use crate::MerkleError;

/// `keccak256(left ‖ right)`. Pair order is significant.
pub fn hash_pair(left: &H256, right: &H256) -> H256 {
    H256::from(keccak256_multi(&[left.as_bytes(), right.as_bytes()]))
}

/// Width of the level above a level of `width` nodes.
pub(crate) fn parent_width(width: usize) -> usize {
    (width + 1) / 2
}

/// Whether `index` is the unpaired last node of a level of `width` nodes.
pub(crate) fn is_promoted(index: usize, width: usize) -> bool {
    width % 2 == 1 && index == width - 1
}

/// A fully materialised tree. `layers[0]` holds the leaves in the order
/// given; the last layer holds the root.
#[derive(Clone, Debug)]
pub struct MerkleTree {
    layers: Vec<Vec<H256>>,
}

impl MerkleTree {
    /// Build a tree over already-hashed leaves.
    pub fn new(leaves: Vec<H256>) -> Result<Self, MerkleError> {
        if leaves.is_empty() {
            return Err(MerkleError::EmptyTree);
        }

        let mut layers = vec![leaves];
        while let Some(level) = layers.last().filter(|l| l.len() > 1) {
            let next: Vec<H256> = level
                .chunks(2)
                .map(|pair| match pair {
                    [left, right] => hash_pair(left, right),
                    [single] => *single,
                    _ => unreachable!("chunks(2) yields one or two nodes"),
                })
                .collect();
            layers.push(next);
        }
        Ok(Self { layers })
    }

    pub fn root(&self) -> H256 {
        // `new` guarantees at least one layer with at least one node.
        self.layers[self.layers.len() - 1][0]
    }

    pub fn leaves(&self) -> &[H256] {
        &self.layers[0]
    }

    pub fn leaf_count(&self) -> usize {
        self.layers[0].len()
    }

    pub fn depth(&self) -> usize {
        self.layers.len() - 1
    }

    /// Batched inclusion proof for the leaves at `indices`.
    ///
    /// Indices may be given in any order and may repeat; the proof always
    /// covers the distinct indices in ascending order.
    pub fn multiproof(&self, indices: &[usize]) -> Result<MultiProof, MerkleError> {
        if indices.is_empty() {
            return Err(MerkleError::EmptyBatch);
        }
        let leaf_count = self.leaf_count();
        let mut known: Vec<usize> = indices.to_vec();
        known.sort_unstable();
        known.dedup();
        if let Some(&index) = known.iter().find(|&&i| i >= leaf_count) {
            return Err(MerkleError::IndexOutOfRange { index, leaf_count });
        }

        let batch_indices = known.clone();
        let mut proof = Vec::new();
        let mut flags = Vec::new();

        for level in &self.layers[..self.depth()] {
            let width = level.len();
            let mut next = Vec::with_capacity(known.len());
            let mut i = 0;
            while i < known.len() {
                let index = known[i];
                if is_promoted(index, width) {
                    next.push(index / 2);
                    i += 1;
                    continue;
                }
                let sibling = index ^ 1;
                if known.get(i + 1) == Some(&sibling) {
                    flags.push(true);
                    i += 2;
                } else {
                    flags.push(false);
                    proof.push(level[sibling]);
                    i += 1;
                }
                next.push(index / 2);
            }
            known = next;
        }

        Ok(MultiProof {
            leaves: batch_indices.iter().map(|&i| self.layers[0][i]).collect(),
            indices: batch_indices,
            leaf_count,
            proof,
            flags,
        })
    }
}
