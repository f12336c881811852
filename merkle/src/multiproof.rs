//! Multi-leaf inclusion proofs.

use ethers_core::types::H256;

use crate::tree::{hash_pair, is_promoted, parent_width};
use crate::MerkleError;

/// A batched inclusion proof.
///
/// `leaves` are in ascending leaf-index order. `proof` and `flags` are in
/// the order a verifier consumes them; a well-formed proof always satisfies
/// `flags.len() == leaves.len() + proof.len() - 1`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MultiProof {
    pub indices: Vec<usize>,
    pub leaf_count: usize,
    pub leaves: Vec<H256>,
    pub proof: Vec<H256>,
    pub flags: Vec<bool>,
}

impl MultiProof {
    /// Whether the flag count matches the leaf and proof counts.
    pub fn lengths_consistent(&self) -> bool {
        self.flags.len() + 1 == self.leaves.len() + self.proof.len()
    }

    pub fn verify(&self, root: H256) -> Result<(), MerkleError> {
        verify_multiproof(
            root,
            self.leaf_count,
            &self.indices,
            &self.leaves,
            &self.proof,
            &self.flags,
        )
    }
}

/// Recompute the root from a batch and check it against `root`.
///
/// Because pairs are not sorted, the side of each combination is taken from
/// the leaf indices; the flags must agree with that layout exactly.
pub fn verify_multiproof(
    root: H256,
    leaf_count: usize,
    indices: &[usize],
    leaves: &[H256],
    proof: &[H256],
    flags: &[bool],
) -> Result<(), MerkleError> {
    if indices.len() != leaves.len() {
        return Err(MerkleError::LeafCountMismatch {
            indices: indices.len(),
            leaves: leaves.len(),
        });
    }
    if leaves.is_empty() {
        return Err(MerkleError::EmptyBatch);
    }
    if indices.windows(2).any(|w| w[0] >= w[1]) {
        return Err(MerkleError::UnorderedIndices);
    }
    if let Some(&index) = indices.iter().find(|&&i| i >= leaf_count) {
        return Err(MerkleError::IndexOutOfRange { index, leaf_count });
    }

    let mut known: Vec<(usize, H256)> = indices.iter().copied().zip(leaves.iter().copied()).collect();
    let mut width = leaf_count;
    let mut step = 0;
    let mut proof_pos = 0;

    while width > 1 {
        let mut next = Vec::with_capacity(known.len());
        let mut i = 0;
        while i < known.len() {
            let (index, hash) = known[i];
            if is_promoted(index, width) {
                next.push((index / 2, hash));
                i += 1;
                continue;
            }

            let flag = *flags.get(step).ok_or(MerkleError::FlagsExhausted)?;
            let sibling = index ^ 1;
            let next_known = known.get(i + 1).map(|(idx, _)| *idx);
            let sibling_hash = if flag {
                if next_known != Some(sibling) {
                    return Err(MerkleError::FlagMismatch { step });
                }
                let h = known[i + 1].1;
                i += 2;
                h
            } else {
                if next_known == Some(sibling) {
                    return Err(MerkleError::FlagMismatch { step });
                }
                let h = *proof.get(proof_pos).ok_or(MerkleError::ProofExhausted)?;
                proof_pos += 1;
                i += 1;
                h
            };

            let parent = if index % 2 == 0 {
                hash_pair(&hash, &sibling_hash)
            } else {
                hash_pair(&sibling_hash, &hash)
            };
            next.push((index / 2, parent));
            step += 1;
        }
        known = next;
        width = parent_width(width);
    }

    if step != flags.len() || proof_pos != proof.len() {
        return Err(MerkleError::UnconsumedProof {
            unused_flags: flags.len() - step,
            unused_proof: proof.len() - proof_pos,
        });
    }
    match known.first() {
        Some((_, computed)) if *computed == root => Ok(()),
        _ => Err(MerkleError::RootMismatch),
    }
}
