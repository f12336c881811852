//! Batched inclusion proofs over a frozen artifact.

use std::collections::BTreeSet;

use crossgov_crypto::leaf_hash;
use crossgov_merkle::{MerkleTree, MultiProof};
use crossgov_types::serde_helpers::checksummed;
use crossgov_types::{Address, MerkleArtifact, H256};
use tracing::debug;

use crate::GovernanceError;

/// A multiproof plus the batch it covers, in leaf order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubsetProof {
    pub root: H256,
    pub voters: Vec<Address>,
    pub indices: Vec<usize>,
    pub leaf_count: usize,
    pub leaves: Vec<H256>,
    pub proof: Vec<H256>,
    pub flags: Vec<bool>,
}

/// Prove that `subset` (all voters when empty) is committed to by the
/// artifact's root.
///
/// The tree is rebuilt from the frozen `(voter, power)` pairs in their
/// persisted order; nothing is re-read from the ledger. The batch is
/// returned in leaf order with duplicates removed.
pub fn prove_subset(
    artifact: &MerkleArtifact,
    subset: &[Address],
) -> Result<SubsetProof, GovernanceError> {
    let leaves: Vec<H256> = artifact
        .voters
        .iter()
        .map(|v| leaf_hash(v.voter, v.power))
        .collect();
    if leaves != artifact.leaves {
        return Err(GovernanceError::CorruptArtifact(artifact.proposal_id));
    }
    let tree = MerkleTree::new(leaves)?;
    if tree.root() != artifact.root {
        return Err(GovernanceError::CorruptArtifact(artifact.proposal_id));
    }

    let indices: Vec<usize> = if subset.is_empty() {
        (0..tree.leaf_count()).collect()
    } else {
        let mut set = BTreeSet::new();
        for voter in subset {
            let index = artifact.index_of(voter).ok_or_else(|| {
                GovernanceError::Validation(format!(
                    "voter {} is not part of the frozen set",
                    checksummed(voter)
                ))
            })?;
            set.insert(index);
        }
        set.into_iter().collect()
    };

    let MultiProof {
        indices,
        leaf_count,
        leaves,
        proof,
        mut flags,
    } = tree.multiproof(&indices)?;

    // An empty flag sequence for a multi-leaf batch means every leaf is
    // combined with a neighbour from the batch.
    if flags.is_empty() && leaves.len() > 1 {
        flags = vec![true; leaves.len() - 1];
    }
    if flags.len() + 1 != leaves.len() + proof.len() {
        return Err(GovernanceError::MultiproofLengthMismatch {
            leaves: leaves.len(),
            proof: proof.len(),
            flags: flags.len(),
        });
    }

    debug!(
        proposal_id = %artifact.proposal_id,
        batch = leaves.len(),
        proof = proof.len(),
        "multiproof built"
    );
    Ok(SubsetProof {
        root: artifact.root,
        voters: indices.iter().map(|&i| artifact.voters[i].voter).collect(),
        indices,
        leaf_count,
        leaves,
        proof,
        flags,
    })
}
