//! Merkle freezer: turns a proposal's vote set into an immutable artifact.

use std::collections::HashMap;
use std::sync::Arc;

use crossgov_crypto::leaf_hash;
use crossgov_merkle::MerkleTree;
use crossgov_store::{ArtifactStore, VoteStore};
use crossgov_types::{Address, FrozenVoter, MerkleArtifact, ProposalId, Tallies, VoteRecord};
use crossgov_utils::KeyedLocks;
use tracing::{info, warn};

use crate::GovernanceError;

/// Build the artifact for `votes`.
///
/// Keeps the highest-nonce vote per voter, orders voters by checksummed
/// address compared case-insensitively (which is the order of the raw
/// address bytes), hashes `(voter, power)` leaves and sums power per support
/// category. The result depends only on the vote set, not on the order of
/// `votes`.
pub fn build_artifact(
    proposal_id: ProposalId,
    votes: Vec<VoteRecord>,
) -> Result<MerkleArtifact, GovernanceError> {
    let mut latest: HashMap<Address, VoteRecord> = HashMap::new();
    for vote in votes {
        match latest.get(&vote.voter) {
            Some(existing) if existing.nonce >= vote.nonce => {}
            _ => {
                latest.insert(vote.voter, vote);
            }
        }
    }
    if latest.is_empty() {
        return Err(GovernanceError::NoVotes(proposal_id));
    }

    let mut unique: Vec<VoteRecord> = latest.into_values().collect();
    unique.sort_by(|a, b| a.voter.cmp(&b.voter));

    let mut counts = Tallies::default();
    let mut voters = Vec::with_capacity(unique.len());
    let mut leaves = Vec::with_capacity(unique.len());
    for vote in unique {
        counts = counts
            .checked_add(vote.support, vote.power)
            .ok_or(GovernanceError::PowerOverflow)?;
        leaves.push(leaf_hash(vote.voter, vote.power));
        voters.push(FrozenVoter {
            voter: vote.voter,
            power: vote.power,
            support: vote.support,
            nonce: vote.nonce,
        });
    }

    let tree = MerkleTree::new(leaves)?;
    Ok(MerkleArtifact {
        proposal_id,
        root: tree.root(),
        counts,
        voters,
        leaves: tree.leaves().to_vec(),
    })
}

pub struct MerkleFreezer {
    votes: Arc<dyn VoteStore>,
    artifacts: Arc<dyn ArtifactStore>,
    locks: KeyedLocks<ProposalId>,
}

impl MerkleFreezer {
    pub fn new(
        votes: Arc<dyn VoteStore>,
        artifacts: Arc<dyn ArtifactStore>,
        locks: KeyedLocks<ProposalId>,
    ) -> Self {
        Self {
            votes,
            artifacts,
            locks,
        }
    }

    /// Freeze the current vote set of `proposal_id`.
    ///
    /// Allowed repeatedly until a publication to Chain A has been reserved;
    /// afterwards the published artifact is final. The proposal lock is held
    /// until the artifact is written, so freezes and vote submissions for one
    /// proposal land in the order they took the lock.
    pub async fn freeze(&self, proposal_id: ProposalId) -> Result<MerkleArtifact, GovernanceError> {
        let _guard = self.locks.lock(&proposal_id).await;
        if let Some(published) = self.artifacts.get_publication(&proposal_id)? {
            return Err(GovernanceError::AlreadyPublished {
                proposal_id,
                root: published.root,
            });
        }

        let artifact = build_artifact(proposal_id, self.votes.votes_for(&proposal_id)?)?;
        let previous = self.artifacts.get_artifact(&proposal_id)?;

        // A publisher in another process may have reserved in the meantime.
        if let Some(published) = self.artifacts.put_artifact_unless_published(&artifact)? {
            return Err(GovernanceError::AlreadyPublished {
                proposal_id,
                root: published.root,
            });
        }

        if let Some(previous) = previous.filter(|p| p.root != artifact.root) {
            warn!(
                %proposal_id,
                previous_root = ?previous.root,
                new_root = ?artifact.root,
                "re-freeze changed the power root"
            );
        }
        info!(
            %proposal_id,
            root = ?artifact.root,
            voters = artifact.voters.len(),
            total = %artifact.counts.total_counted,
            "proposal frozen"
        );
        Ok(artifact)
    }

    pub fn artifact(&self, proposal_id: &ProposalId) -> Result<MerkleArtifact, GovernanceError> {
        self.artifacts
            .get_artifact(proposal_id)?
            .ok_or(GovernanceError::NotFrozen(*proposal_id))
    }
}
