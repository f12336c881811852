//! Assembly of a `batchVerifyAndTally` submission from a frozen artifact.

use crossgov_chain::BatchVote;
use crossgov_store::VoteStore;
use crossgov_types::serde_helpers::checksummed;
use crossgov_types::{Address, MerkleArtifact, H256};

use crate::{prove_subset, GovernanceError};

/// Signed votes plus the multiproof that commits them, in leaf order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerificationBatch {
    pub votes: Vec<BatchVote>,
    pub leaves: Vec<H256>,
    pub proof: Vec<H256>,
    pub flags: Vec<bool>,
}

/// Build the Chain B submission for `subset` (all frozen voters when empty).
///
/// Each stored vote must still be the one that was frozen; a vote replaced
/// after the freeze no longer matches its leaf and is refused.
pub fn assemble_batch(
    artifact: &MerkleArtifact,
    votes: &dyn VoteStore,
    subset: &[Address],
) -> Result<VerificationBatch, GovernanceError> {
    let proof = prove_subset(artifact, subset)?;

    let mut batch = Vec::with_capacity(proof.indices.len());
    for &index in &proof.indices {
        let frozen = &artifact.voters[index];
        let record = votes
            .get_vote(&artifact.proposal_id, &frozen.voter)?
            .ok_or_else(|| {
                GovernanceError::Validation(format!(
                    "no stored vote for frozen voter {}",
                    checksummed(&frozen.voter)
                ))
            })?;
        if record.nonce != frozen.nonce || record.power != frozen.power {
            return Err(GovernanceError::Validation(format!(
                "vote of {} changed since the freeze (nonce {} -> {})",
                checksummed(&frozen.voter),
                frozen.nonce,
                record.nonce
            )));
        }
        batch.push(BatchVote {
            proposal_id: record.proposal_id,
            support: record.support.signed_flag(),
            voter: record.voter,
            power: record.power,
            nonce: record.nonce,
            deadline: record.deadline,
            abstain: record.support.is_abstain(),
            signature: record.signature,
        });
    }

    Ok(VerificationBatch {
        votes: batch,
        leaves: proof.leaves,
        proof: proof.proof,
        flags: proof.flags,
    })
}
