//! Frozen Merkle commitment of a proposal's final voting power.

use ethers_core::types::{Address, H256, U256};
use serde::{Deserialize, Serialize};

use crate::serde_helpers::{checksum, u256_dec};
use crate::{ProposalId, Support};

/// One voter's frozen entry. Position in [`MerkleArtifact::voters`] is the
/// leaf index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrozenVoter {
    #[serde(with = "checksum")]
    pub voter: Address,
    #[serde(with = "u256_dec")]
    pub power: U256,
    pub support: Support,
    #[serde(with = "u256_dec")]
    pub nonce: U256,
}

/// Power summed per support category.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tallies {
    #[serde(rename = "for", with = "u256_dec")]
    pub for_power: U256,
    #[serde(with = "u256_dec")]
    pub against: U256,
    #[serde(with = "u256_dec")]
    pub abstain: U256,
    #[serde(with = "u256_dec")]
    pub total_counted: U256,
}

impl Tallies {
    /// Add `power` to the category for `support` and to the total.
    ///
    /// Returns `None` on overflow.
    pub fn checked_add(mut self, support: Support, power: U256) -> Option<Self> {
        match support {
            Support::Yes => self.for_power = self.for_power.checked_add(power)?,
            Support::No => self.against = self.against.checked_add(power)?,
            Support::Abstain => self.abstain = self.abstain.checked_add(power)?,
        }
        self.total_counted = self.total_counted.checked_add(power)?;
        Some(self)
    }
}

/// The immutable result of freezing a proposal.
///
/// `voters` and `leaves` are index-aligned and ordered by the ascending
/// checksummed voter address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MerkleArtifact {
    #[serde(with = "u256_dec")]
    pub proposal_id: ProposalId,
    pub root: H256,
    pub counts: Tallies,
    pub voters: Vec<FrozenVoter>,
    #[serde(rename = "leavesHexOrdered")]
    pub leaves: Vec<H256>,
}

impl MerkleArtifact {
    /// Leaf index of `voter`, if frozen in this artifact.
    pub fn index_of(&self, voter: &Address) -> Option<usize> {
        self.voters.iter().position(|v| &v.voter == voter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tallies_accumulate_per_category() {
        let t = Tallies::default()
            .checked_add(Support::Yes, U256::from(10))
            .and_then(|t| t.checked_add(Support::No, U256::from(4)))
            .and_then(|t| t.checked_add(Support::Abstain, U256::from(1)))
            .unwrap();
        assert_eq!(t.for_power, U256::from(10));
        assert_eq!(t.against, U256::from(4));
        assert_eq!(t.abstain, U256::from(1));
        assert_eq!(t.total_counted, U256::from(15));
    }

    #[test]
    fn tallies_overflow_is_detected() {
        let t = Tallies::default().checked_add(Support::Yes, U256::MAX).unwrap();
        assert!(t.checked_add(Support::No, U256::one()).is_none());
    }

    #[test]
    fn counts_serialize_with_wire_names() {
        let t = Tallies::default().checked_add(Support::Yes, U256::from(7)).unwrap();
        let json = serde_json::to_value(t).unwrap();
        assert_eq!(json["for"], "7");
        assert_eq!(json["totalCounted"], "7");
    }
}
