//! Stored vote records.

use ethers_core::types::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::serde_helpers::{checksum, hex_bytes, u256_dec};
use crate::{ProposalId, TypeError};

/// A voter's choice. Exactly one of the three states, never a pair of flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Support {
    Yes,
    No,
    Abstain,
}

impl Support {
    /// The value of the signed `support` boolean for this choice.
    ///
    /// Abstain is signed as `false`; the abstention itself travels out of
    /// band.
    pub fn signed_flag(&self) -> bool {
        matches!(self, Support::Yes)
    }

    pub fn is_abstain(&self) -> bool {
        matches!(self, Support::Abstain)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Support::Yes => "yes",
            Support::No => "no",
            Support::Abstain => "abstain",
        }
    }
}

impl fmt::Display for Support {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Support {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "yes" => Ok(Support::Yes),
            "no" => Ok(Support::No),
            "abstain" => Ok(Support::Abstain),
            other => Err(TypeError::InvalidSupport(other.to_string())),
        }
    }
}

/// The current vote of one voter on one proposal.
///
/// `power` is always the server-computed snapshot power, never a client
/// claim, and `signature` covers exactly this tuple.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRecord {
    #[serde(with = "u256_dec")]
    pub proposal_id: ProposalId,
    #[serde(with = "checksum")]
    pub voter: Address,
    #[serde(with = "u256_dec")]
    pub power: U256,
    pub support: Support,
    #[serde(with = "u256_dec")]
    pub nonce: U256,
    #[serde(with = "u256_dec")]
    pub deadline: U256,
    #[serde(with = "hex_bytes")]
    pub signature: Bytes,
}
