//! Request and response bodies.
//!
//! Large integers are decimal strings; hashes, signatures and addresses are
//! `0x` hex, addresses checksummed.

use crossgov_types::serde_helpers::{checksum, u256_dec, u256_lenient, u256_lenient_opt};
use crossgov_types::{Address, MerkleArtifact, ProposalId, VoteRecord, H256, U256};
use serde::{Deserialize, Serialize};

// ── Proposal ─────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainBDomain {
    pub chain_id: u64,
    #[serde(with = "checksum")]
    pub verifier: Address,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalResponse {
    #[serde(with = "u256_dec")]
    pub proposal_id: ProposalId,
    pub snapshot_block: u64,
    #[serde(rename = "snapshotER", with = "u256_dec")]
    pub snapshot_er: U256,
    pub voting_start: u64,
    pub voting_end: u64,
    pub deadline: u64,
    #[serde(rename = "chainB")]
    pub chain_b: ChainBDomain,
}

// ── Power ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputePowerRequest {
    #[serde(deserialize_with = "u256_lenient::deserialize")]
    pub proposal_id: ProposalId,
    pub voter: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PowerResponse {
    #[serde(with = "u256_dec")]
    pub power: U256,
}

// ── Vote ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    #[serde(deserialize_with = "u256_lenient::deserialize")]
    pub proposal_id: ProposalId,
    pub voter: String,
    #[serde(default)]
    pub support: bool,
    #[serde(default)]
    pub abstain: bool,
    #[serde(deserialize_with = "u256_lenient::deserialize")]
    pub nonce: U256,
    #[serde(deserialize_with = "u256_lenient::deserialize")]
    pub deadline: U256,
    pub signature: String,
    /// Client-side power claim, compared against the recomputed value.
    #[serde(default, deserialize_with = "u256_lenient_opt::deserialize")]
    pub power: Option<U256>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteResponse {
    pub ok: bool,
    /// False when a vote with an equal or higher nonce was already stored.
    pub stored: bool,
    pub vote: VoteRecord,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "opt_u256_dec"
    )]
    pub stored_nonce: Option<U256>,
}

mod opt_u256_dec {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<U256>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => s.serialize_some(&v.to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<U256>, D::Error> {
        u256_lenient_opt::deserialize(d)
    }
}

// ── Freeze / multiproof ──────────────────────────────────────────────────

pub type FreezeResponse = MerkleArtifact;

#[derive(Debug, Default, Deserialize)]
pub struct MultiproofRequest {
    #[serde(default)]
    pub voters: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiproofResponse {
    pub root: H256,
    pub voters: Vec<String>,
    pub leaves: Vec<H256>,
    pub proof: Vec<H256>,
    pub proof_flags: Vec<bool>,
    pub indices: Vec<usize>,
    pub leaf_count: usize,
}

// ── Nonce ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct NonceResponse {
    #[serde(with = "u256_dec")]
    pub nonce: U256,
}
