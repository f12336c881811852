//! Persisted cross-chain side effects.

use ethers_core::types::H256;
use serde::{Deserialize, Serialize};

use crate::serde_helpers::u256_dec;
use crate::{ProposalId, Timestamp};

/// Idempotency ledger entry: the proposal's action was executed on Chain A.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRecord {
    #[serde(with = "u256_dec")]
    pub proposal_id: ProposalId,
    pub action_data_hash: H256,
    pub tx_hash: H256,
    pub executed_at: Timestamp,
}

/// Progress of publishing a frozen root across both chains.
///
/// Reserved with both transaction hashes unset before phase 1 is sent, so
/// no freeze can replace the root while it is in flight. `chain_a_tx` is
/// filled in once Chain A confirms, `chain_b_tx` once the mirror does. A
/// reservation settled from Chain A state after a lost receipt keeps
/// `chain_a_tx` unset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicationRecord {
    #[serde(with = "u256_dec")]
    pub proposal_id: ProposalId,
    pub root: H256,
    pub chain_a_tx: Option<H256>,
    pub chain_b_tx: Option<H256>,
    pub published_at: Timestamp,
}

impl PublicationRecord {
    pub fn is_on_chain_a(&self) -> bool {
        self.chain_a_tx.is_some()
    }

    pub fn is_mirrored(&self) -> bool {
        self.chain_b_tx.is_some()
    }
}
