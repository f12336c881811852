//! Chain endpoints and collaborator contract addresses.

use crossgov_types::Address;
use serde::{Deserialize, Serialize};

/// `[chain]` section of the daemon configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChainConfig {
    pub rpc_url_a: String,
    pub rpc_url_b: String,
    /// Chain B id; part of the EIP-712 signing domain.
    pub chain_b_id: u64,
    /// Governance root publisher on Chain A.
    pub publisher: Address,
    /// Vote verifier on Chain B; the EIP-712 verifying contract.
    pub vote_verifier: Address,
    /// Governance executor on Chain A. Only the relayer needs it.
    #[serde(default)]
    pub executor: Option<Address>,
    /// Primary voting asset on Chain A.
    pub asset: Address,
    /// Yield-bearing derivative on Chain A.
    pub derivative: Address,
}
