//! Collaborator contract interfaces.

use async_trait::async_trait;
use crossgov_types::{
    Address, Bytes, ProposalId, ProposalRecord, Snapshot, VotingWindow, H256, U256,
};

use crate::ChainError;

/// Which Chain A token a balance is read from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AssetKind {
    /// The primary voting asset.
    Primary,
    /// The yield-bearing derivative, converted through the exchange rate.
    Derivative,
}

/// A mined transaction. `success` reflects the receipt status.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxOutcome {
    pub tx_hash: H256,
    pub block_number: Option<u64>,
    pub success: bool,
}

/// Arguments of the Chain B `freezeProposal` entry point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FreezeParams {
    pub proposal_id: ProposalId,
    pub power_root: H256,
    pub action_data_hash: H256,
    pub window: VotingWindow,
    pub quorum: U256,
    pub threshold: U256,
}

/// One element of the `batchVerifyAndTally` votes array.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchVote {
    pub proposal_id: ProposalId,
    pub support: bool,
    pub voter: Address,
    pub power: U256,
    pub nonce: U256,
    pub deadline: U256,
    pub abstain: bool,
    pub signature: Bytes,
}

/// A `ProposalPassed(proposalId, actionDataHash)` log from Chain B.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProposalPassed {
    pub proposal_id: ProposalId,
    pub action_data_hash: H256,
    pub block_number: u64,
    pub tx_hash: H256,
    pub log_index: U256,
}

/// Chain A governance root publisher.
#[async_trait]
pub trait ChainAPublisher: Send + Sync {
    async fn snapshot(&self, proposal: ProposalId) -> Result<Snapshot, ChainError>;

    async fn window(&self, proposal: ProposalId) -> Result<VotingWindow, ChainError>;

    async fn deadline(&self, proposal: ProposalId) -> Result<u64, ChainError>;

    /// The authoritative proposal record, including the action-data hash.
    async fn proposal(&self, proposal: ProposalId) -> Result<ProposalRecord, ChainError>;

    async fn publish_root(
        &self,
        proposal: ProposalId,
        power_root: H256,
        total_power: U256,
        quorum: U256,
        threshold: U256,
    ) -> Result<TxOutcome, ChainError>;
}

/// Historical token balances on Chain A.
#[async_trait]
pub trait BalanceReader: Send + Sync {
    /// `balanceOf(holder)` evaluated at `block`.
    async fn balance_at(
        &self,
        asset: AssetKind,
        holder: Address,
        block: u64,
    ) -> Result<U256, ChainError>;
}

/// Chain A governance executor.
#[async_trait]
pub trait ActionExecutor: Send + Sync {
    async fn commit_action(&self, action_data_hash: H256) -> Result<TxOutcome, ChainError>;

    async fn execute_if_authorized(&self, action_data: Bytes) -> Result<TxOutcome, ChainError>;
}

/// Chain B vote verifier.
#[async_trait]
pub trait ChainBVerifier: Send + Sync {
    async fn freeze_proposal(&self, params: FreezeParams) -> Result<TxOutcome, ChainError>;

    async fn next_nonce(&self, proposal: ProposalId, voter: Address) -> Result<U256, ChainError>;

    async fn batch_verify_and_tally(
        &self,
        votes: Vec<BatchVote>,
        leaves: Vec<H256>,
        proof: Vec<H256>,
        proof_flags: Vec<bool>,
    ) -> Result<TxOutcome, ChainError>;

    async fn latest_block(&self) -> Result<u64, ChainError>;

    /// `ProposalPassed` logs in `[from, to]`, in chain order.
    async fn proposal_passed_events(
        &self,
        from: u64,
        to: u64,
    ) -> Result<Vec<ProposalPassed>, ChainError>;
}
