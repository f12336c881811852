//! Nullable chains: scripted Chain A and Chain B collaborators.

use async_trait::async_trait;
use crossgov_chain::{
    ActionExecutor, AssetKind, BalanceReader, BatchVote, ChainAPublisher, ChainBVerifier,
    ChainError, FreezeParams, ProposalPassed, TxOutcome,
};
use crossgov_types::{
    Address, Bytes, ProposalId, ProposalRecord, Snapshot, VotingWindow, H256, U256,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

fn empty_record() -> ProposalRecord {
    ProposalRecord {
        action_data_hash: H256::zero(),
        window: VotingWindow::new(0, 0),
        snapshot: Snapshot {
            block: 0,
            exchange_rate: U256::zero(),
        },
        deadline: 0,
        power_root: H256::zero(),
        total_power: U256::zero(),
        quorum: U256::zero(),
        threshold: U256::zero(),
        frozen: false,
    }
}

/// Arguments of a recorded `publishRoot` call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublishCall {
    pub proposal_id: ProposalId,
    pub power_root: H256,
    pub total_power: U256,
    pub quorum: U256,
    pub threshold: U256,
}

/// In-memory Chain A: publisher, token balances and executor.
///
/// Unknown proposals read as an all-zero record, as an unset contract
/// mapping would.
pub struct NullChainA {
    proposals: Mutex<HashMap<ProposalId, ProposalRecord>>,
    balances: Mutex<HashMap<(AssetKind, Address, u64), U256>>,
    published: Mutex<Vec<PublishCall>>,
    commits: Mutex<Vec<H256>>,
    executions: Mutex<Vec<Bytes>>,
    fail_balance_reads: AtomicBool,
    revert_publish: AtomicBool,
    lose_publish_receipt: AtomicBool,
    revert_execute: AtomicBool,
    next_tx: AtomicU64,
}

impl NullChainA {
    pub fn new() -> Self {
        Self {
            proposals: Mutex::new(HashMap::new()),
            balances: Mutex::new(HashMap::new()),
            published: Mutex::new(Vec::new()),
            commits: Mutex::new(Vec::new()),
            executions: Mutex::new(Vec::new()),
            fail_balance_reads: AtomicBool::new(false),
            revert_publish: AtomicBool::new(false),
            lose_publish_receipt: AtomicBool::new(false),
            revert_execute: AtomicBool::new(false),
            next_tx: AtomicU64::new(1),
        }
    }

    fn update(&self, id: ProposalId, f: impl FnOnce(&mut ProposalRecord)) {
        let mut proposals = self.proposals.lock().unwrap();
        f(proposals.entry(id).or_insert_with(empty_record));
    }

    fn record(&self, id: ProposalId) -> ProposalRecord {
        self.proposals
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .unwrap_or_else(empty_record)
    }

    fn outcome(&self, success: bool) -> TxOutcome {
        let n = self.next_tx.fetch_add(1, Ordering::SeqCst);
        TxOutcome {
            tx_hash: H256::from_low_u64_be(0xA000 + n),
            block_number: Some(n),
            success,
        }
    }

    pub fn set_snapshot(&self, id: ProposalId, block: u64, exchange_rate: U256) {
        self.update(id, |r| {
            r.snapshot = Snapshot {
                block,
                exchange_rate,
            }
        });
    }

    pub fn set_window(&self, id: ProposalId, start: u64, end: u64) {
        self.update(id, |r| r.window = VotingWindow::new(start, end));
    }

    pub fn set_deadline(&self, id: ProposalId, deadline: u64) {
        self.update(id, |r| r.deadline = deadline);
    }

    pub fn set_action_hash(&self, id: ProposalId, hash: H256) {
        self.update(id, |r| r.action_data_hash = hash);
    }

    pub fn set_balance(&self, asset: AssetKind, holder: Address, block: u64, amount: U256) {
        self.balances
            .lock()
            .unwrap()
            .insert((asset, holder, block), amount);
    }

    pub fn fail_balance_reads(&self, fail: bool) {
        self.fail_balance_reads.store(fail, Ordering::SeqCst);
    }

    pub fn revert_publish(&self, revert: bool) {
        self.revert_publish.store(revert, Ordering::SeqCst);
    }

    /// `publishRoot` lands but the caller sees an upstream error.
    pub fn lose_publish_receipt(&self, lose: bool) {
        self.lose_publish_receipt.store(lose, Ordering::SeqCst);
    }

    pub fn revert_execute(&self, revert: bool) {
        self.revert_execute.store(revert, Ordering::SeqCst);
    }

    pub fn published(&self) -> Vec<PublishCall> {
        self.published.lock().unwrap().clone()
    }

    pub fn commits(&self) -> Vec<H256> {
        self.commits.lock().unwrap().clone()
    }

    /// Payloads passed to `executeIfAuthorized`, including reverted ones.
    pub fn executions(&self) -> Vec<Bytes> {
        self.executions.lock().unwrap().clone()
    }
}

impl Default for NullChainA {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChainAPublisher for NullChainA {
    async fn snapshot(&self, proposal: ProposalId) -> Result<Snapshot, ChainError> {
        Ok(self.record(proposal).snapshot)
    }

    async fn window(&self, proposal: ProposalId) -> Result<VotingWindow, ChainError> {
        Ok(self.record(proposal).window)
    }

    async fn deadline(&self, proposal: ProposalId) -> Result<u64, ChainError> {
        Ok(self.record(proposal).deadline)
    }

    async fn proposal(&self, proposal: ProposalId) -> Result<ProposalRecord, ChainError> {
        Ok(self.record(proposal))
    }

    async fn publish_root(
        &self,
        proposal: ProposalId,
        power_root: H256,
        total_power: U256,
        quorum: U256,
        threshold: U256,
    ) -> Result<TxOutcome, ChainError> {
        self.published.lock().unwrap().push(PublishCall {
            proposal_id: proposal,
            power_root,
            total_power,
            quorum,
            threshold,
        });
        if self.revert_publish.load(Ordering::SeqCst) {
            return Ok(self.outcome(false));
        }
        self.update(proposal, |r| {
            r.power_root = power_root;
            r.total_power = total_power;
            r.quorum = quorum;
            r.threshold = threshold;
            r.frozen = true;
        });
        let outcome = self.outcome(true);
        if self.lose_publish_receipt.load(Ordering::SeqCst) {
            return Err(ChainError::Upstream(format!(
                "no receipt for {:?}",
                outcome.tx_hash
            )));
        }
        Ok(outcome)
    }
}

#[async_trait]
impl BalanceReader for NullChainA {
    async fn balance_at(
        &self,
        asset: AssetKind,
        holder: Address,
        block: u64,
    ) -> Result<U256, ChainError> {
        if self.fail_balance_reads.load(Ordering::SeqCst) {
            return Err(ChainError::Upstream(format!(
                "state at block {block} unavailable"
            )));
        }
        Ok(self
            .balances
            .lock()
            .unwrap()
            .get(&(asset, holder, block))
            .copied()
            .unwrap_or_default())
    }
}

#[async_trait]
impl ActionExecutor for NullChainA {
    async fn commit_action(&self, action_data_hash: H256) -> Result<TxOutcome, ChainError> {
        self.commits.lock().unwrap().push(action_data_hash);
        Ok(self.outcome(true))
    }

    async fn execute_if_authorized(&self, action_data: Bytes) -> Result<TxOutcome, ChainError> {
        self.executions.lock().unwrap().push(action_data);
        let success = !self.revert_execute.load(Ordering::SeqCst);
        Ok(self.outcome(success))
    }
}

/// In-memory Chain B vote verifier with a scripted event log.
pub struct NullChainB {
    events: Mutex<Vec<ProposalPassed>>,
    latest_block: AtomicU64,
    nonces: Mutex<HashMap<(ProposalId, Address), U256>>,
    freezes: Mutex<Vec<FreezeParams>>,
    batches: Mutex<Vec<(Vec<BatchVote>, Vec<H256>, Vec<H256>, Vec<bool>)>>,
    fail_freeze: AtomicBool,
    fail_event_reads: AtomicBool,
    next_tx: AtomicU64,
}

impl NullChainB {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            latest_block: AtomicU64::new(0),
            nonces: Mutex::new(HashMap::new()),
            freezes: Mutex::new(Vec::new()),
            batches: Mutex::new(Vec::new()),
            fail_freeze: AtomicBool::new(false),
            fail_event_reads: AtomicBool::new(false),
            next_tx: AtomicU64::new(1),
        }
    }

    fn outcome(&self, success: bool) -> TxOutcome {
        let n = self.next_tx.fetch_add(1, Ordering::SeqCst);
        TxOutcome {
            tx_hash: H256::from_low_u64_be(0xB000 + n),
            block_number: Some(n),
            success,
        }
    }

    /// Append a `ProposalPassed` log at `block`, advancing the head if needed.
    pub fn emit_passed(&self, proposal_id: ProposalId, action_data_hash: H256, block: u64) {
        let mut events = self.events.lock().unwrap();
        let log_index = U256::from(events.len());
        events.push(ProposalPassed {
            proposal_id,
            action_data_hash,
            block_number: block,
            tx_hash: H256::from_low_u64_be(block),
            log_index,
        });
        self.latest_block.fetch_max(block, Ordering::SeqCst);
    }

    pub fn set_latest_block(&self, block: u64) {
        self.latest_block.store(block, Ordering::SeqCst);
    }

    pub fn set_next_nonce(&self, proposal: ProposalId, voter: Address, nonce: U256) {
        self.nonces.lock().unwrap().insert((proposal, voter), nonce);
    }

    pub fn fail_freeze(&self, fail: bool) {
        self.fail_freeze.store(fail, Ordering::SeqCst);
    }

    pub fn fail_event_reads(&self, fail: bool) {
        self.fail_event_reads.store(fail, Ordering::SeqCst);
    }

    pub fn freezes(&self) -> Vec<FreezeParams> {
        self.freezes.lock().unwrap().clone()
    }

    pub fn batches(&self) -> Vec<(Vec<BatchVote>, Vec<H256>, Vec<H256>, Vec<bool>)> {
        self.batches.lock().unwrap().clone()
    }
}

impl Default for NullChainB {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChainBVerifier for NullChainB {
    async fn freeze_proposal(&self, params: FreezeParams) -> Result<TxOutcome, ChainError> {
        if self.fail_freeze.load(Ordering::SeqCst) {
            return Err(ChainError::Upstream("freezeProposal: connection reset".into()));
        }
        self.freezes.lock().unwrap().push(params);
        Ok(self.outcome(true))
    }

    async fn next_nonce(&self, proposal: ProposalId, voter: Address) -> Result<U256, ChainError> {
        Ok(self
            .nonces
            .lock()
            .unwrap()
            .get(&(proposal, voter))
            .copied()
            .unwrap_or_default())
    }

    async fn batch_verify_and_tally(
        &self,
        votes: Vec<BatchVote>,
        leaves: Vec<H256>,
        proof: Vec<H256>,
        proof_flags: Vec<bool>,
    ) -> Result<TxOutcome, ChainError> {
        self.batches
            .lock()
            .unwrap()
            .push((votes, leaves, proof, proof_flags));
        Ok(self.outcome(true))
    }

    async fn latest_block(&self) -> Result<u64, ChainError> {
        Ok(self.latest_block.load(Ordering::SeqCst))
    }

    async fn proposal_passed_events(
        &self,
        from: u64,
        to: u64,
    ) -> Result<Vec<ProposalPassed>, ChainError> {
        if self.fail_event_reads.load(Ordering::SeqCst) {
            return Err(ChainError::Upstream("eth_getLogs: timeout".into()));
        }
        Ok(self
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.block_number >= from && e.block_number <= to)
            .cloned()
            .collect())
    }
}
