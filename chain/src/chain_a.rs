//! Chain A: root publisher, token balances and governance executor.

use std::sync::Arc;

use async_trait::async_trait;
use crossgov_types::{
    Address, Bytes, ProposalId, ProposalRecord, Snapshot, VotingWindow, H256, U256,
};
use ethers::providers::Middleware;

use crate::bindings::{Erc20, GovernanceExecutor, GovernanceRootPublisher};
use crate::client::send_and_confirm;
use crate::{ActionExecutor, AssetKind, BalanceReader, ChainAPublisher, ChainError, TxOutcome};

/// Chain A collaborators bound to one middleware.
pub struct EthChainA<M> {
    publisher: GovernanceRootPublisher<M>,
    asset: Erc20<M>,
    derivative: Erc20<M>,
    executor: Option<GovernanceExecutor<M>>,
}

impl<M: Middleware + 'static> EthChainA<M> {
    pub fn new(
        client: Arc<M>,
        publisher: Address,
        asset: Address,
        derivative: Address,
        executor: Option<Address>,
    ) -> Self {
        Self {
            publisher: GovernanceRootPublisher::new(publisher, client.clone()),
            asset: Erc20::new(asset, client.clone()),
            derivative: Erc20::new(derivative, client.clone()),
            executor: executor.map(|addr| GovernanceExecutor::new(addr, client)),
        }
    }

    fn executor(&self) -> Result<&GovernanceExecutor<M>, ChainError> {
        self.executor
            .as_ref()
            .ok_or_else(|| ChainError::Config("executor address not configured".into()))
    }
}

pub(crate) fn upstream(what: &str, err: impl std::fmt::Display) -> ChainError {
    ChainError::Upstream(format!("{what}: {err}"))
}

pub(crate) fn to_u64(what: &str, value: U256) -> Result<u64, ChainError> {
    if value > U256::from(u64::MAX) {
        return Err(ChainError::Upstream(format!("{what} out of range: {value}")));
    }
    Ok(value.as_u64())
}

#[async_trait]
impl<M: Middleware + 'static> ChainAPublisher for EthChainA<M> {
    async fn snapshot(&self, proposal: ProposalId) -> Result<Snapshot, ChainError> {
        let (block, exchange_rate) = self
            .publisher
            .get_snapshot(proposal)
            .call()
            .await
            .map_err(|e| upstream("getSnapshot", e))?;
        Ok(Snapshot {
            block,
            exchange_rate,
        })
    }

    async fn window(&self, proposal: ProposalId) -> Result<VotingWindow, ChainError> {
        let (start, end) = self
            .publisher
            .get_window(proposal)
            .call()
            .await
            .map_err(|e| upstream("getWindow", e))?;
        Ok(VotingWindow::new(start, end))
    }

    async fn deadline(&self, proposal: ProposalId) -> Result<u64, ChainError> {
        let deadline = self
            .publisher
            .get_deadline(proposal)
            .call()
            .await
            .map_err(|e| upstream("getDeadline", e))?;
        to_u64("deadline", deadline)
    }

    async fn proposal(&self, proposal: ProposalId) -> Result<ProposalRecord, ChainError> {
        let (
            action_data_hash,
            voting_start,
            voting_end,
            snapshot_block,
            snapshot_er,
            deadline,
            power_root,
            total_power,
            quorum,
            threshold,
            frozen,
        ) = self
            .publisher
            .proposals(proposal)
            .call()
            .await
            .map_err(|e| upstream("proposals", e))?;
        Ok(ProposalRecord {
            action_data_hash: H256::from(action_data_hash),
            window: VotingWindow::new(voting_start, voting_end),
            snapshot: Snapshot {
                block: to_u64("snapshotBlock", snapshot_block)?,
                exchange_rate: snapshot_er,
            },
            deadline: to_u64("deadline", deadline)?,
            power_root: H256::from(power_root),
            total_power,
            quorum,
            threshold,
            frozen,
        })
    }

    async fn publish_root(
        &self,
        proposal: ProposalId,
        power_root: H256,
        total_power: U256,
        quorum: U256,
        threshold: U256,
    ) -> Result<TxOutcome, ChainError> {
        let call = self
            .publisher
            .publish_root(proposal, power_root.0, total_power, quorum, threshold);
        send_and_confirm(call, "publishRoot").await
    }
}

#[async_trait]
impl<M: Middleware + 'static> BalanceReader for EthChainA<M> {
    async fn balance_at(
        &self,
        asset: AssetKind,
        holder: Address,
        block: u64,
    ) -> Result<U256, ChainError> {
        let token = match asset {
            AssetKind::Primary => &self.asset,
            AssetKind::Derivative => &self.derivative,
        };
        token
            .balance_of(holder)
            .block(block)
            .call()
            .await
            .map_err(|e| upstream(&format!("balanceOf({asset:?}) at block {block}"), e))
    }
}

#[async_trait]
impl<M: Middleware + 'static> ActionExecutor for EthChainA<M> {
    async fn commit_action(&self, action_data_hash: H256) -> Result<TxOutcome, ChainError> {
        let call = self.executor()?.commit_action(action_data_hash.0);
        send_and_confirm(call, "commitAction").await
    }

    async fn execute_if_authorized(&self, action_data: Bytes) -> Result<TxOutcome, ChainError> {
        let call = self.executor()?.execute_if_authorized(action_data);
        send_and_confirm(call, "executeIfAuthorized").await
    }
}
