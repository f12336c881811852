//! Voting power at a proposal's snapshot.
//!
//! `power = primary + floor(derivative * exchange_rate / 1e18)`, with both
//! balances read at the same historical block.

use std::sync::Arc;

use crossgov_chain::{AssetKind, BalanceReader, ChainAPublisher};
use crossgov_types::{Address, ProposalId, Snapshot, EXCHANGE_RATE_SCALE, U256, U512};
use tracing::debug;

use crate::GovernanceError;

/// Pure power formula. `None` on overflow.
///
/// The product is taken in 512 bits so large balances never wrap before the
/// division; the quotient is floored.
pub fn voting_power(primary: U256, derivative: U256, exchange_rate: U256) -> Option<U256> {
    let scaled = derivative.full_mul(exchange_rate) / U512::from(EXCHANGE_RATE_SCALE);
    let scaled = U256::try_from(scaled).ok()?;
    primary.checked_add(scaled)
}

/// Reads snapshots and balances from Chain A.
#[derive(Clone)]
pub struct PowerOracle {
    chain_a: Arc<dyn ChainAPublisher>,
    balances: Arc<dyn BalanceReader>,
}

impl PowerOracle {
    pub fn new(chain_a: Arc<dyn ChainAPublisher>, balances: Arc<dyn BalanceReader>) -> Self {
        Self { chain_a, balances }
    }

    /// `computePower(proposalId, voter)`.
    pub async fn compute_power(
        &self,
        proposal: ProposalId,
        voter: Address,
    ) -> Result<U256, GovernanceError> {
        let snapshot = self.chain_a.snapshot(proposal).await?;
        self.power_at(&snapshot, voter).await
    }

    /// Power of `voter` at an already-known snapshot.
    ///
    /// Both reads are pinned to `snapshot.block`. A failed read is surfaced,
    /// never treated as a zero balance.
    pub async fn power_at(
        &self,
        snapshot: &Snapshot,
        voter: Address,
    ) -> Result<U256, GovernanceError> {
        let (primary, derivative) = tokio::try_join!(
            self.balances
                .balance_at(AssetKind::Primary, voter, snapshot.block),
            self.balances
                .balance_at(AssetKind::Derivative, voter, snapshot.block),
        )?;
        let power = voting_power(primary, derivative, snapshot.exchange_rate)
            .ok_or(GovernanceError::PowerOverflow)?;
        debug!(
            voter = ?voter,
            block = snapshot.block,
            %primary,
            %derivative,
            %power,
            "computed voting power"
        );
        Ok(power)
    }
}
