//! Proposal data as read from the Chain A publisher.

use ethers_core::types::{H256, U256};
use serde::{Deserialize, Serialize};

use crate::serde_helpers::{parse_u256, u256_dec};
use crate::{Timestamp, TypeError};

/// Proposal identifier (a `uint256` on both chains).
pub type ProposalId = U256;

/// Parse a proposal id from a path segment or request field.
pub fn parse_proposal_id(raw: &str) -> Result<ProposalId, TypeError> {
    parse_u256(raw)
}

/// Historical block and exchange rate at which voting power is measured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub block: u64,
    /// Derivative-to-primary conversion, fixed point with a 1e18 base.
    #[serde(with = "u256_dec")]
    pub exchange_rate: U256,
}

/// Inclusive voting window in Unix seconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VotingWindow {
    pub start: u64,
    pub end: u64,
}

impl VotingWindow {
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// Whether `now` lies within `[start, end]`.
    pub fn contains(&self, now: Timestamp) -> bool {
        let t = now.as_secs();
        t >= self.start && t <= self.end
    }
}

/// Full on-chain proposal record (`proposals(uint256)` on the publisher).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProposalRecord {
    pub action_data_hash: H256,
    pub window: VotingWindow,
    pub snapshot: Snapshot,
    pub deadline: u64,
    pub power_root: H256,
    pub total_power: U256,
    pub quorum: U256,
    pub threshold: U256,
    pub frozen: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_bounds_are_inclusive() {
        let w = VotingWindow::new(100, 200);
        assert!(!w.contains(Timestamp::new(99)));
        assert!(w.contains(Timestamp::new(100)));
        assert!(w.contains(Timestamp::new(200)));
        assert!(!w.contains(Timestamp::new(201)));
    }
}
