//! ProposalPassed → authorised execution on Chain A.
//!
//! Per proposal: `Idle → Observed → Verified → Executed`. Verification
//! compares the emitted action hash with Chain A's record and the configured
//! payload's hash with both. Execution is recorded in a persisted
//! idempotency ledger so a replayed or duplicated event is a no-op, across
//! restarts as well as within one run.

use std::fmt;
use std::sync::Arc;

use crossgov_chain::{ActionExecutor, ChainAPublisher, ProposalPassed};
use crossgov_store::ExecutionStore;
use crossgov_types::{Clock, ExecutionRecord, ProposalId};
use crossgov_utils::KeyedLocks;
use tracing::{debug, error, info, warn};

use crate::action::{action_data_hash, ActionRegistry};
use crate::RelayError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelayState {
    Idle,
    Observed,
    Verified,
    Executed,
}

impl fmt::Display for RelayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RelayState::Idle => "idle",
            RelayState::Observed => "observed",
            RelayState::Verified => "verified",
            RelayState::Executed => "executed",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RelayOutcome {
    Executed(ExecutionRecord),
    /// The idempotency ledger already holds this proposal.
    AlreadyExecuted(ExecutionRecord),
}

pub struct Relayer {
    chain_a: Arc<dyn ChainAPublisher>,
    executor: Arc<dyn ActionExecutor>,
    executions: Arc<dyn ExecutionStore>,
    actions: ActionRegistry,
    clock: Arc<dyn Clock>,
    locks: KeyedLocks<ProposalId>,
    commit_before_execute: bool,
}

impl Relayer {
    pub fn new(
        chain_a: Arc<dyn ChainAPublisher>,
        executor: Arc<dyn ActionExecutor>,
        executions: Arc<dyn ExecutionStore>,
        actions: ActionRegistry,
        clock: Arc<dyn Clock>,
        commit_before_execute: bool,
    ) -> Self {
        Self {
            chain_a,
            executor,
            executions,
            actions,
            clock,
            locks: KeyedLocks::new(),
            commit_before_execute,
        }
    }

    /// Drive one event through the state machine.
    ///
    /// Events for the same proposal are handled one at a time.
    pub async fn handle_event(&self, event: &ProposalPassed) -> Result<RelayOutcome, RelayError> {
        let proposal_id = event.proposal_id;
        let _guard = self.locks.lock(&proposal_id).await;

        if let Some(done) = self.executions.get_execution(&proposal_id)? {
            info!(
                %proposal_id,
                tx = ?done.tx_hash,
                "already executed; skipping duplicate ProposalPassed"
            );
            return Ok(RelayOutcome::AlreadyExecuted(done));
        }
        self.transition(proposal_id, RelayState::Idle, RelayState::Observed);
        info!(
            %proposal_id,
            hash = ?event.action_data_hash,
            block = event.block_number,
            "ProposalPassed observed"
        );

        let authoritative = self.chain_a.proposal(proposal_id).await?.action_data_hash;
        if authoritative != event.action_data_hash {
            error!(
                %proposal_id,
                emitted = ?event.action_data_hash,
                ?authoritative,
                "action hash mismatch between chains; not executing"
            );
            return Err(RelayError::HashMismatch {
                proposal_id,
                emitted: event.action_data_hash,
                authoritative,
            });
        }

        let payload = self
            .actions
            .get(&proposal_id)
            .cloned()
            .ok_or(RelayError::UnknownAction(proposal_id))?;
        let configured = action_data_hash(payload.as_ref());
        if configured != authoritative {
            error!(
                %proposal_id,
                ?configured,
                ?authoritative,
                "configured action payload does not match the passed proposal; not executing"
            );
            return Err(RelayError::PayloadHashMismatch {
                proposal_id,
                configured,
                authoritative,
            });
        }
        self.transition(proposal_id, RelayState::Observed, RelayState::Verified);

        if self.commit_before_execute {
            let commit = self.executor.commit_action(authoritative).await?;
            if !commit.success {
                return Err(RelayError::CommitReverted {
                    tx: commit.tx_hash,
                });
            }
            debug!(%proposal_id, tx = ?commit.tx_hash, "action committed");
        }

        let outcome = self.executor.execute_if_authorized(payload).await?;
        if !outcome.success {
            warn!(%proposal_id, tx = ?outcome.tx_hash, "executeIfAuthorized reverted");
            return Err(RelayError::ExecutionReverted {
                tx: outcome.tx_hash,
            });
        }

        let record = ExecutionRecord {
            proposal_id,
            action_data_hash: authoritative,
            tx_hash: outcome.tx_hash,
            executed_at: self.clock.now(),
        };
        self.executions.put_execution(&record)?;
        self.transition(proposal_id, RelayState::Verified, RelayState::Executed);
        info!(
            %proposal_id,
            tx = ?outcome.tx_hash,
            block = ?outcome.block_number,
            "action executed on Chain A"
        );
        Ok(RelayOutcome::Executed(record))
    }

    fn transition(&self, proposal_id: ProposalId, from: RelayState, to: RelayState) {
        debug!(%proposal_id, %from, %to, "relay state");
    }
}
