//! Checkpointed consumer loop over Chain B `ProposalPassed` logs.
//!
//! Each poll reads one block range `[from, to]` behind the confirmation
//! depth, hands its events to the [`Relayer`] with bounded concurrency and
//! advances the persisted checkpoint to `to` only once every event of the
//! range has been handled. A transient failure or a shutdown leaves the
//! checkpoint where it was, so the range is replayed later.

use std::sync::Arc;
use std::time::Duration;

use crossgov_chain::{ChainBVerifier, ProposalPassed};
use crossgov_store::CheckpointStore;
use tokio::sync::{broadcast, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::{RelayError, RelayOutcome, Relayer};

#[derive(Clone, Debug)]
pub struct ListenerConfig {
    pub poll_interval: Duration,
    /// Blocks to stay behind the Chain B head.
    pub confirmations: u64,
    pub max_block_range: u64,
    pub max_in_flight: usize,
    pub shutdown_grace: Duration,
    /// Replay from this block instead of the persisted checkpoint.
    pub start_block: Option<u64>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            confirmations: 2,
            max_block_range: 2_000,
            max_in_flight: 4,
            shutdown_grace: Duration::from_secs(30),
            start_block: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RangeOutcome {
    /// Nothing confirmed past the checkpoint.
    UpToDate,
    /// The range was handled and checkpointed.
    Completed {
        from: u64,
        to: u64,
        events: usize,
        caught_up: bool,
    },
    /// A transient failure; the range will be replayed.
    Retry { from: u64, to: u64 },
    /// Shutdown arrived mid-range; nothing was checkpointed.
    Interrupted,
}

type Worker = (ProposalPassed, Result<RelayOutcome, RelayError>);

pub struct EventListener {
    chain_b: Arc<dyn ChainBVerifier>,
    relayer: Arc<Relayer>,
    checkpoint: Arc<dyn CheckpointStore>,
    semaphore: Arc<Semaphore>,
    next_block: Option<u64>,
    config: ListenerConfig,
}

impl EventListener {
    pub fn new(
        chain_b: Arc<dyn ChainBVerifier>,
        relayer: Arc<Relayer>,
        checkpoint: Arc<dyn CheckpointStore>,
        config: ListenerConfig,
    ) -> Self {
        Self {
            chain_b,
            relayer,
            checkpoint,
            semaphore: Arc::new(Semaphore::new(config.max_in_flight.max(1))),
            next_block: config.start_block,
            config,
        }
    }

    /// Poll until shutdown.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) -> Result<(), RelayError> {
        info!(
            start_block = ?self.config.start_block,
            confirmations = self.config.confirmations,
            max_in_flight = self.config.max_in_flight,
            "relayer listening for ProposalPassed"
        );
        loop {
            match self.poll_once(&mut shutdown).await {
                Ok(RangeOutcome::Interrupted) => {
                    info!("relayer stopped");
                    return Ok(());
                }
                Ok(RangeOutcome::Completed {
                    caught_up: false, ..
                }) => continue,
                Ok(_) => {}
                Err(e) => warn!(error = %e, "poll failed; retrying"),
            }
            tokio::select! {
                _ = shutdown.recv() => {
                    info!("relayer stopped");
                    return Ok(());
                }
                _ = tokio::time::sleep(self.config.poll_interval) => {}
            }
        }
    }

    /// Process the next confirmed block range.
    pub async fn poll_once(
        &mut self,
        shutdown: &mut broadcast::Receiver<()>,
    ) -> Result<RangeOutcome, RelayError> {
        let head = self.chain_b.latest_block().await?;
        let safe_head = head.saturating_sub(self.config.confirmations);

        let from = match self.next_block {
            Some(block) => block,
            None => match self.checkpoint.get_checkpoint()? {
                Some(done) => done + 1,
                None => {
                    info!(block = safe_head + 1, "no checkpoint; starting at chain head");
                    safe_head + 1
                }
            },
        };
        self.next_block = Some(from);
        if from > safe_head {
            return Ok(RangeOutcome::UpToDate);
        }
        let to = safe_head.min(from.saturating_add(self.config.max_block_range.max(1) - 1));

        let events = self.chain_b.proposal_passed_events(from, to).await?;
        let count = events.len();
        debug!(from, to, events = count, "scanning block range");

        match self.process(events, shutdown).await {
            None => Ok(RangeOutcome::Interrupted),
            Some(true) => {
                warn!(from, to, "range had transient failures; will replay");
                Ok(RangeOutcome::Retry { from, to })
            }
            Some(false) => {
                self.checkpoint.put_checkpoint(to)?;
                self.next_block = Some(to + 1);
                Ok(RangeOutcome::Completed {
                    from,
                    to,
                    events: count,
                    caught_up: to == safe_head,
                })
            }
        }
    }

    /// `Some(retry)` once every event finished, `None` on shutdown.
    async fn process(
        &self,
        events: Vec<ProposalPassed>,
        shutdown: &mut broadcast::Receiver<()>,
    ) -> Option<bool> {
        if events.is_empty() {
            return Some(false);
        }
        let mut workers: JoinSet<Worker> = JoinSet::new();
        for event in events {
            let relayer = Arc::clone(&self.relayer);
            let semaphore = Arc::clone(&self.semaphore);
            workers.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                let result = relayer.handle_event(&event).await;
                (event, result)
            });
        }

        tokio::select! {
            retry = drain(&mut workers) => Some(retry),
            _ = shutdown.recv() => {
                warn!(
                    in_flight = workers.len(),
                    grace = ?self.config.shutdown_grace,
                    "shutdown requested; waiting for in-flight executions"
                );
                if tokio::time::timeout(self.config.shutdown_grace, drain(&mut workers))
                    .await
                    .is_err()
                {
                    warn!(
                        abandoned = workers.len(),
                        "abandoning in-flight executions; range will be replayed on restart"
                    );
                    workers.abort_all();
                }
                None
            }
        }
    }
}

/// Wait for every worker. Returns whether any failure is worth a replay.
async fn drain(workers: &mut JoinSet<Worker>) -> bool {
    let mut retry = false;
    while let Some(joined) = workers.join_next().await {
        match joined {
            Ok((event, Ok(outcome))) => {
                debug!(proposal_id = %event.proposal_id, ?outcome, "event handled");
            }
            Ok((event, Err(e))) if e.is_retryable() => {
                warn!(proposal_id = %event.proposal_id, error = %e, "transient relay failure");
                retry = true;
            }
            Ok((event, Err(e))) => {
                error!(
                    proposal_id = %event.proposal_id,
                    block = event.block_number,
                    error = %e,
                    "event not executed; operator action required"
                );
            }
            Err(e) => {
                error!(error = %e, "relay worker panicked");
                retry = true;
            }
        }
    }
    retry
}
