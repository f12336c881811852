//! Two-phase publication of a frozen root.
//!
//! Before phase 1 the publication is reserved in the store, atomically with
//! a check that the stored artifact still has the root being published.
//! From then on freezes of the proposal are refused, including freezes run
//! by another process against the same database.
//!
//! Phase 1 records the root and totals on Chain A. Phase 2 reads the
//! authoritative action hash, window, quorum and threshold back from Chain A
//! and mirrors them into the Chain B verifier. The phases are not atomic; a
//! phase 2 failure is persisted as a Chain-A-only publication and resumed
//! with [`CrossChainPublisher::resume_mirror`].

use std::sync::Arc;

use crossgov_chain::{ChainAPublisher, ChainBVerifier, FreezeParams};
use crossgov_store::{ArtifactStore, Reservation};
use crossgov_types::{Clock, ProposalId, PublicationRecord, U256};
use tracing::{error, info, warn};

use crate::PublishError;

pub struct CrossChainPublisher {
    chain_a: Arc<dyn ChainAPublisher>,
    chain_b: Arc<dyn ChainBVerifier>,
    artifacts: Arc<dyn ArtifactStore>,
    clock: Arc<dyn Clock>,
}

impl CrossChainPublisher {
    pub fn new(
        chain_a: Arc<dyn ChainAPublisher>,
        chain_b: Arc<dyn ChainBVerifier>,
        artifacts: Arc<dyn ArtifactStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            chain_a,
            chain_b,
            artifacts,
            clock,
        }
    }

    /// Publish the frozen artifact of `proposal_id` to both chains.
    pub async fn publish(
        &self,
        proposal_id: ProposalId,
        quorum: U256,
        threshold: U256,
    ) -> Result<PublicationRecord, PublishError> {
        let artifact = self
            .artifacts
            .get_artifact(&proposal_id)?
            .ok_or(PublishError::NotFrozen(proposal_id))?;

        let mut record = PublicationRecord {
            proposal_id,
            root: artifact.root,
            chain_a_tx: None,
            chain_b_tx: None,
            published_at: self.clock.now(),
        };
        match self.artifacts.reserve_publication(&record)? {
            Reservation::Reserved => {}
            Reservation::Exists(existing) => {
                return Err(if existing.is_mirrored() {
                    PublishError::AlreadyPublished(proposal_id)
                } else {
                    PublishError::PendingMirror {
                        proposal_id,
                        chain_a_tx: existing.chain_a_tx,
                    }
                })
            }
            Reservation::NotFrozen => return Err(PublishError::NotFrozen(proposal_id)),
            Reservation::RootChanged { current } => {
                warn!(%proposal_id, read = ?artifact.root, ?current, "re-frozen while publishing");
                return Err(PublishError::RootChanged {
                    proposal_id,
                    expected: artifact.root,
                    found: current,
                });
            }
        }

        info!(
            %proposal_id,
            root = ?artifact.root,
            total = %artifact.counts.total_counted,
            %quorum,
            %threshold,
            "publishing root to Chain A"
        );
        let outcome = match self
            .chain_a
            .publish_root(
                proposal_id,
                artifact.root,
                artifact.counts.total_counted,
                quorum,
                threshold,
            )
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(%proposal_id, error = %e, "publishRoot outcome unknown; keeping reservation");
                return Err(PublishError::ChainAUnconfirmed {
                    proposal_id,
                    reason: e.to_string(),
                });
            }
        };
        if !outcome.success {
            error!(%proposal_id, tx = ?outcome.tx_hash, "publishRoot reverted");
            self.artifacts.release_publication(&proposal_id)?;
            return Err(PublishError::ChainAPublishFailed {
                tx: outcome.tx_hash,
            });
        }

        record.chain_a_tx = Some(outcome.tx_hash);
        self.artifacts.put_publication(&record)?;
        info!(%proposal_id, tx = ?outcome.tx_hash, "root published on Chain A");

        self.mirror(record).await
    }

    /// Finish an interrupted publication.
    ///
    /// A reservation whose Chain A outcome was never confirmed is settled
    /// against Chain A first: if the reserved root is there, phase 2 runs;
    /// if nothing was published, the reservation is released.
    pub async fn resume_mirror(
        &self,
        proposal_id: ProposalId,
    ) -> Result<PublicationRecord, PublishError> {
        let record = self
            .artifacts
            .get_publication(&proposal_id)?
            .ok_or(PublishError::NotPublished(proposal_id))?;
        if record.is_mirrored() {
            return Err(PublishError::AlreadyPublished(proposal_id));
        }

        if !record.is_on_chain_a() {
            let on_chain = self.chain_a.proposal(proposal_id).await?;
            if !on_chain.frozen {
                self.artifacts.release_publication(&proposal_id)?;
                warn!(%proposal_id, "root never reached Chain A; reservation released");
                return Err(PublishError::NotPublished(proposal_id));
            }
            if on_chain.power_root != record.root {
                return Err(PublishError::RootChanged {
                    proposal_id,
                    expected: record.root,
                    found: on_chain.power_root,
                });
            }
            info!(%proposal_id, root = ?record.root, "reserved root found on Chain A");
        }

        info!(%proposal_id, chain_a_tx = ?record.chain_a_tx, "resuming Chain B mirror");
        self.mirror(record).await
    }

    async fn mirror(
        &self,
        mut record: PublicationRecord,
    ) -> Result<PublicationRecord, PublishError> {
        let proposal_id = record.proposal_id;
        let chain_a_tx = record.chain_a_tx;
        let failed = |reason: String| {
            error!(
                %proposal_id,
                ?chain_a_tx,
                %reason,
                "root is on Chain A but not mirrored to Chain B; rerun with resume"
            );
            PublishError::ChainBMirrorFailed { chain_a_tx, reason }
        };

        let authoritative = self
            .chain_a
            .proposal(proposal_id)
            .await
            .map_err(|e| failed(format!("reading Chain A proposal: {e}")))?;
        let params = FreezeParams {
            proposal_id,
            power_root: record.root,
            action_data_hash: authoritative.action_data_hash,
            window: authoritative.window,
            quorum: authoritative.quorum,
            threshold: authoritative.threshold,
        };

        let outcome = self
            .chain_b
            .freeze_proposal(params)
            .await
            .map_err(|e| failed(e.to_string()))?;
        if !outcome.success {
            return Err(failed(format!("freezeProposal reverted in {:?}", outcome.tx_hash)));
        }

        record.chain_b_tx = Some(outcome.tx_hash);
        self.artifacts.put_publication(&record)?;
        info!(%proposal_id, tx = ?outcome.tx_hash, "freeze mirrored to Chain B");
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossgov_nullables::{NullChainA, NullChainB, NullClock, NullStore};
    use crossgov_types::{MerkleArtifact, Tallies, Timestamp, H256};

    struct Fixture {
        publisher: CrossChainPublisher,
        chain_a: Arc<NullChainA>,
        chain_b: Arc<NullChainB>,
        store: Arc<NullStore>,
    }

    fn fixture() -> Fixture {
        let chain_a = Arc::new(NullChainA::new());
        let chain_b = Arc::new(NullChainB::new());
        let store = Arc::new(NullStore::new());
        let id = U256::from(5);
        chain_a.set_action_hash(id, H256::repeat_byte(0xAC));
        chain_a.set_window(id, 100, 200);
        store
            .put_artifact(&MerkleArtifact {
                proposal_id: id,
                root: H256::repeat_byte(0x77),
                counts: Tallies {
                    total_counted: U256::from(42),
                    ..Tallies::default()
                },
                voters: vec![],
                leaves: vec![],
            })
            .unwrap();
        Fixture {
            publisher: CrossChainPublisher::new(
                chain_a.clone(),
                chain_b.clone(),
                store.clone(),
                Arc::new(NullClock::new(1_000)),
            ),
            chain_a,
            chain_b,
            store,
        }
    }

    #[tokio::test]
    async fn publishes_then_mirrors_authoritative_values() {
        let f = fixture();
        let record = f
            .publisher
            .publish(U256::from(5), U256::from(10), U256::from(6))
            .await
            .unwrap();
        assert!(record.is_mirrored());

        let published = f.chain_a.published();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].total_power, U256::from(42));

        let freezes = f.chain_b.freezes();
        assert_eq!(freezes.len(), 1);
        assert_eq!(freezes[0].power_root, H256::repeat_byte(0x77));
        assert_eq!(freezes[0].action_data_hash, H256::repeat_byte(0xAC));
        assert_eq!((freezes[0].window.start, freezes[0].window.end), (100, 200));
        assert_eq!(freezes[0].quorum, U256::from(10));
        assert_eq!(freezes[0].threshold, U256::from(6));
    }

    #[tokio::test]
    async fn chain_a_revert_stops_before_chain_b() {
        let f = fixture();
        f.chain_a.revert_publish(true);
        let err = f
            .publisher
            .publish(U256::from(5), U256::one(), U256::one())
            .await
            .unwrap_err();
        assert!(matches!(err, PublishError::ChainAPublishFailed { .. }));
        assert!(f.chain_b.freezes().is_empty());
        assert!(f.store.get_publication(&U256::from(5)).unwrap().is_none());
    }

    #[tokio::test]
    async fn chain_b_failure_is_surfaced_and_resumable() {
        let f = fixture();
        f.chain_b.fail_freeze(true);
        let err = f
            .publisher
            .publish(U256::from(5), U256::one(), U256::one())
            .await
            .unwrap_err();
        assert!(matches!(err, PublishError::ChainBMirrorFailed { .. }));

        let pending = f.store.get_publication(&U256::from(5)).unwrap().unwrap();
        assert!(!pending.is_mirrored());
        assert!(matches!(
            f.publisher.publish(U256::from(5), U256::one(), U256::one()).await,
            Err(PublishError::PendingMirror { .. })
        ));

        f.chain_b.fail_freeze(false);
        let record = f.publisher.resume_mirror(U256::from(5)).await.unwrap();
        assert!(record.is_mirrored());
        assert_eq!(f.chain_a.published().len(), 1);
        assert!(matches!(
            f.publisher.resume_mirror(U256::from(5)).await,
            Err(PublishError::AlreadyPublished(_))
        ));
    }

    #[tokio::test]
    async fn lost_receipt_keeps_reservation_until_resumed() {
        let f = fixture();
        let id = U256::from(5);
        f.chain_a.lose_publish_receipt(true);
        assert!(matches!(
            f.publisher.publish(id, U256::one(), U256::one()).await,
            Err(PublishError::ChainAUnconfirmed { .. })
        ));

        let reserved = f.store.get_publication(&id).unwrap().unwrap();
        assert_eq!(reserved.chain_a_tx, None);
        let mut refrozen = f.store.get_artifact(&id).unwrap().unwrap();
        refrozen.root = H256::repeat_byte(0x99);
        assert_eq!(
            f.store.put_artifact_unless_published(&refrozen).unwrap(),
            Some(reserved)
        );
        assert!(matches!(
            f.publisher.publish(id, U256::one(), U256::one()).await,
            Err(PublishError::PendingMirror { chain_a_tx: None, .. })
        ));

        let record = f.publisher.resume_mirror(id).await.unwrap();
        assert!(record.is_mirrored());
        assert_eq!(record.root, H256::repeat_byte(0x77));
        assert_eq!(f.chain_a.published().len(), 1);
        assert_eq!(f.chain_b.freezes()[0].power_root, H256::repeat_byte(0x77));
    }

    #[tokio::test]
    async fn resume_releases_reservation_that_never_landed() {
        let f = fixture();
        let id = U256::from(5);
        let reservation = PublicationRecord {
            proposal_id: id,
            root: H256::repeat_byte(0x77),
            chain_a_tx: None,
            chain_b_tx: None,
            published_at: Timestamp::new(1),
        };
        assert_eq!(
            f.store.reserve_publication(&reservation).unwrap(),
            Reservation::Reserved
        );

        assert!(matches!(
            f.publisher.resume_mirror(id).await,
            Err(PublishError::NotPublished(_))
        ));
        assert_eq!(f.store.get_publication(&id).unwrap(), None);
        assert!(f.chain_b.freezes().is_empty());

        let record = f.publisher.publish(id, U256::one(), U256::one()).await.unwrap();
        assert!(record.is_mirrored());
    }

    #[tokio::test]
    async fn unfrozen_proposal_is_rejected() {
        let f = fixture();
        assert!(matches!(
            f.publisher.publish(U256::from(99), U256::one(), U256::one()).await,
            Err(PublishError::NotFrozen(_))
        ));
    }
}
