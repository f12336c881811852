//! Freezing and publishing one proposal at the same time.

use std::sync::Arc;

use crossgov_governance::{GovernanceError, MerkleFreezer};
use crossgov_nullables::{
    NullChainA, NullChainB, NullClock, NullStore, PauseHandle, PausingArtifacts,
};
use crossgov_relayer::{CrossChainPublisher, PublishError};
use crossgov_store::{ArtifactStore, VoteStore};
use crossgov_types::{Address, Bytes, Support, VoteRecord, U256};
use crossgov_utils::KeyedLocks;

fn vote(id: U256, voter: u8, power: u64) -> VoteRecord {
    VoteRecord {
        proposal_id: id,
        voter: Address::from([voter; 20]),
        power: U256::from(power),
        support: Support::Yes,
        nonce: U256::one(),
        deadline: U256::from(9_999),
        signature: Bytes::default(),
    }
}

struct Harness {
    votes: Arc<NullStore>,
    artifacts: Arc<PausingArtifacts>,
    pause: PauseHandle,
    freezer: Arc<MerkleFreezer>,
    publisher: Arc<CrossChainPublisher>,
    chain_a: Arc<NullChainA>,
    chain_b: Arc<NullChainB>,
}

fn harness() -> Harness {
    let votes = Arc::new(NullStore::new());
    let (artifacts, pause) = PausingArtifacts::new(votes.clone());
    let chain_a = Arc::new(NullChainA::new());
    let chain_b = Arc::new(NullChainB::new());
    Harness {
        freezer: Arc::new(MerkleFreezer::new(
            votes.clone(),
            artifacts.clone(),
            KeyedLocks::new(),
        )),
        publisher: Arc::new(CrossChainPublisher::new(
            chain_a.clone(),
            chain_b.clone(),
            artifacts.clone(),
            Arc::new(NullClock::new(1_000)),
        )),
        votes,
        artifacts,
        pause,
        chain_a,
        chain_b,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn freeze_finishing_after_publish_is_refused() {
    let h = harness();
    let id = U256::from(5);
    h.votes.upsert_vote(&vote(id, 0x01, 10)).unwrap();
    let published = h.freezer.freeze(id).await.unwrap();

    // A later vote, frozen by a call that stalls before writing.
    h.votes.upsert_vote(&vote(id, 0x02, 20)).unwrap();
    h.artifacts.pause_next_read();
    let freezer = h.freezer.clone();
    let refreeze = tokio::spawn(async move { freezer.freeze(id).await });
    h.pause.wait_paused();

    let record = h
        .publisher
        .publish(id, U256::one(), U256::one())
        .await
        .unwrap();
    assert_eq!(record.root, published.root);

    h.pause.resume();
    assert!(matches!(
        refreeze.await.unwrap(),
        Err(GovernanceError::AlreadyPublished { root, .. }) if root == published.root
    ));
    assert_eq!(h.votes.get_artifact(&id).unwrap().unwrap().root, published.root);
    assert_eq!(h.chain_a.published()[0].power_root, published.root);
    assert_eq!(h.chain_b.freezes()[0].power_root, published.root);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn refreeze_between_read_and_reservation_aborts_publish() {
    let h = harness();
    let id = U256::from(6);
    h.votes.upsert_vote(&vote(id, 0x01, 10)).unwrap();
    let first = h.freezer.freeze(id).await.unwrap();

    h.artifacts.pause_next_read();
    let publisher = h.publisher.clone();
    let publish =
        tokio::spawn(async move { publisher.publish(id, U256::one(), U256::one()).await });
    h.pause.wait_paused();

    h.votes.upsert_vote(&vote(id, 0x02, 20)).unwrap();
    let second = h.freezer.freeze(id).await.unwrap();
    assert_ne!(first.root, second.root);

    h.pause.resume();
    assert!(matches!(
        publish.await.unwrap(),
        Err(PublishError::RootChanged { expected, found, .. })
            if expected == first.root && found == second.root
    ));
    assert!(h.chain_a.published().is_empty());
    assert_eq!(h.votes.get_publication(&id).unwrap(), None);

    let record = h
        .publisher
        .publish(id, U256::one(), U256::one())
        .await
        .unwrap();
    assert_eq!(record.root, second.root);
    assert_eq!(h.votes.get_artifact(&id).unwrap().unwrap().root, second.root);
}
