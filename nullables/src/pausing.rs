//! Artifact store wrapper that can hold a caller between a read and its
//! next write, to force interleavings of freeze and publish.

use crossgov_store::{ArtifactStore, Reservation, StoreError};
use crossgov_types::{MerkleArtifact, ProposalId, PublicationRecord};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Delegates everything to `inner`. Once armed, the next `get_artifact`
/// performs its read and then blocks its thread until resumed.
pub struct PausingArtifacts {
    inner: Arc<dyn ArtifactStore>,
    armed: AtomicBool,
    paused: Mutex<Sender<()>>,
    resume: Mutex<Receiver<()>>,
}

/// Test-side control for a [`PausingArtifacts`].
pub struct PauseHandle {
    paused: Receiver<()>,
    resume: Sender<()>,
}

impl PausingArtifacts {
    pub fn new(inner: Arc<dyn ArtifactStore>) -> (Arc<Self>, PauseHandle) {
        let (paused_tx, paused_rx) = channel();
        let (resume_tx, resume_rx) = channel();
        let store = Arc::new(Self {
            inner,
            armed: AtomicBool::new(false),
            paused: Mutex::new(paused_tx),
            resume: Mutex::new(resume_rx),
        });
        let handle = PauseHandle {
            paused: paused_rx,
            resume: resume_tx,
        };
        (store, handle)
    }

    pub fn pause_next_read(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }
}

impl PauseHandle {
    /// Block until a caller is held. Panics after five seconds.
    pub fn wait_paused(&self) {
        self.paused
            .recv_timeout(Duration::from_secs(5))
            .expect("no caller reached the paused read");
    }

    pub fn resume(&self) {
        let _ = self.resume.send(());
    }
}

impl ArtifactStore for PausingArtifacts {
    fn put_artifact(&self, artifact: &MerkleArtifact) -> Result<(), StoreError> {
        self.inner.put_artifact(artifact)
    }

    fn get_artifact(&self, proposal: &ProposalId) -> Result<Option<MerkleArtifact>, StoreError> {
        let artifact = self.inner.get_artifact(proposal)?;
        if self.armed.swap(false, Ordering::SeqCst) {
            let _ = self.paused.lock().unwrap().send(());
            let _ = self.resume.lock().unwrap().recv();
        }
        Ok(artifact)
    }

    fn put_artifact_unless_published(
        &self,
        artifact: &MerkleArtifact,
    ) -> Result<Option<PublicationRecord>, StoreError> {
        self.inner.put_artifact_unless_published(artifact)
    }

    fn put_publication(&self, record: &PublicationRecord) -> Result<(), StoreError> {
        self.inner.put_publication(record)
    }

    fn get_publication(
        &self,
        proposal: &ProposalId,
    ) -> Result<Option<PublicationRecord>, StoreError> {
        self.inner.get_publication(proposal)
    }

    fn reserve_publication(&self, record: &PublicationRecord) -> Result<Reservation, StoreError> {
        self.inner.reserve_publication(record)
    }

    fn release_publication(&self, proposal: &ProposalId) -> Result<(), StoreError> {
        self.inner.release_publication(proposal)
    }
}
