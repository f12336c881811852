//! LMDB environment setup.

use std::path::Path;
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};

use crate::{
    LmdbArtifactStore, LmdbCheckpointStore, LmdbError, LmdbExecutionStore, LmdbVoteStore,
};

const DB_VOTES: &str = "votes";
const DB_ARTIFACTS: &str = "artifacts";
const DB_PUBLICATIONS: &str = "publications";
const DB_EXECUTIONS: &str = "executions";
const DB_META: &str = "meta";

/// Wraps the LMDB environment and all database handles.
pub struct LmdbEnvironment {
    env: Arc<Env>,
    votes: Database<Bytes, Bytes>,
    artifacts: Database<Bytes, Bytes>,
    publications: Database<Bytes, Bytes>,
    executions: Database<Bytes, Bytes>,
    meta: Database<Bytes, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given path.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)?;
        // SAFETY: the environment is opened once per process for this path
        // and never concurrently memory-mapped with different options.
        let env = unsafe { EnvOpenOptions::new().map_size(map_size).max_dbs(8).open(path)? };

        let mut wtxn = env.write_txn()?;
        let votes = env.create_database(&mut wtxn, Some(DB_VOTES))?;
        let artifacts = env.create_database(&mut wtxn, Some(DB_ARTIFACTS))?;
        let publications = env.create_database(&mut wtxn, Some(DB_PUBLICATIONS))?;
        let executions = env.create_database(&mut wtxn, Some(DB_EXECUTIONS))?;
        let meta = env.create_database(&mut wtxn, Some(DB_META))?;
        wtxn.commit()?;

        tracing::info!(path = %path.display(), "opened LMDB environment");

        Ok(Self {
            env: Arc::new(env),
            votes,
            artifacts,
            publications,
            executions,
            meta,
        })
    }

    pub fn vote_store(&self) -> LmdbVoteStore {
        LmdbVoteStore {
            env: self.env.clone(),
            votes_db: self.votes,
        }
    }

    pub fn artifact_store(&self) -> LmdbArtifactStore {
        LmdbArtifactStore {
            env: self.env.clone(),
            artifacts_db: self.artifacts,
            publications_db: self.publications,
        }
    }

    pub fn execution_store(&self) -> LmdbExecutionStore {
        LmdbExecutionStore {
            env: self.env.clone(),
            executions_db: self.executions,
        }
    }

    pub fn checkpoint_store(&self) -> LmdbCheckpointStore {
        LmdbCheckpointStore {
            env: self.env.clone(),
            meta_db: self.meta,
        }
    }
}
