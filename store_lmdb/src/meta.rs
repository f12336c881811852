//! LMDB implementation of CheckpointStore.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use crossgov_store::{CheckpointStore, StoreError};

use crate::LmdbError;

const KEY_RELAYER_CHECKPOINT: &[u8] = b"relayer_checkpoint";

pub struct LmdbCheckpointStore {
    pub(crate) env: Arc<Env>,
    pub(crate) meta_db: Database<Bytes, Bytes>,
}

impl CheckpointStore for LmdbCheckpointStore {
    fn get_checkpoint(&self) -> Result<Option<u64>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        match self
            .meta_db
            .get(&rtxn, KEY_RELAYER_CHECKPOINT)
            .map_err(LmdbError::from)?
        {
            Some(bytes) => {
                let arr: [u8; 8] = bytes
                    .try_into()
                    .map_err(|_| LmdbError::Corrupt {
                        table: "meta",
                        reason: format!("checkpoint is {} bytes, expected 8", bytes.len()),
                    })?;
                Ok(Some(u64::from_be_bytes(arr)))
            }
            None => Ok(None),
        }
    }

    fn put_checkpoint(&self, block: u64) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.meta_db
            .put(&mut wtxn, KEY_RELAYER_CHECKPOINT, &block.to_be_bytes())
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LmdbEnvironment;

    #[test]
    fn checkpoint_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let env = LmdbEnvironment::open(dir.path(), 16 << 20).unwrap();
        let store = env.checkpoint_store();
        assert_eq!(store.get_checkpoint().unwrap(), None);
        store.put_checkpoint(1234).unwrap();
        store.put_checkpoint(1300).unwrap();
        assert_eq!(store.get_checkpoint().unwrap(), Some(1300));
    }

    #[test]
    fn short_checkpoint_is_reported_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let env = LmdbEnvironment::open(dir.path(), 16 << 20).unwrap();
        let store = env.checkpoint_store();
        let mut wtxn = store.env.write_txn().unwrap();
        store
            .meta_db
            .put(&mut wtxn, KEY_RELAYER_CHECKPOINT, &[1, 2, 3])
            .unwrap();
        wtxn.commit().unwrap();

        assert!(matches!(
            store.get_checkpoint(),
            Err(StoreError::Corrupt { table: "meta", .. })
        ));
    }
}
