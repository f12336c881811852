//! LMDB implementation of ExecutionStore.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use crossgov_store::{ExecutionStore, StoreError};
use crossgov_types::{ExecutionRecord, ProposalId};

use crate::keys::proposal_key;
use crate::LmdbError;

pub struct LmdbExecutionStore {
    pub(crate) env: Arc<Env>,
    pub(crate) executions_db: Database<Bytes, Bytes>,
}

impl ExecutionStore for LmdbExecutionStore {
    fn get_execution(&self, proposal: &ProposalId) -> Result<Option<ExecutionRecord>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        match self
            .executions_db
            .get(&rtxn, &proposal_key(proposal)[..])
            .map_err(LmdbError::from)?
        {
            Some(bytes) => Ok(Some(bincode::deserialize(bytes).map_err(LmdbError::from)?)),
            None => Ok(None),
        }
    }

    fn put_execution(&self, record: &ExecutionRecord) -> Result<(), StoreError> {
        let bytes = bincode::serialize(record).map_err(LmdbError::from)?;
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.executions_db
            .put(&mut wtxn, &proposal_key(&record.proposal_id)[..], &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LmdbEnvironment;
    use crossgov_types::{Timestamp, H256, U256};

    #[test]
    fn execution_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let record = ExecutionRecord {
            proposal_id: U256::from(9),
            action_data_hash: H256::repeat_byte(0x01),
            tx_hash: H256::repeat_byte(0x02),
            executed_at: Timestamp::new(1_700_000_000),
        };
        {
            let env = LmdbEnvironment::open(dir.path(), 16 << 20).unwrap();
            env.execution_store().put_execution(&record).unwrap();
        }
        let env = LmdbEnvironment::open(dir.path(), 16 << 20).unwrap();
        assert_eq!(env.execution_store().get_execution(&U256::from(9)).unwrap(), Some(record));
        assert_eq!(env.execution_store().get_execution(&U256::from(10)).unwrap(), None);
    }
}
