//! Event-consumer checkpoint.

use crate::StoreError;

/// Last Chain B block whose events were fully processed.
pub trait CheckpointStore: Send + Sync {
    fn get_checkpoint(&self) -> Result<Option<u64>, StoreError>;

    fn put_checkpoint(&self, block: u64) -> Result<(), StoreError>;
}
