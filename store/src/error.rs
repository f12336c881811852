use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    /// A stored value decoded but is not a valid record of its table.
    #[error("corrupt {table} entry: {reason}")]
    Corrupt { table: &'static str, reason: String },
}
