use crossgov_types::H256;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChainError {
    /// Node error, pruned historical state, timeout or decoding failure.
    #[error("upstream chain unavailable: {0}")]
    Upstream(String),

    #[error("transaction {0:?} dropped before confirmation")]
    Dropped(H256),

    #[error("chain client configuration: {0}")]
    Config(String),
}
