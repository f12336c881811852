use ethers_core::types::Address;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("malformed signature: {0}")]
    Malformed(String),

    #[error("signer recovery failed: {0}")]
    Recovery(String),

    #[error("signature recovers to {recovered:?}, not the claimed voter {claimed:?}")]
    SignerMismatch { claimed: Address, recovered: Address },
}
