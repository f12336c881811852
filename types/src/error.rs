//! Parse errors for wire encodings.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid integer: {0}")]
    InvalidInteger(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("unknown support value: {0}")]
    InvalidSupport(String),
}
