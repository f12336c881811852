//! Chain collaborators.
//!
//! The on-chain contracts are consumed only through their call and event
//! interfaces. This crate defines those interfaces as async traits
//! ([`ChainAPublisher`], [`BalanceReader`], [`ActionExecutor`],
//! [`ChainBVerifier`]) and implements them over `ethers` contract bindings.
//! Tests substitute the in-memory fakes from `crossgov-nullables`.

pub mod bindings;
pub mod chain_a;
pub mod chain_b;
pub mod client;
pub mod config;
pub mod error;
pub mod traits;

pub use chain_a::EthChainA;
pub use chain_b::EthChainB;
pub use client::{http_provider, signed_client, SignedClient};
pub use config::ChainConfig;
pub use error::ChainError;
pub use traits::{
    ActionExecutor, AssetKind, BalanceReader, BatchVote, ChainAPublisher, ChainBVerifier,
    FreezeParams, ProposalPassed, TxOutcome,
};
