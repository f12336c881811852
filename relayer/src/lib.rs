//! Cross-chain side of CrossGov.
//!
//! - [`CrossChainPublisher`] pushes a frozen root to Chain A and mirrors the
//!   freeze to Chain B.
//! - [`Relayer`] turns a Chain B `ProposalPassed` event into exactly one
//!   authorised execution on Chain A.
//! - [`EventListener`] feeds the relayer from a checkpointed polling loop.

pub mod action;
pub mod error;
pub mod listener;
pub mod publisher;
pub mod relayer;
pub mod shutdown;

pub use action::{action_data_hash, encode_action_data, encode_call, ActionRegistry, ActionSpec};
pub use error::{PublishError, RelayError};
pub use listener::{EventListener, ListenerConfig, RangeOutcome};
pub use publisher::CrossChainPublisher;
pub use relayer::{RelayOutcome, RelayState, Relayer};
pub use shutdown::ShutdownController;
