//! HTTP service for CrossGov.
//!
//! Endpoints (all under `/api`):
//! - `GET  /proposal/:id` snapshot, window, deadline and signing domain
//! - `POST /compute-power` voting power at the snapshot
//! - `POST /vote` signed vote submission
//! - `POST /merkle/:id` freeze
//! - `POST /multiproof/:id` batched inclusion proof
//! - `GET  /nextNonce/:id/:voter` Chain B nonce
//!
//! plus `GET /metrics` in Prometheus text format.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod server;

pub use error::RpcError;
pub use metrics::RpcMetrics;
pub use server::{router, AppState, RpcServer};
