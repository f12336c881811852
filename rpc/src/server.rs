//! Axum router and server.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use crossgov_chain::{ChainAPublisher, ChainBVerifier};
use crossgov_governance::{MerkleFreezer, PowerOracle, VoteLedger};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::RpcError;
use crate::handlers;
use crate::metrics::RpcMetrics;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<VoteLedger>,
    pub freezer: Arc<MerkleFreezer>,
    pub oracle: PowerOracle,
    pub chain_a: Arc<dyn ChainAPublisher>,
    pub chain_b: Arc<dyn ChainBVerifier>,
    pub metrics: Arc<RpcMetrics>,
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/proposal/:id", get(handlers::get_proposal))
        .route("/compute-power", post(handlers::compute_power))
        .route("/vote", post(handlers::submit_vote))
        .route("/merkle/:id", post(handlers::freeze))
        .route("/multiproof/:id", post(handlers::multiproof))
        .route("/nextNonce/:id/:voter", get(handlers::next_nonce));

    Router::new()
        .nest("/api", api)
        .route("/metrics", get(handlers::metrics))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub struct RpcServer {
    pub port: u16,
}

impl RpcServer {
    pub fn new(port: u16) -> Self {
        Self { port }
    }

    /// Bind and serve until `shutdown` resolves.
    pub async fn start<F>(&self, state: AppState, shutdown: F) -> Result<(), RpcError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| RpcError::Server(format!("bind {addr}: {e}")))?;
        info!(%addr, "rpc listening");

        axum::serve(listener, router(state))
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| RpcError::Server(e.to_string()))
    }
}
