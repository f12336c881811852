//! RPC error types and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use crossgov_governance::GovernanceError;
use crossgov_types::TypeError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Bad signature: {0}")]
    BadSignature(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("upstream chain unavailable: {0}")]
    Upstream(String),

    #[error("{0}")]
    Internal(String),

    #[error("server error: {0}")]
    Server(String),
}

impl RpcError {
    pub fn status(&self) -> StatusCode {
        match self {
            RpcError::BadRequest(_) | RpcError::BadSignature(_) => StatusCode::BAD_REQUEST,
            RpcError::NotFound(_) => StatusCode::NOT_FOUND,
            RpcError::Conflict(_) => StatusCode::CONFLICT,
            RpcError::Upstream(_) => StatusCode::BAD_GATEWAY,
            RpcError::Internal(_) | RpcError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(%status, error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<GovernanceError> for RpcError {
    fn from(e: GovernanceError) -> Self {
        match e {
            GovernanceError::Validation(msg) => RpcError::BadRequest(msg),
            GovernanceError::BadSignature(e) => RpcError::BadSignature(e.to_string()),
            GovernanceError::UpstreamUnavailable(msg) => RpcError::Upstream(msg),
            GovernanceError::NoVotes(_) => RpcError::BadRequest(e.to_string()),
            GovernanceError::NotFrozen(_) => RpcError::NotFound(e.to_string()),
            GovernanceError::AlreadyPublished { .. } => RpcError::Conflict(e.to_string()),
            GovernanceError::PowerOverflow
            | GovernanceError::CorruptArtifact(_)
            | GovernanceError::MultiproofLengthMismatch { .. }
            | GovernanceError::Merkle(_)
            | GovernanceError::Store(_) => RpcError::Internal(e.to_string()),
        }
    }
}

impl From<TypeError> for RpcError {
    fn from(e: TypeError) -> Self {
        RpcError::BadRequest(e.to_string())
    }
}

impl From<crossgov_chain::ChainError> for RpcError {
    fn from(e: crossgov_chain::ChainError) -> Self {
        RpcError::Upstream(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn governance_errors_map_to_status() {
        let cases = [
            (GovernanceError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (GovernanceError::UpstreamUnavailable("x".into()), StatusCode::BAD_GATEWAY),
            (
                GovernanceError::MultiproofLengthMismatch {
                    leaves: 2,
                    proof: 0,
                    flags: 0,
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (GovernanceError::NotFrozen(crossgov_types::U256::one()), StatusCode::NOT_FOUND),
        ];
        for (err, status) in cases {
            assert_eq!(RpcError::from(err).status(), status);
        }
    }
}
