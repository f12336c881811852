//! Request handlers.

use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::Json;
use crossgov_governance::{prove_subset, SubmitOutcome, VoteSubmission};
use crossgov_types::serde_helpers::{checksummed, parse_address, parse_hex_bytes};
use crossgov_types::{parse_proposal_id, Address, ProposalId};
use tracing::{debug, info};

use crate::dto::*;
use crate::error::RpcError;
use crate::server::AppState;

fn proposal_id(raw: &str) -> Result<ProposalId, RpcError> {
    parse_proposal_id(raw).map_err(|e| RpcError::BadRequest(format!("invalid proposal id: {e}")))
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, RpcError> {
    payload
        .map(|Json(v)| v)
        .map_err(|rejection| RpcError::BadRequest(rejection.body_text()))
}

/// Count upstream failures before handing the error back.
fn observe(state: &AppState, err: RpcError) -> RpcError {
    if matches!(err, RpcError::Upstream(_)) {
        state.metrics.upstream_errors.inc();
    }
    err
}

// ── Proposal ─────────────────────────────────────────────────────────────

pub async fn get_proposal(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProposalResponse>, RpcError> {
    let id = proposal_id(&id)?;
    let (snapshot, window, deadline) = tokio::try_join!(
        state.chain_a.snapshot(id),
        state.chain_a.window(id),
        state.chain_a.deadline(id),
    )
    .map_err(|e| observe(&state, e.into()))?;

    let domain = state.ledger.domain();
    Ok(Json(ProposalResponse {
        proposal_id: id,
        snapshot_block: snapshot.block,
        snapshot_er: snapshot.exchange_rate,
        voting_start: window.start,
        voting_end: window.end,
        deadline,
        chain_b: ChainBDomain {
            chain_id: domain.chain_id,
            verifier: domain.verifying_contract,
        },
    }))
}

// ── Power ────────────────────────────────────────────────────────────────

pub async fn compute_power(
    State(state): State<AppState>,
    payload: Result<Json<ComputePowerRequest>, JsonRejection>,
) -> Result<Json<PowerResponse>, RpcError> {
    let req = body(payload)?;
    let voter = parse_address(&req.voter)?;
    let power = state
        .oracle
        .compute_power(req.proposal_id, voter)
        .await
        .map_err(|e| observe(&state, e.into()))?;
    Ok(Json(PowerResponse { power }))
}

// ── Vote ─────────────────────────────────────────────────────────────────

pub async fn submit_vote(
    State(state): State<AppState>,
    payload: Result<Json<VoteRequest>, JsonRejection>,
) -> Result<Json<VoteResponse>, RpcError> {
    let result = async {
        let req = body(payload)?;
        let submission = VoteSubmission {
            proposal_id: req.proposal_id,
            voter: parse_address(&req.voter)?,
            support: req.support,
            abstain: req.abstain,
            nonce: req.nonce,
            deadline: req.deadline,
            signature: parse_hex_bytes(&req.signature)?,
            claimed_power: req.power,
        };
        state.ledger.submit(submission).await.map_err(RpcError::from)
    }
    .await;

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) => {
            state.metrics.votes_rejected.inc();
            debug!(error = %e, "vote rejected");
            return Err(observe(&state, e));
        }
    };

    let response = match outcome {
        SubmitOutcome::Accepted(vote) => {
            state.metrics.votes_accepted.inc();
            VoteResponse {
                ok: true,
                stored: true,
                vote,
                stored_nonce: None,
            }
        }
        SubmitOutcome::Ignored {
            record,
            stored_nonce,
        } => {
            state.metrics.votes_ignored.inc();
            VoteResponse {
                ok: true,
                stored: false,
                vote: record,
                stored_nonce: Some(stored_nonce),
            }
        }
    };
    Ok(Json(response))
}

// ── Freeze / multiproof ──────────────────────────────────────────────────

pub async fn freeze(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<FreezeResponse>, RpcError> {
    let id = proposal_id(&id)?;
    let artifact = state.freezer.freeze(id).await?;
    state.metrics.freezes.inc();
    Ok(Json(artifact))
}

/// The body is optional; an absent or empty `voters` list proves every
/// frozen voter.
pub async fn multiproof(
    State(state): State<AppState>,
    Path(id): Path<String>,
    raw: Bytes,
) -> Result<Json<MultiproofResponse>, RpcError> {
    let id = proposal_id(&id)?;
    let req: MultiproofRequest = if raw.iter().all(u8::is_ascii_whitespace) {
        MultiproofRequest::default()
    } else {
        serde_json::from_slice(&raw)
            .map_err(|e| RpcError::BadRequest(format!("invalid multiproof request: {e}")))?
    };
    let subset = req
        .voters
        .iter()
        .map(|v| parse_address(v))
        .collect::<Result<Vec<Address>, _>>()?;

    let artifact = state.freezer.artifact(&id)?;
    let proof = prove_subset(&artifact, &subset)?;
    state.metrics.multiproofs.inc();
    info!(
        proposal_id = %id,
        batch = proof.leaves.len(),
        proof = proof.proof.len(),
        "multiproof served"
    );

    Ok(Json(MultiproofResponse {
        root: proof.root,
        voters: proof.voters.iter().map(checksummed).collect(),
        leaves: proof.leaves,
        proof: proof.proof,
        proof_flags: proof.flags,
        indices: proof.indices,
        leaf_count: proof.leaf_count,
    }))
}

// ── Nonce ────────────────────────────────────────────────────────────────

pub async fn next_nonce(
    State(state): State<AppState>,
    Path((id, voter)): Path<(String, String)>,
) -> Result<Json<NonceResponse>, RpcError> {
    let id = proposal_id(&id)?;
    let voter = parse_address(&voter)?;
    let nonce = state
        .chain_b
        .next_nonce(id, voter)
        .await
        .map_err(|e| observe(&state, e.into()))?;
    Ok(Json(NonceResponse { nonce }))
}

// ── Metrics ──────────────────────────────────────────────────────────────

pub async fn metrics(State(state): State<AppState>) -> Result<impl IntoResponse, RpcError> {
    let text = state
        .metrics
        .encode()
        .map_err(|e| RpcError::Internal(e.to_string()))?;
    Ok(([(CONTENT_TYPE, "text/plain; version=0.0.4")], text))
}
