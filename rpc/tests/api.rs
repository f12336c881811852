use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use crossgov_chain::AssetKind;
use crossgov_crypto::{TypedVote, VoteDomain};
use crossgov_governance::{AbstainPolicy, MerkleFreezer, PowerOracle, VoteLedger};
use crossgov_nullables::{NullChainA, NullChainB, NullClock, NullStore};
use crossgov_rpc::{router, AppState, RpcMetrics};
use crossgov_types::serde_helpers::{checksummed, to_hex};
use crossgov_types::{Address, U256, EXCHANGE_RATE_SCALE};
use crossgov_utils::KeyedLocks;
use ethers_signers::{LocalWallet, Signer};
use serde_json::{json, Value};
use tower::ServiceExt;

const KEY: &str = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
const SNAPSHOT_BLOCK: u64 = 500;
const CHAIN_B_ID: u64 = 11155111;

struct Harness {
    app: Router,
    chain_a: Arc<NullChainA>,
    chain_b: Arc<NullChainB>,
    wallet: LocalWallet,
    domain: VoteDomain,
}

fn harness() -> Harness {
    let wallet: LocalWallet = KEY.parse().unwrap();
    let chain_a = Arc::new(NullChainA::new());
    let chain_b = Arc::new(NullChainB::new());
    let id = U256::from(1);
    chain_a.set_snapshot(id, SNAPSHOT_BLOCK, U256::from(2) * U256::from(EXCHANGE_RATE_SCALE));
    chain_a.set_window(id, 1_000, 2_000);
    chain_a.set_deadline(id, 2_500);
    chain_a.set_balance(AssetKind::Primary, wallet.address(), SNAPSHOT_BLOCK, U256::from(100));
    chain_a.set_balance(AssetKind::Derivative, wallet.address(), SNAPSHOT_BLOCK, U256::from(50));

    let store = Arc::new(NullStore::new());
    let locks = KeyedLocks::new();
    let domain = VoteDomain::new(CHAIN_B_ID, Address::from([0x42; 20]));
    let oracle = PowerOracle::new(chain_a.clone(), chain_a.clone());
    let ledger = VoteLedger::new(
        store.clone(),
        chain_a.clone(),
        oracle.clone(),
        Arc::new(NullClock::new(1_500)),
        locks.clone(),
        domain,
        AbstainPolicy::Reject,
    );
    let freezer = MerkleFreezer::new(store.clone(), store, locks);

    let state = AppState {
        ledger: Arc::new(ledger),
        freezer: Arc::new(freezer),
        oracle,
        chain_a: chain_a.clone(),
        chain_b: chain_b.clone(),
        metrics: Arc::new(RpcMetrics::new().unwrap()),
    };
    Harness {
        app: router(state),
        chain_a,
        chain_b,
        wallet,
        domain,
    }
}

impl Harness {
    fn vote_body(&self, support: bool, nonce: u64, signed_power: u64) -> Value {
        let typed = TypedVote {
            proposal_id: U256::from(1),
            support,
            voter: self.wallet.address(),
            power: U256::from(signed_power),
            nonce: U256::from(nonce),
            deadline: U256::from(3_000),
        };
        let sig = self.wallet.sign_hash(typed.signing_hash(&self.domain)).unwrap();
        json!({
            "proposalId": "1",
            "voter": checksummed(&self.wallet.address()),
            "support": support,
            "nonce": nonce.to_string(),
            "deadline": "3000",
            "signature": to_hex(&sig.to_vec()),
        })
    }

    async fn call(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(v) => builder
                .header("content-type", "application/json")
                .body(Body::from(v.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, value)
    }
}

#[tokio::test]
async fn proposal_details_include_signing_domain() {
    let h = harness();
    let (status, body) = h.call("GET", "/api/proposal/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["snapshotBlock"], 500);
    assert_eq!(body["snapshotER"], "2000000000000000000");
    assert_eq!(body["votingStart"], 1_000);
    assert_eq!(body["votingEnd"], 2_000);
    assert_eq!(body["deadline"], 2_500);
    assert_eq!(body["chainB"]["chainId"], CHAIN_B_ID);
}

#[tokio::test]
async fn malformed_proposal_id_is_bad_request() {
    let h = harness();
    let (status, body) = h.call("GET", "/api/proposal/not-a-number", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("invalid proposal id"));
}

#[tokio::test]
async fn compute_power_reports_snapshot_power() {
    let h = harness();
    let body = json!({ "proposalId": "1", "voter": checksummed(&h.wallet.address()) });
    let (status, resp) = h.call("POST", "/api/compute-power", Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["power"], "200");
}

#[tokio::test]
async fn failed_balance_read_is_bad_gateway() {
    let h = harness();
    h.chain_a.fail_balance_reads(true);
    let body = json!({ "proposalId": "1", "voter": checksummed(&h.wallet.address()) });
    let (status, _) = h.call("POST", "/api/compute-power", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn vote_then_replay_then_freeze_then_multiproof() {
    let h = harness();

    let (status, resp) = h.call("POST", "/api/vote", Some(h.vote_body(true, 1, 200))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["ok"], true);
    assert_eq!(resp["stored"], true);
    assert_eq!(resp["vote"]["power"], "200");
    assert_eq!(resp["vote"]["support"], "yes");

    let (status, resp) = h.call("POST", "/api/vote", Some(h.vote_body(true, 1, 200))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["stored"], false);
    assert_eq!(resp["storedNonce"], "1");

    let (status, artifact) = h.call("POST", "/api/merkle/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(artifact["counts"]["for"], "200");
    assert_eq!(artifact["counts"]["totalCounted"], "200");
    assert_eq!(artifact["voters"].as_array().unwrap().len(), 1);

    let (status, proof) = h.call("POST", "/api/multiproof/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(proof["root"], artifact["root"]);
    assert_eq!(proof["leafCount"], 1);
    assert_eq!(proof["leaves"], artifact["leavesHexOrdered"]);
    assert!(proof["proof"].as_array().unwrap().is_empty());
    assert!(proof["proofFlags"].as_array().unwrap().is_empty());
    assert_eq!(proof["voters"][0], checksummed(&h.wallet.address()));
}

#[tokio::test]
async fn signature_over_a_different_power_is_rejected() {
    let h = harness();
    let (status, resp) = h.call("POST", "/api/vote", Some(h.vote_body(true, 1, 201))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(resp["error"].as_str().unwrap().starts_with("Bad signature"));
}

#[tokio::test]
async fn mismatched_power_claim_is_rejected() {
    let h = harness();
    let mut body = h.vote_body(true, 1, 200);
    body["power"] = json!("150");
    let (status, resp) = h.call("POST", "/api/vote", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(resp["error"].as_str().unwrap().contains("client power mismatch"));
}

#[tokio::test]
async fn missing_fields_are_bad_request() {
    let h = harness();
    let (status, _) = h
        .call("POST", "/api/vote", Some(json!({ "proposalId": "1" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn multiproof_before_freeze_is_not_found() {
    let h = harness();
    let (status, _) = h.call("POST", "/api/multiproof/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn multiproof_for_unknown_voter_is_bad_request() {
    let h = harness();
    h.call("POST", "/api/vote", Some(h.vote_body(false, 1, 200))).await;
    h.call("POST", "/api/merkle/1", None).await;

    let body = json!({ "voters": [checksummed(&Address::from([0x77; 20]))] });
    let (status, _) = h.call("POST", "/api/multiproof/1", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn next_nonce_reads_chain_b() {
    let h = harness();
    h.chain_b
        .set_next_nonce(U256::from(1), h.wallet.address(), U256::from(7));
    let uri = format!("/api/nextNonce/1/{}", checksummed(&h.wallet.address()));
    let (status, resp) = h.call("GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["nonce"], "7");
}

#[tokio::test]
async fn metrics_count_accepted_votes() {
    let h = harness();
    h.call("POST", "/api/vote", Some(h.vote_body(true, 1, 200))).await;
    let (status, text) = h.call("GET", "/metrics", None).await;
    assert_eq!(status, StatusCode::OK);
    let text = text.as_str().unwrap().to_string();
    assert!(text.contains("crossgov_votes_accepted_total 1"));
}
