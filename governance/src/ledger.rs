//! Vote ledger: validates signed votes and keeps one current vote per
//! (proposal, voter).

use std::sync::Arc;

use crossgov_chain::ChainAPublisher;
use crossgov_crypto::{verify_vote, TypedVote, VoteDomain};
use crossgov_store::{UpsertOutcome, VoteStore};
use crossgov_types::{Address, Bytes, Clock, ProposalId, Support, VoteRecord, U256};
use crossgov_utils::KeyedLocks;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{GovernanceError, PowerOracle};

/// How the unsigned `abstain` flag is treated.
///
/// The signed struct only carries a yes/no boolean, so abstention has no
/// cryptographic binding to the signature.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AbstainPolicy {
    /// Refuse any submission flagged as abstain.
    #[default]
    Reject,
    /// Accept abstain only alongside a signed `support = false`.
    Unbound,
}

/// A vote as submitted by a client, before validation.
#[derive(Clone, Debug)]
pub struct VoteSubmission {
    pub proposal_id: ProposalId,
    pub voter: Address,
    /// The signed boolean.
    pub support: bool,
    pub abstain: bool,
    pub nonce: U256,
    pub deadline: U256,
    pub signature: Bytes,
    /// Power the client believes it has. Only compared, never trusted.
    pub claimed_power: Option<U256>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted(VoteRecord),
    /// A vote with an equal or higher nonce is already stored.
    Ignored {
        record: VoteRecord,
        stored_nonce: U256,
    },
}

impl SubmitOutcome {
    pub fn record(&self) -> &VoteRecord {
        match self {
            SubmitOutcome::Accepted(record) => record,
            SubmitOutcome::Ignored { record, .. } => record,
        }
    }

    pub fn is_stored(&self) -> bool {
        matches!(self, SubmitOutcome::Accepted(_))
    }
}

pub struct VoteLedger {
    store: Arc<dyn VoteStore>,
    chain_a: Arc<dyn ChainAPublisher>,
    oracle: PowerOracle,
    clock: Arc<dyn Clock>,
    locks: KeyedLocks<ProposalId>,
    domain: VoteDomain,
    abstain_policy: AbstainPolicy,
}

impl VoteLedger {
    pub fn new(
        store: Arc<dyn VoteStore>,
        chain_a: Arc<dyn ChainAPublisher>,
        oracle: PowerOracle,
        clock: Arc<dyn Clock>,
        locks: KeyedLocks<ProposalId>,
        domain: VoteDomain,
        abstain_policy: AbstainPolicy,
    ) -> Self {
        Self {
            store,
            chain_a,
            oracle,
            clock,
            locks,
            domain,
            abstain_policy,
        }
    }

    pub fn domain(&self) -> &VoteDomain {
        &self.domain
    }

    /// Validate and store a signed vote.
    ///
    /// Checks run in order: abstain policy, voting window, signature expiry,
    /// recomputed power (and the client's claim, if any), then the EIP-712
    /// signature over the authoritative power. A vote whose nonce does not
    /// exceed the stored one is [`SubmitOutcome::Ignored`].
    pub async fn submit(&self, vote: VoteSubmission) -> Result<SubmitOutcome, GovernanceError> {
        let support = self.resolve_support(&vote)?;

        let window = self.chain_a.window(vote.proposal_id).await?;
        let now = self.clock.now();
        if !window.contains(now) {
            return Err(GovernanceError::Validation(format!(
                "outside voting window [{}, {}] at {}",
                window.start,
                window.end,
                now.as_secs()
            )));
        }
        if U256::from(now.as_secs()) > vote.deadline {
            return Err(GovernanceError::Validation("expired signature".into()));
        }

        let power = self
            .oracle
            .compute_power(vote.proposal_id, vote.voter)
            .await?;
        if let Some(claimed) = vote.claimed_power {
            if claimed != power {
                return Err(GovernanceError::Validation(format!(
                    "client power mismatch: claimed {claimed}, computed {power}"
                )));
            }
        }

        let typed = TypedVote {
            proposal_id: vote.proposal_id,
            support: vote.support,
            voter: vote.voter,
            power,
            nonce: vote.nonce,
            deadline: vote.deadline,
        };
        verify_vote(&self.domain, &typed, vote.signature.as_ref())?;

        let record = VoteRecord {
            proposal_id: vote.proposal_id,
            voter: vote.voter,
            power,
            support,
            nonce: vote.nonce,
            deadline: vote.deadline,
            signature: vote.signature,
        };

        let _guard = self.locks.lock(&vote.proposal_id).await;
        match self.store.upsert_vote(&record)? {
            UpsertOutcome::Stored => {
                info!(
                    proposal_id = %record.proposal_id,
                    voter = ?record.voter,
                    support = %record.support,
                    nonce = %record.nonce,
                    power = %record.power,
                    "vote stored"
                );
                Ok(SubmitOutcome::Accepted(record))
            }
            UpsertOutcome::Stale { stored_nonce } => {
                debug!(
                    proposal_id = %record.proposal_id,
                    voter = ?record.voter,
                    nonce = %record.nonce,
                    %stored_nonce,
                    "stale nonce ignored"
                );
                Ok(SubmitOutcome::Ignored {
                    record,
                    stored_nonce,
                })
            }
        }
    }

    /// Current stored vote of `voter`.
    pub fn current_vote(
        &self,
        proposal: &ProposalId,
        voter: &Address,
    ) -> Result<Option<VoteRecord>, GovernanceError> {
        Ok(self.store.get_vote(proposal, voter)?)
    }

    fn resolve_support(&self, vote: &VoteSubmission) -> Result<Support, GovernanceError> {
        match (vote.support, vote.abstain) {
            (true, false) => Ok(Support::Yes),
            (false, false) => Ok(Support::No),
            (true, true) => Err(GovernanceError::Validation(
                "a vote cannot both support and abstain".into(),
            )),
            (false, true) => match self.abstain_policy {
                AbstainPolicy::Reject => Err(GovernanceError::Validation(
                    "abstain votes are not accepted".into(),
                )),
                AbstainPolicy::Unbound => {
                    warn!(
                        proposal_id = %vote.proposal_id,
                        voter = ?vote.voter,
                        "accepting abstain flag that is not covered by the signature"
                    );
                    Ok(Support::Abstain)
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossgov_chain::AssetKind;
    use crossgov_nullables::{NullChainA, NullClock, NullStore};
    use crossgov_types::EXCHANGE_RATE_SCALE;
    use ethers_signers::{LocalWallet, Signer};

    const KEY: &str = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
    const SNAPSHOT_BLOCK: u64 = 500;

    struct Fixture {
        ledger: VoteLedger,
        store: Arc<NullStore>,
        clock: Arc<NullClock>,
        wallet: LocalWallet,
    }

    fn fixture(policy: AbstainPolicy) -> Fixture {
        let wallet: LocalWallet = KEY.parse().unwrap();
        let chain = Arc::new(NullChainA::new());
        let id = U256::from(1);
        chain.set_snapshot(id, SNAPSHOT_BLOCK, U256::from(2) * U256::from(EXCHANGE_RATE_SCALE));
        chain.set_window(id, 1_000, 2_000);
        chain.set_balance(AssetKind::Primary, wallet.address(), SNAPSHOT_BLOCK, U256::from(100));
        chain.set_balance(AssetKind::Derivative, wallet.address(), SNAPSHOT_BLOCK, U256::from(50));

        let store = Arc::new(NullStore::new());
        let clock = Arc::new(NullClock::new(1_500));
        let ledger = VoteLedger::new(
            store.clone(),
            chain.clone(),
            PowerOracle::new(chain.clone(), chain),
            clock.clone(),
            KeyedLocks::new(),
            VoteDomain::new(11155111, Address::from([0x42; 20])),
            policy,
        );
        Fixture {
            ledger,
            store,
            clock,
            wallet,
        }
    }

    fn signed(f: &Fixture, support: bool, nonce: u64, power: u64) -> VoteSubmission {
        let typed = TypedVote {
            proposal_id: U256::from(1),
            support,
            voter: f.wallet.address(),
            power: U256::from(power),
            nonce: U256::from(nonce),
            deadline: U256::from(3_000),
        };
        let sig = f
            .wallet
            .sign_hash(typed.signing_hash(f.ledger.domain()))
            .unwrap();
        VoteSubmission {
            proposal_id: typed.proposal_id,
            voter: typed.voter,
            support,
            abstain: false,
            nonce: typed.nonce,
            deadline: typed.deadline,
            signature: Bytes::from(sig.to_vec()),
            claimed_power: None,
        }
    }

    #[tokio::test]
    async fn accepts_vote_with_recomputed_power() {
        let f = fixture(AbstainPolicy::Reject);
        let outcome = f.ledger.submit(signed(&f, true, 1, 200)).await.unwrap();
        assert!(outcome.is_stored());
        assert_eq!(outcome.record().power, U256::from(200));
        assert_eq!(outcome.record().support, Support::Yes);
    }

    #[tokio::test]
    async fn higher_nonce_replaces_and_lower_is_ignored() {
        let f = fixture(AbstainPolicy::Reject);
        f.ledger.submit(signed(&f, true, 1, 200)).await.unwrap();
        f.ledger.submit(signed(&f, false, 2, 200)).await.unwrap();

        let stale = f.ledger.submit(signed(&f, true, 1, 200)).await.unwrap();
        assert_eq!(
            stale,
            SubmitOutcome::Ignored {
                record: stale.record().clone(),
                stored_nonce: U256::from(2),
            }
        );

        let votes = f.store.votes_for(&U256::from(1)).unwrap();
        assert_eq!(votes.len(), 1);
        assert_eq!(votes[0].nonce, U256::from(2));
        assert_eq!(votes[0].support, Support::No);

        let current = f
            .ledger
            .current_vote(&U256::from(1), &f.wallet.address())
            .unwrap()
            .unwrap();
        assert_eq!(current, votes[0]);
    }

    #[tokio::test]
    async fn resubmitting_same_nonce_is_idempotent() {
        let f = fixture(AbstainPolicy::Reject);
        let vote = signed(&f, true, 3, 200);
        f.ledger.submit(vote.clone()).await.unwrap();
        let before = f.store.votes_for(&U256::from(1)).unwrap();
        let second = f.ledger.submit(vote).await.unwrap();
        assert!(!second.is_stored());
        assert_eq!(f.store.votes_for(&U256::from(1)).unwrap(), before);
    }

    #[tokio::test]
    async fn signature_over_inflated_power_is_rejected() {
        let f = fixture(AbstainPolicy::Reject);
        let err = f.ledger.submit(signed(&f, true, 1, 1_000)).await.unwrap_err();
        assert!(matches!(err, GovernanceError::BadSignature(_)));
        assert!(f.store.votes_for(&U256::from(1)).unwrap().is_empty());
    }

    #[tokio::test]
    async fn mismatched_power_claim_is_rejected() {
        let f = fixture(AbstainPolicy::Reject);
        let mut vote = signed(&f, true, 1, 200);
        vote.claimed_power = Some(U256::from(201));
        assert!(matches!(
            f.ledger.submit(vote).await,
            Err(GovernanceError::Validation(msg)) if msg.contains("client power mismatch")
        ));
    }

    #[tokio::test]
    async fn outside_window_is_rejected() {
        let f = fixture(AbstainPolicy::Reject);
        f.clock.set(2_001);
        assert!(matches!(
            f.ledger.submit(signed(&f, true, 1, 200)).await,
            Err(GovernanceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn expired_signature_is_rejected() {
        let f = fixture(AbstainPolicy::Reject);
        let mut vote = signed(&f, true, 1, 200);
        vote.deadline = U256::from(1_499);
        assert!(matches!(
            f.ledger.submit(vote).await,
            Err(GovernanceError::Validation(msg)) if msg == "expired signature"
        ));
    }

    #[tokio::test]
    async fn abstain_follows_policy() {
        let f = fixture(AbstainPolicy::Reject);
        let mut vote = signed(&f, false, 1, 200);
        vote.abstain = true;
        assert!(f.ledger.submit(vote).await.is_err());

        let f = fixture(AbstainPolicy::Unbound);
        let mut vote = signed(&f, false, 1, 200);
        vote.abstain = true;
        let outcome = f.ledger.submit(vote).await.unwrap();
        assert_eq!(outcome.record().support, Support::Abstain);
    }

    #[tokio::test]
    async fn support_and_abstain_together_is_rejected() {
        let f = fixture(AbstainPolicy::Unbound);
        let mut vote = signed(&f, true, 1, 200);
        vote.abstain = true;
        assert!(matches!(
            f.ledger.submit(vote).await,
            Err(GovernanceError::Validation(_))
        ));
    }
}
