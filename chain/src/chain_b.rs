//! Chain B: vote verifier.

use std::sync::Arc;

use async_trait::async_trait;
use crossgov_types::{Address, ProposalId, H256, U256};
use ethers::providers::Middleware;

use crate::bindings::{Vote, VoteVerifier};
use crate::chain_a::upstream;
use crate::client::send_and_confirm;
use crate::{BatchVote, ChainBVerifier, ChainError, FreezeParams, ProposalPassed, TxOutcome};

pub struct EthChainB<M> {
    client: Arc<M>,
    verifier: VoteVerifier<M>,
}

impl<M: Middleware + 'static> EthChainB<M> {
    pub fn new(client: Arc<M>, verifier: Address) -> Self {
        Self {
            verifier: VoteVerifier::new(verifier, client.clone()),
            client,
        }
    }
}

impl From<BatchVote> for Vote {
    fn from(v: BatchVote) -> Self {
        Vote {
            proposal_id: v.proposal_id,
            support: v.support,
            voter: v.voter,
            power: v.power,
            nonce: v.nonce,
            deadline: v.deadline,
            abstain: v.abstain,
            signature: v.signature,
        }
    }
}

#[async_trait]
impl<M: Middleware + 'static> ChainBVerifier for EthChainB<M> {
    async fn freeze_proposal(&self, params: FreezeParams) -> Result<TxOutcome, ChainError> {
        let call = self.verifier.freeze_proposal(
            params.proposal_id,
            params.power_root.0,
            params.action_data_hash.0,
            params.window.start,
            params.window.end,
            params.quorum,
            params.threshold,
        );
        send_and_confirm(call, "freezeProposal").await
    }

    async fn next_nonce(&self, proposal: ProposalId, voter: Address) -> Result<U256, ChainError> {
        self.verifier
            .get_next_nonce(proposal, voter)
            .call()
            .await
            .map_err(|e| upstream("getNextNonce", e))
    }

    async fn batch_verify_and_tally(
        &self,
        votes: Vec<BatchVote>,
        leaves: Vec<H256>,
        proof: Vec<H256>,
        proof_flags: Vec<bool>,
    ) -> Result<TxOutcome, ChainError> {
        let votes = votes.into_iter().map(Vote::from).collect();
        let call = self.verifier.batch_verify_and_tally(
            votes,
            leaves.into_iter().map(|h| h.0).collect(),
            proof.into_iter().map(|h| h.0).collect(),
            proof_flags,
        );
        send_and_confirm(call, "batchVerifyAndTally").await
    }

    async fn latest_block(&self) -> Result<u64, ChainError> {
        self.client
            .get_block_number()
            .await
            .map(|n| n.as_u64())
            .map_err(|e| upstream("eth_blockNumber", e))
    }

    async fn proposal_passed_events(
        &self,
        from: u64,
        to: u64,
    ) -> Result<Vec<ProposalPassed>, ChainError> {
        let logs = self
            .verifier
            .proposal_passed_filter()
            .from_block(from)
            .to_block(to)
            .query_with_meta()
            .await
            .map_err(|e| upstream(&format!("ProposalPassed logs {from}..={to}"), e))?;

        let mut events: Vec<ProposalPassed> = logs
            .into_iter()
            .map(|(event, meta)| ProposalPassed {
                proposal_id: event.proposal_id,
                action_data_hash: H256::from(event.action_data_hash),
                block_number: meta.block_number.as_u64(),
                tx_hash: meta.transaction_hash,
                log_index: meta.log_index,
            })
            .collect();
        events.sort_by(|a, b| {
            (a.block_number, a.log_index).cmp(&(b.block_number, b.log_index))
        });
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossgov_types::Bytes;
    use ethers::abi::{Token, Tokenizable};

    #[test]
    fn batch_vote_tokenizes_in_verifier_field_order() {
        let vote = Vote::from(BatchVote {
            proposal_id: U256::from(7),
            support: false,
            voter: Address::from([0xAB; 20]),
            power: U256::from(40),
            nonce: U256::from(2),
            deadline: U256::from(900),
            abstain: true,
            signature: Bytes::from(vec![0x1B; 65]),
        });
        let Token::Tuple(fields) = vote.into_token() else {
            panic!("vote is not a tuple");
        };
        assert_eq!(
            fields,
            vec![
                Token::Uint(U256::from(7)),
                Token::Bool(false),
                Token::Address(Address::from([0xAB; 20])),
                Token::Uint(U256::from(40)),
                Token::Uint(U256::from(2)),
                Token::Uint(U256::from(900)),
                Token::Bool(true),
                Token::Bytes(vec![0x1B; 65]),
            ]
        );
    }
}
