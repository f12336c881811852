//! Key layouts.
//!
//! Proposal ids are encoded as 32-byte big-endian integers so keys sort
//! numerically; vote keys append the 20-byte voter address.

use crossgov_types::{Address, ProposalId};

pub fn proposal_key(id: &ProposalId) -> [u8; 32] {
    let mut key = [0u8; 32];
    id.to_big_endian(&mut key);
    key
}

pub fn vote_key(id: &ProposalId, voter: &Address) -> [u8; 52] {
    let mut key = [0u8; 52];
    key[..32].copy_from_slice(&proposal_key(id));
    key[32..].copy_from_slice(voter.as_bytes());
    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossgov_types::U256;

    #[test]
    fn proposal_keys_sort_numerically() {
        assert!(proposal_key(&U256::from(2)) < proposal_key(&U256::from(10)));
    }

    #[test]
    fn vote_key_is_prefixed_by_proposal() {
        let id = U256::from(7);
        let key = vote_key(&id, &Address::from([0xAA; 20]));
        assert_eq!(&key[..32], &proposal_key(&id));
        assert_eq!(&key[32..], &[0xAA; 20]);
    }
}
