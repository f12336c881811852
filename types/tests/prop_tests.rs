use proptest::prelude::*;

use crossgov_types::serde_helpers::{checksummed, parse_address, parse_u256};
use crossgov_types::{Address, Bytes, Support, Timestamp, VoteRecord, VotingWindow, U256};

fn record(voter: [u8; 20], power: u64, nonce: u64) -> VoteRecord {
    VoteRecord {
        proposal_id: U256::from(2),
        voter: Address::from(voter),
        power: U256::from(power),
        support: Support::No,
        nonce: U256::from(nonce),
        deadline: U256::from(1_900_000_000u64),
        signature: Bytes::from(vec![0xAB; 65]),
    }
}

proptest! {
    /// Decimal strings parse back to the integer they were printed from.
    #[test]
    fn u256_decimal_roundtrip(hi in any::<u128>(), lo in any::<u128>()) {
        let v = (U256::from(hi) << 128) | U256::from(lo);
        prop_assert_eq!(parse_u256(&v.to_string()).unwrap(), v);
    }

    /// A checksummed address always parses to itself.
    #[test]
    fn checksummed_address_roundtrip(bytes in prop::array::uniform20(0u8..)) {
        let addr = Address::from(bytes);
        prop_assert_eq!(parse_address(&checksummed(&addr)).unwrap(), addr);
    }

    /// Stored records survive the bincode encoding used by the LMDB backend.
    #[test]
    fn vote_record_bincode_roundtrip(
        voter in prop::array::uniform20(0u8..),
        power in any::<u64>(),
        nonce in any::<u64>(),
    ) {
        let r = record(voter, power, nonce);
        let encoded = bincode::serialize(&r).unwrap();
        let decoded: VoteRecord = bincode::deserialize(&encoded).unwrap();
        prop_assert_eq!(decoded, r);
    }

    /// Window membership matches the inclusive bounds.
    #[test]
    fn window_contains_matches_bounds(start in 0u64..1_000, len in 0u64..1_000, t in 0u64..3_000) {
        let w = VotingWindow::new(start, start + len);
        prop_assert_eq!(w.contains(Timestamp::new(t)), t >= start && t <= start + len);
    }
}
