use proptest::prelude::*;

use crossgov_merkle::MerkleTree;
use ethers_core::types::H256;

fn leaves(n: usize) -> Vec<H256> {
    (0..n).map(|i| H256::from_low_u64_be(i as u64 + 1)).collect()
}

proptest! {
    /// Every non-empty batch of any tree verifies and satisfies the
    /// flag-length invariant.
    #[test]
    fn multiproof_verifies_and_has_consistent_lengths(
        n in 1usize..64,
        picks in prop::collection::vec(any::<prop::sample::Index>(), 1..16),
    ) {
        let tree = MerkleTree::new(leaves(n)).unwrap();
        let indices: Vec<usize> = picks.iter().map(|p| p.index(n)).collect();
        let mp = tree.multiproof(&indices).unwrap();
        prop_assert_eq!(mp.flags.len() + 1, mp.leaves.len() + mp.proof.len());
        prop_assert!(mp.verify(tree.root()).is_ok());
    }

    /// Proving every leaf needs no proof hashes and only combine flags.
    #[test]
    fn full_batch_is_all_combines(n in 1usize..64) {
        let tree = MerkleTree::new(leaves(n)).unwrap();
        let all: Vec<usize> = (0..n).collect();
        let mp = tree.multiproof(&all).unwrap();
        prop_assert!(mp.proof.is_empty());
        prop_assert_eq!(mp.flags.len(), n - 1);
        prop_assert!(mp.flags.iter().all(|f| *f));
    }

    /// The root is a pure function of the ordered leaves.
    #[test]
    fn root_is_deterministic(n in 1usize..64) {
        let a = MerkleTree::new(leaves(n)).unwrap();
        let b = MerkleTree::new(leaves(n)).unwrap();
        prop_assert_eq!(a.root(), b.root());
    }
}
