//! Keccak-256 hashing and the leaf encoding.

use ethers_core::abi::{encode, Token};
use ethers_core::types::{Address, H256, U256};
use sha3::{Digest, Keccak256};

/// Keccak-256 of arbitrary data.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Hash multiple byte slices in sequence (avoids concatenation allocation).
pub fn keccak256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Merkle leaf committing a voter's final power:
/// `keccak256(abi.encode(address voter, uint256 power))`.
pub fn leaf_hash(voter: Address, power: U256) -> H256 {
    let encoded = encode(&[Token::Address(voter), Token::Uint(power)]);
    H256::from(keccak256(&encoded))
}
