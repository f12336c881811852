//! EIP-712 hashing of signed votes and signer recovery.
//!
//! The typed schema is fixed:
//!
//! ```text
//! Vote(uint256 proposalId,bool support,address voter,uint256 power,uint256 nonce,uint256 deadline)
//! ```
//!
//! under the domain `{name: "CrossGov", version: "1", chainId, verifyingContract}`
//! where `chainId` is Chain B's id and `verifyingContract` the Chain B vote
//! verifier. Abstention is not part of the signed struct.

use ethers_core::abi::{encode, Token};
use ethers_core::types::{Address, Signature, H256, U256};

use crate::hash::{keccak256, keccak256_multi};
use crate::SignatureError;

pub const DOMAIN_NAME: &str = "CrossGov";
pub const DOMAIN_VERSION: &str = "1";

const DOMAIN_TYPE: &str =
    "EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)";
const VOTE_TYPE: &str =
    "Vote(uint256 proposalId,bool support,address voter,uint256 power,uint256 nonce,uint256 deadline)";

/// Signing domain of the Chain B vote verifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VoteDomain {
    pub chain_id: u64,
    pub verifying_contract: Address,
}

impl VoteDomain {
    pub fn new(chain_id: u64, verifying_contract: Address) -> Self {
        Self {
            chain_id,
            verifying_contract,
        }
    }

    pub fn separator(&self) -> H256 {
        let encoded = encode(&[
            Token::FixedBytes(keccak256(DOMAIN_TYPE.as_bytes()).to_vec()),
            Token::FixedBytes(keccak256(DOMAIN_NAME.as_bytes()).to_vec()),
            Token::FixedBytes(keccak256(DOMAIN_VERSION.as_bytes()).to_vec()),
            Token::Uint(U256::from(self.chain_id)),
            Token::Address(self.verifying_contract),
        ]);
        H256::from(keccak256(&encoded))
    }
}

/// The exact tuple a voter signs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TypedVote {
    pub proposal_id: U256,
    pub support: bool,
    pub voter: Address,
    pub power: U256,
    pub nonce: U256,
    pub deadline: U256,
}

impl TypedVote {
    pub fn struct_hash(&self) -> H256 {
        let encoded = encode(&[
            Token::FixedBytes(keccak256(VOTE_TYPE.as_bytes()).to_vec()),
            Token::Uint(self.proposal_id),
            Token::Bool(self.support),
            Token::Address(self.voter),
            Token::Uint(self.power),
            Token::Uint(self.nonce),
            Token::Uint(self.deadline),
        ]);
        H256::from(keccak256(&encoded))
    }

    /// `keccak256("\x19\x01" ‖ domainSeparator ‖ structHash)`
    pub fn signing_hash(&self, domain: &VoteDomain) -> H256 {
        H256::from(keccak256_multi(&[
            &[0x19, 0x01],
            domain.separator().as_bytes(),
            self.struct_hash().as_bytes(),
        ]))
    }
}

/// Recover the address that produced `signature` over `vote`.
pub fn recover_signer(
    domain: &VoteDomain,
    vote: &TypedVote,
    signature: &[u8],
) -> Result<Address, SignatureError> {
    let sig = Signature::try_from(signature)
        .map_err(|e| SignatureError::Malformed(e.to_string()))?;
    sig.recover(vote.signing_hash(domain))
        .map_err(|e| SignatureError::Recovery(e.to_string()))
}

/// Verify that `signature` over `vote` was produced by `vote.voter`.
///
/// Fails closed: any recovery problem or signer mismatch is an error.
pub fn verify_vote(
    domain: &VoteDomain,
    vote: &TypedVote,
    signature: &[u8],
) -> Result<Address, SignatureError> {
    let recovered = recover_signer(domain, vote, signature)?;
    if recovered != vote.voter {
        return Err(SignatureError::SignerMismatch {
            claimed: vote.voter,
            recovered,
        });
    }
    Ok(recovered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers_core::types::transaction::eip712::{Eip712, TypedData};
    use ethers_signers::{LocalWallet, Signer};

    const KEY: &str = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

    fn wallet() -> LocalWallet {
        KEY.parse().unwrap()
    }

    fn domain() -> VoteDomain {
        VoteDomain::new(11155111, Address::from([0x42; 20]))
    }

    fn vote(voter: Address) -> TypedVote {
        TypedVote {
            proposal_id: U256::from(2),
            support: true,
            voter,
            power: U256::from(200),
            nonce: U256::from(1),
            deadline: U256::from(1_900_000_000u64),
        }
    }

    #[test]
    fn digest_matches_generic_typed_data_encoder() {
        let v = vote(Address::from([0x11; 20]));
        let d = domain();
        let json = format!(
            r#"{{
                "types": {{
                    "EIP712Domain": [
                        {{"name": "name", "type": "string"}},
                        {{"name": "version", "type": "string"}},
                        {{"name": "chainId", "type": "uint256"}},
                        {{"name": "verifyingContract", "type": "address"}}
                    ],
                    "Vote": [
                        {{"name": "proposalId", "type": "uint256"}},
                        {{"name": "support", "type": "bool"}},
                        {{"name": "voter", "type": "address"}},
                        {{"name": "power", "type": "uint256"}},
                        {{"name": "nonce", "type": "uint256"}},
                        {{"name": "deadline", "type": "uint256"}}
                    ]
                }},
                "primaryType": "Vote",
                "domain": {{
                    "name": "CrossGov",
                    "version": "1",
                    "chainId": {},
                    "verifyingContract": "{:?}"
                }},
                "message": {{
                    "proposalId": "2",
                    "support": true,
                    "voter": "{:?}",
                    "power": "200",
                    "nonce": "1",
                    "deadline": "1900000000"
                }}
            }}"#,
            d.chain_id, d.verifying_contract, v.voter
        );
        let typed: TypedData = serde_json::from_str(&json).unwrap();
        let expected = typed.encode_eip712().unwrap();
        assert_eq!(v.signing_hash(&d), H256::from(expected));
    }

    #[test]
    fn recovers_the_signer() {
        let w = wallet();
        let v = vote(w.address());
        let sig = w.sign_hash(v.signing_hash(&domain())).unwrap();
        assert_eq!(verify_vote(&domain(), &v, &sig.to_vec()).unwrap(), w.address());
    }

    #[test]
    fn tampered_power_is_rejected() {
        let w = wallet();
        let v = vote(w.address());
        let sig = w.sign_hash(v.signing_hash(&domain())).unwrap();
        let tampered = TypedVote {
            power: U256::from(201),
            ..v
        };
        assert!(matches!(
            verify_vote(&domain(), &tampered, &sig.to_vec()),
            Err(SignatureError::SignerMismatch { .. })
        ));
    }

    #[test]
    fn other_domain_is_rejected() {
        let w = wallet();
        let v = vote(w.address());
        let sig = w.sign_hash(v.signing_hash(&domain())).unwrap();
        let other = VoteDomain::new(1, domain().verifying_contract);
        assert!(verify_vote(&other, &v, &sig.to_vec()).is_err());
    }

    #[test]
    fn short_signature_is_malformed() {
        let v = vote(Address::from([0x11; 20]));
        assert!(matches!(
            verify_vote(&domain(), &v, &[0u8; 10]),
            Err(SignatureError::Malformed(_))
        ));
    }
}
