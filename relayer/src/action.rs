//! Action payloads executed on Chain A.
//!
//! `actionData = abi.encode(address target, uint256 value, bytes data)` and
//! its keccak-256 is the `actionDataHash` that both chains record.

use std::collections::HashMap;

use crossgov_crypto::keccak256;
use crossgov_types::serde_helpers::{checksum, hex_bytes, u256_lenient};
use crossgov_types::{Address, Bytes, ProposalId, H256, U256};
use ethers_core::abi::token::{LenientTokenizer, Tokenizer};
use ethers_core::abi::{encode, AbiParser, Token};
use serde::Deserialize;

use crate::RelayError;

pub fn encode_action_data(target: Address, value: U256, data: &[u8]) -> Bytes {
    Bytes::from(encode(&[
        Token::Address(target),
        Token::Uint(value),
        Token::Bytes(data.to_vec()),
    ]))
}

pub fn action_data_hash(action_data: &[u8]) -> H256 {
    H256::from(keccak256(action_data))
}

/// Calldata for `signature` (e.g. `updateUnbondingPeriod(uint256)`) with
/// `args` given as strings and parsed by parameter type.
pub fn encode_call(signature: &str, args: &[String]) -> Result<Bytes, RelayError> {
    let declaration = if signature.trim_start().starts_with("function ") {
        signature.to_string()
    } else {
        format!("function {signature}")
    };
    let function = AbiParser::default()
        .parse_function(&declaration)
        .map_err(|e| RelayError::InvalidAction(format!("{signature}: {e}")))?;
    if function.inputs.len() != args.len() {
        return Err(RelayError::InvalidAction(format!(
            "{signature} takes {} arguments, {} given",
            function.inputs.len(),
            args.len()
        )));
    }
    let tokens = function
        .inputs
        .iter()
        .zip(args)
        .map(|(param, arg)| {
            LenientTokenizer::tokenize(&param.kind, arg)
                .map_err(|e| RelayError::InvalidAction(format!("{}: {e}", param.name)))
        })
        .collect::<Result<Vec<_>, _>>()?;
    function
        .encode_input(&tokens)
        .map(Bytes::from)
        .map_err(|e| RelayError::InvalidAction(e.to_string()))
}

/// One `[[actions]]` entry.
///
/// Calldata is either given verbatim (`data`) or built from `signature` and
/// `args`.
#[derive(Clone, Debug, Deserialize)]
pub struct ActionSpec {
    #[serde(deserialize_with = "u256_lenient::deserialize")]
    pub proposal_id: ProposalId,
    #[serde(deserialize_with = "checksum::deserialize")]
    pub target: Address,
    #[serde(default, deserialize_with = "u256_lenient::deserialize")]
    pub value: U256,
    #[serde(default, deserialize_with = "deserialize_opt_hex")]
    pub data: Option<Bytes>,
    #[serde(default)]
    pub signature: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
}

fn deserialize_opt_hex<'de, D: serde::Deserializer<'de>>(d: D) -> Result<Option<Bytes>, D::Error> {
    hex_bytes::deserialize(d).map(Some)
}

impl ActionSpec {
    pub fn calldata(&self) -> Result<Bytes, RelayError> {
        match (&self.data, &self.signature) {
            (Some(data), None) => Ok(data.clone()),
            (None, Some(signature)) => encode_call(signature, &self.args),
            (None, None) => Ok(Bytes::default()),
            (Some(_), Some(_)) => Err(RelayError::InvalidAction(format!(
                "proposal {}: give either data or signature, not both",
                self.proposal_id
            ))),
        }
    }

    pub fn action_data(&self) -> Result<Bytes, RelayError> {
        Ok(encode_action_data(
            self.target,
            self.value,
            self.calldata()?.as_ref(),
        ))
    }
}

/// Encoded action payloads by proposal.
#[derive(Clone, Debug, Default)]
pub struct ActionRegistry {
    payloads: HashMap<ProposalId, Bytes>,
}

impl ActionRegistry {
    pub fn from_specs(specs: &[ActionSpec]) -> Result<Self, RelayError> {
        let mut payloads = HashMap::with_capacity(specs.len());
        for spec in specs {
            if payloads.insert(spec.proposal_id, spec.action_data()?).is_some() {
                return Err(RelayError::InvalidAction(format!(
                    "duplicate action for proposal {}",
                    spec.proposal_id
                )));
            }
        }
        Ok(Self { payloads })
    }

    pub fn insert(&mut self, proposal_id: ProposalId, action_data: Bytes) {
        self.payloads.insert(proposal_id, action_data);
    }

    pub fn get(&self, proposal_id: &ProposalId) -> Option<&Bytes> {
        self.payloads.get(proposal_id)
    }

    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }
}
