//! Wire encodings.
//!
//! Large integers travel as decimal strings and addresses as EIP-55
//! checksummed hex. Stored records use the strict forms; request bodies
//! accept the lenient ones (decimal or `0x` hex strings, or plain JSON
//! numbers).

use ethers_core::types::{Address, Bytes, U256};
use ethers_core::utils::to_checksum;
use serde::{de, Deserialize, Deserializer, Serializer};

use crate::TypeError;

/// Parse a decimal or `0x`-prefixed hex integer.
pub fn parse_u256(raw: &str) -> Result<U256, TypeError> {
    let s = raw.trim();
    if s.is_empty() {
        return Err(TypeError::InvalidInteger(raw.to_string()));
    }
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => U256::from_str_radix(hex, 16).ok(),
        None if s.bytes().all(|b| b.is_ascii_digit()) => U256::from_dec_str(s).ok(),
        None => None,
    };
    parsed.ok_or_else(|| TypeError::InvalidInteger(raw.to_string()))
}

/// Parse a `0x`-prefixed 20-byte address.
///
/// All-lowercase and all-uppercase inputs are accepted as-is. Mixed-case
/// input must carry a valid EIP-55 checksum.
pub fn parse_address(raw: &str) -> Result<Address, TypeError> {
    let s = raw.trim();
    let body = s
        .strip_prefix("0x")
        .ok_or_else(|| TypeError::InvalidAddress(raw.to_string()))?;
    if body.len() != 40 || !body.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(TypeError::InvalidAddress(raw.to_string()));
    }
    let mut bytes = [0u8; 20];
    for (i, chunk) in body.as_bytes().chunks(2).enumerate() {
        let pair = std::str::from_utf8(chunk).map_err(|_| TypeError::InvalidAddress(raw.to_string()))?;
        bytes[i] =
            u8::from_str_radix(pair, 16).map_err(|_| TypeError::InvalidAddress(raw.to_string()))?;
    }
    let address = Address::from(bytes);

    let has_lower = body.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = body.bytes().any(|b| b.is_ascii_uppercase());
    if has_lower && has_upper && to_checksum(&address, None) != s {
        return Err(TypeError::InvalidAddress(raw.to_string()));
    }
    Ok(address)
}

/// EIP-55 checksummed form of an address.
pub fn checksummed(address: &Address) -> String {
    to_checksum(address, None)
}

/// Decode `0x`-prefixed hex into bytes.
pub fn parse_hex_bytes(raw: &str) -> Result<Bytes, TypeError> {
    let s = raw.trim();
    let body = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(body)
        .map(Bytes::from)
        .map_err(|_| TypeError::InvalidHex(raw.to_string()))
}

/// Lowercase `0x` hex of arbitrary bytes.
pub fn to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Strict decimal-string `U256`.
pub mod u256_dec {
    use super::*;

    pub fn serialize<S: Serializer>(value: &U256, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<U256, D::Error> {
        let raw = String::deserialize(d)?;
        parse_u256(&raw).map_err(de::Error::custom)
    }
}

/// Request-side `U256`: decimal string, hex string, or JSON number.
pub mod u256_lenient {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Num(u64),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<U256, D::Error> {
        match Raw::deserialize(d)? {
            Raw::Str(s) => parse_u256(&s).map_err(de::Error::custom),
            Raw::Num(n) => Ok(U256::from(n)),
        }
    }
}

/// Optional request-side `U256`; absent or `null` is `None`.
pub mod u256_lenient_opt {
    use super::*;

    #[derive(Deserialize)]
    struct Wrapped(#[serde(deserialize_with = "super::u256_lenient::deserialize")] U256);

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<U256>, D::Error> {
        Ok(Option::<Wrapped>::deserialize(d)?.map(|w| w.0))
    }
}

/// Checksummed address string.
pub mod checksum {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Address, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&checksummed(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Address, D::Error> {
        let raw = String::deserialize(d)?;
        parse_address(&raw).map_err(de::Error::custom)
    }
}

/// `0x` hex bytes.
pub mod hex_bytes {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Bytes, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&to_hex(value.as_ref()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Bytes, D::Error> {
        let raw = String::deserialize(d)?;
        parse_hex_bytes(&raw).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decimal_and_hex_integers() {
        assert_eq!(parse_u256("200").unwrap(), U256::from(200));
        assert_eq!(parse_u256("0xc8").unwrap(), U256::from(200));
        assert!(parse_u256("").is_err());
        assert!(parse_u256("12a").is_err());
        assert!(parse_u256("-1").is_err());
    }

    #[test]
    fn accepts_lowercase_and_valid_checksum() {
        let lower = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed";
        let checksum = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
        assert_eq!(parse_address(lower).unwrap(), parse_address(checksum).unwrap());
        assert_eq!(checksummed(&parse_address(lower).unwrap()), checksum);
    }

    #[test]
    fn rejects_bad_checksum_and_length() {
        assert!(parse_address("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAeD").is_err());
        assert!(parse_address("0x1234").is_err());
        assert!(parse_address("5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").is_err());
        assert!(parse_address("0xzzaeb6053f3e94c9b9a09f33669435e7ef1beaed").is_err());
    }

    #[test]
    fn hex_bytes_roundtrip() {
        let b = parse_hex_bytes("0xdeadBEEF").unwrap();
        assert_eq!(b.as_ref(), &[0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(to_hex(b.as_ref()), "0xdeadbeef");
        assert!(parse_hex_bytes("0xabc").is_err());
    }
}
