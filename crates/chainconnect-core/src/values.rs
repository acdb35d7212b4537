//! Primitive Ethereum wire values.
//!
//! Every codec accepts one of several source representations and produces
//! exactly one canonical form:
//!
//! | Codec        | Accepts                              | Produces             |
//! |--------------|--------------------------------------|----------------------|
//! | [`HexString`]| integer, string, bytes               | lowercase `0x…`      |
//! | [`parse_big_int`] | integer, hex string, bytes (big-endian) | [`U256`]   |
//! | [`Address`]  | anything [`HexString`] accepts       | 42-char `0x…`        |
//! | [`BlockTag`] | exact tag name                       | enum variant         |

use std::fmt;
use std::str::FromStr;

use alloy_primitives::U256;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::ValueError;

/// Length of `0x` + 20 bytes.
pub const ADDRESS_LEN: usize = 42;
/// Length of `0x` + 32 bytes.
pub const HASH_LEN: usize = 66;

/// One of the source representations a hex-like value may arrive in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HexInput {
    Integer(U256),
    Text(String),
    Bytes(Vec<u8>),
}

impl HexInput {
    /// Map a JSON value onto a source representation.
    ///
    /// Non-negative integer numbers are integers, strings are text, and
    /// arrays of numbers in `0..=255` are byte sequences.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_u64().map(|n| Self::Integer(U256::from(n))),
            Value::String(s) => Some(Self::Text(s.clone())),
            Value::Array(items) => items
                .iter()
                .map(|v| v.as_u64().and_then(|b| u8::try_from(b).ok()))
                .collect::<Option<Vec<u8>>>()
                .map(Self::Bytes),
            _ => None,
        }
    }
}

impl From<U256> for HexInput {
    fn from(v: U256) -> Self {
        Self::Integer(v)
    }
}

impl From<u64> for HexInput {
    fn from(v: u64) -> Self {
        Self::Integer(U256::from(v))
    }
}

impl From<&str> for HexInput {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for HexInput {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&[u8]> for HexInput {
    fn from(v: &[u8]) -> Self {
        Self::Bytes(v.to_vec())
    }
}

impl From<Vec<u8>> for HexInput {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

fn describe(value: &Value) -> String {
    let text = value.to_string();
    if text.chars().count() > 80 {
        format!("{}…", text.chars().take(80).collect::<String>())
    } else {
        text
    }
}

// ─── HexString ────────────────────────────────────────────────────────────────

/// Lowercase `0x`-prefixed hex string with at least one digit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HexString(String);

impl HexString {
    /// Run the hex codec over any accepted representation.
    pub fn parse(input: impl Into<HexInput>) -> Result<Self, ValueError> {
        let candidate = match input.into() {
            HexInput::Integer(n) if n.is_zero() => "0x0".to_string(),
            HexInput::Integer(n) => format!("0x{n:x}"),
            HexInput::Text(s) => s.to_lowercase(),
            HexInput::Bytes(b) => format!("0x{}", hex::encode(b)),
        };
        if is_hex(&candidate) {
            Ok(Self(candidate))
        } else {
            Err(ValueError::InvalidHex(candidate))
        }
    }

    /// Run the hex codec over a JSON value.
    pub fn from_value(value: &Value) -> Result<Self, ValueError> {
        let input =
            HexInput::from_value(value).ok_or_else(|| ValueError::InvalidHex(describe(value)))?;
        Self::parse(input)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The hex digits after `0x`.
    pub fn digits(&self) -> &str {
        &self.0[2..]
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Interpret the digits as a big-endian unsigned integer.
    pub fn to_u256(&self) -> Result<U256, ValueError> {
        U256::from_str_radix(self.digits(), 16)
            .map_err(|_| ValueError::InvalidInteger(self.0.clone()))
    }
}

fn is_hex(s: &str) -> bool {
    s.len() >= 3
        && s.starts_with("0x")
        && s[2..].bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

impl fmt::Display for HexString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for HexString {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for HexString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<HexString> for Value {
    fn from(v: HexString) -> Self {
        Value::String(v.0)
    }
}

// ─── BigInt ───────────────────────────────────────────────────────────────────

/// Run the integer codec over any accepted representation.
///
/// Strings must pass the hex codec first; byte sequences are read
/// big-endian. Anything wider than 256 bits is rejected.
pub fn parse_big_int(input: impl Into<HexInput>) -> Result<U256, ValueError> {
    match input.into() {
        HexInput::Integer(n) => Ok(n),
        other => {
            let rendered = format!("{other:?}");
            HexString::parse(other)
                .and_then(|hex| hex.to_u256())
                .map_err(|_| ValueError::InvalidInteger(rendered))
        }
    }
}

/// Run the integer codec over a JSON value.
pub fn big_int_from_value(value: &Value) -> Result<U256, ValueError> {
    let input =
        HexInput::from_value(value).ok_or_else(|| ValueError::InvalidInteger(describe(value)))?;
    parse_big_int(input)
}

// ─── Address ──────────────────────────────────────────────────────────────────

/// A 20-byte account address in lowercase hex.
///
/// Only the length is checked; mixed-case EIP-55 checksums are not verified.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(HexString);

impl Address {
    pub fn parse(input: impl Into<HexInput>) -> Result<Self, ValueError> {
        Self::from_hex(HexString::parse(input)?)
    }

    pub fn from_value(value: &Value) -> Result<Self, ValueError> {
        Self::from_hex(HexString::from_value(value)?)
    }

    pub fn from_hex(hex: HexString) -> Result<Self, ValueError> {
        if hex.as_str().len() == ADDRESS_LEN {
            Ok(Self(hex))
        } else {
            Err(ValueError::InvalidAddress(hex.into_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn as_hex(&self) -> &HexString {
        &self.0
    }
}

/// Validate a JSON array of addresses.
pub fn address_list_from_value(value: &Value) -> Result<Vec<Address>, ValueError> {
    value
        .as_array()
        .ok_or_else(|| ValueError::InvalidAddress(describe(value)))?
        .iter()
        .map(Address::from_value)
        .collect()
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Address {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Address> for Value {
    fn from(v: Address) -> Self {
        v.0.into()
    }
}

// ─── BlockHash ────────────────────────────────────────────────────────────────

/// A 32-byte block hash in lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlockHash(HexString);

impl BlockHash {
    pub fn parse(input: impl Into<HexInput>) -> Result<Self, ValueError> {
        Self::from_hex(HexString::parse(input)?)
    }

    pub fn from_value(value: &Value) -> Result<Self, ValueError> {
        Self::from_hex(HexString::from_value(value)?)
    }

    fn from_hex(hex: HexString) -> Result<Self, ValueError> {
        if hex.as_str().len() == HASH_LEN {
            Ok(Self(hex))
        } else {
            Err(ValueError::InvalidHash(hex.into_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<BlockHash> for Value {
    fn from(v: BlockHash) -> Self {
        v.0.into()
    }
}

macro_rules! string_serde {
    ($($ty:ident),*) => {$(
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Self::parse(s).map_err(serde::de::Error::custom)
            }
        }
    )*};
}

string_serde!(HexString, Address, BlockHash);

// ─── BlockTag ─────────────────────────────────────────────────────────────────

/// Symbolic block position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockTag {
    Earliest,
    Latest,
    Safe,
    Finalized,
    Pending,
}

impl BlockTag {
    pub const ALL: [Self; 5] = [
        Self::Earliest,
        Self::Latest,
        Self::Safe,
        Self::Finalized,
        Self::Pending,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Earliest => "earliest",
            Self::Latest => "latest",
            Self::Safe => "safe",
            Self::Finalized => "finalized",
            Self::Pending => "pending",
        }
    }

    pub fn from_value(value: &Value) -> Result<Self, ValueError> {
        value
            .as_str()
            .ok_or_else(|| ValueError::InvalidBlockTag(describe(value)))?
            .parse()
    }
}

impl FromStr for BlockTag {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tag| tag.as_str() == s)
            .ok_or_else(|| ValueError::InvalidBlockTag(s.to_string()))
    }
}

impl fmt::Display for BlockTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-facing block identifier: a native block number or a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockId {
    Number(u64),
    Tag(BlockTag),
}

impl From<u64> for BlockId {
    fn from(n: u64) -> Self {
        Self::Number(n)
    }
}

impl From<BlockTag> for BlockId {
    fn from(tag: BlockTag) -> Self {
        Self::Tag(tag)
    }
}

impl From<BlockId> for Value {
    fn from(id: BlockId) -> Self {
        match id {
            BlockId::Number(n) => Value::from(n),
            BlockId::Tag(tag) => Value::String(tag.as_str().into()),
        }
    }
}
