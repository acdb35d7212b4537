//! Static registry of the read-only Ethereum JSON-RPC methods.
//!
//! Each [`EthereumMethod`] maps to a [`MethodSpec`] triple:
//!
//! - `params`: the caller-facing shape (native integers, block tags)
//! - `serialize`: the wire shape (hex quantities, block tags)
//! - `response`: how the node's `result` is coerced
//!
//! The registry is the only place where caller values are translated into
//! their wire encoding. Method names that are not registered are not an
//! error: [`EthereumMethod::from_name`] returns `None` and the connector
//! forwards such calls unvalidated.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::U256;
use serde_json::{Map, Value};

use crate::error::ValueError;
use crate::values::{
    address_list_from_value, big_int_from_value, Address, BlockHash, BlockTag, HexString,
};

/// A single positional parameter slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Any hex-like value, emitted as a lowercase hex string.
    Hex,
    /// A 20-byte address.
    Address,
    /// A 32-byte block hash.
    BlockHash,
    /// A caller-facing native integer (JSON number), left as is.
    Integer,
    /// A caller-facing native block number or a block tag, left as is.
    BlockNumberOrTag,
    /// Wire block identifier: hex quantity or block tag.
    BlockRef,
    /// A transaction request object.
    Transaction,
}

impl Slot {
    /// Validate one parameter and return its canonical form.
    pub fn coerce(self, value: &Value) -> Result<Value, ValueError> {
        match self {
            Self::Hex => HexString::from_value(value).map(Value::from),
            Self::Address => Address::from_value(value).map(Value::from),
            Self::BlockHash => BlockHash::from_value(value).map(Value::from),
            Self::Integer => native_integer(value).map(|_| value.clone()),
            Self::BlockNumberOrTag => match value {
                Value::String(_) => BlockTag::from_value(value).map(|_| value.clone()),
                _ => native_integer(value).map(|_| value.clone()),
            },
            Self::BlockRef => match HexString::from_value(value) {
                Ok(hex) => Ok(hex.into()),
                Err(_) => BlockTag::from_value(value).map(|tag| Value::String(tag.as_str().into())),
            },
            Self::Transaction => transaction(value),
        }
    }
}

fn native_integer(value: &Value) -> Result<u64, ValueError> {
    value
        .as_u64()
        .ok_or_else(|| ValueError::InvalidInteger(value.to_string()))
}

/// Transaction envelope types accepted by `eth_signTransaction`.
const TRANSACTION_TYPES: [&str; 2] = ["0x1", "0x2"];

fn transaction(value: &Value) -> Result<Value, ValueError> {
    let obj = value
        .as_object()
        .ok_or_else(|| ValueError::InvalidTransaction(format!("not an object: {value}")))?;

    let tx_type = obj
        .get("type")
        .and_then(Value::as_str)
        .filter(|t| TRANSACTION_TYPES.contains(t))
        .ok_or_else(|| ValueError::InvalidTransaction("type must be 0x1 or 0x2".into()))?;
    let from = obj
        .get("from")
        .ok_or_else(|| ValueError::InvalidTransaction("missing `from`".into()))
        .and_then(Address::from_value)?;
    let to = match obj.get("to") {
        None => None,
        Some(to) => Some(Address::from_value(to)?),
    };

    let mut out: Map<String, Value> = obj.clone();
    out.insert("type".into(), Value::String(tx_type.into()));
    out.insert("from".into(), from.into());
    if let Some(to) = to {
        out.insert("to".into(), to.into());
    }
    Ok(Value::Object(out))
}

/// Accepted tuple shapes for one method, tried in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSchema {
    shapes: &'static [&'static [Slot]],
}

impl ParamSchema {
    pub const fn new(shapes: &'static [&'static [Slot]]) -> Self {
        Self { shapes }
    }

    pub fn shapes(&self) -> &'static [&'static [Slot]] {
        self.shapes
    }

    /// Returns `true` if the only accepted shape is the empty tuple.
    pub fn is_empty(&self) -> bool {
        self.shapes.iter().all(|shape| shape.is_empty())
    }

    /// Validate `params` against the first shape of matching arity and
    /// return the canonicalized list.
    pub fn apply(&self, params: &[Value]) -> Result<Vec<Value>, String> {
        let mut last_error = None;
        for shape in self.shapes.iter().filter(|s| s.len() == params.len()) {
            match shape
                .iter()
                .zip(params)
                .enumerate()
                .map(|(i, (slot, value))| slot.coerce(value).map_err(|e| format!("param {i}: {e}")))
                .collect::<Result<Vec<_>, _>>()
            {
                Ok(out) => return Ok(out),
                Err(e) => last_error = Some(e),
            }
        }
        Err(last_error.unwrap_or_else(|| {
            let arities: Vec<String> = self.shapes.iter().map(|s| s.len().to_string()).collect();
            format!(
                "expected {} param(s), got {}",
                arities.join(" or "),
                params.len()
            )
        }))
    }
}

/// Sync progress reported by `eth_syncing`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncProgress {
    pub starting_block: HexString,
    pub current_block: HexString,
    pub highest_block: HexString,
}

/// `eth_syncing` result: a flag, or progress while syncing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStatus {
    Flag(bool),
    Progress(SyncProgress),
}

impl SyncStatus {
    pub fn is_syncing(&self) -> bool {
        match self {
            Self::Flag(flag) => *flag,
            Self::Progress(_) => true,
        }
    }
}

/// A coerced method result.
#[derive(Debug, Clone, PartialEq)]
pub enum MethodResult {
    Text(String),
    Bool(bool),
    Quantity(U256),
    Hex(HexString),
    Address(Address),
    Addresses(Vec<Address>),
    Syncing(SyncStatus),
    /// Result of an unregistered method, passed through unvalidated.
    Raw(Value),
}

impl MethodResult {
    pub fn as_quantity(&self) -> Option<U256> {
        match self {
            Self::Quantity(q) => Some(*q),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn into_addresses(self) -> Option<Vec<Address>> {
        match self {
            Self::Addresses(a) => Some(a),
            _ => None,
        }
    }

    /// Render as JSON in canonical wire encoding.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Text(s) => Value::String(s.clone()),
            Self::Bool(b) => Value::Bool(*b),
            Self::Quantity(q) => HexString::parse(*q).map(Value::from).unwrap_or(Value::Null),
            Self::Hex(h) => h.clone().into(),
            Self::Address(a) => a.clone().into(),
            Self::Addresses(list) => list.iter().cloned().map(Value::from).collect(),
            Self::Syncing(SyncStatus::Flag(b)) => Value::Bool(*b),
            Self::Syncing(SyncStatus::Progress(p)) => serde_json::json!({
                "startingBlock": p.starting_block.as_str(),
                "currentBlock": p.current_block.as_str(),
                "highestBlock": p.highest_block.as_str(),
            }),
            Self::Raw(v) => v.clone(),
        }
    }
}

/// How a method's `result` is coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSchema {
    Text,
    Bool,
    Quantity,
    Hex,
    Address,
    AddressList,
    Syncing,
}

impl ResponseSchema {
    pub fn coerce(self, value: &Value) -> Result<MethodResult, String> {
        let result = match self {
            Self::Text => value
                .as_str()
                .map(|s| MethodResult::Text(s.to_string()))
                .ok_or_else(|| format!("expected string, got {value}"))?,
            Self::Bool => value
                .as_bool()
                .map(MethodResult::Bool)
                .ok_or_else(|| format!("expected boolean, got {value}"))?,
            Self::Quantity => MethodResult::Quantity(big_int_from_value(value).map_err(err)?),
            Self::Hex => MethodResult::Hex(HexString::from_value(value).map_err(err)?),
            Self::Address => MethodResult::Address(Address::from_value(value).map_err(err)?),
            Self::AddressList => {
                MethodResult::Addresses(address_list_from_value(value).map_err(err)?)
            }
            Self::Syncing => MethodResult::Syncing(sync_status(value)?),
        };
        Ok(result)
    }
}

fn err(e: ValueError) -> String {
    e.to_string()
}

fn sync_status(value: &Value) -> Result<SyncStatus, String> {
    if let Some(flag) = value.as_bool() {
        return Ok(SyncStatus::Flag(flag));
    }
    let field = |name: &str| {
        value
            .get(name)
            .ok_or_else(|| format!("sync status is missing `{name}`"))
            .and_then(|v| HexString::from_value(v).map_err(err))
    };
    Ok(SyncStatus::Progress(SyncProgress {
        starting_block: field("startingBlock")?,
        current_block: field("currentBlock")?,
        highest_block: field("highestBlock")?,
    }))
}

/// The schema triple registered for a method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodSpec {
    pub params: ParamSchema,
    pub serialize: ParamSchema,
    pub response: ResponseSchema,
}

const fn spec(params: ParamSchema, serialize: ParamSchema, response: ResponseSchema) -> MethodSpec {
    MethodSpec {
        params,
        serialize,
        response,
    }
}

const EMPTY: ParamSchema = ParamSchema::new(&[&[]]);
const DATA: ParamSchema = ParamSchema::new(&[&[Slot::Hex]]);
const ACCOUNT_PARAMS: ParamSchema = ParamSchema::new(&[
    &[Slot::Address],
    &[Slot::Address, Slot::BlockNumberOrTag],
]);
const ACCOUNT_WIRE: ParamSchema =
    ParamSchema::new(&[&[Slot::Address], &[Slot::Address, Slot::BlockRef]]);
const STORAGE_PARAMS: ParamSchema = ParamSchema::new(&[
    &[Slot::Address, Slot::Integer],
    &[Slot::Address, Slot::Integer, Slot::BlockNumberOrTag],
]);
const STORAGE_WIRE: ParamSchema = ParamSchema::new(&[
    &[Slot::Address, Slot::Hex],
    &[Slot::Address, Slot::Hex, Slot::BlockRef],
]);
const BY_HASH: ParamSchema = ParamSchema::new(&[&[Slot::BlockHash]]);
const BY_NUMBER_PARAMS: ParamSchema = ParamSchema::new(&[&[Slot::BlockNumberOrTag]]);
const BY_NUMBER_WIRE: ParamSchema = ParamSchema::new(&[&[Slot::BlockRef]]);
const SIGN: ParamSchema = ParamSchema::new(&[&[Slot::Address, Slot::Hex]]);
const SIGN_TX: ParamSchema = ParamSchema::new(&[&[Slot::Transaction]]);

const NO_PARAMS_TEXT: MethodSpec = spec(EMPTY, EMPTY, ResponseSchema::Text);
const NO_PARAMS_BOOL: MethodSpec = spec(EMPTY, EMPTY, ResponseSchema::Bool);
const NO_PARAMS_QUANTITY: MethodSpec = spec(EMPTY, EMPTY, ResponseSchema::Quantity);
const NO_PARAMS_ACCOUNTS: MethodSpec = spec(EMPTY, EMPTY, ResponseSchema::AddressList);
const SHA3: MethodSpec = spec(DATA, DATA, ResponseSchema::Hex);
const SYNCING: MethodSpec = spec(EMPTY, EMPTY, ResponseSchema::Syncing);
const COINBASE: MethodSpec = spec(EMPTY, EMPTY, ResponseSchema::Address);
const ACCOUNT_QUANTITY: MethodSpec = spec(ACCOUNT_PARAMS, ACCOUNT_WIRE, ResponseSchema::Quantity);
const ACCOUNT_CODE: MethodSpec = spec(ACCOUNT_PARAMS, ACCOUNT_WIRE, ResponseSchema::Hex);
const STORAGE: MethodSpec = spec(STORAGE_PARAMS, STORAGE_WIRE, ResponseSchema::Hex);
const COUNT_BY_HASH: MethodSpec = spec(BY_HASH, BY_HASH, ResponseSchema::Quantity);
const COUNT_BY_NUMBER: MethodSpec =
    spec(BY_NUMBER_PARAMS, BY_NUMBER_WIRE, ResponseSchema::Quantity);
const ETH_SIGN: MethodSpec = spec(SIGN, SIGN, ResponseSchema::Hex);
const ETH_SIGN_TX: MethodSpec = spec(SIGN_TX, SIGN_TX, ResponseSchema::Hex);

macro_rules! methods {
    ($($variant:ident => $name:literal => $spec:expr,)*) => {
        /// Every registered JSON-RPC method.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum EthereumMethod {
            $($variant,)*
        }

        impl EthereumMethod {
            pub const ALL: &'static [EthereumMethod] = &[$(Self::$variant,)*];

            /// The wire name, e.g. `"eth_chainId"`.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)*
                }
            }

            /// Look up a method by wire name. `None` means "not registered".
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($name => Some(Self::$variant),)*
                    _ => None,
                }
            }

            pub fn spec(self) -> &'static MethodSpec {
                match self {
                    $(Self::$variant => &$spec,)*
                }
            }
        }
    };
}

methods! {
    Web3ClientVersion => "web3_clientVersion" => NO_PARAMS_TEXT,
    Web3Sha3 => "web3_sha3" => SHA3,
    NetVersion => "net_version" => NO_PARAMS_TEXT,
    NetListening => "net_listening" => NO_PARAMS_BOOL,
    NetPeerCount => "net_peerCount" => NO_PARAMS_QUANTITY,
    ProtocolVersion => "eth_protocolVersion" => NO_PARAMS_TEXT,
    Syncing => "eth_syncing" => SYNCING,
    Coinbase => "eth_coinbase" => COINBASE,
    ChainId => "eth_chainId" => NO_PARAMS_QUANTITY,
    Mining => "eth_mining" => NO_PARAMS_BOOL,
    Hashrate => "eth_hashrate" => NO_PARAMS_QUANTITY,
    GasPrice => "eth_gasPrice" => NO_PARAMS_QUANTITY,
    Accounts => "eth_accounts" => NO_PARAMS_ACCOUNTS,
    RequestAccounts => "eth_requestAccounts" => NO_PARAMS_ACCOUNTS,
    BlockNumber => "eth_blockNumber" => NO_PARAMS_QUANTITY,
    GetBalance => "eth_getBalance" => ACCOUNT_QUANTITY,
    GetStorageAt => "eth_getStorageAt" => STORAGE,
    GetTransactionCount => "eth_getTransactionCount" => ACCOUNT_QUANTITY,
    GetBlockTransactionCountByHash => "eth_getBlockTransactionCountByHash" => COUNT_BY_HASH,
    GetBlockTransactionCountByNumber => "eth_getBlockTransactionCountByNumber" => COUNT_BY_NUMBER,
    GetUncleCountByBlockHash => "eth_getUncleCountByBlockHash" => COUNT_BY_HASH,
    GetUncleCountByBlockNumber => "eth_getUncleCountByBlockNumber" => COUNT_BY_NUMBER,
    GetCode => "eth_getCode" => ACCOUNT_CODE,
    Sign => "eth_sign" => ETH_SIGN,
    SignTransaction => "eth_signTransaction" => ETH_SIGN_TX,
}

impl fmt::Display for EthereumMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EthereumMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| format!("`{s}` is not a registered method"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ADDR: &str = "0x0000000000000000000000000000000000000001";

    #[test]
    fn names_round_trip() {
        for method in EthereumMethod::ALL {
            assert_eq!(EthereumMethod::from_name(method.as_str()), Some(*method));
        }
        assert_eq!(EthereumMethod::ALL.len(), 25);
        assert_eq!(EthereumMethod::from_name("eth_sendRawTransaction"), None);
    }

    #[test]
    fn zero_param_methods_reject_params() {
        for method in EthereumMethod::ALL.iter().filter(|m| m.spec().serialize.is_empty()) {
            let spec = method.spec();
            assert_eq!(spec.serialize.apply(&[]).unwrap(), Vec::<Value>::new());
            assert!(spec.serialize.apply(&[json!(1)]).is_err(), "{method}");
            assert!(spec.params.apply(&[json!("latest")]).is_err(), "{method}");
        }
    }

    #[test]
    fn balance_block_number_is_hex_encoded() {
        let spec = EthereumMethod::GetBalance.spec();
        let wire = spec.serialize.apply(&[json!(ADDR), json!(16)]).unwrap();
        assert_eq!(wire, vec![json!(ADDR), json!("0x10")]);

        let wire = spec.serialize.apply(&[json!(ADDR), json!("latest")]).unwrap();
        assert_eq!(wire[1], json!("latest"));

        let wire = spec.serialize.apply(&[json!(ADDR.to_uppercase().replace("0X", "0x"))]).unwrap();
        assert_eq!(wire, vec![json!(ADDR)]);
    }

    #[test]
    fn caller_schema_accepts_native_integers_and_tags() {
        let spec = EthereumMethod::GetCode.spec();
        assert!(spec.params.apply(&[json!(ADDR), json!(100)]).is_ok());
        assert!(spec.params.apply(&[json!(ADDR), json!("pending")]).is_ok());
        assert!(spec.params.apply(&[json!(ADDR), json!("0x64")]).is_err());
        assert!(spec.params.apply(&[json!(ADDR), json!("tip")]).is_err());
    }

    #[test]
    fn block_ref_rejects_unknown_tag() {
        let spec = EthereumMethod::GetBlockTransactionCountByNumber.spec();
        assert_eq!(spec.serialize.apply(&[json!("safe")]).unwrap(), vec![json!("safe")]);
        assert_eq!(spec.serialize.apply(&[json!(255)]).unwrap(), vec![json!("0xff")]);
        assert!(spec.serialize.apply(&[json!("tip")]).is_err());
        assert!(spec.serialize.apply(&[]).is_err());
    }

    #[test]
    fn storage_slot_is_hex_on_the_wire() {
        let spec = EthereumMethod::GetStorageAt.spec();
        assert_eq!(
            spec.serialize.apply(&[json!(ADDR), json!(0)]).unwrap(),
            vec![json!(ADDR), json!("0x0")]
        );
        assert_eq!(
            spec.serialize
                .apply(&[json!(ADDR), json!(2), json!(10)])
                .unwrap(),
            vec![json!(ADDR), json!("0x2"), json!("0xa")]
        );
        assert!(spec.serialize.apply(&[json!(ADDR)]).is_err());
    }

    #[test]
    fn block_hash_length_enforced() {
        let spec = EthereumMethod::GetUncleCountByBlockHash.spec();
        let hash = format!("0x{}", "0f".repeat(32));
        assert!(spec.serialize.apply(&[json!(hash)]).is_ok());
        assert!(spec.serialize.apply(&[json!(ADDR)]).is_err());
    }

    #[test]
    fn transaction_fields_validated() {
        let spec = EthereumMethod::SignTransaction.spec();
        let tx = json!({"type": "0x2", "from": ADDR.replace("01", "AB"), "value": "0x1"});
        let wire = spec.serialize.apply(&[tx]).unwrap();
        assert_eq!(wire[0]["from"], json!(ADDR.replace("01", "ab")));
        assert_eq!(wire[0]["value"], json!("0x1"));

        assert!(spec.serialize.apply(&[json!({"type": "0x3", "from": ADDR})]).is_err());
        assert!(spec.serialize.apply(&[json!({"type": "0x1"})]).is_err());
        assert!(spec
            .serialize
            .apply(&[json!({"type": "0x1", "from": ADDR, "to": "0x12"})])
            .is_err());
    }

    #[test]
    fn responses_are_coerced() {
        assert_eq!(
            ResponseSchema::Quantity.coerce(&json!("0x1")).unwrap(),
            MethodResult::Quantity(U256::from(1))
        );
        assert_eq!(
            ResponseSchema::Bool.coerce(&json!(true)).unwrap(),
            MethodResult::Bool(true)
        );
        assert!(ResponseSchema::Bool.coerce(&json!("true")).is_err());
        assert!(ResponseSchema::Text.coerce(&json!(1)).is_err());
        assert!(ResponseSchema::AddressList.coerce(&json!([ADDR, "0x1"])).is_err());
        assert_eq!(
            ResponseSchema::Address.coerce(&json!(ADDR)).unwrap().to_value(),
            json!(ADDR)
        );
    }

    #[test]
    fn syncing_accepts_flag_or_progress() {
        let idle = ResponseSchema::Syncing.coerce(&json!(false)).unwrap();
        assert_eq!(idle, MethodResult::Syncing(SyncStatus::Flag(false)));

        let progress = ResponseSchema::Syncing
            .coerce(&json!({
                "startingBlock": "0x0",
                "currentBlock": "0x10",
                "highestBlock": "0xFF"
            }))
            .unwrap();
        let MethodResult::Syncing(status) = progress else {
            panic!("expected sync status");
        };
        assert!(status.is_syncing());
        assert_eq!(
            progress_highest(&status),
            Some("0xff".to_string())
        );

        assert!(ResponseSchema::Syncing
            .coerce(&json!({"startingBlock": "0x0"}))
            .is_err());
    }

    fn progress_highest(status: &SyncStatus) -> Option<String> {
        match status {
            SyncStatus::Progress(p) => Some(p.highest_block.to_string()),
            SyncStatus::Flag(_) => None,
        }
    }
}
