//! JSON-RPC 2.0 wire types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// JSON-RPC request ID: string, number, or null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RpcId {
    Number(Number),
    String(String),
    Null,
}

impl RpcId {
    pub fn number(n: u64) -> Self {
        Self::Number(n.into())
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(Self::Null),
            Value::String(s) => Some(Self::String(s.clone())),
            Value::Number(n) => Some(Self::Number(n.clone())),
            _ => None,
        }
    }
}

impl std::fmt::Display for RpcId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s}"),
            Self::Null => write!(f, "null"),
        }
    }
}

/// A single JSON-RPC parameter value.
pub type RpcParam = Value;

/// A JSON-RPC 2.0 request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: RpcId,
    pub method: String,
    pub params: Vec<RpcParam>,
}

impl JsonRpcRequest {
    /// Create a new JSON-RPC 2.0 request.
    pub fn new(id: u64, method: impl Into<String>, params: Vec<RpcParam>) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            id: RpcId::number(id),
            method: method.into(),
            params,
        }
    }
}

/// A JSON-RPC 2.0 error object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    fn from_value(value: &Value) -> Result<Self, String> {
        let obj = value
            .as_object()
            .ok_or_else(|| "error member is not an object".to_string())?;
        let code = obj
            .get("code")
            .and_then(integral_code)
            .ok_or_else(|| "error code is not an integer".to_string())?;
        let message = obj
            .get("message")
            .and_then(Value::as_str)
            .ok_or_else(|| "error message is not a string".to_string())?;
        Ok(Self {
            code,
            message: message.to_string(),
            data: obj.get("data").cloned(),
        })
    }
}

/// Accepts `-32000` as well as `-32000.0`, rejects fractional codes.
fn integral_code(value: &Value) -> Option<i64> {
    if let Some(code) = value.as_i64() {
        return Some(code);
    }
    let f = value.as_f64()?;
    (f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64).then_some(f as i64)
}

impl std::fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "JSON-RPC error {}: {}", self.code, self.message)
    }
}

/// A JSON-RPC 2.0 response: exactly one of `result` / `error`.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonRpcResponse {
    Success { id: RpcId, result: Value },
    Error { id: RpcId, error: JsonRpcError },
}

impl JsonRpcResponse {
    pub fn success(id: RpcId, result: Value) -> Self {
        Self::Success { id, result }
    }

    pub fn error(id: RpcId, error: JsonRpcError) -> Self {
        Self::Error { id, error }
    }

    /// Parse a raw reply. Anything that is neither the success nor the
    /// error shape is rejected with a description of the mismatch.
    pub fn from_value(value: Value) -> Result<Self, String> {
        let Value::Object(mut obj) = value else {
            return Err("reply is not a JSON object".into());
        };
        match obj.get("jsonrpc") {
            Some(Value::String(v)) if v == "2.0" => {}
            _ => return Err("missing or unsupported jsonrpc version".into()),
        }
        let id = obj
            .get("id")
            .and_then(RpcId::from_value)
            .ok_or_else(|| "missing or invalid id".to_string())?;

        // `"error": null` is treated as absent.
        match (obj.remove("result"), obj.get("error").filter(|e| !e.is_null())) {
            (Some(_), Some(_)) => Err("reply carries both result and error".into()),
            (None, Some(err)) => Ok(Self::Error {
                id,
                error: JsonRpcError::from_value(err)?,
            }),
            (Some(result), None) => Ok(Self::Success { id, result }),
            (None, None) => Err("reply carries neither result nor error".into()),
        }
    }

    pub fn id(&self) -> &RpcId {
        match self {
            Self::Success { id, .. } | Self::Error { id, .. } => id,
        }
    }

    /// Returns `true` if this is a successful response.
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Unwrap the result value or return the node's error.
    pub fn into_result(self) -> Result<Value, JsonRpcError> {
        match self {
            Self::Success { result, .. } => Ok(result),
            Self::Error { error, .. } => Err(error),
        }
    }

    /// Render back into the wire form.
    pub fn into_value(self) -> Value {
        let mut obj = Map::new();
        obj.insert("jsonrpc".into(), Value::String("2.0".into()));
        match self {
            Self::Success { id, result } => {
                obj.insert("id".into(), id_value(id));
                obj.insert("result".into(), result);
            }
            Self::Error { id, error } => {
                obj.insert("id".into(), id_value(id));
                obj.insert(
                    "error".into(),
                    serde_json::to_value(error).unwrap_or(Value::Null),
                );
            }
        }
        Value::Object(obj)
    }
}

fn id_value(id: RpcId) -> Value {
    match id {
        RpcId::Number(n) => Value::Number(n),
        RpcId::String(s) => Value::String(s),
        RpcId::Null => Value::Null,
    }
}
