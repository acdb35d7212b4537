//! Error types for codecs, transports and connectors.

use thiserror::Error;

use crate::request::JsonRpcError;

/// A value failed one of the primitive codecs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid integer: {0}")]
    InvalidInteger(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid block hash: {0}")]
    InvalidHash(String),

    #[error("invalid block tag: {0}")]
    InvalidBlockTag(String),

    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),
}

/// Errors raised while moving an envelope across a transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed (connection refused, unreadable body, etc.).
    #[error("HTTP error: {0}")]
    Http(String),

    /// The endpoint URL could not be parsed.
    #[error("invalid endpoint URL: {0}")]
    InvalidUrl(String),

    /// Reply body was not JSON.
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// Errors surfaced by [`ProviderConnector`](crate::connector::ProviderConnector).
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// Caller-supplied params failed the method's schema. No transport call was made.
    #[error("invalid params for {method}: {reason}")]
    InvalidParams { method: String, reason: String },

    /// The reply was not a JSON-RPC envelope, or its result failed the response schema.
    #[error("invalid response for {method}: {reason}")]
    InvalidResponse { method: String, reason: String },

    /// Well-formed error envelope returned by the node.
    #[error("RPC error {}: {}", .0.code, .0.message)]
    Rpc(JsonRpcError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("not implemented: {feature}")]
    NotImplemented { feature: String },
}

impl ConnectorError {
    /// Returns `true` if the error was raised by local schema validation.
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Self::InvalidParams { .. } | Self::InvalidResponse { .. })
    }

    /// Returns `true` if this is a node-side error envelope.
    pub fn is_rpc_error(&self) -> bool {
        matches!(self, Self::Rpc(_))
    }

    /// The node's error code, if this is an RPC error.
    pub fn rpc_code(&self) -> Option<i64> {
        match self {
            Self::Rpc(err) => Some(err.code),
            _ => None,
        }
    }

    pub(crate) fn not_implemented(feature: impl Into<String>) -> Self {
        Self::NotImplemented {
            feature: feature.into(),
        }
    }
}
