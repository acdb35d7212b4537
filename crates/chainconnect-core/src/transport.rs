//! The `RpcTransport` trait: the black-box request/response exchange
//! underneath every connector.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::TransportError;
use crate::events::EventSource;
use crate::request::JsonRpcRequest;

/// Moves one JSON-RPC envelope to a node or wallet and returns the raw reply.
///
/// Implementations must not interpret the reply: envelope parsing and
/// schema validation happen in [`Connector`](crate::connector::Connector)
/// so every transport behaves identically.
///
/// # Object Safety
/// The trait is object-safe and can be stored as `Arc<dyn RpcTransport>`.
#[async_trait]
pub trait RpcTransport: Send + Sync + 'static {
    /// Send a single JSON-RPC request and return the reply body.
    async fn send(&self, req: JsonRpcRequest) -> Result<Value, TransportError>;

    /// Return the transport's identifier (URL or wallet name).
    fn target(&self) -> &str;

    /// Wallet event source, if this transport has one.
    fn events(&self) -> Option<Arc<dyn EventSource>> {
        None
    }
}
