//! EIP-1193 injected provider contract and its transport adapter.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use chainconnect_core::connector::Connector;
use chainconnect_core::error::TransportError;
use chainconnect_core::events::{EventSource, ListenerId, RawListener, WalletEvent};
use chainconnect_core::request::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
use chainconnect_core::transport::RpcTransport;

/// A wallet-supplied provider object living in the caller's runtime.
///
/// `request` resolves to the bare result or rejects with a provider RPC
/// error (`4001` user rejected, `4900` disconnected, node errors, …).
#[async_trait]
pub trait Eip1193Provider: Send + Sync + 'static {
    async fn request(&self, payload: JsonRpcRequest) -> Result<Value, JsonRpcError>;

    fn on(&self, event: WalletEvent, listener: RawListener) -> ListenerId;

    fn remove_listener(&self, event: WalletEvent, id: ListenerId);
}

/// Exposes an injected provider's events to the connector.
struct ProviderEvents(Arc<dyn Eip1193Provider>);

impl EventSource for ProviderEvents {
    fn on(&self, event: WalletEvent, listener: RawListener) -> ListenerId {
        self.0.on(event, listener)
    }

    fn remove_listener(&self, event: WalletEvent, id: ListenerId) {
        self.0.remove_listener(event, id)
    }
}

/// [`RpcTransport`] over an injected provider.
///
/// The provider's outcome is rewrapped as a JSON-RPC envelope so the
/// connector parses it exactly like an HTTP reply.
pub struct InjectedTransport {
    name: String,
    provider: Arc<dyn Eip1193Provider>,
}

impl InjectedTransport {
    pub fn new(name: impl Into<String>, provider: Arc<dyn Eip1193Provider>) -> Self {
        Self {
            name: name.into(),
            provider,
        }
    }

    pub fn provider(&self) -> &Arc<dyn Eip1193Provider> {
        &self.provider
    }
}

#[async_trait]
impl RpcTransport for InjectedTransport {
    async fn send(&self, req: JsonRpcRequest) -> Result<Value, TransportError> {
        let id = req.id.clone();
        let envelope = match self.provider.request(req).await {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(error) => JsonRpcResponse::error(id, error),
        };
        Ok(envelope.into_value())
    }

    fn target(&self) -> &str {
        &self.name
    }

    fn events(&self) -> Option<Arc<dyn EventSource>> {
        Some(Arc::new(ProviderEvents(self.provider.clone())))
    }
}

/// Build a validating connector over an injected provider.
pub fn injected_connector(provider: Arc<dyn Eip1193Provider>) -> Connector {
    Connector::new(Arc::new(InjectedTransport::new("injected", provider)))
}
