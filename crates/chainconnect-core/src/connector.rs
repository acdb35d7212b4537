//! The uniform request/subscribe contract and its validating implementation.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ConnectorError;
use crate::events::{EventHandler, ProviderEvent, RawListener, Subscription, WalletEvent};
use crate::methods::{EthereumMethod, MethodResult};
use crate::request::{JsonRpcRequest, JsonRpcResponse};
use crate::transport::RpcTransport;
use crate::values::{address_list_from_value, Address};

/// Request id used for every envelope. No batching, no correlation.
pub const REQUEST_ID: u64 = 1;

/// Request/subscribe capability over one transport target.
///
/// Connectors hold no connection state and may be shared freely.
#[async_trait]
pub trait ProviderConnector: Send + Sync + 'static {
    /// Call `method`. Registered methods are validated on the way out and
    /// on the way back; anything else is passed through as [`MethodResult::Raw`].
    async fn request(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<MethodResult, ConnectorError>;

    /// Attach a typed event handler.
    fn subscribe(&self, handler: EventHandler) -> Result<Subscription, ConnectorError>;
}

/// Runs registry validation around an [`RpcTransport`].
#[derive(Clone)]
pub struct Connector {
    transport: Arc<dyn RpcTransport>,
}

impl Connector {
    pub fn new(transport: Arc<dyn RpcTransport>) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &Arc<dyn RpcTransport> {
        &self.transport
    }

    fn subscribe_accounts(
        &self,
        callback: Arc<dyn Fn(Vec<Address>) + Send + Sync>,
    ) -> Result<Subscription, ConnectorError> {
        let events = self.transport.events().ok_or_else(|| {
            ConnectorError::not_implemented(format!(
                "subscriptions over {}",
                self.transport.target()
            ))
        })?;

        let listener: RawListener = Arc::new(move |payload: &Value| {
            match address_list_from_value(payload) {
                Ok(accounts) => callback(accounts),
                Err(e) => tracing::debug!(error = %e, "ignoring malformed accountsChanged payload"),
            }
        });
        let id = events.on(WalletEvent::AccountsChanged, listener);
        Ok(Subscription::new(ProviderEvent::ConnectedAccounts, move || {
            events.remove_listener(WalletEvent::AccountsChanged, id)
        }))
    }
}

#[async_trait]
impl ProviderConnector for Connector {
    async fn request(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<MethodResult, ConnectorError> {
        let registered = EthereumMethod::from_name(method);

        let params = match registered {
            Some(m) => m
                .spec()
                .serialize
                .apply(&params)
                .map_err(|reason| ConnectorError::InvalidParams {
                    method: method.to_string(),
                    reason,
                })?,
            None => params,
        };

        let req = JsonRpcRequest::new(REQUEST_ID, method, params);
        tracing::debug!(
            method,
            transport = %self.transport.target(),
            registered = registered.is_some(),
            "dispatching request"
        );
        let raw = self.transport.send(req).await?;

        let result = JsonRpcResponse::from_value(raw)
            .map_err(|reason| ConnectorError::InvalidResponse {
                method: method.to_string(),
                reason,
            })?
            .into_result()
            .map_err(ConnectorError::Rpc)?;

        match registered {
            Some(m) => m.spec().response.coerce(&result).map_err(|reason| {
                ConnectorError::InvalidResponse {
                    method: method.to_string(),
                    reason,
                }
            }),
            None => Ok(MethodResult::Raw(result)),
        }
    }

    fn subscribe(&self, handler: EventHandler) -> Result<Subscription, ConnectorError> {
        match handler {
            EventHandler::ConnectedAccounts(callback) => self.subscribe_accounts(callback),
            EventHandler::BlockNumber(_) => Err(ConnectorError::not_implemented(format!(
                "{} subscription",
                ProviderEvent::BlockNumber
            ))),
        }
    }
}
