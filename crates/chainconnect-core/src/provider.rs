//! Provider session: a shared connector plus minimal connection state.

use std::sync::Arc;

use alloy_primitives::U256;
use serde_json::Value;

use crate::connector::ProviderConnector;
use crate::error::ConnectorError;
use crate::events::{EventHandler, Subscription};
use crate::methods::{EthereumMethod, MethodResult};
use crate::values::{address_list_from_value, big_int_from_value, Address};

/// Coarse connection status derived from [`ProviderState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Disconnected,
    Connected,
}

/// Snapshot of what is known about the connected chain and accounts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderState {
    pub chain_id: Option<U256>,
    pub block_height: Option<U256>,
    pub connected_addresses: Vec<Address>,
}

impl ProviderState {
    /// Connected once accounts, chain id and block height are all known.
    pub fn status(&self) -> ConnectionStatus {
        if !self.connected_addresses.is_empty()
            && self.chain_id.is_some()
            && self.block_height.is_some()
        {
            ConnectionStatus::Connected
        } else {
            ConnectionStatus::Disconnected
        }
    }
}

/// A session over a (possibly shared) connector.
///
/// State changes only through [`Provider::connect`] and the `set_*` hooks.
/// `connect` takes `&mut self`, so concurrent connects on one provider are
/// impossible; callers sharing a provider across tasks wrap it in a lock.
pub struct Provider {
    connector: Arc<dyn ProviderConnector>,
    state: ProviderState,
}

impl Provider {
    pub fn new(connector: Arc<dyn ProviderConnector>, state: ProviderState) -> Self {
        Self { connector, state }
    }

    /// Build a provider from a best-effort initial snapshot.
    ///
    /// `eth_chainId`, `eth_blockNumber` and `eth_accounts` are requested
    /// concurrently. If any of them fails the provider starts disconnected
    /// with empty state; construction itself never fails.
    pub async fn create(connector: Arc<dyn ProviderConnector>) -> Self {
        let (chain_id, block_height, accounts) = futures::join!(
            connector.request(EthereumMethod::ChainId.as_str(), vec![]),
            connector.request(EthereumMethod::BlockNumber.as_str(), vec![]),
            connector.request(EthereumMethod::Accounts.as_str(), vec![]),
        );

        match snapshot(chain_id, block_height, accounts) {
            Ok(state) => Self::new(connector, state),
            Err(e) => {
                tracing::warn!(error = %e, "connector is not connected");
                Self::new(connector, ProviderState::default())
            }
        }
    }

    /// Ask the wallet for accounts; on a non-empty answer with no known
    /// chain, fetch chain id and block height concurrently.
    ///
    /// State is written only after every request has succeeded and
    /// validated, so a failed `connect` leaves the state untouched.
    pub async fn connect(&mut self) -> Result<(), ConnectorError> {
        let method = EthereumMethod::RequestAccounts;
        let result = self.connector.request(method.as_str(), vec![]).await?;
        let accounts = addresses(method, result)?;

        if !accounts.is_empty() && self.state.chain_id.is_none() {
            let (chain_id, block_height) = futures::try_join!(
                self.connector.request(EthereumMethod::ChainId.as_str(), vec![]),
                self.connector.request(EthereumMethod::BlockNumber.as_str(), vec![]),
            )?;
            let chain_id = quantity(EthereumMethod::ChainId, chain_id)?;
            let block_height = quantity(EthereumMethod::BlockNumber, block_height)?;
            tracing::debug!(accounts = accounts.len(), %chain_id, "provider connected");
            self.state.chain_id = Some(chain_id);
            self.state.block_height = Some(block_height);
        }
        self.state.connected_addresses = accounts;
        Ok(())
    }

    pub async fn request(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<MethodResult, ConnectorError> {
        self.connector.request(method, params).await
    }

    pub fn subscribe(&self, handler: EventHandler) -> Result<Subscription, ConnectorError> {
        self.connector.subscribe(handler)
    }

    pub fn connector(&self) -> &Arc<dyn ProviderConnector> {
        &self.connector
    }

    pub fn state(&self) -> &ProviderState {
        &self.state
    }

    pub fn status(&self) -> ConnectionStatus {
        self.state.status()
    }

    pub fn chain_id(&self) -> Option<U256> {
        self.state.chain_id
    }

    pub fn block_height(&self) -> Option<U256> {
        self.state.block_height
    }

    pub fn connected_addresses(&self) -> &[Address] {
        &self.state.connected_addresses
    }

    pub fn set_connected_addresses(&mut self, addresses: Vec<Address>) {
        self.state.connected_addresses = addresses;
    }

    pub fn set_chain_id(&mut self, chain_id: Option<U256>) {
        self.state.chain_id = chain_id;
    }

    pub fn set_block_height(&mut self, block_height: Option<U256>) {
        self.state.block_height = block_height;
    }
}

impl std::fmt::Debug for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provider")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

fn snapshot(
    chain_id: Result<MethodResult, ConnectorError>,
    block_height: Result<MethodResult, ConnectorError>,
    accounts: Result<MethodResult, ConnectorError>,
) -> Result<ProviderState, ConnectorError> {
    Ok(ProviderState {
        chain_id: Some(quantity(EthereumMethod::ChainId, chain_id?)?),
        block_height: Some(quantity(EthereumMethod::BlockNumber, block_height?)?),
        connected_addresses: addresses(EthereumMethod::Accounts, accounts?)?,
    })
}

/// Connectors other than [`Connector`](crate::connector::Connector) may
/// hand back raw values; validate those here.
fn quantity(method: EthereumMethod, result: MethodResult) -> Result<U256, ConnectorError> {
    match result {
        MethodResult::Quantity(q) => Ok(q),
        MethodResult::Raw(v) => big_int_from_value(&v).map_err(|e| invalid(method, e)),
        other => Err(invalid(method, format!("expected quantity, got {other:?}"))),
    }
}

fn addresses(method: EthereumMethod, result: MethodResult) -> Result<Vec<Address>, ConnectorError> {
    match result {
        MethodResult::Addresses(list) => Ok(list),
        MethodResult::Raw(v) => address_list_from_value(&v).map_err(|e| invalid(method, e)),
        other => Err(invalid(method, format!("expected address list, got {other:?}"))),
    }
}

fn invalid(method: EthereumMethod, reason: impl std::fmt::Display) -> ConnectorError {
    ConnectorError::InvalidResponse {
        method: method.to_string(),
        reason: reason.to_string(),
    }
}
