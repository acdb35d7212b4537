//! chainconnect-core — typed client layer for Ethereum JSON-RPC providers.
//!
//! # Overview
//!
//! ChainConnect puts direct HTTP JSON-RPC and wallet-injected providers
//! behind one validated interface. This crate defines:
//!
//! - [`values`]: codecs for hex strings, integers, addresses and block tags
//! - [`methods`]: the static per-method schema registry
//! - [`RpcTransport`]: the raw envelope exchange every transport implements
//! - [`ProviderConnector`] / [`Connector`]: the uniform `request` / `subscribe` contract
//! - [`Provider`]: session object holding chain id, block height and accounts
//! - [`WalletWatcher`]: publishes the connected addresses of the selected connector

pub mod connector;
pub mod error;
pub mod events;
pub mod methods;
pub mod provider;
pub mod request;
pub mod state;
pub mod transport;
pub mod values;

pub use alloy_primitives::U256;
pub use connector::{Connector, ProviderConnector};
pub use error::{ConnectorError, TransportError, ValueError};
pub use events::{
    EventHandler, EventSource, ListenerId, ListenerRegistry, ProviderEvent, RawListener,
    Subscription, WalletEvent,
};
pub use methods::{EthereumMethod, MethodResult, MethodSpec, SyncStatus};
pub use provider::{ConnectionStatus, Provider, ProviderState};
pub use request::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, RpcId, RpcParam};
pub use state::WalletWatcher;
pub use transport::RpcTransport;
pub use values::{Address, BlockHash, BlockId, BlockTag, HexInput, HexString};
