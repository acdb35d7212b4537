//! chainconnect-injected — wallet-injected providers for ChainConnect.
//!
//! # Features
//! - [`Eip1193Provider`]: the injected `request` / `on` / `removeListener` contract
//! - [`InjectedTransport`]: adapts an injected provider to the shared connector
//! - [`watch_injected_providers`]: EIP-6963 wallet discovery

pub mod discovery;
pub mod eip1193;

pub use discovery::{
    watch_injected_providers, AnnounceEvent, AnnounceListener, AnnouncedProviders, DiscoveryBus,
    ProviderDetail, ProviderInfo, ANNOUNCE_PROVIDER_EVENT, REQUEST_PROVIDER_EVENT,
};
pub use eip1193::{injected_connector, Eip1193Provider, InjectedTransport};
