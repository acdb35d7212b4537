//! chainconnect-http — HTTP JSON-RPC transport for ChainConnect.
//!
//! # Quick start
//! ```rust,no_run
//! use chainconnect_core::ProviderConnector;
//! use chainconnect_http::http_connector;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let connector = http_connector("https://cloudflare-eth.com")?;
//! let chain_id = connector.request("eth_chainId", vec![]).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;

pub use client::{http_connector, HttpTransport, HttpTransportConfig};
