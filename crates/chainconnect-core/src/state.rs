//! Wallet address watcher.
//!
//! Tracks the connected addresses of whichever connector is currently
//! selected and publishes them through a `tokio::sync::watch` channel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::watch;

use crate::connector::ProviderConnector;
use crate::events::{EventHandler, Subscription};
use crate::methods::{EthereumMethod, MethodResult};
use crate::values::{address_list_from_value, Address};

pub struct WalletWatcher {
    addresses: Arc<watch::Sender<Vec<Address>>>,
    connector: Option<Arc<dyn ProviderConnector>>,
    subscription: Option<Subscription>,
}

impl Default for WalletWatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl WalletWatcher {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Vec::new());
        Self {
            addresses: Arc::new(tx),
            connector: None,
            subscription: None,
        }
    }

    /// Swap the watched connector.
    ///
    /// The previous connector's subscription is dropped and the address
    /// list reset. A new connector is queried with `eth_accounts` and
    /// followed through its `connectedAccounts` events.
    pub async fn set_connector(&mut self, connector: Option<Arc<dyn ProviderConnector>>) {
        if let Some(previous) = self.subscription.take() {
            previous.unsubscribe();
        }
        self.addresses.send_replace(Vec::new());
        self.connector = connector.clone();

        let Some(connector) = connector else {
            return;
        };

        let sink = self.addresses.clone();
        let event_seen = Arc::new(AtomicBool::new(false));
        let seen = event_seen.clone();
        match connector.subscribe(EventHandler::connected_accounts(move |accounts| {
            seen.store(true, Ordering::SeqCst);
            sink.send_replace(accounts);
        })) {
            Ok(sub) => self.subscription = Some(sub),
            Err(e) => tracing::warn!(error = %e, "account changes will not be tracked"),
        }

        let accounts = match connector
            .request(EthereumMethod::Accounts.as_str(), vec![])
            .await
        {
            Ok(MethodResult::Addresses(list)) => list,
            Ok(MethodResult::Raw(value)) => address_list_from_value(&value).unwrap_or_default(),
            Ok(_) => Vec::new(),
            Err(e) => {
                tracing::debug!(error = %e, "eth_accounts failed, assuming no accounts");
                Vec::new()
            }
        };
        // An event delivered while eth_accounts was in flight is newer.
        let mut fetched = Some(accounts);
        self.addresses.send_if_modified(|current| match fetched.take() {
            Some(list) if !event_seen.load(Ordering::SeqCst) => {
                *current = list;
                true
            }
            _ => false,
        });
    }

    pub fn connector(&self) -> Option<&Arc<dyn ProviderConnector>> {
        self.connector.as_ref()
    }

    /// The current address list.
    pub fn addresses(&self) -> Vec<Address> {
        self.addresses.borrow().clone()
    }

    /// A receiver that observes every change to the address list.
    pub fn subscribe(&self) -> watch::Receiver<Vec<Address>> {
        self.addresses.subscribe()
    }
}
