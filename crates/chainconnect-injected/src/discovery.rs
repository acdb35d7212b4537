//! EIP-6963 multi-wallet discovery.
//!
//! The host event system is abstracted as a [`DiscoveryBus`]. Announcements
//! come from untrusted, independent emitters: malformed ones are dropped,
//! and the same wallet may announce itself any number of times.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;
use uuid::Uuid;

use chainconnect_core::connector::Connector;

use crate::eip1193::{Eip1193Provider, InjectedTransport};

/// Event a wallet dispatches to announce itself.
pub const ANNOUNCE_PROVIDER_EVENT: &str = "eip6963:announceProvider";
/// Event broadcast to ask wallets to announce themselves.
pub const REQUEST_PROVIDER_EVENT: &str = "eip6963:requestProvider";

/// Wallet metadata carried in an announcement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderInfo {
    pub uuid: Uuid,
    pub name: String,
    /// Data URI, e.g. `data:image/svg+xml;base64,...`
    pub icon: String,
    /// Reverse-DNS identifier, e.g. `io.metamask`
    pub rdns: String,
}

impl ProviderInfo {
    pub fn from_value(value: &Value) -> Result<Self, String> {
        let info: Self = serde_json::from_value(value.clone()).map_err(|e| e.to_string())?;
        if !info.icon.starts_with("data:") {
            return Err(format!("icon for {} is not a data URI", info.name));
        }
        Ok(info)
    }
}

/// Raw announcement payload (`event.detail`), not yet validated.
#[derive(Clone)]
pub struct AnnounceEvent {
    pub info: Value,
    pub provider: Arc<dyn Eip1193Provider>,
}

/// A validated announcement.
#[derive(Clone)]
pub struct ProviderDetail {
    pub info: ProviderInfo,
    pub provider: Arc<dyn Eip1193Provider>,
}

impl ProviderDetail {
    /// Build a validating connector over this wallet.
    pub fn connector(&self) -> Connector {
        Connector::new(Arc::new(InjectedTransport::new(
            self.info.name.clone(),
            self.provider.clone(),
        )))
    }
}

impl fmt::Debug for ProviderDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderDetail")
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}

pub type AnnounceListener = Box<dyn Fn(AnnounceEvent) + Send + Sync>;

/// The host's event system.
pub trait DiscoveryBus: Send + Sync {
    /// Listen for `eip6963:announceProvider` events.
    fn add_announce_listener(&self, listener: AnnounceListener);

    /// Dispatch `eip6963:requestProvider`.
    fn request_providers(&self);
}

/// Start listening for announcements, then ask wallets to announce.
///
/// Every valid announcement is forwarded on the returned channel for as
/// long as the bus keeps the listener alive. No wallet is selected here.
pub fn watch_injected_providers(bus: &dyn DiscoveryBus) -> mpsc::UnboundedReceiver<ProviderDetail> {
    let (tx, rx) = mpsc::unbounded_channel();
    bus.add_announce_listener(Box::new(move |event: AnnounceEvent| {
        match ProviderInfo::from_value(&event.info) {
            Ok(info) => {
                tracing::debug!(name = %info.name, rdns = %info.rdns, "wallet announced");
                let _ = tx.send(ProviderDetail {
                    info,
                    provider: event.provider,
                });
            }
            Err(reason) => tracing::debug!(%reason, "dropping malformed announcement"),
        }
    }));
    bus.request_providers();
    rx
}

/// Announced wallets keyed by uuid, in first-seen order.
///
/// A re-announcement replaces the stored entry.
#[derive(Debug, Default)]
pub struct AnnouncedProviders {
    order: Vec<Uuid>,
    by_uuid: HashMap<Uuid, ProviderDetail>,
}

impl AnnouncedProviders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if this uuid had not been seen before.
    pub fn insert(&mut self, detail: ProviderDetail) -> bool {
        let uuid = detail.info.uuid;
        let fresh = self.by_uuid.insert(uuid, detail).is_none();
        if fresh {
            self.order.push(uuid);
        }
        fresh
    }

    pub fn get(&self, uuid: &Uuid) -> Option<&ProviderDetail> {
        self.by_uuid.get(uuid)
    }

    pub fn find_by_rdns(&self, rdns: &str) -> Option<&ProviderDetail> {
        self.iter().find(|d| d.info.rdns == rdns)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProviderDetail> {
        self.order.iter().filter_map(|uuid| self.by_uuid.get(uuid))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn info(uuid: &str, icon: &str) -> Value {
        json!({"uuid": uuid, "name": "Test Wallet", "icon": icon, "rdns": "com.example.wallet"})
    }

    #[test]
    fn info_requires_uuid_and_data_icon() {
        let good = info("350670db-19fa-4704-a166-e52e178b59d2", "data:image/png;base64,AAAA");
        assert_eq!(ProviderInfo::from_value(&good).unwrap().rdns, "com.example.wallet");

        let bad_uuid = info("wallet-1", "data:image/png;base64,AAAA");
        assert!(ProviderInfo::from_value(&bad_uuid).is_err());

        let bad_icon = info("350670db-19fa-4704-a166-e52e178b59d2", "https://example.com/i.png");
        assert!(ProviderInfo::from_value(&bad_icon).is_err());

        assert!(ProviderInfo::from_value(&json!({"name": "x"})).is_err());
    }
}
