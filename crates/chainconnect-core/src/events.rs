//! Event plumbing between wallet transports and connector subscriptions.
//!
//! Wallet-level events are raw JSON payloads keyed by EIP-1193 event name.
//! [`EventHandler`] is the typed, validated form a caller subscribes with.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use alloy_primitives::U256;
use serde_json::Value;

use crate::values::Address;

/// EIP-1193 event names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WalletEvent {
    Connect,
    Disconnect,
    ChainChanged,
    AccountsChanged,
    Message,
}

impl WalletEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::Disconnect => "disconnect",
            Self::ChainChanged => "chainChanged",
            Self::AccountsChanged => "accountsChanged",
            Self::Message => "message",
        }
    }
}

impl fmt::Display for WalletEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Listener for a raw wallet event payload.
pub type RawListener = Arc<dyn Fn(&Value) + Send + Sync>;

/// Handle returned by [`EventSource::on`], used to remove the listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Anything that can deliver wallet events.
pub trait EventSource: Send + Sync {
    fn on(&self, event: WalletEvent, listener: RawListener) -> ListenerId;

    fn remove_listener(&self, event: WalletEvent, id: ListenerId);
}

type ListenerMap = HashMap<WalletEvent, Vec<(ListenerId, RawListener)>>;

/// Observer registry with synchronous notify.
///
/// In-process wallets embed one of these to back `on` / `removeListener`.
#[derive(Clone, Default)]
pub struct ListenerRegistry {
    next_id: Arc<AtomicU64>,
    listeners: Arc<Mutex<ListenerMap>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A listener that panicked must not silently disable the registry.
    fn map(&self) -> MutexGuard<'_, ListenerMap> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Invoke every listener registered for `event`.
    pub fn emit(&self, event: WalletEvent, payload: &Value) {
        // Snapshot so listeners may unsubscribe from inside the callback.
        let targets: Vec<RawListener> = self
            .map()
            .get(&event)
            .map(|list| list.iter().map(|(_, l)| l.clone()).collect())
            .unwrap_or_default();
        for listener in targets {
            listener(payload);
        }
    }

    /// Number of listeners registered for `event`.
    pub fn len(&self, event: WalletEvent) -> usize {
        self.map().get(&event).map_or(0, Vec::len)
    }

    pub fn is_empty(&self, event: WalletEvent) -> bool {
        self.len(event) == 0
    }
}

impl EventSource for ListenerRegistry {
    fn on(&self, event: WalletEvent, listener: RawListener) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.map().entry(event).or_default().push((id, listener));
        id
    }

    fn remove_listener(&self, event: WalletEvent, id: ListenerId) {
        if let Some(list) = self.map().get_mut(&event) {
            list.retain(|(existing, _)| *existing != id);
        }
    }
}

/// Provider-level events a caller may subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderEvent {
    ConnectedAccounts,
    BlockNumber,
}

impl fmt::Display for ProviderEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ConnectedAccounts => "connectedAccounts",
            Self::BlockNumber => "blockNumber",
        })
    }
}

/// A provider event paired with its typed callback.
#[derive(Clone)]
pub enum EventHandler {
    ConnectedAccounts(Arc<dyn Fn(Vec<Address>) + Send + Sync>),
    BlockNumber(Arc<dyn Fn(U256) + Send + Sync>),
}

impl EventHandler {
    pub fn connected_accounts(f: impl Fn(Vec<Address>) + Send + Sync + 'static) -> Self {
        Self::ConnectedAccounts(Arc::new(f))
    }

    pub fn block_number(f: impl Fn(U256) + Send + Sync + 'static) -> Self {
        Self::BlockNumber(Arc::new(f))
    }

    pub fn event(&self) -> ProviderEvent {
        match self {
            Self::ConnectedAccounts(_) => ProviderEvent::ConnectedAccounts,
            Self::BlockNumber(_) => ProviderEvent::BlockNumber,
        }
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EventHandler").field(&self.event()).finish()
    }
}

/// An active subscription. Call [`Subscription::unsubscribe`] to detach it.
pub struct Subscription {
    event: ProviderEvent,
    detach: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(event: ProviderEvent, detach: impl FnOnce() + Send + 'static) -> Self {
        Self {
            event,
            detach: Some(Box::new(detach)),
        }
    }

    pub fn event(&self) -> ProviderEvent {
        self.event
    }

    pub fn unsubscribe(mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("event", &self.event)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn emit_reaches_registered_listeners_only() {
        let registry = ListenerRegistry::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let id = registry.on(
            WalletEvent::AccountsChanged,
            Arc::new(move |_: &Value| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        registry.emit(WalletEvent::AccountsChanged, &Value::Null);
        registry.emit(WalletEvent::ChainChanged, &Value::Null);
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        registry.remove_listener(WalletEvent::AccountsChanged, id);
        registry.emit(WalletEvent::AccountsChanged, &Value::Null);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(registry.is_empty(WalletEvent::AccountsChanged));
    }

    #[test]
    fn listener_may_remove_itself() {
        let registry = ListenerRegistry::new();
        let inner = registry.clone();
        let slot: Arc<Mutex<Option<ListenerId>>> = Arc::default();
        let own_id = slot.clone();
        let id = registry.on(
            WalletEvent::Message,
            Arc::new(move |_: &Value| {
                if let Some(id) = *own_id.lock().unwrap() {
                    inner.remove_listener(WalletEvent::Message, id);
                }
            }),
        );
        *slot.lock().unwrap() = Some(id);

        registry.emit(WalletEvent::Message, &Value::Null);
        assert_eq!(registry.len(WalletEvent::Message), 0);
    }

    #[test]
    fn poisoned_registry_keeps_accepting_listeners() {
        let registry = ListenerRegistry::new();
        let shared = registry.clone();
        let _ = std::thread::spawn(move || {
            let _guard = shared.listeners.lock().unwrap();
            panic!("listener panicked while holding the map");
        })
        .join();
        assert!(registry.listeners.is_poisoned());

        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let id = registry.on(
            WalletEvent::ChainChanged,
            Arc::new(move |_: &Value| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );
        registry.emit(WalletEvent::ChainChanged, &Value::Null);
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        registry.remove_listener(WalletEvent::ChainChanged, id);
        assert!(registry.is_empty(WalletEvent::ChainChanged));
    }

    #[test]
    fn subscription_detaches_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let sub = Subscription::new(ProviderEvent::ConnectedAccounts, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(sub.event(), ProviderEvent::ConnectedAccounts);
        sub.unsubscribe();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
