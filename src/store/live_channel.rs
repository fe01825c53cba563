//! Live channel handle, addressing, and the signal pump.
//!
//! The store owns at most one [`LiveChannel`]. Every channel gets a fresh
//! [`ChannelId`]; signals are tagged with it so that a late `Closed` from
//! a torn-down channel cannot touch its successor.

use std::fmt;
use std::sync::Weak;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use super::event_store::{EventStore, StoreInner};
use crate::domain::EventId;
use crate::transport::ChannelSignal;

/// Default global channel path.
pub const DEFAULT_CHANNEL_PATH: &str = "/ws/events";

/// What a channel is subscribed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelScope {
    /// Every event.
    #[default]
    All,
    /// A single event.
    Event(EventId),
}

impl ChannelScope {
    /// Channel path under `base`: `base` itself, or `base/{id}`.
    #[must_use]
    pub fn path(self, base: &str) -> String {
        let base = base.trim_end_matches('/');
        match self {
            Self::All => base.to_string(),
            Self::Event(id) => format!("{base}/{id}"),
        }
    }
}

impl From<Option<EventId>> for ChannelScope {
    fn from(id: Option<EventId>) -> Self {
        id.map_or(Self::All, Self::Event)
    }
}

/// Identity of one opened channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelId(uuid::Uuid);

impl ChannelId {
    /// Creates a new random `ChannelId` (UUID v4).
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for ChannelId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The store's handle to its open channel.
#[derive(Debug)]
pub(crate) struct LiveChannel {
    pub(crate) id: ChannelId,
    pub(crate) scope: ChannelScope,
    close: oneshot::Sender<()>,
    pump: JoinHandle<()>,
}

impl LiveChannel {
    /// Starts pumping `signals` into the store and returns the handle.
    pub(crate) fn start(
        store: Weak<StoreInner>,
        scope: ChannelScope,
        signals: mpsc::Receiver<ChannelSignal>,
        close: oneshot::Sender<()>,
    ) -> Self {
        let id = ChannelId::new();
        let pump = tokio::spawn(pump_signals(store, id, signals));
        Self {
            id,
            scope,
            close,
            pump,
        }
    }

    /// Asks the transport to close and stops delivering signals.
    pub(crate) fn teardown(self) {
        let _ = self.close.send(());
        self.pump.abort();
    }
}

/// Forwards a channel's signals to the store until it closes.
///
/// A stream that ends without `Closed` is treated as closed.
async fn pump_signals(
    store: Weak<StoreInner>,
    id: ChannelId,
    mut signals: mpsc::Receiver<ChannelSignal>,
) {
    while let Some(signal) = signals.recv().await {
        let Some(inner) = store.upgrade() else {
            return;
        };
        let closed = signal == ChannelSignal::Closed;
        EventStore::from_inner(inner).handle_signal(id, signal);
        if closed {
            return;
        }
    }
    if let Some(inner) = store.upgrade() {
        EventStore::from_inner(inner).handle_signal(id, ChannelSignal::Closed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_scope_uses_base_path() {
        assert_eq!(ChannelScope::All.path("/ws/events/"), "/ws/events");
    }

    #[test]
    fn event_scope_appends_id() {
        let scope = ChannelScope::from(Some(EventId::new(7)));
        assert_eq!(scope.path(DEFAULT_CHANNEL_PATH), "/ws/events/7");
    }

    #[test]
    fn channel_ids_are_unique() {
        assert_ne!(ChannelId::new(), ChannelId::new());
    }
}
