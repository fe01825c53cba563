//! Transport adapter contracts and their production implementations.
//!
//! The store depends only on these traits: [`SnapshotSource`] (request →
//! list of records) and [`ChannelTransport`] (path → stream of
//! [`ChannelSignal`]s). Tests inject fakes; the binary wires in
//! [`HttpSnapshotSource`] and [`WsChannelTransport`].

pub mod http_snapshot;
pub mod ws_channel;

use std::fmt::Debug;

use futures_util::future::BoxFuture;
use tokio::sync::{mpsc, oneshot};

use crate::domain::ApiEvent;
use crate::error::FetchError;

pub use http_snapshot::HttpSnapshotSource;
pub use ws_channel::WsChannelTransport;

/// Bulk snapshot loader.
pub trait SnapshotSource: Debug + Send + Sync {
    /// Fetches the full list of event records.
    fn fetch_events(&self) -> BoxFuture<'_, Result<Vec<ApiEvent>, FetchError>>;
}

/// Lifecycle signal emitted by an open push channel, in delivery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelSignal {
    /// Socket handshake completed.
    Opened,
    /// A text frame arrived.
    Message(String),
    /// Transport-level failure. May be followed by [`ChannelSignal::Closed`].
    Error(String),
    /// Socket closed, locally or remotely. Last signal of a channel.
    Closed,
}

/// Handle to one push channel returned by [`ChannelTransport::open`].
#[derive(Debug)]
pub struct ChannelConnection {
    /// Signals in the order the transport delivers them.
    pub signals: mpsc::Receiver<ChannelSignal>,
    /// Fire (or drop) to ask the transport to close the socket.
    pub close: oneshot::Sender<()>,
}

impl ChannelConnection {
    /// Creates a connection pair: the store-facing handle and the
    /// transport-facing ends.
    #[must_use]
    pub fn pair(buffer: usize) -> (Self, ChannelEnds) {
        let (signal_tx, signals) = mpsc::channel(buffer.max(1));
        let (close, close_rx) = oneshot::channel();
        (
            Self { signals, close },
            ChannelEnds {
                signals: signal_tx,
                close: close_rx,
            },
        )
    }
}

/// Transport-side ends of a [`ChannelConnection`].
#[derive(Debug)]
pub struct ChannelEnds {
    /// Where the transport pushes signals.
    pub signals: mpsc::Sender<ChannelSignal>,
    /// Resolves when the store asks for the socket to close.
    pub close: oneshot::Receiver<()>,
}

/// Opens push channels.
///
/// `open` must not block: it returns immediately and reports progress
/// through [`ChannelSignal`]s, starting with `Opened` or `Error`.
pub trait ChannelTransport: Debug + Send + Sync {
    /// Opens a channel at `path` (e.g. `/ws/events` or `/ws/events/7`).
    fn open(&self, path: &str) -> ChannelConnection;
}
