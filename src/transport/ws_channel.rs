//! Push channel over WebSocket.
//!
//! Each [`WsChannelTransport::open`] spawns one task that owns the socket
//! and translates its lifecycle into [`ChannelSignal`]s. The task ends,
//! always emitting a final `Closed`, when the remote closes, the socket
//! fails, or the store fires/drops the close handle.

use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use super::{ChannelConnection, ChannelEnds, ChannelSignal, ChannelTransport};

/// Opens channels at `{base_url}{path}`.
#[derive(Debug, Clone)]
pub struct WsChannelTransport {
    base_url: String,
    buffer: usize,
}

impl WsChannelTransport {
    /// Creates a transport for the feed at `base_url` (`ws://` or `wss://`).
    ///
    /// `buffer` bounds the signals queued between the socket task and the
    /// store.
    #[must_use]
    pub fn new(base_url: &str, buffer: usize) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            buffer,
        }
    }

    /// URL a channel at `path` connects to.
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

impl ChannelTransport for WsChannelTransport {
    fn open(&self, path: &str) -> ChannelConnection {
        let (connection, ends) = ChannelConnection::pair(self.buffer);
        let url = self.url_for(path);
        tokio::spawn(run_socket(url, ends));
        connection
    }
}

async fn run_socket(url: String, ends: ChannelEnds) {
    let ChannelEnds { signals, mut close } = ends;

    tracing::debug!(%url, "opening push channel");
    let stream = tokio::select! {
        _ = &mut close => {
            let _ = signals.send(ChannelSignal::Closed).await;
            return;
        }
        result = connect_async(url.as_str()) => match result {
            Ok((stream, _)) => stream,
            Err(e) => {
                let _ = signals.send(ChannelSignal::Error(e.to_string())).await;
                let _ = signals.send(ChannelSignal::Closed).await;
                return;
            }
        }
    };

    if signals.send(ChannelSignal::Opened).await.is_err() {
        return;
    }

    let (mut ws_tx, mut ws_rx) = stream.split();
    loop {
        tokio::select! {
            _ = &mut close => {
                let _ = ws_tx.send(Message::Close(None)).await;
                break;
            }
            msg = ws_rx.next() => {
                let text = match msg {
                    Some(Ok(Message::Text(text))) => text.as_str().to_owned(),
                    Some(Ok(Message::Binary(bytes))) => match String::from_utf8(bytes.to_vec()) {
                        Ok(text) => text,
                        Err(_) => {
                            tracing::debug!("dropping non-utf8 binary frame");
                            continue;
                        }
                    },
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        let _ = signals.send(ChannelSignal::Error(e.to_string())).await;
                        break;
                    }
                };
                if signals.send(ChannelSignal::Message(text)).await.is_err() {
                    break;
                }
            }
        }
    }

    let _ = signals.send(ChannelSignal::Closed).await;
    tracing::debug!(%url, "push channel task finished");
}
