//! # live-odds
//!
//! Client-side, continuously updated view of live sporting events and their
//! betting coefficients.
//!
//! The crate reconciles a bulk snapshot (fetched over HTTP) with a stream of
//! incremental push updates (delivered over a WebSocket), tolerating socket
//! drops, duplicate or out-of-order messages, and partial payloads.
//!
//! ## Architecture
//!
//! ```text
//! UI layers (read API, embedding code)
//!     │  list / by_id / status
//!     │
//!     ├── EventStore (store/)
//!     │     ├── EventTable merge engine (domain/)
//!     │     └── LiveChannel + ReconnectPolicy
//!     │
//!     └── Transport adapters (transport/)
//!           ├── HttpSnapshotSource  (reqwest)
//!           └── WsChannelTransport  (tokio-tungstenite)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod store;
pub mod transport;
