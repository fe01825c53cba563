//! Shared application state injected into all Axum handlers.

use crate::store::{ChannelScope, EventStore};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The event store every handler reads from.
    pub store: EventStore,
    /// Scope used by `POST /live/connect` when the request names none.
    pub default_scope: ChannelScope,
}
