//! Store layer: the event store and its live-channel lifecycle.
//!
//! [`EventStore`] owns the [`crate::domain::EventTable`], the single live
//! channel handle, and the optional reconnect policy. Mutations arrive from
//! three triggers: a completed snapshot fetch, an inbound channel signal,
//! or a direct call.

pub mod event_store;
pub mod live_channel;
pub mod reconnect;

pub use event_store::{EventStore, StoreOptions};
pub use live_channel::{ChannelId, ChannelScope, DEFAULT_CHANNEL_PATH};
pub use reconnect::ReconnectPolicy;
