//! Feed configuration loaded from environment variables.
//!
//! All settings come from environment variables (or a `.env` file via
//! `dotenvy`); every key has a default.

use std::net::SocketAddr;
use std::time::Duration;

use crate::domain::{EventId, UpdateOrdering};
use crate::store::{ChannelScope, DEFAULT_CHANNEL_PATH, ReconnectPolicy, StoreOptions};

/// Top-level configuration.
///
/// Loaded once at startup via [`FeedConfig::from_env`].
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Socket address the read API binds to (e.g. `0.0.0.0:3000`).
    pub listen_addr: SocketAddr,

    /// Base URL of the snapshot endpoint (`/api/events` is appended).
    pub http_base: String,

    /// Base URL of the push channel (`ws://` or `wss://`).
    pub ws_base: String,

    /// Global channel path; per-event channels append `/{id}`.
    pub ws_path: String,

    /// When set, the live channel is scoped to this event only.
    pub event_id: Option<EventId>,

    /// Timeout for one snapshot request.
    pub fetch_timeout: Duration,

    /// Arrival-order or timestamp-guarded update merging.
    pub update_ordering: UpdateOrdering,

    /// Reconnect-on-drop policy.
    pub reconnect: ReconnectPolicy,

    /// Signals buffered between the socket task and the store.
    pub channel_buffer: usize,
}

impl FeedConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to defaults when a variable is not set. Calls
    /// `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR`, `FEED_EVENT_ID` or
    /// `FEED_UPDATE_ORDERING` is set but cannot be parsed.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let listen_addr: SocketAddr = std::env::var("LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
            .parse()?;

        let http_base = std::env::var("FEED_HTTP_BASE")
            .unwrap_or_else(|_| "http://localhost:8080".to_string());
        let ws_base =
            std::env::var("FEED_WS_BASE").unwrap_or_else(|_| "ws://localhost:8080".to_string());
        let ws_path =
            std::env::var("FEED_WS_PATH").unwrap_or_else(|_| DEFAULT_CHANNEL_PATH.to_string());

        let event_id = match std::env::var("FEED_EVENT_ID") {
            Ok(raw) if !raw.trim().is_empty() => Some(raw.parse::<EventId>()?),
            _ => None,
        };

        let fetch_timeout = Duration::from_secs(parse_env("FEED_FETCH_TIMEOUT_SECS", 10));

        let update_ordering = match std::env::var("FEED_UPDATE_ORDERING") {
            Ok(raw) => raw.parse::<UpdateOrdering>()?,
            Err(_) => UpdateOrdering::default(),
        };

        let reconnect = ReconnectPolicy {
            enabled: parse_env_bool("FEED_RECONNECT_ENABLED", false),
            base_delay: Duration::from_millis(parse_env("FEED_RECONNECT_BASE_MS", 500)),
            max_delay: Duration::from_millis(parse_env("FEED_RECONNECT_MAX_MS", 30_000)),
            max_attempts: parse_env("FEED_RECONNECT_MAX_ATTEMPTS", 10),
        };

        let channel_buffer = parse_env("FEED_CHANNEL_BUFFER", 1_024);

        Ok(Self {
            listen_addr,
            http_base,
            ws_base,
            ws_path,
            event_id,
            fetch_timeout,
            update_ordering,
            reconnect,
            channel_buffer,
        })
    }

    /// Store options derived from this configuration.
    #[must_use]
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            ordering: self.update_ordering,
            reconnect: self.reconnect,
            channel_path: self.ws_path.clone(),
        }
    }

    /// Channel scope derived from `event_id`.
    #[must_use]
    pub fn channel_scope(&self) -> ChannelScope {
        ChannelScope::from(self.event_id)
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Parses an environment variable as a boolean. Accepts `"true"`, `"1"`,
/// `"false"`, `"0"` (case-insensitive). Returns `default` otherwise.
fn parse_env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key)
        .ok()
        .map(|v| v.trim().to_ascii_lowercase())
        .as_deref()
    {
        Some("true") | Some("1") => true,
        Some("false") | Some("0") => false,
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_use_defaults() {
        assert_eq!(parse_env("LIVE_ODDS_TEST_UNSET_NUMBER", 42u32), 42);
        assert!(parse_env_bool("LIVE_ODDS_TEST_UNSET_BOOL", true));
    }

    #[test]
    fn scope_follows_event_id() {
        let Ok(listen_addr) = "127.0.0.1:0".parse() else {
            return;
        };
        let mut config = FeedConfig {
            listen_addr,
            http_base: "http://x".to_string(),
            ws_base: "ws://x".to_string(),
            ws_path: "/live".to_string(),
            event_id: None,
            fetch_timeout: Duration::from_secs(1),
            update_ordering: UpdateOrdering::Timestamp,
            reconnect: ReconnectPolicy::disabled(),
            channel_buffer: 4,
        };
        assert_eq!(config.channel_scope(), ChannelScope::All);
        config.event_id = Some(EventId::new(9));
        assert_eq!(config.channel_scope(), ChannelScope::Event(EventId::new(9)));

        let options = config.store_options();
        assert_eq!(options.channel_path, "/live");
        assert_eq!(options.ordering, UpdateOrdering::Timestamp);
    }
}
