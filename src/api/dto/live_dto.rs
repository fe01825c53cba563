//! Status and live-channel control DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::common_dto::millis_to_utc;
use crate::domain::TableStatus;
use crate::store::ChannelScope;

/// Response body for `GET /status` and the live/snapshot control endpoints.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    /// A snapshot fetch is in flight.
    pub loading: bool,
    /// Message from the last failed fetch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// The push channel is open.
    pub live_connected: bool,
    /// Epoch milliseconds of the last successful snapshot merge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_snapshot_at: Option<i64>,
    /// Same instant as `last_snapshot_at`, ISO-8601.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_snapshot_time: Option<DateTime<Utc>>,
    /// Number of events in list order.
    pub event_count: usize,
    /// Scope of the held channel: `"all"`, an event id, or absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
}

impl StatusResponse {
    /// Builds the response from table flags and the held channel scope.
    #[must_use]
    pub fn new(status: TableStatus, scope: Option<ChannelScope>) -> Self {
        Self {
            loading: status.loading,
            error: status.error,
            live_connected: status.live_connected,
            last_snapshot_at: status.last_snapshot_at,
            last_snapshot_time: status.last_snapshot_at.and_then(millis_to_utc),
            event_count: status.event_count,
            channel: scope.map(|s| match s {
                ChannelScope::All => "all".to_string(),
                ChannelScope::Event(id) => id.to_string(),
            }),
        }
    }
}

/// Query parameters for `POST /live/connect`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ConnectParams {
    /// Scope the channel to one event; omit for the configured default.
    pub event_id: Option<i64>,
}
