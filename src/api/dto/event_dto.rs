//! Event DTOs for list and detail endpoints.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::common_dto::{PaginationMeta, millis_to_utc};
use crate::domain::{Coeff, Event, EventId, EventStatus, Trend};

/// One event as served to UI layers.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventDto {
    /// Event identifier.
    pub id: EventId,
    /// Home side.
    pub team_a: String,
    /// Away side.
    pub team_b: String,
    /// Display score.
    pub score: String,
    /// Current coefficient.
    pub coeff: Coeff,
    /// Coefficient before the last push update.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev_coeff: Option<Coeff>,
    /// Direction of the last change.
    pub trend: Trend,
    /// Match status, if the feed sends one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<EventStatus>,
    /// Epoch milliseconds of the last mutation.
    pub last_updated: i64,
    /// Same instant as `last_updated`, ISO-8601.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated_at: Option<DateTime<Utc>>,
}

impl From<&Event> for EventDto {
    fn from(event: &Event) -> Self {
        Self {
            id: event.id,
            team_a: event.team_a.clone(),
            team_b: event.team_b.clone(),
            score: event.score.clone(),
            coeff: event.coeff,
            prev_coeff: event.prev_coeff,
            trend: event.trend(),
            status: event.status,
            last_updated: event.last_updated,
            last_updated_at: millis_to_utc(event.last_updated),
        }
    }
}

/// Response body for `GET /events`.
#[derive(Debug, Serialize, ToSchema)]
pub struct EventListResponse {
    /// Events in list order.
    pub data: Vec<EventDto>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}
