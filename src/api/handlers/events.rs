//! Event read handlers: list and detail.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{EventDto, EventListResponse, PaginationParams};
use crate::app_state::AppState;
use crate::domain::EventId;
use crate::error::{ErrorResponse, FeedError};

/// `GET /events`: Events in list order, paginated.
///
/// # Errors
///
/// Returns [`FeedError::InvalidRequest`] if the pagination query does not
/// parse.
#[utoipa::path(
    get,
    path = "/api/v1/events",
    tag = "Events",
    summary = "List events",
    description = "Returns tracked events in the order established by the last snapshot, followed by events first seen through upserts.",
    params(PaginationParams),
    responses(
        (status = 200, description = "Paginated event list", body = EventListResponse),
        (status = 400, description = "Malformed pagination query", body = ErrorResponse),
    )
)]
pub async fn list_events(
    State(state): State<AppState>,
    query: Result<Query<PaginationParams>, QueryRejection>,
) -> Result<impl IntoResponse, FeedError> {
    let Query(params) = query?;
    let params = params.clamped();
    let (data, total) = state.store.read(|table| {
        let data: Vec<EventDto> = table
            .list()
            .skip(params.offset())
            .take(params.per_page as usize)
            .map(EventDto::from)
            .collect();
        (data, table.len())
    });

    Ok(Json(EventListResponse {
        data,
        pagination: params.meta(total),
    }))
}

/// `GET /events/{id}`: One event.
///
/// # Errors
///
/// Returns [`FeedError::EventNotFound`] if the id is not in the table.
#[utoipa::path(
    get,
    path = "/api/v1/events/{id}",
    tag = "Events",
    summary = "Get event",
    params(("id" = i64, Path, description = "Event identifier")),
    responses(
        (status = 200, description = "Event detail", body = EventDto),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, FeedError> {
    let id = EventId::new(id);
    let event = state
        .store
        .read(|table| table.by_id(id).map(EventDto::from))
        .ok_or(FeedError::EventNotFound(id))?;
    Ok(Json(event))
}

/// Event routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/events", get(list_events))
        .route("/events/{id}", get(get_event))
}
