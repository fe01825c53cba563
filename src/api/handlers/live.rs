//! Status and lifecycle handlers: snapshot reload, live connect/disconnect.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{ConnectParams, StatusResponse};
use crate::app_state::AppState;
use crate::domain::EventId;
use crate::error::{ErrorResponse, FeedError};
use crate::store::ChannelScope;

fn current_status(state: &AppState) -> StatusResponse {
    StatusResponse::new(state.store.status(), state.store.channel_scope())
}

/// `GET /status`: Store flags.
#[utoipa::path(
    get,
    path = "/api/v1/status",
    tag = "Live",
    summary = "Store status",
    description = "Returns loading, error, liveConnected and lastSnapshotAt.",
    responses(
        (status = 200, description = "Current flags", body = StatusResponse),
    )
)]
pub async fn get_status(State(state): State<AppState>) -> impl IntoResponse {
    Json(current_status(&state))
}

/// `POST /snapshot/reload`: Fetch a fresh snapshot.
///
/// # Errors
///
/// Returns [`FeedError::Upstream`] if the snapshot fetch fails. The failure
/// is also recorded in the store's `error` flag.
#[utoipa::path(
    post,
    path = "/api/v1/snapshot/reload",
    tag = "Live",
    summary = "Reload snapshot",
    responses(
        (status = 200, description = "Snapshot merged", body = StatusResponse),
        (status = 502, description = "Snapshot fetch failed", body = ErrorResponse),
    )
)]
pub async fn reload_snapshot(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, FeedError> {
    state.store.load_snapshot().await?;
    Ok(Json(current_status(&state)))
}

/// `POST /live/connect`: (Re)open the push channel.
///
/// # Errors
///
/// Returns [`FeedError::InvalidRequest`] if the query string does not parse.
#[utoipa::path(
    post,
    path = "/api/v1/live/connect",
    tag = "Live",
    summary = "Open live channel",
    description = "Tears down any open channel and opens a new one, globally or for one event.",
    params(ConnectParams),
    responses(
        (status = 202, description = "Channel opening", body = StatusResponse),
        (status = 400, description = "Malformed query", body = ErrorResponse),
    )
)]
pub async fn connect_live(
    State(state): State<AppState>,
    query: Result<Query<ConnectParams>, QueryRejection>,
) -> Result<impl IntoResponse, FeedError> {
    let Query(params) = query?;
    let scope = params
        .event_id
        .map_or(state.default_scope, |id| ChannelScope::Event(EventId::new(id)));
    state.store.connect(scope);
    Ok((axum::http::StatusCode::ACCEPTED, Json(current_status(&state))))
}

/// `POST /live/disconnect`: Close the push channel.
#[utoipa::path(
    post,
    path = "/api/v1/live/disconnect",
    tag = "Live",
    summary = "Close live channel",
    responses(
        (status = 200, description = "Channel closed", body = StatusResponse),
    )
)]
pub async fn disconnect_live(State(state): State<AppState>) -> impl IntoResponse {
    state.store.disconnect();
    Json(current_status(&state))
}

/// Status and lifecycle routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/status", get(get_status))
        .route("/snapshot/reload", post(reload_snapshot))
        .route("/live/connect", post(connect_live))
        .route("/live/disconnect", post(disconnect_live))
}
