//! Read API: route handlers, DTOs, OpenAPI document, and router composition.
//!
//! Resource endpoints are mounted under `/api/v1`; `/health` sits at the
//! root. All mutation of the table still goes through the store's named
//! operations.

pub mod dto;
pub mod handlers;

use axum::Router;
use utoipa::OpenApi;

use crate::app_state::AppState;

/// OpenAPI document for the read API.
#[derive(Debug, OpenApi)]
#[openapi(
    info(title = "live-odds", description = "Live odds cache read API"),
    paths(
        handlers::events::list_events,
        handlers::events::get_event,
        handlers::live::get_status,
        handlers::live::reload_snapshot,
        handlers::live::connect_live,
        handlers::live::disconnect_live,
        handlers::system::health_handler,
    ),
    components(schemas(
        dto::EventDto,
        dto::EventListResponse,
        dto::PaginationMeta,
        dto::StatusResponse,
        handlers::system::HealthResponse,
        crate::error::ErrorResponse,
        crate::error::ErrorBody,
    )),
    tags(
        (name = "Events", description = "Tracked events and their odds"),
        (name = "Live", description = "Store status and channel lifecycle"),
        (name = "System", description = "Service health"),
    )
)]
pub struct ApiDoc;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    let router = Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes());

    #[cfg(feature = "swagger-ui")]
    let router = router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    );

    router
}
