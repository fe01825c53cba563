//! Error types for the snapshot transport and the read API.
//!
//! [`FetchError`] is what a snapshot transport returns; the store absorbs it
//! into its `error` flag. [`FeedError`] is the read API's error type and
//! maps each variant to an HTTP status and a structured JSON body.

use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::EventId;

/// Message stored when a fetch failure carries no text of its own.
pub const GENERIC_FETCH_ERROR: &str = "failed to load events";

/// Failure of the snapshot transport.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// Request never produced a response (DNS, connect, timeout...).
    #[error("{0}")]
    Transport(String),

    /// Server answered with a non-success status.
    #[error("snapshot request failed with status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },

    /// Response body was not a list of event records.
    #[error("invalid snapshot body: {0}")]
    Decode(String),
}

impl FetchError {
    /// Human-readable message for the table's `error` flag.
    ///
    /// Falls back to [`GENERIC_FETCH_ERROR`] when the failure's own text is
    /// blank.
    #[must_use]
    pub fn user_message(&self) -> String {
        let text = self.to_string();
        if text.trim().is_empty() {
            GENERIC_FETCH_ERROR.to_string()
        } else {
            text
        }
    }
}

/// Structured JSON error response body.
///
/// ```json
/// { "error": { "code": 2001, "message": "event not found: 7" } }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Read API error with HTTP status code mapping.
///
/// | Range     | Category  | HTTP Status |
/// |-----------|-----------|-------------|
/// | 1000–1999 | Validation | 400 |
/// | 2000–2999 | Not Found  | 404 |
/// | 3000–3999 | Server     | 502 |
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// Event with the given id is not in the table.
    #[error("event not found: {0}")]
    EventNotFound(EventId),

    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Snapshot reload failed upstream.
    #[error("snapshot fetch failed: {0}")]
    Upstream(#[from] FetchError),
}

impl FeedError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::EventNotFound(_) => 2001,
            Self::Upstream(_) => 3002,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::EventNotFound(_) => StatusCode::NOT_FOUND,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<QueryRejection> for FeedError {
    fn from(rejection: QueryRejection) -> Self {
        Self::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for FeedError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
