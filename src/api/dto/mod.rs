//! Data Transfer Objects for the read API.
//!
//! Field names are camelCase to match the upstream feed's wire format.

pub mod common_dto;
pub mod event_dto;
pub mod live_dto;

pub use common_dto::*;
pub use event_dto::*;
pub use live_dto::*;
