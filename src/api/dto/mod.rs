//! Data Transfer Objects for REST request/response serialization.

pub mod events_dto;
pub mod webhook_dto;

pub use events_dto::*;
pub use webhook_dto::*;
