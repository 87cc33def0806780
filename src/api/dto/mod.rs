//! Data Transfer Objects for REST request/response serialization.
//!
//! Discord snowflakes are serialized as JSON strings; requests accept
//! strings or numbers.

pub mod chain_dto;
pub mod webhook_dto;

pub use chain_dto::*;
pub use webhook_dto::*;
