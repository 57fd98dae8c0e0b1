//! fitpr-api: Shared API types and schemas
//!
//! Contains the error response shape, request/response payloads and OpenAPI
//! schema definitions used by the daemon, the client library and the CLI.

pub mod errors;
pub mod requests;
pub mod responses;

pub use errors::{ApiErrorResponse, ErrorCode};
