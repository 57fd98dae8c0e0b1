//! API route handlers

pub mod auth;
pub mod docs;
pub mod error;
pub mod system;

use axum::extract::FromRequest;

pub use error::ApiFailure;

/// JSON body whose rejections are reported as validation failures
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiFailure))]
pub struct ValidJson<T>(pub T);
