//! Service info and health endpoints

use axum::{Json, extract::Request};
use fitpr_api::responses::{HealthResponse, ServiceInfo};

use crate::api::error::ApiFailure;

/// Service information
#[utoipa::path(
    get,
    path = "/",
    tag = "system",
    responses(
        (status = 200, description = "Service is running", body = ServiceInfo),
        (status = 429, description = "Rate limit exceeded", body = fitpr_api::ApiErrorResponse),
    )
)]
pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message: "FitPr API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "running".to_string(),
    })
}

/// Health check
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 429, description = "Rate limit exceeded", body = fitpr_api::ApiErrorResponse),
    )
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
    })
}

/// Fallback for unknown routes
pub async fn not_found(request: Request) -> ApiFailure {
    ApiFailure::not_found(format!("No route for {}", request.uri().path()))
}
