//! PIN-based client access

use std::sync::Arc;

use axum::{Json, extract::State};
use chrono::Utc;
use fitpr_api::{
    requests::VerifyPinRequest,
    responses::{ClientProfile, VerifyPinResponse},
};
use tracing::info;

use crate::api::{ApiFailure, ValidJson};
use crate::state::AppState;

/// Verify a client's PIN
///
/// # Errors
/// Returns `ApiFailure` for malformed input, unknown or inactive clients and
/// wrong PINs
#[utoipa::path(
    post,
    path = "/api/v1/auth/pin",
    tag = "auth",
    request_body = VerifyPinRequest,
    responses(
        (status = 200, description = "PIN accepted", body = VerifyPinResponse),
        (status = 400, description = "Malformed client id or PIN", body = fitpr_api::ApiErrorResponse),
        (status = 401, description = "Incorrect PIN", body = fitpr_api::ApiErrorResponse),
        (status = 403, description = "Client access disabled", body = fitpr_api::ApiErrorResponse),
        (status = 404, description = "Unknown client", body = fitpr_api::ApiErrorResponse),
        (status = 429, description = "Too many attempts", body = fitpr_api::ApiErrorResponse),
    )
)]
pub async fn verify_pin(
    State(state): State<Arc<AppState>>,
    ValidJson(request): ValidJson<VerifyPinRequest>,
) -> Result<Json<VerifyPinResponse>, ApiFailure> {
    let client = state.directory.verify(&request.client_id, &request.pin)?;
    info!(client_id = %client.id, "client signed in with PIN");

    Ok(Json(VerifyPinResponse {
        client: ClientProfile::from(client),
        verified_at: Utc::now(),
    }))
}
