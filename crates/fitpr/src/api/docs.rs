//! OpenAPI document

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(title = "FitPr API", description = "Trainer and client fitness management"),
    paths(super::system::root, super::system::health, super::auth::verify_pin),
    components(schemas(
        fitpr_api::ApiErrorResponse,
        fitpr_api::ErrorCode,
        fitpr_api::requests::VerifyPinRequest,
        fitpr_api::responses::ClientProfile,
        fitpr_api::responses::VerifyPinResponse,
        fitpr_api::responses::HealthResponse,
        fitpr_api::responses::ServiceInfo,
    )),
    tags(
        (name = "system", description = "Service status"),
        (name = "auth", description = "Client access"),
    )
)]
pub struct ApiDoc;
