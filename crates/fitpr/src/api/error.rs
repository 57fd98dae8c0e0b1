//! Handler error plumbing
//!
//! Handlers fail with [`ApiFailure`]. Its response only carries the
//! unclassified error; the [`map_errors`] middleware classifies it with the
//! configured mapper and the request id, so every failure leaves the service
//! as an [`ApiErrorResponse`].

use std::any::Any;
use std::sync::Arc;

use axum::{
    Json,
    extract::{Request, State, rejection::JsonRejection},
    http::{HeaderValue, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use fitpr_api::{ApiErrorResponse, ErrorCode};
use fitpr_core::{AppError, CaughtError, FieldIssue};

use crate::middleware::RequestId;
use crate::state::AppState;

/// A failure raised inside a handler
#[derive(Debug)]
pub struct ApiFailure(pub CaughtError);

/// Error awaiting classification, carried in response extensions
#[derive(Clone)]
struct Unmapped(Arc<CaughtError>);

impl ApiFailure {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self(AppError::not_found(message).into())
    }
}

impl From<AppError> for ApiFailure {
    fn from(error: AppError) -> Self {
        Self(error.into())
    }
}

impl From<CaughtError> for ApiFailure {
    fn from(error: CaughtError) -> Self {
        Self(error)
    }
}

impl From<JsonRejection> for ApiFailure {
    fn from(rejection: JsonRejection) -> Self {
        let kind = match &rejection {
            JsonRejection::JsonDataError(_) => "invalid_data",
            JsonRejection::JsonSyntaxError(_) => "json_syntax",
            JsonRejection::MissingJsonContentType(_) => "content_type",
            JsonRejection::BytesRejection(_) => "body",
            _ => "json",
        };
        Self(CaughtError::Schema(vec![FieldIssue::new(
            "body",
            rejection.body_text(),
            kind,
        )]))
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.kind().code().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = status.into_response();
        response.extensions_mut().insert(Unmapped(Arc::new(self.0)));
        response
    }
}

/// Panic handler for `CatchPanicLayer`
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    ApiFailure(CaughtError::from_panic(payload)).into_response()
}

/// Classify handler failures into JSON error bodies
pub async fn map_errors(State(state): State<Arc<AppState>>, request: Request, next: Next) -> Response {
    let request_id = request.extensions().get::<RequestId>().cloned();

    let mut response = next.run(request).await;
    let Some(Unmapped(caught)) = response.extensions_mut().remove::<Unmapped>() else {
        return response;
    };

    let body = match request_id {
        Some(RequestId(id)) => state.mapper.map_for_request(&caught, &id),
        None => state.mapper.map(&caught),
    };
    error_response(body)
}

/// Render an error body with its status and, for rate limits, `Retry-After`
pub fn error_response(body: ApiErrorResponse) -> Response {
    let status =
        StatusCode::from_u16(body.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let retry_after = if body.code == ErrorCode::RateLimitExceeded {
        body.details
            .as_ref()
            .and_then(|details| details.get("retryAfter"))
            .and_then(serde_json::Value::as_u64)
    } else {
        None
    };

    let mut response = (status, Json(body)).into_response();
    if let Some(seconds) = retry_after {
        response
            .headers_mut()
            .insert(header::RETRY_AFTER, HeaderValue::from(seconds));
    }
    response
}
