//! Structured error responses
//!
//! Every failed request is answered with an [`ApiErrorResponse`]. The HTTP
//! status is never chosen independently: it is derived from the [`ErrorCode`].

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Stable machine-readable error code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    AuthenticationError,
    AuthorizationError,
    NotFound,
    Conflict,
    RateLimitExceeded,
    InternalError,
    UnknownError,
}

impl ErrorCode {
    /// HTTP status code carried by responses with this code
    #[must_use]
    pub const fn status_code(self) -> u16 {
        match self {
            Self::ValidationError => 400,
            Self::AuthenticationError => 401,
            Self::AuthorizationError => 403,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::RateLimitExceeded => 429,
            Self::InternalError | Self::UnknownError => 500,
        }
    }

    /// Wire representation of the code
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::AuthenticationError => "AUTHENTICATION_ERROR",
            Self::AuthorizationError => "AUTHORIZATION_ERROR",
            Self::NotFound => "NOT_FOUND",
            Self::Conflict => "CONFLICT",
            Self::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            Self::InternalError => "INTERNAL_ERROR",
            Self::UnknownError => "UNKNOWN_ERROR",
        }
    }

    /// Whether the failure is attributable to the caller
    #[must_use]
    pub const fn is_client_error(self) -> bool {
        self.status_code() < 500
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JSON body returned for every failed request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
    /// Error code
    pub code: ErrorCode,
    /// Human readable message
    pub message: String,
    /// Optional structured details (e.g. field-level validation issues)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<Value>,
    /// HTTP status, always `code.status_code()`
    pub status_code: u16,
    /// Identifier of the request that failed, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ApiErrorResponse {
    /// Create a response whose status is derived from `code`
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            status_code: code.status_code(),
            request_id: None,
        }
    }

    /// Attach structured details
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Attach the id of the failed request
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_codes_are_fixed() {
        assert_eq!(ErrorCode::ValidationError.status_code(), 400);
        assert_eq!(ErrorCode::AuthenticationError.status_code(), 401);
        assert_eq!(ErrorCode::AuthorizationError.status_code(), 403);
        assert_eq!(ErrorCode::NotFound.status_code(), 404);
        assert_eq!(ErrorCode::Conflict.status_code(), 409);
        assert_eq!(ErrorCode::RateLimitExceeded.status_code(), 429);
        assert_eq!(ErrorCode::InternalError.status_code(), 500);
        assert_eq!(ErrorCode::UnknownError.status_code(), 500);
    }

    #[test]
    fn test_wire_shape() {
        let response = ApiErrorResponse::new(ErrorCode::ValidationError, "Invalid email")
            .with_details(json!({ "field": "email" }));

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            json!({
                "code": "VALIDATION_ERROR",
                "message": "Invalid email",
                "details": { "field": "email" },
                "statusCode": 400,
            })
        );
    }

    #[test]
    fn test_code_display_matches_serde() {
        let serialized = serde_json::to_string(&ErrorCode::RateLimitExceeded).unwrap();
        assert_eq!(serialized, format!("\"{}\"", ErrorCode::RateLimitExceeded));
    }

    #[test]
    fn test_request_id_round_trips() {
        let body = r#"{"code":"NOT_FOUND","message":"gone","statusCode":404,"requestId":"abc"}"#;
        let parsed: ApiErrorResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.code, ErrorCode::NotFound);
        assert_eq!(parsed.request_id.as_deref(), Some("abc"));
        assert!(parsed.details.is_none());
    }
}
