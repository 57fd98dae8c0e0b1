//! Error types for the fitpr client

use fitpr_api::{ApiErrorResponse, ErrorCode};
use thiserror::Error;

/// Errors that can occur when using the fitpr client
#[derive(Error, Debug)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The service answered with an error body
    #[error("API error ({}): {}", .0.status_code, .0.message)]
    Api(ApiErrorResponse),

    /// The service failed without a readable error body
    #[error("Invalid response ({status}): {body}")]
    InvalidResponse {
        /// HTTP status code
        status: u16,
        /// Raw response text
        body: String,
    },
}

impl ClientError {
    /// Error code reported by the service, if any
    #[must_use]
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Api(error) => Some(error.code),
            _ => None,
        }
    }

    /// Seconds to wait before retrying a rate-limited call
    #[must_use]
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            Self::Api(error) if error.code == ErrorCode::RateLimitExceeded => error
                .details
                .as_ref()
                .and_then(|details| details.get("retryAfter"))
                .and_then(serde_json::Value::as_u64),
            _ => None,
        }
    }

    /// Decode a failed response body
    pub(crate) fn from_body(status: u16, body: String) -> Self {
        match serde_json::from_str::<ApiErrorResponse>(&body) {
            Ok(error) => Self::Api(error),
            Err(_) => Self::InvalidResponse { status, body },
        }
    }
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decodes_error_body() {
        let body = json!({
            "code": "RATE_LIMIT_EXCEEDED",
            "message": "Too many requests, please try again later.",
            "details": { "limit": 5, "retryAfter": 42, "resetTime": "2026-01-01T00:00:00Z" },
            "statusCode": 429,
            "requestId": "abc"
        });

        let error = ClientError::from_body(429, body.to_string());
        assert_eq!(error.code(), Some(ErrorCode::RateLimitExceeded));
        assert_eq!(error.retry_after(), Some(42));
        assert_eq!(
            error.to_string(),
            "API error (429): Too many requests, please try again later."
        );
    }

    #[test]
    fn test_keeps_unreadable_body() {
        let error = ClientError::from_body(502, "Bad Gateway".to_string());
        assert!(matches!(
            error,
            ClientError::InvalidResponse { status: 502, ref body } if body == "Bad Gateway"
        ));
        assert_eq!(error.code(), None);
        assert_eq!(error.retry_after(), None);
    }

    #[test]
    fn test_retry_after_only_for_rate_limits() {
        let body = json!({
            "code": "VALIDATION_ERROR",
            "message": "bad",
            "details": { "retryAfter": 3 },
            "statusCode": 400
        });
        let error = ClientError::from_body(400, body.to_string());
        assert_eq!(error.retry_after(), None);
    }
}
