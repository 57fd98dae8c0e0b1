//! Error-to-response mapping
//!
//! [`ErrorMapper::map`] turns any [`CaughtError`] into exactly one
//! [`ApiErrorResponse`]. It is total, logs every classification and never
//! fails itself.

use std::fmt;
use std::str::FromStr;

use fitpr_api::{ApiErrorResponse, ErrorCode};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::error::{CaughtError, ErrorKind};

/// Message used for internal failures outside development
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";
/// Message used for unclassifiable failures outside development
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unexpected error occurred";

const VALIDATION_MESSAGE: &str = "Validation failed";

/// Deployment environment, controls how much of an internal failure is disclosed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    #[default]
    Production,
    Test,
}

impl Environment {
    /// Interpret a `NODE_ENV` style value
    ///
    /// Only the exact value `development` enables disclosure; anything else,
    /// including aliases accepted by [`FromStr`], is treated as production.
    #[must_use]
    pub fn from_node_env(value: &str) -> Self {
        if value == "development" {
            Self::Development
        } else {
            Self::Production
        }
    }

    /// Whether internal error messages may reach the caller
    #[must_use]
    pub const fn discloses_internals(self) -> bool {
        matches!(self, Self::Development)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Test => "test",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            "test" => Ok(Self::Test),
            other => Err(format!("unknown environment: {other}")),
        }
    }
}

/// Converts caught errors into structured responses
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorMapper {
    environment: Environment,
}

impl ErrorMapper {
    #[must_use]
    pub const fn new(environment: Environment) -> Self {
        Self { environment }
    }

    #[must_use]
    pub const fn environment(&self) -> Environment {
        self.environment
    }

    /// Classify `error` and log the classification
    #[must_use]
    pub fn map(&self, caught: &CaughtError) -> ApiErrorResponse {
        let response = self.describe(caught);

        if response.code.is_client_error() {
            warn!(
                code = %response.code,
                status = response.status_code,
                error = %caught,
                "request failed: {}",
                response.message
            );
        } else {
            error!(
                code = %response.code,
                status = response.status_code,
                error = ?caught,
                chain = ?caught.chain(),
                "unhandled failure: {caught}"
            );
        }

        response
    }

    /// Like [`map`](Self::map) but tags the response with a request id
    #[must_use]
    pub fn map_for_request(&self, caught: &CaughtError, request_id: &str) -> ApiErrorResponse {
        self.map(caught).with_request_id(request_id)
    }

    /// Classify `error` without logging
    #[must_use]
    pub fn describe(&self, caught: &CaughtError) -> ApiErrorResponse {
        let disclose = self.environment.discloses_internals();

        match caught {
            CaughtError::Schema(issues) => {
                let mut response = ApiErrorResponse::new(ErrorCode::ValidationError, VALIDATION_MESSAGE);
                if let Ok(details) = serde_json::to_value(issues) {
                    response = response.with_details(details);
                }
                response
            }
            CaughtError::App(app) => {
                let code = app.kind.code();
                let redacted = match app.kind {
                    ErrorKind::Internal if !disclose => Some(INTERNAL_ERROR_MESSAGE),
                    ErrorKind::Unknown if !disclose => Some(UNKNOWN_ERROR_MESSAGE),
                    ErrorKind::Validation
                    | ErrorKind::Authentication
                    | ErrorKind::Authorization
                    | ErrorKind::NotFound
                    | ErrorKind::Conflict
                    | ErrorKind::RateLimit
                    | ErrorKind::Internal
                    | ErrorKind::Unknown => None,
                };

                if let Some(message) = redacted {
                    return ApiErrorResponse::new(code, message);
                }
                let response = ApiErrorResponse::new(code, app.message.clone());
                match &app.details {
                    Some(details) => response.with_details(details.clone()),
                    None => response,
                }
            }
            CaughtError::Generic { message, .. } => {
                let message = if disclose {
                    message.as_str()
                } else {
                    INTERNAL_ERROR_MESSAGE
                };
                ApiErrorResponse::new(ErrorCode::InternalError, message)
            }
            CaughtError::Unknown { description } => {
                let message = if disclose {
                    description.as_str()
                } else {
                    UNKNOWN_ERROR_MESSAGE
                };
                ApiErrorResponse::new(ErrorCode::UnknownError, message)
            }
        }
    }
}
