//! Error taxonomy
//!
//! Errors are plain data: an [`ErrorKind`] plus a message and optional
//! structured details. [`CaughtError`] is what a catch site holds before the
//! failure has been classified.

use std::any::Any;
use std::error::Error as StdError;
use std::fmt;

use fitpr_api::ErrorCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// The fixed set of error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Authentication,
    Authorization,
    NotFound,
    Conflict,
    RateLimit,
    Internal,
    Unknown,
}

impl ErrorKind {
    /// Wire code for this kind
    #[must_use]
    pub const fn code(self) -> ErrorCode {
        match self {
            Self::Validation => ErrorCode::ValidationError,
            Self::Authentication => ErrorCode::AuthenticationError,
            Self::Authorization => ErrorCode::AuthorizationError,
            Self::NotFound => ErrorCode::NotFound,
            Self::Conflict => ErrorCode::Conflict,
            Self::RateLimit => ErrorCode::RateLimitExceeded,
            Self::Internal => ErrorCode::InternalError,
            Self::Unknown => ErrorCode::UnknownError,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Authentication => "authentication",
            Self::Authorization => "authorization",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::RateLimit => "rate_limit",
            Self::Internal => "internal",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified application error
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authentication, message)
    }

    pub fn authorization(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authorization, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RateLimit, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Attach structured details
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// A single field-level schema violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIssue {
    /// Path to the offending field, segments joined with ` -> `
    pub field: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl FieldIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            kind: kind.into(),
        }
    }
}

/// A failure as seen at a catch site, before classification
#[derive(Error, Debug)]
pub enum CaughtError {
    /// Request or schema validation failed
    #[error("validation failed: {} issue(s)", .0.len())]
    Schema(Vec<FieldIssue>),

    /// A taxonomy error raised by application code
    #[error(transparent)]
    App(#[from] AppError),

    /// Any other error value carrying a message
    #[error("{message}")]
    Generic {
        message: String,
        #[source]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },

    /// A value that is not an error at all
    #[error("unknown error: {description}")]
    Unknown { description: String },
}

impl CaughtError {
    /// Wrap an arbitrary error, keeping it as the source
    pub fn generic<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Generic {
            message: error.to_string(),
            source: Some(Box::new(error)),
        }
    }

    /// A generic failure that only has a message
    pub fn message(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
            source: None,
        }
    }

    /// Classify a panic payload
    ///
    /// String payloads (`panic!("...")`) are treated like an error carrying
    /// that message; anything else is an unknown value.
    #[must_use]
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        match payload.downcast::<String>() {
            Ok(message) => Self::message(*message),
            Err(payload) => match payload.downcast::<&'static str>() {
                Ok(message) => Self::message(*message),
                Err(_) => Self::Unknown {
                    description: "panic with a non-string payload".to_string(),
                },
            },
        }
    }

    /// Kind this failure classifies as
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Schema(_) => ErrorKind::Validation,
            Self::App(error) => error.kind,
            Self::Generic { .. } => ErrorKind::Internal,
            Self::Unknown { .. } => ErrorKind::Unknown,
        }
    }

    /// Messages of the error and each of its sources, outermost first
    #[must_use]
    pub fn chain(&self) -> Vec<String> {
        let mut chain = vec![self.to_string()];
        let mut source = StdError::source(self);
        while let Some(error) = source {
            let message = error.to_string();
            // `generic` keeps the wrapped error as source with the same text
            if chain.last() != Some(&message) {
                chain.push(message);
            }
            source = error.source();
        }
        chain
    }
}
