//! Error context and report metadata
//!
//! [`ErrorContext`] only selects presentation. [`ErrorMetadata`] is attached to
//! reported errors for observability and never influences control flow.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CaughtError, ErrorKind};

/// Where in the application a failure surfaced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorContext {
    #[default]
    Global,
    Trainer,
    Client,
    Auth,
    Payment,
    Api,
}

/// A recovery affordance offered next to an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Render the failed view again
    Retry,
    /// Go to the landing page
    Home,
    /// Go to a context-specific page
    Navigate {
        label: &'static str,
        href: &'static str,
    },
}

impl RecoveryAction {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Retry => "Try again",
            Self::Home => "Go home",
            Self::Navigate { label, .. } => label,
        }
    }
}

/// How a context presents its failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Presentation {
    pub title: &'static str,
    pub description: &'static str,
    /// Accent colour used by the fallback page
    pub accent: &'static str,
    pub actions: &'static [RecoveryAction],
}

const DEFAULT_ACTIONS: &[RecoveryAction] = &[RecoveryAction::Retry, RecoveryAction::Home];

impl ErrorContext {
    pub const ALL: [Self; 6] = [
        Self::Global,
        Self::Trainer,
        Self::Client,
        Self::Auth,
        Self::Payment,
        Self::Api,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::Trainer => "trainer",
            Self::Client => "client",
            Self::Auth => "auth",
            Self::Payment => "payment",
            Self::Api => "api",
        }
    }

    #[must_use]
    pub fn presentation(self) -> Presentation {
        match self {
            Self::Global => Presentation {
                title: "Something went wrong",
                description: "An unexpected problem stopped this page from loading.",
                accent: "#dc2626",
                actions: DEFAULT_ACTIONS,
            },
            Self::Trainer => Presentation {
                title: "Trainer dashboard error",
                description: "We couldn't load this part of your dashboard.",
                accent: "#2563eb",
                actions: &[
                    RecoveryAction::Retry,
                    RecoveryAction::Navigate {
                        label: "Back to dashboard",
                        href: "/trainer/dashboard",
                    },
                    RecoveryAction::Home,
                ],
            },
            Self::Client => Presentation {
                title: "Client portal error",
                description: "We couldn't load your training information.",
                accent: "#16a34a",
                actions: &[
                    RecoveryAction::Retry,
                    RecoveryAction::Navigate {
                        label: "Enter your PIN again",
                        href: "/client/login",
                    },
                    RecoveryAction::Home,
                ],
            },
            Self::Auth => Presentation {
                title: "Authentication error",
                description: "Your session could not be verified.",
                accent: "#d97706",
                actions: &[
                    RecoveryAction::Navigate {
                        label: "Sign in again",
                        href: "/login",
                    },
                    RecoveryAction::Home,
                ],
            },
            Self::Payment => Presentation {
                title: "Payment error",
                description: "Your payment could not be completed.",
                accent: "#9333ea",
                actions: &[
                    RecoveryAction::Retry,
                    RecoveryAction::Navigate {
                        label: "View billing",
                        href: "/trainer/payments",
                    },
                    RecoveryAction::Home,
                ],
            },
            Self::Api => Presentation {
                title: "Service unavailable",
                description: "The service did not respond as expected.",
                accent: "#4b5563",
                actions: DEFAULT_ACTIONS,
            },
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorContext {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|context| context.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown error context: {s}"))
    }
}

/// Report severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    #[must_use]
    pub const fn for_kind(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::Validation | ErrorKind::NotFound | ErrorKind::RateLimit => Self::Low,
            ErrorKind::Authentication | ErrorKind::Authorization | ErrorKind::Conflict => {
                Self::Medium
            }
            ErrorKind::Internal => Self::High,
            ErrorKind::Unknown => Self::Critical,
        }
    }
}

/// Observability data attached to a reported error
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorMetadata {
    pub context: ErrorContext,
    pub severity: Severity,
    pub category: ErrorKind,
    pub timestamp: DateTime<Utc>,
    pub retryable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// Name of the component tree that failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
}

impl ErrorMetadata {
    /// Derive metadata from a caught error
    #[must_use]
    pub fn classify(error: &CaughtError, context: ErrorContext, timestamp: DateTime<Utc>) -> Self {
        let kind = error.kind();
        Self {
            context,
            severity: Severity::for_kind(kind),
            category: kind,
            timestamp,
            retryable: matches!(
                kind,
                ErrorKind::RateLimit | ErrorKind::Internal | ErrorKind::Unknown
            ),
            request_id: None,
            component: None,
        }
    }

    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    #[must_use]
    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[test]
    fn test_every_context_has_recovery() {
        for context in ErrorContext::ALL {
            let presentation = context.presentation();
            assert!(!presentation.title.is_empty());
            assert!(!presentation.actions.is_empty(), "{context} has no actions");
        }
    }

    #[test]
    fn test_context_parsing() {
        assert_eq!("Trainer".parse::<ErrorContext>(), Ok(ErrorContext::Trainer));
        assert!("billing".parse::<ErrorContext>().is_err());
    }

    #[test]
    fn test_metadata_classification() {
        let now = Utc::now();
        let metadata = ErrorMetadata::classify(
            &CaughtError::from(AppError::rate_limit("slow down")),
            ErrorContext::Api,
            now,
        );
        assert_eq!(metadata.severity, Severity::Low);
        assert_eq!(metadata.category, ErrorKind::RateLimit);
        assert!(metadata.retryable);

        let metadata = ErrorMetadata::classify(
            &CaughtError::from(AppError::authorization("no")),
            ErrorContext::Trainer,
            now,
        );
        assert_eq!(metadata.severity, Severity::Medium);
        assert!(!metadata.retryable);
    }

    #[test]
    fn test_unknown_is_critical() {
        let error = CaughtError::Unknown {
            description: "?".to_string(),
        };
        let metadata = ErrorMetadata::classify(&error, ErrorContext::Global, Utc::now());
        assert_eq!(metadata.severity, Severity::Critical);
    }
}
