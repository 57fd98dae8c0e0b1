//! Error reporting hooks

use tracing::{error, info, warn};

use crate::context::{ErrorMetadata, Severity};
use crate::error::CaughtError;

/// Receives every error captured by a boundary
///
/// Reporting is observational: implementations must not panic and their
/// outcome is never consulted.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, error: &CaughtError, metadata: &ErrorMetadata);
}

impl<F> ErrorReporter for F
where
    F: Fn(&CaughtError, &ErrorMetadata) + Send + Sync,
{
    fn report(&self, error: &CaughtError, metadata: &ErrorMetadata) {
        self(error, metadata);
    }
}

/// Reports through `tracing`, at a level derived from the severity
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, error: &CaughtError, metadata: &ErrorMetadata) {
        let context = metadata.context.as_str();
        let category = metadata.category.as_str();
        let component = metadata.component.as_deref().unwrap_or("-");
        let request_id = metadata.request_id.as_deref().unwrap_or("-");

        match metadata.severity {
            Severity::Low => info!(
                context, category, component, request_id,
                retryable = metadata.retryable,
                "error captured: {error}"
            ),
            Severity::Medium => warn!(
                context, category, component, request_id,
                retryable = metadata.retryable,
                "error captured: {error}"
            ),
            Severity::High | Severity::Critical => error!(
                context, category, component, request_id,
                retryable = metadata.retryable,
                severity = ?metadata.severity,
                chain = ?error.chain(),
                "error captured: {error}"
            ),
        }
    }
}
