//! fitpr-core: Error classification, recovery and rate limiting
//!
//! Holds the error taxonomy and its mapping to API responses, the render
//! error boundary, the fixed-window rate limiter and the PIN client directory.

pub mod access;
pub mod boundary;
pub mod clock;
pub mod config;
pub mod context;
pub mod error;
pub mod mapper;
pub mod ratelimit;
pub mod report;

pub use access::{ClientDirectory, validate_pin};
pub use boundary::{BoundaryState, CapturedError, ErrorBoundary, FallbackProps, Rendered, escape_html};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ClientConfig, RateLimitConfig, RateLimitRule};
pub use context::{ErrorContext, ErrorMetadata, Presentation, RecoveryAction, Severity};
pub use error::{AppError, CaughtError, ErrorKind, FieldIssue};
pub use mapper::{Environment, ErrorMapper};
pub use ratelimit::{Decision, MemoryStore, RateLimitError, RateLimitRecord, RateLimitStore, RateLimiter};
pub use report::{ErrorReporter, TracingReporter};
