//! Render error boundary
//!
//! An [`ErrorBoundary`] wraps the rendering of one component tree. While
//! `Normal` it renders its child; the first child failure (an `Err` or a
//! panic) moves it to `Failed`, where it renders a contextual fallback until
//! [`ErrorBoundary::reset`] is called.
//!
//! Work scheduled outside the `render` call is not observed. Custom fallbacks
//! run outside the catch, so a failing fallback propagates to the caller.

use std::fmt::Write as _;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use chrono::Utc;
use fitpr_api::ApiErrorResponse;

use crate::context::{ErrorContext, ErrorMetadata, RecoveryAction};
use crate::error::CaughtError;
use crate::mapper::ErrorMapper;
use crate::report::{ErrorReporter, TracingReporter};

/// Everything known about a captured failure
#[derive(Debug)]
pub struct CapturedError {
    pub error: CaughtError,
    /// Messages of the error and its sources, outermost first
    pub chain: Vec<String>,
    pub metadata: ErrorMetadata,
    /// Classification of the error under the boundary's disclosure policy
    pub response: ApiErrorResponse,
}

/// Boundary state machine
#[derive(Debug, Default)]
pub enum BoundaryState {
    #[default]
    Normal,
    Failed(Box<CapturedError>),
}

/// Output of a render pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    /// The child rendered normally
    Content(String),
    /// The fallback was rendered instead
    Fallback { html: String, status: u16 },
}

impl Rendered {
    #[must_use]
    pub fn html(&self) -> &str {
        match self {
            Self::Content(html) | Self::Fallback { html, .. } => html,
        }
    }

    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}

/// Values handed to a fallback renderer
#[derive(Debug)]
pub struct FallbackProps<'a> {
    pub context: ErrorContext,
    pub captured: &'a CapturedError,
    /// Whether the raw error may be shown
    pub disclose: bool,
    /// Path the retry action points at
    pub retry_href: &'a str,
}

type FallbackFn = dyn Fn(&FallbackProps<'_>) -> String + Send + Sync;

/// Failure containment for one render tree
pub struct ErrorBoundary {
    context: ErrorContext,
    mapper: ErrorMapper,
    reporter: Arc<dyn ErrorReporter>,
    fallback: Option<Arc<FallbackFn>>,
    component: Option<String>,
    request_id: Option<String>,
    retry_href: String,
    state: BoundaryState,
}

impl ErrorBoundary {
    #[must_use]
    pub fn new(context: ErrorContext, mapper: ErrorMapper) -> Self {
        Self {
            context,
            mapper,
            reporter: Arc::new(TracingReporter),
            fallback: None,
            component: None,
            request_id: None,
            retry_href: "/".to_string(),
            state: BoundaryState::Normal,
        }
    }

    /// Replace the reporting callback
    #[must_use]
    pub fn on_error(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Replace the default fallback page
    #[must_use]
    pub fn with_fallback<F>(mut self, fallback: F) -> Self
    where
        F: Fn(&FallbackProps<'_>) -> String + Send + Sync + 'static,
    {
        self.fallback = Some(Arc::new(fallback));
        self
    }

    /// Name the wrapped component tree in reports
    #[must_use]
    pub fn component(mut self, name: impl Into<String>) -> Self {
        self.component = Some(name.into());
        self
    }

    #[must_use]
    pub fn request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Path offered by the retry action
    #[must_use]
    pub fn retry_href(mut self, href: impl Into<String>) -> Self {
        self.retry_href = href.into();
        self
    }

    #[must_use]
    pub const fn context(&self) -> ErrorContext {
        self.context
    }

    #[must_use]
    pub const fn state(&self) -> &BoundaryState {
        &self.state
    }

    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self.state, BoundaryState::Failed(_))
    }

    /// The captured failure, if any
    #[must_use]
    pub fn captured(&self) -> Option<&CapturedError> {
        match &self.state {
            BoundaryState::Normal => None,
            BoundaryState::Failed(captured) => Some(captured.as_ref()),
        }
    }

    /// Render `child`, or the fallback if the boundary has failed
    pub fn render<F>(&mut self, child: F) -> Rendered
    where
        F: FnOnce() -> Result<String, CaughtError>,
    {
        if matches!(self.state, BoundaryState::Normal) {
            // Partial output of a failed child is discarded, nothing it
            // touched is observed afterwards.
            let error = match panic::catch_unwind(AssertUnwindSafe(child)) {
                Ok(Ok(html)) => return Rendered::Content(html),
                Ok(Err(error)) => error,
                Err(payload) => CaughtError::from_panic(payload),
            };
            self.capture(error);
        }

        self.render_fallback()
    }

    /// Return to `Normal`; the next `render` runs the child again
    pub fn reset(&mut self) {
        if let BoundaryState::Failed(captured) = &self.state {
            tracing::debug!(
                context = self.context.as_str(),
                error = %captured.error,
                "error boundary reset"
            );
        }
        self.state = BoundaryState::Normal;
    }

    fn capture(&mut self, error: CaughtError) {
        let mut metadata = ErrorMetadata::classify(&error, self.context, Utc::now());
        if let Some(component) = &self.component {
            metadata = metadata.with_component(component.clone());
        }
        let mut response = self.mapper.map(&error);
        if let Some(request_id) = &self.request_id {
            metadata = metadata.with_request_id(request_id.clone());
            response = response.with_request_id(request_id.clone());
        }

        self.reporter.report(&error, &metadata);

        self.state = BoundaryState::Failed(Box::new(CapturedError {
            chain: error.chain(),
            error,
            metadata,
            response,
        }));
    }

    fn render_fallback(&self) -> Rendered {
        let BoundaryState::Failed(captured) = &self.state else {
            return Rendered::Content(String::new());
        };

        let props = FallbackProps {
            context: self.context,
            captured: captured.as_ref(),
            disclose: self.mapper.environment().discloses_internals(),
            retry_href: &self.retry_href,
        };
        let html = match &self.fallback {
            Some(fallback) => fallback(&props),
            None => default_fallback(&props),
        };

        Rendered::Fallback {
            html,
            status: captured.response.status_code,
        }
    }
}

/// The built-in fallback page
#[must_use]
pub fn default_fallback(props: &FallbackProps<'_>) -> String {
    let presentation = props.context.presentation();
    let captured = props.captured;
    let mut html = String::new();

    let _ = write!(
        html,
        "<section class=\"error-boundary\" data-context=\"{context}\" style=\"border-top: 4px solid {accent}\">\
         <h1>{title}</h1><p>{description}</p>",
        context = props.context,
        accent = presentation.accent,
        title = escape_html(presentation.title),
        description = escape_html(presentation.description),
    );

    // The mapped message is already redacted outside development
    let _ = write!(
        html,
        "<p class=\"error-message\">{}</p>",
        escape_html(&captured.response.message)
    );

    if props.disclose {
        html.push_str("<details open><summary>Error details</summary><pre class=\"error-chain\">");
        for line in &captured.chain {
            html.push_str(&escape_html(line));
            html.push('\n');
        }
        html.push_str("</pre></details>");
    }

    if let Some(request_id) = &captured.metadata.request_id {
        let _ = write!(
            html,
            "<p class=\"error-reference\">Reference: <code>{}</code></p>",
            escape_html(request_id)
        );
    }

    html.push_str("<nav class=\"recovery\">");
    for action in presentation.actions {
        let href = match action {
            RecoveryAction::Retry => props.retry_href,
            RecoveryAction::Home => "/",
            RecoveryAction::Navigate { href, .. } => *href,
        };
        let _ = write!(
            html,
            "<a href=\"{}\">{}</a>",
            escape_html(href),
            escape_html(action.label())
        );
    }
    html.push_str("</nav></section>");

    html
}

/// Escape text for HTML element and attribute content
#[must_use]
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
