//! Server-rendered pages
//!
//! Each page renders inside an [`ErrorBoundary`] for its area of the app, so
//! a failing page yields that area's fallback instead of an error body.

use std::fmt::Write as _;
use std::sync::Arc;

use axum::{
    Extension,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Html,
};
use fitpr_core::{AppError, ClientConfig, ErrorBoundary, ErrorContext, Rendered, escape_html};
use serde::Deserialize;

use crate::middleware::RequestId;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub trainer: Option<String>,
}

/// Trainer dashboard listing the trainer's clients
pub async fn trainer_dashboard(
    State(state): State<Arc<AppState>>,
    request_id: Option<Extension<RequestId>>,
    Query(query): Query<DashboardQuery>,
) -> (StatusCode, Html<String>) {
    let mut boundary = boundary(&state, ErrorContext::Trainer, request_id)
        .component("TrainerDashboard")
        .retry_href("/trainer/dashboard");

    let rendered = boundary.render(|| {
        let trainer = query
            .trainer
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::validation("A trainer id is required"))?;
        Ok(dashboard_html(trainer, &state.directory.for_trainer(trainer)))
    });
    respond(rendered)
}

/// Client profile page
pub async fn client_page(
    State(state): State<Arc<AppState>>,
    request_id: Option<Extension<RequestId>>,
    Path(client_id): Path<String>,
) -> (StatusCode, Html<String>) {
    let retry = format!("/clients/{client_id}");
    let mut boundary = boundary(&state, ErrorContext::Client, request_id)
        .component("ClientProfile")
        .retry_href(retry);

    let rendered = boundary.render(|| {
        let client = state.directory.get(&client_id)?;
        Ok(client_html(client))
    });
    respond(rendered)
}

fn boundary(
    state: &AppState,
    context: ErrorContext,
    request_id: Option<Extension<RequestId>>,
) -> ErrorBoundary {
    let boundary = ErrorBoundary::new(context, state.mapper);
    match request_id {
        Some(Extension(RequestId(id))) => boundary.request_id(id),
        None => boundary,
    }
}

fn respond(rendered: Rendered) -> (StatusCode, Html<String>) {
    match rendered {
        Rendered::Content(html) => (StatusCode::OK, Html(page(&html))),
        Rendered::Fallback { html, status } => (
            StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Html(page(&html)),
        ),
    }
}

fn page(body: &str) -> String {
    format!(
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\"><title>FitPr</title></head><body>{body}</body></html>"
    )
}

fn dashboard_html(trainer: &str, clients: &[&ClientConfig]) -> String {
    let mut html = format!("<h1>Clients of {}</h1>", escape_html(trainer));
    if clients.is_empty() {
        html.push_str("<p>No clients yet.</p>");
        return html;
    }
    html.push_str("<ul>");
    for client in clients {
        let status = if client.active { "" } else { " (inactive)" };
        let _ = write!(
            html,
            "<li><a href=\"/clients/{}\">{}</a>{status}</li>",
            escape_html(&client.id),
            escape_html(&client.name),
        );
    }
    html.push_str("</ul>");
    html
}

fn client_html(client: &ClientConfig) -> String {
    let mut html = format!("<h1>{}</h1>", escape_html(&client.name));
    if let Some(email) = &client.email {
        let _ = write!(html, "<p>{}</p>", escape_html(email));
    }
    if !client.active {
        html.push_str("<p>Access disabled</p>");
    }
    html
}

/// Page that always fails, used to check the boundary end to end
#[cfg(test)]
pub async fn broken_page(
    State(state): State<Arc<AppState>>,
    request_id: Option<Extension<RequestId>>,
) -> (StatusCode, Html<String>) {
    let mut boundary = boundary(&state, ErrorContext::Payment, request_id);
    respond(boundary.render(|| Err(fitpr_core::CaughtError::message("ledger offline"))))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(id: &str, name: &str, active: bool) -> ClientConfig {
        ClientConfig {
            id: id.to_string(),
            name: name.to_string(),
            trainer_id: "t1".to_string(),
            email: Some(format!("{id}@example.com")),
            pin: "1234".to_string(),
            active,
        }
    }

    #[test]
    fn test_dashboard_escapes_names() {
        let evil = client("c1", "<script>", true);
        let html = dashboard_html("t1", &[&evil]);
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_dashboard_marks_inactive() {
        let a = client("c1", "Ana", true);
        let b = client("c2", "Bo", false);
        let html = dashboard_html("t1", &[&a, &b]);
        assert!(html.contains("/clients/c1"));
        assert!(html.contains("Bo</a> (inactive)"));
        assert!(dashboard_html("t1", &[]).contains("No clients yet"));
    }

    #[test]
    fn test_client_html() {
        let html = client_html(&client("c1", "Ana", false));
        assert!(html.contains("<h1>Ana</h1>"));
        assert!(html.contains("c1@example.com"));
        assert!(html.contains("Access disabled"));
    }
}
