//! Request id, logging, security headers and rate limiting

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

use crate::api::error::ApiFailure;
use crate::state::AppState;

pub const REQUEST_ID_HEADER: &str = "x-request-id";
pub const PROCESS_TIME_HEADER: &str = "x-process-time";

/// Identifier assigned to each request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

/// Assign a request id and log the request around the inner service
pub async fn request_context(mut request: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let client_ip = client_ip(&request, false);
    let user_agent = request
        .headers()
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_owned();

    request.extensions_mut().insert(RequestId(request_id.clone()));

    let span = info_span!("request", %method, %path, request_id = %request_id);
    info!(parent: &span, client_ip = %client_ip, user_agent = %user_agent, "request started");

    let started = Instant::now();
    let mut response = next.run(request).instrument(span.clone()).await;
    let elapsed = started.elapsed().as_secs_f64();

    info!(
        parent: &span,
        status = response.status().as_u16(),
        elapsed_ms = elapsed * 1000.0,
        "request completed"
    );

    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        headers.insert(REQUEST_ID_HEADER, value);
    }
    if let Ok(value) = HeaderValue::from_str(&format!("{elapsed:.4}")) {
        headers.insert(PROCESS_TIME_HEADER, value);
    }

    response
}

const SECURITY_HEADERS: [(&str, &str); 6] = [
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "DENY"),
    ("referrer-policy", "strict-origin-when-cross-origin"),
    ("permissions-policy", "geolocation=(), microphone=(), camera=()"),
    (
        "content-security-policy",
        "default-src 'self'; script-src 'self' 'unsafe-inline'; style-src 'self' 'unsafe-inline'; \
         img-src 'self' data: https:; font-src 'self'; connect-src 'self'; frame-ancestors 'none';",
    ),
    ("x-api-version", env!("CARGO_PKG_VERSION")),
];

/// Add the static security headers to every response
pub async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    for (name, value) in SECURITY_HEADERS {
        headers.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
    }
    response
}

/// Apply the first matching rate limit rule, keyed by client address and rule
///
/// The address is the socket peer unless `trust_forwarded_for` is set.
pub async fn rate_limit(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let config = &state.config.rate_limit;
    if !config.enabled {
        return next.run(request).await;
    }
    let Some(rule) = config.rule_for(request.uri().path()) else {
        return next.run(request).await;
    };

    let identifier = format!(
        "{}:{}",
        client_ip(&request, config.trust_forwarded_for),
        rule.path
    );
    if let Err(error) = state
        .limiter
        .check_rate_limit(&identifier, rule.max_requests, rule.window())
        .await
    {
        return ApiFailure::from(error).into_response();
    }

    next.run(request).await
}

/// Caller address: the socket peer, or the forwarding headers when trusted
fn client_ip(request: &Request, trust_forwarded: bool) -> String {
    if trust_forwarded {
        // Try X-Forwarded-For first
        if let Some(forwarded) = request.headers().get("x-forwarded-for")
            && let Ok(val) = forwarded.to_str()
            && let Some(first) = val.split(',').next()
            && !first.trim().is_empty()
        {
            return first.trim().to_string();
        }

        // Try X-Real-IP
        if let Some(real_ip) = request.headers().get("x-real-ip")
            && let Ok(val) = real_ip.to_str()
            && !val.trim().is_empty()
        {
            return val.trim().to_string();
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or_else(|| "unknown".to_string(), |info| info.0.ip().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http;

    fn from_peer(request: &mut Request) {
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([192, 0, 2, 1], 4000))));
    }

    #[test]
    fn test_client_ip_ignores_forwarding_headers_by_default() {
        let mut request = http::Request::builder()
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .header("x-real-ip", "10.0.0.2")
            .body(Body::empty())
            .unwrap();
        assert_eq!(client_ip(&request, false), "unknown");

        from_peer(&mut request);
        assert_eq!(client_ip(&request, false), "192.0.2.1");
    }

    #[test]
    fn test_client_ip_trusted_forwarding() {
        let mut request = http::Request::builder()
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .header("x-real-ip", "10.0.0.2")
            .body(Body::empty())
            .unwrap();
        from_peer(&mut request);
        assert_eq!(client_ip(&request, true), "203.0.113.7");

        let mut request = http::Request::builder()
            .header("x-real-ip", "10.0.0.2")
            .body(Body::empty())
            .unwrap();
        from_peer(&mut request);
        assert_eq!(client_ip(&request, true), "10.0.0.2");

        let mut request = http::Request::builder().body(Body::empty()).unwrap();
        from_peer(&mut request);
        assert_eq!(client_ip(&request, true), "192.0.2.1");
    }
}
