use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::TimeDelta;
use serde_json::json;

use fitpr_api::ErrorCode;
use fitpr_core::*;

/// Text of the fallback's message paragraph
fn error_message(html: &str) -> Option<&str> {
    const OPEN: &str = "<p class=\"error-message\">";
    let start = html.find(OPEN)? + OPEN.len();
    let end = start + html[start..].find("</p>")?;
    Some(&html[start..end])
}

fn limiter_with_clock() -> (RateLimiter, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::default());
    let limiter = RateLimiter::new(Arc::new(MemoryStore::new()), clock.clone());
    (limiter, clock)
}

#[tokio::test]
async fn test_rate_limited_call_maps_to_429() {
    let (limiter, _clock) = limiter_with_clock();
    let mapper = ErrorMapper::new(Environment::Production);

    for _ in 0..2 {
        limiter
            .check_rate_limit("user-1", 2, Duration::from_millis(1000))
            .await
            .unwrap();
    }
    let err = limiter
        .check_rate_limit("user-1", 2, Duration::from_millis(1000))
        .await
        .unwrap_err();

    let response = mapper.map(&err.into());
    assert_eq!(response.code, ErrorCode::RateLimitExceeded);
    assert_eq!(response.status_code, 429);
    assert_eq!(response.details.unwrap()["limit"], 2);
}

#[tokio::test]
async fn test_call_after_reset_time_succeeds() {
    let (limiter, clock) = limiter_with_clock();
    let window = Duration::from_millis(1000);

    limiter.check_rate_limit("user-1", 1, window).await.unwrap();
    assert!(limiter.check_rate_limit("user-1", 1, window).await.is_err());

    // windowMs after the reset time
    clock.advance(TimeDelta::milliseconds(2000));
    assert!(limiter.check_rate_limit("user-1", 1, window).await.is_ok());
}

#[test]
fn test_validation_error_with_details() {
    let mapper = ErrorMapper::new(Environment::Production);
    let error = AppError::validation("Invalid email").with_details(json!({ "field": "email" }));

    let body = serde_json::to_value(mapper.map(&error.into())).unwrap();
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["statusCode"], 400);
    assert_eq!(body["details"], json!({ "field": "email" }));
}

#[test]
fn test_boundary_disclosure_by_environment() {
    for context in ErrorContext::ALL {
        let title = context.presentation().title;

        let mut dev = ErrorBoundary::new(context, ErrorMapper::new(Environment::Development));
        let rendered = dev.render(|| Err(CaughtError::message("x")));
        assert!(rendered.html().contains(title));
        assert_eq!(error_message(rendered.html()), Some("x"));

        let mut prod = ErrorBoundary::new(context, ErrorMapper::new(Environment::Production));
        let rendered = prod.render(|| Err(CaughtError::message("x")));
        assert!(rendered.html().contains(title));
        assert_ne!(error_message(rendered.html()), Some("x"));
        assert!(!rendered.html().contains(">x<"));
        assert!(!rendered.html().contains("x\n"));
    }
}

#[test]
fn test_boundary_reports_once_and_recovers() {
    let reports = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&reports);
    let mut boundary = ErrorBoundary::new(ErrorContext::Trainer, ErrorMapper::new(Environment::Production))
        .component("ClientList")
        .on_error(Arc::new(move |_: &CaughtError, metadata: &ErrorMetadata| {
            sink.lock().unwrap().push(metadata.clone());
        }));

    let first = boundary.render(|| panic!("list failed"));
    assert!(first.is_fallback());
    let again = boundary.render(|| Ok("never rendered".to_string()));
    assert!(again.is_fallback());

    boundary.reset();
    let recovered = boundary.render(|| Ok("clients".to_string()));
    assert_eq!(recovered, Rendered::Content("clients".to_string()));

    let reports = reports.lock().unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].context, ErrorContext::Trainer);
    assert_eq!(reports[0].severity, Severity::High);
}

#[test]
fn test_pin_failures_classify() {
    let directory = ClientDirectory::new([ClientConfig {
        id: "c1".to_string(),
        name: "Ana".to_string(),
        trainer_id: "t1".to_string(),
        email: None,
        pin: "2468".to_string(),
        active: true,
    }]);
    let mapper = ErrorMapper::new(Environment::Production);

    let status = |client: &str, pin: &str| {
        directory
            .verify(client, pin)
            .map_err(|err| mapper.map(&err.into()).status_code)
            .err()
    };

    assert_eq!(status("c1", "2468"), None);
    assert_eq!(status("c1", "1357"), Some(401));
    assert_eq!(status("c1", "24"), Some(400));
    assert_eq!(status("nobody", "2468"), Some(404));
}
