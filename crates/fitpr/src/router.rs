//! HTTP router configuration

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::catch_panic::CatchPanicLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::api::{auth, docs::ApiDoc, error, system};
use crate::middleware::{rate_limit, request_context, security_headers};
use crate::pages;
use crate::state::AppState;

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    apply_layers(routes(), state)
}

fn routes() -> Router<Arc<AppState>> {
    Router::new()
        // System endpoints
        .route("/", get(system::root))
        .route("/health", get(system::health))
        // Client access
        .route("/api/v1/auth/pin", post(auth::verify_pin))
        // Pages
        .route("/trainer/dashboard", get(pages::trainer_dashboard))
        .route("/clients/{id}", get(pages::client_page))
        // API documentation
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .fallback(system::not_found)
}

/// Wrap routes in the middleware stack, outermost last
fn apply_layers(router: Router<Arc<AppState>>, state: Arc<AppState>) -> Router {
    router
        .layer(CatchPanicLayer::custom(error::panic_response))
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit))
        .layer(middleware::from_fn_with_state(state.clone(), error::map_errors))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_context))
        .with_state(state)
}
