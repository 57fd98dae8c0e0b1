//! Application state shared across HTTP handlers

use std::sync::Arc;

use fitpr_core::{ClientDirectory, ErrorMapper, RateLimiter};

use crate::config::Config;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<Config>,
    /// Converts failures into API responses
    pub mapper: ErrorMapper,
    /// Request rate limiter
    pub limiter: RateLimiter,
    /// Clients allowed to sign in with a PIN
    pub directory: Arc<ClientDirectory>,
}

impl AppState {
    /// Create new application state
    #[must_use]
    pub fn new(config: Config, limiter: RateLimiter) -> Self {
        let directory = ClientDirectory::new(config.clients.iter().cloned());
        Self {
            mapper: ErrorMapper::new(config.environment),
            limiter,
            directory: Arc::new(directory),
            config: Arc::new(config),
        }
    }
}
