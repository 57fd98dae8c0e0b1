use thiserror::Error;

use crate::error::AppError;

/// Rate limiting errors
#[derive(Debug, Error)]
pub enum RateLimitError {
    /// Limit or window is unusable
    #[error("rate limit configuration error: {0}")]
    Config(String),

    /// The backing store failed
    #[error("rate limit store error: {0}")]
    Store(String),
}

impl From<RateLimitError> for AppError {
    fn from(error: RateLimitError) -> Self {
        Self::internal(error.to_string())
    }
}
