//! Fixed-window rate limiting
//!
//! Each identifier owns a [`RateLimitRecord`]. The first request of a window
//! creates it, later requests increment it, and it is reset wholesale once the
//! current time passes `reset_time`. Bursts straddling a window boundary can
//! therefore reach twice the limit.
//!
//! Records live in an injected [`RateLimitStore`]; [`MemoryStore`] keeps them in
//! process, which only holds the limit for single-instance deployments.

mod error;
pub mod storage;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use crate::clock::{Clock, SystemClock};
use crate::error::AppError;

pub use error::RateLimitError;
pub use storage::memory::MemoryStore;

/// Message returned to limited callers
pub const RATE_LIMIT_MESSAGE: &str = "Too many requests, please try again later";

/// Counter state of one identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitRecord {
    pub count: u32,
    pub reset_time: DateTime<Utc>,
}

/// Outcome of counting one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Counted; carries the updated record
    Allowed(RateLimitRecord),
    /// Rejected; carries the unchanged record
    Limited(RateLimitRecord),
}

impl Decision {
    #[must_use]
    pub const fn record(&self) -> RateLimitRecord {
        match self {
            Self::Allowed(record) | Self::Limited(record) => *record,
        }
    }
}

impl RateLimitRecord {
    /// Apply one request to `existing` under the fixed-window policy
    ///
    /// Rejected requests leave the record untouched.
    ///
    /// # Errors
    /// Returns `RateLimitError::Config` when a new window would end past the
    /// latest representable time.
    pub fn admit(
        existing: Option<Self>,
        max_requests: u32,
        window: TimeDelta,
        now: DateTime<Utc>,
    ) -> Result<Decision, RateLimitError> {
        match existing {
            Some(record) if now <= record.reset_time => {
                if record.count >= max_requests {
                    Ok(Decision::Limited(record))
                } else {
                    Ok(Decision::Allowed(Self {
                        count: record.count + 1,
                        ..record
                    }))
                }
            }
            _ => {
                let reset_time = now.checked_add_signed(window).ok_or_else(|| {
                    RateLimitError::Config("rate limit window is too long".to_string())
                })?;
                Ok(Decision::Allowed(Self {
                    count: 1,
                    reset_time,
                }))
            }
        }
    }

    /// Whether the window of this record has ended at `now`
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.reset_time
    }

    /// Whole seconds until the window resets, at least one
    #[must_use]
    pub fn retry_after(&self, now: DateTime<Utc>) -> u64 {
        let millis = (self.reset_time - now).num_milliseconds().max(0);
        u64::try_from(millis).unwrap_or(0).div_ceil(1000).max(1)
    }
}

/// Storage for rate limit records
///
/// `hit` must apply [`RateLimitRecord::admit`] atomically per key so that
/// concurrent requests cannot exceed the limit.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Count one request against `key`
    async fn hit(
        &self,
        key: &str,
        max_requests: u32,
        window: TimeDelta,
        now: DateTime<Utc>,
    ) -> Result<Decision, RateLimitError>;

    /// Current record for `key`, expired or not
    async fn get(&self, key: &str) -> Result<Option<RateLimitRecord>, RateLimitError>;

    /// Drop records whose window ended before `now`, returning how many
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, RateLimitError>;
}

/// Rate limiter over an injected store and clock
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn RateLimitStore>,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(store: Arc<dyn RateLimitStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Process-local limiter on the wall clock
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), Arc::new(SystemClock))
    }

    /// Count a request from `identifier`
    ///
    /// # Errors
    /// Returns a `RateLimit` error when `identifier` already made
    /// `max_requests` requests in the current window, and an `Internal` error
    /// when the limit is unusable or the store fails.
    pub async fn check_rate_limit(
        &self,
        identifier: &str,
        max_requests: u32,
        window: Duration,
    ) -> Result<RateLimitRecord, AppError> {
        if max_requests == 0 {
            return Err(RateLimitError::Config("max_requests must be > 0".to_string()).into());
        }
        let window = TimeDelta::from_std(window)
            .ok()
            .filter(|window| *window > TimeDelta::zero())
            .ok_or_else(|| RateLimitError::Config("rate limit window must be > 0".to_string()))?;

        let now = self.clock.now();
        match self.store.hit(identifier, max_requests, window, now).await? {
            Decision::Allowed(record) => {
                debug!(identifier, count = record.count, max_requests, "request counted");
                Ok(record)
            }
            Decision::Limited(record) => {
                let retry_after = record.retry_after(now);
                warn!(identifier, max_requests, retry_after, "rate limit exceeded");
                Err(AppError::rate_limit(RATE_LIMIT_MESSAGE).with_details(json!({
                    "limit": max_requests,
                    "retryAfter": retry_after,
                    "resetTime": record.reset_time,
                })))
            }
        }
    }

    /// Drop records whose window has ended
    ///
    /// # Errors
    /// Returns an error if the store fails.
    pub async fn purge_expired(&self) -> Result<usize, RateLimitError> {
        let purged = self.store.purge_expired(self.clock.now()).await?;
        if purged > 0 {
            debug!(purged, "purged expired rate limit records");
        }
        Ok(purged)
    }
}
