use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};

use crate::ratelimit::{Decision, RateLimitError, RateLimitRecord, RateLimitStore};

/// In-process store, one mutex-guarded map per limiter
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, RateLimitRecord>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracked identifiers
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, RateLimitRecord>> {
        // Records are plain values, a poisoned map is still consistent
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl RateLimitStore for MemoryStore {
    async fn hit(
        &self,
        key: &str,
        max_requests: u32,
        window: TimeDelta,
        now: DateTime<Utc>,
    ) -> Result<Decision, RateLimitError> {
        let mut records = self.lock();
        let decision = RateLimitRecord::admit(records.get(key).copied(), max_requests, window, now)?;
        if let Decision::Allowed(record) = decision {
            records.insert(key.to_string(), record);
        }
        Ok(decision)
    }

    async fn get(&self, key: &str) -> Result<Option<RateLimitRecord>, RateLimitError> {
        Ok(self.lock().get(key).copied())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, RateLimitError> {
        let mut records = self.lock();
        let before = records.len();
        records.retain(|_, record| !record.is_expired(now));
        Ok(before - records.len())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[tokio::test]
    async fn test_concurrent_hits_respect_limit() {
        let store = Arc::new(MemoryStore::new());
        let now = Utc::now();
        let window = TimeDelta::seconds(60);

        let mut handles = Vec::new();
        for _ in 0..32 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.hit("shared", 10, window, now).await.unwrap()
            }));
        }

        let mut allowed = 0;
        for handle in handles {
            if matches!(handle.await.unwrap(), Decision::Allowed(_)) {
                allowed += 1;
            }
        }

        assert_eq!(allowed, 10);
        assert_eq!(store.get("shared").await.unwrap().unwrap().count, 10);
    }

    #[tokio::test]
    async fn test_first_hit_creates_record() {
        let store = MemoryStore::new();
        assert!(store.is_empty());

        let now = Utc::now();
        let decision = store.hit("k", 1, TimeDelta::seconds(1), now).await.unwrap();
        assert_eq!(
            decision,
            Decision::Allowed(RateLimitRecord {
                count: 1,
                reset_time: now + TimeDelta::seconds(1),
            })
        );
        assert_eq!(store.len(), 1);
    }
}
