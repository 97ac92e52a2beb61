//! In-process cache backend.
//!
//! A concurrent map with per-entry absolute expiry. Expiration is lazy:
//! an entry past its deadline is treated as absent and removed on the next
//! read that touches it. Fixed TTL, no sliding expiration, no capacity
//! policy beyond process memory.

use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use time::OffsetDateTime;

use super::client::{CacheClient, CacheError};

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: OffsetDateTime,
}

impl Entry {
    fn is_expired(&self, now: OffsetDateTime) -> bool {
        now >= self.expires_at
    }
}

/// Shared in-memory key-value store safe for many in-flight requests.
#[derive(Default)]
pub struct MemoryCache {
    entries: DashMap<String, Entry>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (non-expired) entries; expired entries are swept.
    pub fn len(&self) -> usize {
        let now = OffsetDateTime::now_utc();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn matches(pattern: &str, key: &str) -> bool {
        match pattern.strip_suffix('*') {
            Some(prefix) => key.starts_with(prefix),
            None => key == pattern,
        }
    }
}

#[async_trait]
impl CacheClient for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let now = OffsetDateTime::now_utc();
        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired(now) {
                return Ok(Some(entry.value.clone()));
            }
        }
        // Lazily drop the expired entry, if any.
        self.entries
            .remove_if(key, |_, entry| entry.is_expired(now));
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let expires_at = OffsetDateTime::now_utc() + ttl;
        self.entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries.remove(key);
        Ok(())
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>, CacheError> {
        let now = OffsetDateTime::now_utc();
        Ok(self
            .entries
            .iter()
            .filter(|entry| !entry.value().is_expired(now))
            .filter(|entry| Self::matches(pattern, entry.key()))
            .map(|entry| entry.key().clone())
            .collect())
    }
}
