//! Cache client abstraction.
//!
//! Thin async key-value operations over a shared backend. No business
//! logic lives here; the read orchestrator and invalidation coordinator
//! decide what to do with a degraded cache.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache unavailable: {0}")]
    Unavailable(String),
    #[error("cache operation failed: {0}")]
    Operation(String),
}

impl CacheError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    pub fn operation(message: impl Into<String>) -> Self {
        Self::Operation(message.into())
    }
}

/// Async key-value operations over a single shared connection or pool.
///
/// Patterns are colon-delimited key prefixes terminated by `*` (for
/// example `sight:list:*`); a pattern without `*` matches exactly one key.
#[async_trait]
pub trait CacheClient: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    async fn keys(&self, pattern: &str) -> Result<Vec<String>, CacheError>;

    /// Delete every key matching `pattern` and return how many went away.
    ///
    /// List-then-delete, not atomic: a key written by a concurrent reader
    /// between the two steps survives until its TTL expires.
    async fn delete_matching(&self, pattern: &str) -> Result<u64, CacheError> {
        let keys = self.keys(pattern).await?;
        let mut removed = 0u64;
        for key in keys {
            self.delete(&key).await?;
            removed += 1;
        }
        Ok(removed)
    }
}
