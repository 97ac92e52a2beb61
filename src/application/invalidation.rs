//! Invalidation coordinator: fan-out deletion of cache keys after writes.
//!
//! The store commit is authoritative and happens first; invalidation is a
//! best-effort follow-up with no rollback path. A failure here is logged
//! and absorbed: entries self-expire within the TTL anyway.
//!
//! Search keys are only cleared by the explicit bulk clear, not on every
//! mutation; until their TTL runs out they may serve stale results.

use std::sync::Arc;

use tracing::{info, warn};

use crate::cache::{CacheClient, CacheError, SightKey, patterns};

const TARGET: &str = "sightline::invalidation";

pub struct InvalidationCoordinator {
    cache: Arc<dyn CacheClient>,
}

impl InvalidationCoordinator {
    pub fn new(cache: Arc<dyn CacheClient>) -> Self {
        Self { cache }
    }

    /// A newly created sight may enter list results; listings are the only
    /// keys that can already be stale.
    pub async fn after_create(&self) {
        self.drop_matching(patterns::LIST).await;
    }

    /// Update or delete of sight `id`: the detail key plus every listing
    /// and both curated subsets.
    pub async fn after_write(&self, id: i64) {
        self.drop_key(&SightKey::Detail(id).render()).await;
        self.drop_matching(patterns::LIST).await;
        self.drop_key(&SightKey::HotList.render()).await;
        self.drop_key(&SightKey::FineList.render()).await;
    }

    /// Bulk clear of the whole namespace (detail, list, search, curated).
    ///
    /// Unlike the write-path hooks this surfaces failure: it is an explicit
    /// operator action, not a side effect of a store commit.
    pub async fn clear_namespace(&self) -> Result<u64, CacheError> {
        self.cache.delete(&SightKey::HotList.render()).await?;
        self.cache.delete(&SightKey::FineList.render()).await?;
        let mut removed = 2;
        removed += self.cache.delete_matching(patterns::LIST).await?;
        removed += self.cache.delete_matching(patterns::DETAIL).await?;
        removed += self.cache.delete_matching(patterns::SEARCH).await?;
        info!(target: TARGET, removed, "cleared sight cache namespace");
        Ok(removed)
    }

    async fn drop_key(&self, key: &str) {
        if let Err(error) = self.cache.delete(key).await {
            warn!(target: TARGET, key, %error, "cache invalidation failed");
        }
    }

    async fn drop_matching(&self, pattern: &str) {
        match self.cache.delete_matching(pattern).await {
            Ok(removed) => {
                info!(target: TARGET, pattern, removed, "invalidated cache keys");
            }
            Err(error) => {
                warn!(target: TARGET, pattern, %error, "cache invalidation failed");
            }
        }
    }
}
