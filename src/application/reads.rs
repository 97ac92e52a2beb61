//! Cache-aside read orchestrator.
//!
//! Every read follows the same pipeline: derive the key, attempt a
//! read-through, on miss query the Catalog Store, encode per item with
//! failure isolation, write back best-effort, wrap in the envelope.
//!
//! The cache is an optimization, never a dependency: a read only fails for
//! a genuine store failure (or a detail row that cannot be encoded).
//! Corrupted entries are discarded and treated as a miss. Two concurrent
//! misses for the same key may both query the store and both write back;
//! last write wins and both carry equivalent data.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use sightline_api_types::{Envelope, Pagination};

use crate::application::catalog::{CatalogStore, StoreError};
use crate::application::codec::{self, CodecError, CodecFailure};
use crate::application::pagination::{PageQuery, PageQueryError, validate_keyword};
use crate::cache::{CacheClient, SightKey};

const TARGET: &str = "sightline::reads";

/// Hot list and fine list are fixed, unpaginated curated subsets.
const HOT_LIST_LIMIT: u32 = 10;
const FINE_LIST_LIMIT: u32 = 3;

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("sight not found")]
    NotFound,
    #[error(transparent)]
    Validation(#[from] PageQueryError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed to encode sight {id}")]
    Encode {
        id: i64,
        #[source]
        source: CodecError,
    },
}

/// Page-shaped cache payload: items plus their pagination block.
///
/// The hit path re-wraps this in the envelope, so hit and miss responses
/// are byte-for-byte equivalent. A cached value that does not decode into
/// this shape counts as corrupt and is discarded.
#[derive(Debug, Serialize, Deserialize)]
struct CachedPage {
    data: Vec<Value>,
    pagination: Pagination,
}

pub struct SightReadService {
    store: Arc<dyn CatalogStore>,
    cache: Arc<dyn CacheClient>,
    ttl: Duration,
}

impl SightReadService {
    pub fn new(store: Arc<dyn CatalogStore>, cache: Arc<dyn CacheClient>, ttl: Duration) -> Self {
        Self { store, cache, ttl }
    }

    /// Single sight with nested associations; 404 when absent. A missing
    /// id is re-checked on every request, never cached as a miss.
    pub async fn detail(&self, id: i64) -> Result<Envelope, ReadError> {
        let key = SightKey::Detail(id).render();
        if let Some(cached) = self.read_cached::<Value>(&key, "detail").await {
            return Ok(Envelope::ok(cached));
        }

        let record = self
            .store
            .get_by_id(id)
            .await?
            .ok_or(ReadError::NotFound)?;
        let value = codec::encode_sight(&record)
            .map_err(|source| ReadError::Encode { id, source })?;

        self.write_back(&key, &value, "detail").await;
        Ok(Envelope::ok(value))
    }

    /// Paginated listing over the whole catalog.
    pub async fn list(&self, query: PageQuery) -> Result<Envelope, ReadError> {
        let key = SightKey::List {
            page: query.page(),
            page_size: query.page_size(),
        }
        .render();
        self.paged(&key, "list", query, None).await
    }

    /// Keyword search across name, province, city and area.
    pub async fn search(&self, keyword: &str, query: PageQuery) -> Result<Envelope, ReadError> {
        validate_keyword(keyword)?;
        let key = SightKey::Search {
            keyword: keyword.to_string(),
            page: query.page(),
            page_size: query.page_size(),
        }
        .render();
        self.paged(&key, "search", query, Some(keyword)).await
    }

    /// Fixed popular subset (`is_hot` flag).
    pub async fn hot_list(&self) -> Result<Envelope, ReadError> {
        self.curated(SightKey::HotList, "hot", |store| async move {
            store.list_hot(HOT_LIST_LIMIT).await
        })
        .await
    }

    /// Fixed featured subset (`is_top` flag).
    pub async fn fine_list(&self) -> Result<Envelope, ReadError> {
        self.curated(SightKey::FineList, "fine", |store| async move {
            store.list_fine(FINE_LIST_LIMIT).await
        })
        .await
    }

    async fn paged(
        &self,
        key: &str,
        op: &'static str,
        query: PageQuery,
        keyword: Option<&str>,
    ) -> Result<Envelope, ReadError> {
        if let Some(cached) = self.read_cached::<CachedPage>(key, op).await {
            return Ok(Envelope::page(Value::Array(cached.data), cached.pagination));
        }

        let (records, total) = match keyword {
            Some(keyword) => {
                let records = self
                    .store
                    .search(keyword, query.skip(), query.page_size())
                    .await?;
                let total = self.store.count_search(keyword).await?;
                (records, total)
            }
            None => {
                let records = self.store.list(query.skip(), query.page_size()).await?;
                let total = self.store.count().await?;
                (records, total)
            }
        };
        let pagination = query.meta(total);

        let (encoded, failures) = codec::encode_sights(&records);
        log_skipped(op, &failures);

        // Populate only when at least one item survived encoding.
        if !encoded.is_empty() {
            let page = CachedPage {
                data: encoded,
                pagination: pagination.clone(),
            };
            match serde_json::to_value(&page) {
                Ok(value) => self.write_back(key, &value, op).await,
                Err(error) => {
                    warn!(target: TARGET, op, key, %error, "failed to assemble cache payload");
                }
            }
            return Ok(Envelope::page(Value::Array(page.data), page.pagination));
        }

        Ok(Envelope::page(Value::Array(Vec::new()), pagination))
    }

    async fn curated<F, Fut>(
        &self,
        key: SightKey,
        op: &'static str,
        fetch: F,
    ) -> Result<Envelope, ReadError>
    where
        F: FnOnce(Arc<dyn CatalogStore>) -> Fut,
        Fut: Future<Output = Result<Vec<crate::domain::entities::SightRecord>, StoreError>>,
    {
        let key = key.render();
        if let Some(cached) = self.read_cached::<Value>(&key, op).await {
            return Ok(Envelope::ok(cached));
        }

        let records = fetch(self.store.clone()).await?;
        let (encoded, failures) = codec::encode_sights(&records);
        log_skipped(op, &failures);

        let has_items = !encoded.is_empty();
        let value = Value::Array(encoded);
        if has_items {
            self.write_back(&key, &value, op).await;
        }
        Ok(Envelope::ok(value))
    }

    /// Read-through lookup. Returns `None` on a miss, on a cache failure
    /// (absorbed, logged) and on a corrupt entry (deleted, logged): all
    /// three fall back to the Catalog Store.
    async fn read_cached<T: serde::de::DeserializeOwned>(
        &self,
        key: &str,
        op: &'static str,
    ) -> Option<T> {
        let raw = match self.cache.get(key).await {
            Ok(raw) => raw,
            Err(error) => {
                counter!("sightline_cache_error_total", "op" => op).increment(1);
                warn!(target: TARGET, op, key, %error, "cache read failed, falling back to store");
                return None;
            }
        };

        let Some(raw) = raw else {
            counter!("sightline_cache_miss_total", "op" => op).increment(1);
            return None;
        };

        match serde_json::from_str::<T>(&raw) {
            Ok(decoded) => {
                counter!("sightline_cache_hit_total", "op" => op).increment(1);
                Some(decoded)
            }
            Err(error) => {
                counter!("sightline_cache_corrupt_total", "op" => op).increment(1);
                warn!(target: TARGET, op, key, %error, "discarding corrupt cache entry");
                if let Err(error) = self.cache.delete(key).await {
                    warn!(target: TARGET, op, key, %error, "failed to delete corrupt cache entry");
                }
                None
            }
        }
    }

    /// Best-effort write-back with the fixed TTL; failure is logged, never
    /// surfaced.
    async fn write_back(&self, key: &str, value: &Value, op: &'static str) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(error) => {
                warn!(target: TARGET, op, key, %error, "failed to serialize cache payload");
                return;
            }
        };
        match self.cache.set(key, &raw, self.ttl).await {
            Ok(()) => {
                info!(target: TARGET, op, key, "cached query result");
            }
            Err(error) => {
                counter!("sightline_cache_write_failed_total", "op" => op).increment(1);
                warn!(target: TARGET, op, key, %error, "cache write failed, serving store result");
            }
        }
    }
}

fn log_skipped(op: &'static str, failures: &[CodecFailure]) {
    for failure in failures {
        warn!(
            target: TARGET,
            op,
            sight_id = failure.id,
            error = %failure.error,
            "skipping row that failed serialization"
        );
    }
}
