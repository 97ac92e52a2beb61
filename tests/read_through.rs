//! Cache-aside behavior of the read and write services against an
//! in-memory store double and the in-process cache backend.

mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use common::{InMemoryCatalog, make_sight};
use sightline::application::invalidation::InvalidationCoordinator;
use sightline::application::pagination::PageQuery;
use sightline::application::reads::{ReadError, SightReadService};
use sightline::application::writes::SightWriteService;
use sightline::application::catalog::UpdateSightParams;
use sightline::cache::{CacheClient, CacheError, MemoryCache, SightKey};
use sightline::domain::entities::SightRecord;

const TTL: Duration = Duration::from_secs(3600);

fn build_reads(
    sights: Vec<SightRecord>,
) -> (Arc<InMemoryCatalog>, Arc<MemoryCache>, SightReadService) {
    let store = Arc::new(InMemoryCatalog::new(sights));
    let cache = Arc::new(MemoryCache::new());
    let reads = SightReadService::new(store.clone(), cache.clone(), TTL);
    (store, cache, reads)
}

#[tokio::test]
async fn second_detail_read_is_served_from_cache() {
    let (store, _cache, reads) = build_reads(vec![make_sight(1, "West Lake")]);

    let first = reads.detail(1).await.expect("first read");
    assert_eq!(store.query_count(), 1);

    let second = reads.detail(1).await.expect("second read");
    assert_eq!(store.query_count(), 1, "cache hit must not touch the store");

    // Hit and miss responses are byte-for-byte equivalent.
    assert_eq!(
        serde_json::to_value(&first).unwrap(),
        serde_json::to_value(&second).unwrap()
    );
}

#[tokio::test]
async fn corrupt_cache_entry_is_discarded_and_refetched() {
    let (store, cache, reads) = build_reads(vec![make_sight(1, "West Lake")]);
    let key = SightKey::Detail(1).render();

    reads.detail(1).await.expect("prime the cache");
    cache.set(&key, "{definitely not json", TTL).await.unwrap();

    let envelope = reads.detail(1).await.expect("read past corruption");
    assert_eq!(store.query_count(), 2, "corruption falls back to the store");
    assert_eq!(envelope.code, 200);

    // The poisoned entry was replaced by a decodable one.
    let raw = cache.get(&key).await.unwrap().expect("repopulated");
    serde_json::from_str::<serde_json::Value>(&raw).expect("valid JSON");
}

#[tokio::test]
async fn missing_sight_is_rechecked_on_every_request() {
    let (store, cache, reads) = build_reads(vec![make_sight(1, "West Lake")]);

    assert!(matches!(
        reads.detail(99).await.unwrap_err(),
        ReadError::NotFound
    ));
    assert!(matches!(
        reads.detail(99).await.unwrap_err(),
        ReadError::NotFound
    ));
    assert_eq!(store.query_count(), 2, "absence is never cached");
    assert!(cache.get(&SightKey::Detail(99).render()).await.unwrap().is_none());
}

#[tokio::test]
async fn list_pagination_metadata_rounds_up() {
    let sights = (1..=7).map(|id| make_sight(id, "Sight")).collect();
    let (_store, _cache, reads) = build_reads(sights);

    let query = PageQuery::new(Some(2), Some(3)).unwrap();
    let envelope = reads.list(query).await.expect("page two");

    let pagination = envelope.pagination.expect("list carries pagination");
    assert_eq!(pagination.total, 7);
    assert_eq!(pagination.page_size, 3);
    assert_eq!(pagination.current_page, 2);
    assert_eq!(pagination.total_pages, 3);

    let data = envelope.data.expect("data");
    assert_eq!(data.as_array().unwrap().len(), 3);
    assert_eq!(data[0]["id"], 4);
}

#[tokio::test]
async fn row_that_fails_encoding_is_skipped_not_fatal() {
    let mut sights: Vec<SightRecord> = (1..=5).map(|id| make_sight(id, "Sight")).collect();
    sights[2].score = f64::NAN;
    let (store, _cache, reads) = build_reads(sights);

    let query = PageQuery::new(Some(1), Some(10)).unwrap();
    let envelope = reads.list(query).await.expect("listing succeeds");
    assert_eq!(envelope.code, 200);

    let data = envelope.data.expect("data");
    assert_eq!(data.as_array().unwrap().len(), 4, "bad row is dropped");

    // The surviving page was still cached.
    let before = store.query_count();
    reads.list(query).await.expect("cached listing");
    assert_eq!(store.query_count(), before);
}

#[tokio::test]
async fn detail_encoding_failure_is_an_error() {
    let mut sight = make_sight(1, "West Lake");
    sight.score = f64::NAN;
    let (_store, cache, reads) = build_reads(vec![sight]);

    assert!(matches!(
        reads.detail(1).await.unwrap_err(),
        ReadError::Encode { id: 1, .. }
    ));
    assert!(cache.is_empty(), "nothing cached for a failed detail read");
}

#[tokio::test]
async fn search_matches_name_province_city_and_area() {
    let mut coastal = make_sight(2, "Gulangyu");
    coastal.province = "Fujian".to_string();
    coastal.city = "Xiamen".to_string();
    coastal.area = Some("Siming".to_string());
    let (_store, _cache, reads) = build_reads(vec![make_sight(1, "West Lake"), coastal]);
    let query = PageQuery::new(None, None).unwrap();

    for keyword in ["Gulangyu", "Fujian", "Xiamen", "Siming"] {
        let envelope = reads.search(keyword, query).await.expect("search");
        let data = envelope.data.expect("data");
        assert_eq!(data.as_array().unwrap().len(), 1, "keyword {keyword}");
        assert_eq!(data[0]["id"], 2);
    }

    assert!(matches!(
        reads.search("   ", query).await.unwrap_err(),
        ReadError::Validation(_)
    ));
}

#[tokio::test]
async fn update_invalidates_everything_except_search() {
    let mut hot = make_sight(1, "West Lake");
    hot.is_hot = true;
    hot.is_top = true;
    let (store, cache, reads) = build_reads(vec![hot]);
    let writes = SightWriteService::new(
        store.clone(),
        Arc::new(InvalidationCoordinator::new(cache.clone())),
    );
    let query = PageQuery::new(None, None).unwrap();

    reads.detail(1).await.unwrap();
    reads.list(query).await.unwrap();
    reads.hot_list().await.unwrap();
    reads.fine_list().await.unwrap();
    reads.search("West", query).await.unwrap();

    let envelope = writes
        .update(
            1,
            UpdateSightParams {
                name: Some("East Lake".to_string()),
                ..Default::default()
            },
        )
        .await
        .expect("update");
    assert_eq!(envelope.message, "sight updated");

    assert!(cache.get(&SightKey::Detail(1).render()).await.unwrap().is_none());
    assert!(cache.keys("sight:list:*").await.unwrap().is_empty());
    assert!(cache.get(&SightKey::HotList.render()).await.unwrap().is_none());
    assert!(cache.get(&SightKey::FineList.render()).await.unwrap().is_none());

    // Search entries ride out their TTL and may serve the old name.
    let stale = cache
        .get(&SightKey::Search { keyword: "West".to_string(), page: 1, page_size: 6 }.render())
        .await
        .unwrap()
        .expect("search entry survives");
    assert!(stale.contains("West Lake"));
}

#[tokio::test]
async fn delete_then_read_is_not_found() {
    let (store, cache, reads) = build_reads(vec![make_sight(1, "West Lake")]);
    let writes = SightWriteService::new(
        store.clone(),
        Arc::new(InvalidationCoordinator::new(cache.clone())),
    );

    reads.detail(1).await.unwrap();
    let envelope = writes.delete(1).await.expect("delete");
    assert_eq!(envelope.message, "sight deleted");

    assert!(matches!(
        reads.detail(1).await.unwrap_err(),
        ReadError::NotFound
    ));
}

#[tokio::test]
async fn clear_namespace_drops_all_derived_entries() {
    let mut hot = make_sight(1, "West Lake");
    hot.is_hot = true;
    let (_store, cache, reads) = build_reads(vec![hot, make_sight(2, "Slender West Lake")]);
    let coordinator = InvalidationCoordinator::new(cache.clone());
    let query = PageQuery::new(None, None).unwrap();

    reads.detail(1).await.unwrap();
    reads.list(query).await.unwrap();
    reads.hot_list().await.unwrap();
    reads.search("Lake", query).await.unwrap();
    assert!(!cache.is_empty());

    coordinator.clear_namespace().await.expect("clear");
    assert!(cache.is_empty());
}

struct DownCache;

#[async_trait]
impl CacheClient for DownCache {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Err(CacheError::unavailable("connection refused"))
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), CacheError> {
        Err(CacheError::unavailable("connection refused"))
    }

    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Err(CacheError::unavailable("connection refused"))
    }

    async fn keys(&self, _pattern: &str) -> Result<Vec<String>, CacheError> {
        Err(CacheError::unavailable("connection refused"))
    }
}

#[tokio::test]
async fn cache_outage_degrades_to_store_reads() {
    let store = Arc::new(InMemoryCatalog::new(vec![make_sight(1, "West Lake")]));
    let reads = SightReadService::new(store.clone(), Arc::new(DownCache), TTL);
    let query = PageQuery::new(None, None).unwrap();

    assert_eq!(reads.detail(1).await.expect("detail").code, 200);
    assert_eq!(reads.list(query).await.expect("list").code, 200);
    assert_eq!(reads.hot_list().await.expect("hot").code, 200);
    assert_eq!(store.query_count(), 4, "every read went to the store");

    // Writes also survive a dead cache; invalidation is best-effort.
    let writes = SightWriteService::new(store.clone(), Arc::new(InvalidationCoordinator::new(Arc::new(DownCache))));
    writes.delete(1).await.expect("delete despite cache outage");
}
