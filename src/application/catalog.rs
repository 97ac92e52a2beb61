//! Catalog Store trait describing the persistence adapter.
//!
//! The cache-aside orchestrator treats this as the single source of truth;
//! everything behind it (schema, query construction) is an adapter detail.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::{SightRecord, TicketRecord};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("resource not found")]
    NotFound,
    #[error("database timeout")]
    Timeout,
}

impl StoreError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct CreateSightParams {
    pub name: String,
    pub desc: String,
    pub main_img: String,
    pub banner_img: String,
    pub content: String,
    pub score: f64,
    pub min_price: f64,
    pub province: String,
    pub city: String,
    pub area: Option<String>,
    pub town: Option<String>,
    pub is_top: bool,
    pub is_hot: bool,
    pub is_valid: bool,
    pub profile: CreateProfileParams,
}

#[derive(Debug, Clone)]
pub struct CreateProfileParams {
    pub img: String,
    pub address: String,
    pub explain: Option<String>,
    pub open_time: String,
    pub tel: String,
    pub level: Option<String>,
    pub tags: Option<String>,
    pub attention: Option<String>,
    pub location: Option<String>,
}

/// Partial update: `None` fields keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct UpdateSightParams {
    pub name: Option<String>,
    pub desc: Option<String>,
    pub main_img: Option<String>,
    pub banner_img: Option<String>,
    pub content: Option<String>,
    pub score: Option<f64>,
    pub min_price: Option<f64>,
    pub province: Option<String>,
    pub city: Option<String>,
    pub area: Option<String>,
    pub town: Option<String>,
    pub is_top: Option<bool>,
    pub is_hot: Option<bool>,
    pub is_valid: Option<bool>,
}

impl UpdateSightParams {
    pub fn is_noop(&self) -> bool {
        self.name.is_none()
            && self.desc.is_none()
            && self.main_img.is_none()
            && self.banner_img.is_none()
            && self.content.is_none()
            && self.score.is_none()
            && self.min_price.is_none()
            && self.province.is_none()
            && self.city.is_none()
            && self.area.is_none()
            && self.town.is_none()
            && self.is_top.is_none()
            && self.is_hot.is_none()
            && self.is_valid.is_none()
    }
}

/// CRUD and query operations over sights with their nested associations.
///
/// Keyword search matches name OR province OR city OR area as a substring.
/// Case behavior belongs to the adapter: the shipped Postgres adapter uses
/// `ILIKE` (case-insensitive), an in-memory double may differ.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn get_by_id(&self, id: i64) -> Result<Option<SightRecord>, StoreError>;

    async fn list(&self, skip: u64, limit: u32) -> Result<Vec<SightRecord>, StoreError>;

    async fn list_hot(&self, limit: u32) -> Result<Vec<SightRecord>, StoreError>;

    async fn list_fine(&self, limit: u32) -> Result<Vec<SightRecord>, StoreError>;

    async fn search(
        &self,
        keyword: &str,
        skip: u64,
        limit: u32,
    ) -> Result<Vec<SightRecord>, StoreError>;

    async fn count(&self) -> Result<u64, StoreError>;

    async fn count_search(&self, keyword: &str) -> Result<u64, StoreError>;

    async fn create(&self, params: CreateSightParams) -> Result<SightRecord, StoreError>;

    /// Returns `StoreError::NotFound` when `id` does not exist.
    async fn update(&self, id: i64, params: UpdateSightParams) -> Result<SightRecord, StoreError>;

    /// Child rows (tickets, profile) go before the parent sight.
    /// Returns `StoreError::NotFound` when `id` does not exist.
    async fn delete(&self, id: i64) -> Result<(), StoreError>;

    async fn get_ticket(&self, id: i64) -> Result<Option<TicketRecord>, StoreError>;

    async fn list_tickets(&self, skip: u64, limit: u32) -> Result<Vec<TicketRecord>, StoreError>;

    async fn tickets_by_sight(&self, sight_id: i64) -> Result<Vec<TicketRecord>, StoreError>;
}
