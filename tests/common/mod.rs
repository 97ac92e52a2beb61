//! Shared test doubles for the integration suites.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use time::macros::datetime;
use tokio::sync::Mutex;

use sightline::application::catalog::{
    CatalogStore, CreateSightParams, StoreError, UpdateSightParams,
};
use sightline::domain::entities::{SightProfileRecord, SightRecord, TicketRecord};

/// In-memory Catalog Store that counts every query it serves, so tests can
/// tell whether a read came from the cache or from the store.
pub struct InMemoryCatalog {
    sights: Mutex<Vec<SightRecord>>,
    queries: AtomicUsize,
}

impl InMemoryCatalog {
    pub fn new(sights: Vec<SightRecord>) -> Self {
        Self {
            sights: Mutex::new(sights),
            queries: AtomicUsize::new(0),
        }
    }

    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub async fn len(&self) -> usize {
        self.sights.lock().await.len()
    }

    fn touch(&self) {
        self.queries.fetch_add(1, Ordering::SeqCst);
    }

    fn matches(record: &SightRecord, keyword: &str) -> bool {
        let needle = keyword.to_lowercase();
        record.name.to_lowercase().contains(&needle)
            || record.province.to_lowercase().contains(&needle)
            || record.city.to_lowercase().contains(&needle)
            || record
                .area
                .as_deref()
                .is_some_and(|area| area.to_lowercase().contains(&needle))
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalog {
    async fn get_by_id(&self, id: i64) -> Result<Option<SightRecord>, StoreError> {
        self.touch();
        Ok(self
            .sights
            .lock()
            .await
            .iter()
            .find(|sight| sight.id == id)
            .cloned())
    }

    async fn list(&self, skip: u64, limit: u32) -> Result<Vec<SightRecord>, StoreError> {
        self.touch();
        let mut sights = self.sights.lock().await.clone();
        sights.sort_by_key(|sight| sight.id);
        Ok(sights
            .into_iter()
            .skip(skip as usize)
            .take(limit as usize)
            .collect())
    }

    async fn list_hot(&self, limit: u32) -> Result<Vec<SightRecord>, StoreError> {
        self.touch();
        Ok(self
            .sights
            .lock()
            .await
            .iter()
            .filter(|sight| sight.is_hot)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn list_fine(&self, limit: u32) -> Result<Vec<SightRecord>, StoreError> {
        self.touch();
        Ok(self
            .sights
            .lock()
            .await
            .iter()
            .filter(|sight| sight.is_top)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn search(
        &self,
        keyword: &str,
        skip: u64,
        limit: u32,
    ) -> Result<Vec<SightRecord>, StoreError> {
        self.touch();
        Ok(self
            .sights
            .lock()
            .await
            .iter()
            .filter(|sight| Self::matches(sight, keyword))
            .skip(skip as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        self.touch();
        Ok(self.sights.lock().await.len() as u64)
    }

    async fn count_search(&self, keyword: &str) -> Result<u64, StoreError> {
        self.touch();
        Ok(self
            .sights
            .lock()
            .await
            .iter()
            .filter(|sight| Self::matches(sight, keyword))
            .count() as u64)
    }

    async fn create(&self, params: CreateSightParams) -> Result<SightRecord, StoreError> {
        self.touch();
        let mut sights = self.sights.lock().await;
        let id = sights.iter().map(|sight| sight.id).max().unwrap_or(0) + 1;
        let now = datetime!(2024-05-01 08:00 UTC);
        let record = SightRecord {
            id,
            name: params.name,
            desc: params.desc,
            main_img: params.main_img,
            banner_img: params.banner_img,
            content: params.content,
            score: params.score,
            min_price: params.min_price,
            province: params.province,
            city: params.city,
            area: params.area,
            town: params.town,
            is_top: params.is_top,
            is_hot: params.is_hot,
            is_valid: params.is_valid,
            created_at: now,
            updated_at: now,
            profile: Some(SightProfileRecord {
                id: id * 10,
                sight_id: id,
                img: params.profile.img,
                address: params.profile.address,
                explain: params.profile.explain,
                open_time: params.profile.open_time,
                tel: params.profile.tel,
                level: params.profile.level,
                tags: params.profile.tags,
                attention: params.profile.attention,
                location: params.profile.location,
            }),
            tickets: Vec::new(),
        };
        sights.push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: i64, params: UpdateSightParams) -> Result<SightRecord, StoreError> {
        self.touch();
        let mut sights = self.sights.lock().await;
        let sight = sights
            .iter_mut()
            .find(|sight| sight.id == id)
            .ok_or(StoreError::NotFound)?;

        if let Some(name) = params.name {
            sight.name = name;
        }
        if let Some(desc) = params.desc {
            sight.desc = desc;
        }
        if let Some(main_img) = params.main_img {
            sight.main_img = main_img;
        }
        if let Some(banner_img) = params.banner_img {
            sight.banner_img = banner_img;
        }
        if let Some(content) = params.content {
            sight.content = content;
        }
        if let Some(score) = params.score {
            sight.score = score;
        }
        if let Some(min_price) = params.min_price {
            sight.min_price = min_price;
        }
        if let Some(province) = params.province {
            sight.province = province;
        }
        if let Some(city) = params.city {
            sight.city = city;
        }
        if let Some(area) = params.area {
            sight.area = Some(area);
        }
        if let Some(town) = params.town {
            sight.town = Some(town);
        }
        if let Some(is_top) = params.is_top {
            sight.is_top = is_top;
        }
        if let Some(is_hot) = params.is_hot {
            sight.is_hot = is_hot;
        }
        if let Some(is_valid) = params.is_valid {
            sight.is_valid = is_valid;
        }
        Ok(sight.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        self.touch();
        let mut sights = self.sights.lock().await;
        let before = sights.len();
        sights.retain(|sight| sight.id != id);
        if sights.len() == before {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn get_ticket(&self, id: i64) -> Result<Option<TicketRecord>, StoreError> {
        self.touch();
        Ok(self
            .sights
            .lock()
            .await
            .iter()
            .flat_map(|sight| sight.tickets.iter())
            .find(|ticket| ticket.id == id)
            .cloned())
    }

    async fn list_tickets(&self, skip: u64, limit: u32) -> Result<Vec<TicketRecord>, StoreError> {
        self.touch();
        let mut tickets: Vec<TicketRecord> = self
            .sights
            .lock()
            .await
            .iter()
            .flat_map(|sight| sight.tickets.iter().cloned())
            .collect();
        tickets.sort_by_key(|ticket| ticket.id);
        Ok(tickets
            .into_iter()
            .skip(skip as usize)
            .take(limit as usize)
            .collect())
    }

    async fn tickets_by_sight(&self, sight_id: i64) -> Result<Vec<TicketRecord>, StoreError> {
        self.touch();
        Ok(self
            .sights
            .lock()
            .await
            .iter()
            .filter(|sight| sight.id == sight_id)
            .flat_map(|sight| sight.tickets.iter().cloned())
            .collect())
    }
}

/// A fully-populated sight with a profile and one ticket.
pub fn make_sight(id: i64, name: &str) -> SightRecord {
    let created = datetime!(2024-04-01 09:30 UTC);
    SightRecord {
        id,
        name: name.to_string(),
        desc: format!("{name} description"),
        main_img: format!("/img/{id}.jpg"),
        banner_img: format!("/img/{id}-banner.jpg"),
        content: format!("All about {name}."),
        score: 4.8,
        min_price: 60.0,
        province: "Zhejiang".to_string(),
        city: "Hangzhou".to_string(),
        area: Some("Xihu".to_string()),
        town: None,
        is_top: false,
        is_hot: false,
        is_valid: true,
        created_at: created,
        updated_at: created,
        profile: Some(SightProfileRecord {
            id: id * 10,
            sight_id: id,
            img: format!("/img/{id}-profile.jpg"),
            address: "1 Scenic Road".to_string(),
            explain: None,
            open_time: "08:00-18:00".to_string(),
            tel: "0571-87977767".to_string(),
            level: Some("5A".to_string()),
            tags: Some("lake,park".to_string()),
            attention: None,
            location: Some("120.15,30.25".to_string()),
        }),
        tickets: vec![TicketRecord {
            id: id * 100,
            sight_id: id,
            name: "Adult day pass".to_string(),
            desc: None,
            kind: Some("entrance".to_string()),
            price: 80.0,
            discount: 0.9,
            total: 1000,
            remain: 800,
            expire_date: None,
            return_policy: Some("Refundable before use".to_string()),
            is_valid: true,
            created_at: created,
            updated_at: created,
        }],
    }
}
