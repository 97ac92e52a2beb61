//! Catalog records as stored by the Catalog Store.
//!
//! These are the authoritative shapes; everything the cache holds is a
//! disposable projection derived from them.

use time::{Date, OffsetDateTime};

/// A tourist attraction with its derived aggregates and curation flags.
#[derive(Debug, Clone)]
pub struct SightRecord {
    pub id: i64,
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
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub profile: Option<SightProfileRecord>,
    pub tickets: Vec<TicketRecord>,
}

/// Extended descriptive attributes, lifecycle-bound to the parent sight.
#[derive(Debug, Clone)]
pub struct SightProfileRecord {
    pub id: i64,
    pub sight_id: i64,
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

/// Sellable unit tied to a sight.
#[derive(Debug, Clone)]
pub struct TicketRecord {
    pub id: i64,
    pub sight_id: i64,
    pub name: String,
    pub desc: Option<String>,
    pub kind: Option<String>,
    pub price: f64,
    pub discount: f64,
    pub total: i32,
    pub remain: i32,
    pub expire_date: Option<Date>,
    pub return_policy: Option<String>,
    pub is_valid: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}
