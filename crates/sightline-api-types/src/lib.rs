//! Shared request and response types for the Sightline tourism catalog API.
//!
//! Every endpoint answers with the same [`Envelope`] shape: an integer
//! status code, a human-readable message, an optional payload and an
//! optional pagination block. Timestamps are rendered as RFC 3339 strings
//! so that cached payloads decode to the exact same JSON the live path
//! produces.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

/// Uniform response wrapper carried by every endpoint outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub code: u16,
    pub message: String,
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl Envelope {
    /// Successful response with a payload and no pagination block.
    pub fn ok(data: Value) -> Self {
        Self {
            code: 200,
            message: "success".to_string(),
            data: Some(data),
            pagination: None,
        }
    }

    /// Successful response carrying a page of items plus its pagination block.
    pub fn page(data: Value, pagination: Pagination) -> Self {
        Self {
            code: 200,
            message: "success".to_string(),
            data: Some(data),
            pagination: Some(pagination),
        }
    }

    /// Successful response with a message only (writes, cache clears).
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            code: 200,
            message: message.into(),
            data: None,
            pagination: None,
        }
    }

    /// Failure response; `data` is always null for errors.
    pub fn error(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
            pagination: None,
        }
    }
}

/// Pagination metadata attached to list and search responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub total: u64,
    pub page_size: u32,
    pub current_page: u32,
    pub total_pages: u64,
}

/// Public projection of a sight with its nested associations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SightResponse {
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
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    /// Explicit `null` when the sight has no profile; never omitted.
    pub profile: Option<SightProfileResponse>,
    pub tickets: Vec<TicketResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SightProfileResponse {
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

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketResponse {
    pub id: i64,
    pub sight_id: i64,
    pub name: String,
    pub desc: Option<String>,
    pub kind: Option<String>,
    pub price: f64,
    pub discount: f64,
    pub total: i32,
    pub remain: i32,
    /// ISO calendar date (`YYYY-MM-DD`) when present.
    pub expire_date: Option<String>,
    pub return_policy: Option<String>,
    pub is_valid: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Payload for `POST /api/sight/create/`; the profile is created alongside
/// the sight in the same unit of work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SightCreateRequest {
    pub name: String,
    pub desc: String,
    pub main_img: String,
    pub banner_img: String,
    pub content: String,
    #[serde(default = "default_score")]
    pub score: f64,
    #[serde(default)]
    pub min_price: f64,
    pub province: String,
    pub city: String,
    pub area: Option<String>,
    pub town: Option<String>,
    #[serde(default)]
    pub is_top: bool,
    #[serde(default)]
    pub is_hot: bool,
    #[serde(default = "default_true")]
    pub is_valid: bool,
    pub profile: SightProfileCreateRequest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SightProfileCreateRequest {
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

/// Partial update payload for `PUT /api/sight/update/{id}/`; only supplied
/// fields change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SightUpdateRequest {
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

fn default_score() -> f64 {
    5.0
}

fn default_true() -> bool {
    true
}
