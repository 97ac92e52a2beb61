use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use tracing::info;

use sightline_api_types::{Envelope, SightCreateRequest, SightUpdateRequest};

use crate::application::catalog::{CreateProfileParams, CreateSightParams, UpdateSightParams};
use crate::application::pagination::PageQuery;

use super::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    page: Option<u32>,
    page_size: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    keyword: String,
    page: Option<u32>,
    page_size: Option<u32>,
}

pub async fn root() -> Json<Envelope> {
    Json(Envelope::message("welcome to the sightline api"))
}

pub async fn sight_detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Envelope>, ApiError> {
    Ok(Json(state.reads.detail(id).await?))
}

pub async fn sight_list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Envelope>, ApiError> {
    let query = PageQuery::new(params.page, params.page_size)?;
    Ok(Json(state.reads.list(query).await?))
}

pub async fn hot_sight_list(State(state): State<AppState>) -> Result<Json<Envelope>, ApiError> {
    Ok(Json(state.reads.hot_list().await?))
}

pub async fn fine_sight_list(State(state): State<AppState>) -> Result<Json<Envelope>, ApiError> {
    Ok(Json(state.reads.fine_list().await?))
}

pub async fn search_sights(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Envelope>, ApiError> {
    let query = PageQuery::new(params.page, params.page_size)?;
    Ok(Json(state.reads.search(&params.keyword, query).await?))
}

/// Flush every derived entry under the `sight:` namespace. Unlike the
/// write-path fan-out, a cache failure here is the operation failing and
/// is surfaced.
pub async fn clear_cache(State(state): State<AppState>) -> Result<Json<Envelope>, ApiError> {
    let removed = state.invalidation.clear_namespace().await?;
    info!(
        target = "sightline::http",
        removed, "cleared sight cache namespace"
    );
    Ok(Json(Envelope::message(format!(
        "cache cleared, {removed} entries removed"
    ))))
}

pub async fn create_sight(
    State(state): State<AppState>,
    Json(payload): Json<SightCreateRequest>,
) -> Result<Json<Envelope>, ApiError> {
    let params = create_params(payload);
    Ok(Json(state.writes.create(params).await?))
}

pub async fn update_sight(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<SightUpdateRequest>,
) -> Result<Json<Envelope>, ApiError> {
    let params = update_params(payload);
    Ok(Json(state.writes.update(id, params).await?))
}

pub async fn delete_sight(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Envelope>, ApiError> {
    Ok(Json(state.writes.delete(id).await?))
}

fn create_params(payload: SightCreateRequest) -> CreateSightParams {
    CreateSightParams {
        name: payload.name,
        desc: payload.desc,
        main_img: payload.main_img,
        banner_img: payload.banner_img,
        content: payload.content,
        score: payload.score,
        min_price: payload.min_price,
        province: payload.province,
        city: payload.city,
        area: payload.area,
        town: payload.town,
        is_top: payload.is_top,
        is_hot: payload.is_hot,
        is_valid: payload.is_valid,
        profile: CreateProfileParams {
            img: payload.profile.img,
            address: payload.profile.address,
            explain: payload.profile.explain,
            open_time: payload.profile.open_time,
            tel: payload.profile.tel,
            level: payload.profile.level,
            tags: payload.profile.tags,
            attention: payload.profile.attention,
            location: payload.profile.location,
        },
    }
}

fn update_params(payload: SightUpdateRequest) -> UpdateSightParams {
    UpdateSightParams {
        name: payload.name,
        desc: payload.desc,
        main_img: payload.main_img,
        banner_img: payload.banner_img,
        content: payload.content,
        score: payload.score,
        min_price: payload.min_price,
        province: payload.province,
        city: payload.city,
        area: payload.area,
        town: payload.town,
        is_top: payload.is_top,
        is_hot: payload.is_hot,
        is_valid: payload.is_valid,
    }
}
