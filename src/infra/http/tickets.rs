use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use sightline_api_types::Envelope;

use super::{AppState, error::ApiError};

const DEFAULT_LIMIT: u32 = 100;

#[derive(Debug, Deserialize)]
pub struct TicketListParams {
    skip: Option<u64>,
    limit: Option<u32>,
}

pub async fn ticket_detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Envelope>, ApiError> {
    Ok(Json(state.tickets.detail(id).await?))
}

pub async fn ticket_list(
    State(state): State<AppState>,
    Query(params): Query<TicketListParams>,
) -> Result<Json<Envelope>, ApiError> {
    let skip = params.skip.unwrap_or(0);
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
    Ok(Json(state.tickets.list(skip, limit).await?))
}

pub async fn tickets_by_sight(
    State(state): State<AppState>,
    Path(sight_id): Path<i64>,
) -> Result<Json<Envelope>, ApiError> {
    Ok(Json(state.tickets.by_sight(sight_id).await?))
}
