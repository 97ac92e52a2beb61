//! HTTP surface: router, handlers, middleware and error mapping.

mod auth;
mod error;
mod middleware;
mod sights;
mod tickets;

pub use auth::require_sight_admin;
pub use error::ApiError;
pub use middleware::{RequestContext, log_responses, set_request_context};

use std::sync::Arc;

use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post, put},
};

use crate::application::invalidation::InvalidationCoordinator;
use crate::application::principal::PrincipalVerifier;
use crate::application::reads::SightReadService;
use crate::application::tickets::TicketReadService;
use crate::application::writes::SightWriteService;

/// Handles for every request, built once by the composition root and
/// injected here; no ambient globals.
#[derive(Clone)]
pub struct AppState {
    pub reads: Arc<SightReadService>,
    pub tickets: Arc<TicketReadService>,
    pub writes: Arc<SightWriteService>,
    pub invalidation: Arc<InvalidationCoordinator>,
    pub verifier: Arc<dyn PrincipalVerifier>,
}

pub fn build_router(state: AppState) -> Router {
    let admin_routes = Router::new()
        .route("/api/sight/create/", post(sights::create_sight))
        .route("/api/sight/update/{id}/", put(sights::update_sight))
        .route("/api/sight/delete/{id}/", delete(sights::delete_sight))
        .route_layer(from_fn_with_state(state.clone(), require_sight_admin));

    Router::new()
        .route("/", get(sights::root))
        .route("/api/sight/detail/{id}/", get(sights::sight_detail))
        .route("/api/sight/list/", get(sights::sight_list))
        .route("/api/sight/hot/list/", get(sights::hot_sight_list))
        .route("/api/sight/fine/list/", get(sights::fine_sight_list))
        .route("/api/sight/search/", get(sights::search_sights))
        .route("/api/sight/ticket/{id}/", get(tickets::ticket_detail))
        .route("/api/sight/ticket/list/", get(tickets::ticket_list))
        .route(
            "/api/sight/ticket/sight/{sight_id}/",
            get(tickets::tickets_by_sight),
        )
        .route("/api/sight/clear-cache/", post(sights::clear_cache))
        .merge(admin_routes)
        .layer(from_fn(log_responses))
        .layer(from_fn(set_request_context))
        .with_state(state)
}
