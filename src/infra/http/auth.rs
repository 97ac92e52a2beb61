use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::application::principal::{AuthError, Role};

use super::{AppState, error::ApiError};

/// Route layer for write endpoints. Verifies the bearer token and requires
/// the `sight_admin` role before the handler, and therefore the store or
/// cache, is reached.
pub async fn require_sight_admin(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let principal = match bearer_token(&request).and_then(|token| state.verifier.verify(token)) {
        Ok(principal) => principal,
        Err(error) => return ApiError::from(error).into_response(),
    };
    if let Err(error) = principal.require(Role::SightAdmin) {
        return ApiError::from(error).into_response();
    }

    request.extensions_mut().insert(principal.clone());
    let mut response = next.run(request).await;
    response.extensions_mut().insert(principal);
    response
}

fn bearer_token(request: &Request<Body>) -> Result<&str, AuthError> {
    let header = request
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::Missing)?
        .to_str()
        .map_err(|_| AuthError::Invalid)?;
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::Invalid)
}
