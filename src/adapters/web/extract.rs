//! Bearer-token authentication extractor.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use std::sync::Arc;

use crate::ports::auth_port::Owner;

use super::{AppState, WebError};

/// The authenticated account for a request. Rejects with 401 when the
/// `Authorization: Bearer` header is absent or the token resolves to no
/// account.
pub struct AuthOwner(pub Owner);

impl FromRequestParts<Arc<AppState>> for AuthOwner {
    type Rejection = WebError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| WebError::unauthorized("Missing Authorization header"))?;

        match state.auth.resolve_token(token)? {
            Some(owner) => Ok(AuthOwner(owner)),
            None => Err(WebError::unauthorized("Unauthorized user")),
        }
    }
}
