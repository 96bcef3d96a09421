use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
};
use std::sync::Arc;

use super::{ApiError, AppState};

/// Authenticated caller identity, resolved from `Authorization: Bearer`.
///
/// Handlers take this as an argument instead of reading ambient request
/// state, so the ownership checks below always name the identity they run
/// against. Every failure mode (missing header, malformed value, unknown
/// token) surfaces as the same uniform 401.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub id: i32,
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(&parts.headers) else {
            return Err(ApiError::Unauthenticated);
        };

        let user_id = state
            .store()
            .resolve_token(&token)
            .await
            .map_err(|e| ApiError::internal(format!("Token lookup failed: {e}")))?;

        match user_id {
            Some(id) => Ok(Self { id }),
            None => Err(ApiError::Unauthenticated),
        }
    }
}

/// Extract the bearer secret from the Authorization header
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    if let Some(auth_header) = headers.get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        let token = token.trim();
        if !token.is_empty() {
            return Some(token.to_string());
        }
    }

    None
}
