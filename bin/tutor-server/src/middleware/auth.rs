//! Bearer-token authentication middleware.
//!
//! Applied to every protected route.  A missing header yields 401; a token
//! that is malformed, badly signed, or expired yields 403.  On success the
//! verified user id is attached to the request as an [`AuthUser`] extension.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request};
use axum::middleware::Next;
use axum::response::Response;
use tracing::debug;

use crate::error::ServerError;
use crate::state::AppState;

/// The authenticated user id, extracted from the verified session token.
#[derive(Debug, Clone)]
pub struct AuthUser(pub String);

pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ServerError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| ServerError::Unauthenticated("missing bearer token".to_owned()))?;

    let user_id = state.tokens.verify(token).map_err(|e| {
        debug!(error = %e, "token verification failed");
        ServerError::Forbidden("invalid or expired token".to_owned())
    })?;

    req.extensions_mut().insert(AuthUser(user_id));
    Ok(next.run(req).await)
}

/// Requests that name a user id must name the authenticated user.
pub fn ensure_owner(auth: &AuthUser, user_id: &str) -> Result<(), ServerError> {
    if auth.0 != user_id {
        return Err(ServerError::Forbidden(
            "token does not match requested user".to_owned(),
        ));
    }
    Ok(())
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn ensure_owner_accepts_matching_id() {
        let auth = AuthUser("user-1".to_owned());
        assert!(ensure_owner(&auth, "user-1").is_ok());
    }

    #[test]
    fn ensure_owner_rejects_other_id() {
        let auth = AuthUser("user-1".to_owned());
        assert!(matches!(
            ensure_owner(&auth, "user-2"),
            Err(ServerError::Forbidden(_))
        ));
    }
}
