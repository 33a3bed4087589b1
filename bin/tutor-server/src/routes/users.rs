//! User profile lookup.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Extension, Json, Router};
use utoipa::OpenApi;

use crate::error::ServerError;
use crate::middleware::auth::{ensure_owner, AuthUser};
use crate::entities::UserStore;
use crate::schemas::auth::UserProfile;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(get_user), components(schemas(UserProfile)))]
pub struct UsersApi;

/// Register user routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/user/{user_id}", get(get_user))
}

/// Fetch the authenticated user's profile (`GET /api/user/{user_id}`).
#[utoipa::path(
    get,
    path = "/api/user/{user_id}",
    tag = "users",
    responses(
        (status = 200, description = "User profile", body = UserProfile),
        (status = 403, description = "Token names another user"),
        (status = 404, description = "User not found"),
    )
)]
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<String>,
) -> Result<Json<UserProfile>, ServerError> {
    ensure_owner(&auth, &user_id)?;

    let user = state
        .store
        .get_user(&user_id)
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("user {user_id}")))?;

    Ok(Json(user.to_profile()))
}
