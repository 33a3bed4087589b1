//! Registration and login.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;
use tracing::info;
use utoipa::OpenApi;
use uuid::Uuid;
use validator::Validate;

use crate::auth::password;
use crate::entities::{User, UserStore};
use crate::error::ServerError;
use crate::schemas::auth::{AuthResponse, LoginRequest, SignupRequest};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(signup, login),
    components(schemas(SignupRequest, LoginRequest, AuthResponse))
)]
pub struct AuthApi;

/// Register signup / login routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
}

/// Create an account (`POST /api/signup`).
#[utoipa::path(
    post,
    path = "/api/signup",
    tag = "auth",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid fields"),
        (status = 409, description = "Email already registered"),
    )
)]
pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ServerError> {
    req.validate()
        .map_err(|e| ServerError::BadRequest(e.to_string()))?;

    if state.store.get_user_by_email(&req.email).await?.is_some() {
        return Err(ServerError::Conflict("email already registered".to_owned()));
    }

    let password_hash = password::hash(&req.password)
        .map_err(|e| ServerError::Internal(format!("password hashing failed: {e}")))?;

    let user = User {
        id: Uuid::new_v4().to_string(),
        name: req.name,
        email: req.email,
        password_hash,
        created_at: Utc::now(),
        last_login: None,
    };

    if let Err(e) = state.store.insert_user(user.clone()).await {
        // Two concurrent signups can pass the lookup above; the UNIQUE
        // constraint is the arbiter.
        if is_unique_violation(&e) {
            return Err(ServerError::Conflict("email already registered".to_owned()));
        }
        return Err(e.into());
    }

    let token = state
        .tokens
        .issue(&user.id)
        .map_err(|e| ServerError::Internal(format!("token issuance failed: {e}")))?;

    info!(user_id = %user.id, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user_id: user.id,
            token,
        }),
    ))
}

/// Authenticate with email and password (`POST /api/login`).
#[utoipa::path(
    post,
    path = "/api/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = AuthResponse),
        (status = 400, description = "Invalid fields"),
        (status = 401, description = "Invalid email or password"),
    )
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ServerError> {
    req.validate()
        .map_err(|e| ServerError::BadRequest(e.to_string()))?;

    let user = match state.store.get_user_by_email(&req.email).await? {
        Some(user) if password::verify(&req.password, &user.password_hash) => user,
        Some(_) => return Err(ServerError::InvalidCredentials),
        None => {
            // A verification runs even for unknown emails; the response must
            // not reveal which of the two fields was wrong.
            let _ = password::verify(&req.password, password::dummy_hash());
            return Err(ServerError::InvalidCredentials);
        }
    };

    state.store.touch_last_login(&user.id, Utc::now()).await?;

    let token = state
        .tokens
        .issue(&user.id)
        .map_err(|e| ServerError::Internal(format!("token issuance failed: {e}")))?;

    info!(user_id = %user.id, "user logged in");
    Ok(Json(AuthResponse {
        user_id: user.id,
        token,
    }))
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}
