//! Axum router construction.
//!
//! [`build`] assembles the complete application router, including:
//! - Middleware layers (CORS, per-request trace-id injection)
//! - Bearer-token auth on the protected route group
//! - Optional Swagger UI / OpenAPI spec endpoint (disable with `TUTOR_ENABLE_SWAGGER=false`)
//! - A JSON 404 fallback for unrecognised routes

mod auth;
mod chat;
pub mod doc;
mod health;
mod history;
mod subjects;
mod upload;
mod users;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{middleware, Json, Router};
use serde_json::json;
use tower::ServiceBuilder;
use utoipa_swagger_ui::SwaggerUi;

use crate::middleware::auth::require_auth;
use crate::middleware::{cors, trace};
use crate::state::AppState;

/// Build the complete Axum [`Router`] for the application.
pub fn build(state: Arc<AppState>) -> Router {
    let public = Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(subjects::router());

    let protected = Router::new()
        .merge(users::router())
        .merge(chat::router())
        .merge(upload::router())
        .merge(history::router())
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            require_auth,
        ));

    let mut app = Router::new().nest("/api", public.merge(protected));

    // ── Swagger UI ────────────────────────────────────────────────────────────
    // Enabled by default; disable with TUTOR_ENABLE_SWAGGER=false in
    // production to avoid exposing the API structure to potential attackers.
    if state.config.enable_swagger {
        app = app.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", doc::get_docs()));
    }

    app.fallback(not_found)
        // Outermost layers execute first on the way in.
        .layer(ServiceBuilder::new().layer(cors::cors_layer(&state.config)))
        .layer(middleware::from_fn(trace::trace_middleware))
        .with_state(state)
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" })))
}
