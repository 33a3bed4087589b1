//! The chat endpoint.
//!
//! Delegates to [`crate::chat::orchestrator`], which guarantees a non-empty
//! reply whether or not the completion provider is reachable.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Extension, Json, Router};
use utoipa::OpenApi;

use crate::chat::orchestrator;
use crate::chat::sentiment::Sentiment;
use crate::error::ServerError;
use crate::middleware::auth::{ensure_owner, AuthUser};
use crate::schemas::chat::{ChatRequest, ChatResponse};
use crate::state::AppState;

/// Maximum allowed message length in bytes to prevent memory exhaustion.
const MAX_MESSAGE_BYTES: usize = 16 * 1024; // 16 KiB

#[derive(OpenApi)]
#[openapi(paths(chat), components(schemas(ChatRequest, ChatResponse, Sentiment)))]
pub struct ChatApi;

/// Register chat routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/chat", post(chat))
}

/// One tutoring chat turn (`POST /api/chat`).
#[utoipa::path(
    post,
    path = "/api/chat",
    tag = "chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Reply generated", body = ChatResponse),
        (status = 400, description = "Bad request or unknown subject"),
        (status = 500, description = "Storage error"),
    )
)]
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ServerError> {
    ensure_owner(&auth, &req.user_id)?;

    let message = req.message.trim();
    if message.is_empty() {
        return Err(ServerError::BadRequest("message must not be empty".to_owned()));
    }
    if message.len() > MAX_MESSAGE_BYTES {
        return Err(ServerError::BadRequest(format!(
            "message too large ({} bytes); maximum is {} bytes",
            message.len(),
            MAX_MESSAGE_BYTES,
        )));
    }

    let reply = orchestrator::handle_chat(
        state.store.as_ref(),
        state.context_cache.as_ref(),
        state.provider.as_ref(),
        state.sentiment.as_ref(),
        &req.user_id,
        &req.subject,
        message,
    )
    .await?;

    Ok(Json(ChatResponse {
        ai_response: reply.outcome.text().to_owned(),
        sentiment: reply.sentiment,
    }))
}
