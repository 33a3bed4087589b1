//! Conversation history, mood logs, and message management.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::{delete, get, post};
use axum::{Extension, Json, Router};
use tracing::info;
use utoipa::OpenApi;

use crate::entities::{ChatStore, MoodStore, SubjectStore};
use crate::error::ServerError;
use crate::middleware::auth::{ensure_owner, AuthUser};
use crate::schemas::chat::{MessageBody, SaveMessageRequest};
use crate::schemas::history::{
    ClearHistoryRequest, HistoryQuery, HistoryResponse, MessageResponse, MoodLogResponse,
    MoodLogsResponse, MoodQuery,
};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(get_history, get_mood_logs, clear_history, save_message),
    components(schemas(HistoryResponse, MessageResponse, MoodLogsResponse, MoodLogResponse))
)]
pub struct HistoryApi;

/// Register history / mood routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/history/{user_id}", get(get_history))
        .route("/moodlogs/{user_id}", get(get_mood_logs))
        .route("/clear-history/{user_id}", delete(clear_history))
        .route("/messages/{id}/save", post(save_message))
}

/// Chronological chat history for one subject
/// (`GET /api/history/{user_id}?subject=&limit=`).
#[utoipa::path(
    get,
    path = "/api/history/{user_id}",
    tag = "history",
    responses(
        (status = 200, description = "Messages, oldest first", body = HistoryResponse),
        (status = 400, description = "Missing or unknown subject"),
    )
)]
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, ServerError> {
    ensure_owner(&auth, &user_id)?;

    let subject_name = query
        .subject
        .ok_or_else(|| ServerError::BadRequest("missing subject query parameter".to_owned()))?;
    let subject = state
        .store
        .get_subject_by_name(&subject_name)
        .await?
        .ok_or_else(|| ServerError::BadRequest(format!("unknown subject: {subject_name}")))?;

    let history = state
        .store
        .list_history(&user_id, &subject.id, query.limit)
        .await?;

    Ok(Json(HistoryResponse {
        history: history.iter().map(|m| m.to_response()).collect(),
    }))
}

/// Mood entries across all subjects, newest first
/// (`GET /api/moodlogs/{user_id}?days=`).
#[utoipa::path(
    get,
    path = "/api/moodlogs/{user_id}",
    tag = "history",
    responses(
        (status = 200, description = "Mood entries, newest first", body = MoodLogsResponse),
    )
)]
pub async fn get_mood_logs(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<String>,
    Query(query): Query<MoodQuery>,
) -> Result<Json<MoodLogsResponse>, ServerError> {
    ensure_owner(&auth, &user_id)?;

    let logs = state.store.list_mood_logs(&user_id, query.days).await?;

    Ok(Json(MoodLogsResponse {
        mood_logs: logs.iter().map(|l| l.to_response()).collect(),
    }))
}

/// Delete all messages and mood entries for one subject
/// (`DELETE /api/clear-history/{user_id}`).  Idempotent.
#[utoipa::path(
    delete,
    path = "/api/clear-history/{user_id}",
    tag = "history",
    responses(
        (status = 200, description = "History cleared", body = MessageBody),
        (status = 400, description = "Unknown subject"),
    )
)]
pub async fn clear_history(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<String>,
    Json(req): Json<ClearHistoryRequest>,
) -> Result<Json<MessageBody>, ServerError> {
    ensure_owner(&auth, &user_id)?;

    let subject = state
        .store
        .get_subject_by_name(&req.subject)
        .await?
        .ok_or_else(|| ServerError::BadRequest(format!("unknown subject: {}", req.subject)))?;

    let removed = state.store.clear_history(&user_id, &subject.id).await?;
    state.store.clear_mood_logs(&user_id, &subject.id).await?;

    info!(user_id = %user_id, subject = %subject.name, removed, "history cleared");
    Ok(Json(MessageBody {
        message: format!("Cleared {} history", subject.name),
    }))
}

/// Flip the saved flag on one owned message
/// (`POST /api/messages/{id}/save`).
#[utoipa::path(
    post,
    path = "/api/messages/{id}/save",
    tag = "history",
    responses(
        (status = 200, description = "Flag updated", body = MessageBody),
        (status = 404, description = "No such message for this user"),
    )
)]
pub async fn save_message(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(req): Json<SaveMessageRequest>,
) -> Result<Json<MessageBody>, ServerError> {
    ensure_owner(&auth, &req.user_id)?;

    let updated = state.store.set_saved(&id, &req.user_id, req.saved).await?;
    if !updated {
        return Err(ServerError::NotFound(format!("message {id}")));
    }

    Ok(Json(MessageBody {
        message: if req.saved {
            "Message saved".to_owned()
        } else {
            "Message unsaved".to_owned()
        },
    }))
}
