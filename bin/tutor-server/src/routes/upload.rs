//! Uploaded-document context.
//!
//! The front-end extracts text from a PDF client-side and posts it here;
//! the text is held in the in-process [`crate::chat::context::ContextCache`]
//! and spliced into later chat prompts for the same (user, subject) pair.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Extension, Json, Router};
use tracing::info;
use utoipa::OpenApi;

use crate::error::ServerError;
use crate::middleware::auth::{ensure_owner, AuthUser};
use crate::schemas::chat::{MessageBody, UploadContextRequest};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(upload_pdf_content), components(schemas(UploadContextRequest, MessageBody)))]
pub struct UploadApi;

/// Register upload routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/upload-pdf-content", post(upload_pdf_content))
}

/// Store extracted document text (`POST /api/upload-pdf-content`).
///
/// Re-uploading for the same (user, subject) pair replaces the previous
/// text.  Entries are never persisted and vanish on restart.
#[utoipa::path(
    post,
    path = "/api/upload-pdf-content",
    tag = "upload",
    request_body = UploadContextRequest,
    responses(
        (status = 200, description = "Context stored", body = MessageBody),
        (status = 400, description = "Empty content"),
    )
)]
pub async fn upload_pdf_content(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<UploadContextRequest>,
) -> Result<Json<MessageBody>, ServerError> {
    ensure_owner(&auth, &req.user_id)?;

    if req.content.trim().is_empty() {
        return Err(ServerError::BadRequest("content must not be empty".to_owned()));
    }

    state
        .context_cache
        .store(&req.user_id, &req.subject, req.content);

    info!(
        user_id = %req.user_id,
        subject = %req.subject,
        file = %req.file_name,
        "reference context stored"
    );

    Ok(Json(MessageBody {
        message: format!(
            "Content from {} is ready to use in {} chats",
            req.file_name, req.subject
        ),
    }))
}
