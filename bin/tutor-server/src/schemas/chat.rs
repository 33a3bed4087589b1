use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::chat::sentiment::Sentiment;

/// Request body for `POST /api/chat`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub user_id: String,
    pub message: String,
    /// Subject display name, e.g. `"Quantum Physics"`.
    pub subject: String,
}

/// Response body for `POST /api/chat`.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub ai_response: String,
    pub sentiment: Sentiment,
}

/// Request body for `POST /api/upload-pdf-content`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadContextRequest {
    pub user_id: String,
    pub subject: String,
    pub file_name: String,
    /// Text extracted from the uploaded document by the front-end.
    pub content: String,
}

/// Request body for `POST /api/messages/{id}/save`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveMessageRequest {
    pub user_id: String,
    pub saved: bool,
}

/// Generic `{"message": …}` acknowledgement body.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MessageBody {
    pub message: String,
}
