use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{ChatMessage, MoodLog};

/// Query string for `GET /api/history/{user_id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryQuery {
    /// Subject display name; required.
    pub subject: Option<String>,
    /// Keep only the most recent N messages.
    pub limit: Option<u32>,
}

/// Query string for `GET /api/moodlogs/{user_id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct MoodQuery {
    /// Restrict to entries from the last N days.
    pub days: Option<u32>,
}

/// Request body for `DELETE /api/clear-history/{user_id}`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ClearHistoryRequest {
    pub subject: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub history: Vec<MessageResponse>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: String,
    pub user_id: String,
    pub subject_id: String,
    pub role: String,
    pub content: String,
    pub sentiment_score: Option<f64>,
    pub sentiment_magnitude: Option<f64>,
    pub saved: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MoodLogsResponse {
    pub mood_logs: Vec<MoodLogResponse>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MoodLogResponse {
    pub id: String,
    pub user_id: String,
    pub subject_id: String,
    pub score: f64,
    pub magnitude: f64,
    pub message: String,
    pub created_at: String,
}

impl ChatMessage {
    pub fn to_response(&self) -> MessageResponse {
        MessageResponse {
            id: self.id.clone(),
            user_id: self.user_id.clone(),
            subject_id: self.subject_id.clone(),
            role: self.role.clone(),
            content: self.content.clone(),
            sentiment_score: self.sentiment_score,
            sentiment_magnitude: self.sentiment_magnitude,
            saved: self.saved,
            created_at: self.created_at.to_rfc3339(),
        }
    }
}

impl MoodLog {
    pub fn to_response(&self) -> MoodLogResponse {
        MoodLogResponse {
            id: self.id.clone(),
            user_id: self.user_id.clone(),
            subject_id: self.subject_id.clone(),
            score: self.score,
            magnitude: self.magnitude,
            message: self.message.clone(),
            created_at: self.created_at.to_rfc3339(),
        }
    }
}
