use chrono::{DateTime, Utc};

/// A single message row in the `chat_messages` table.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub id: String,
    pub user_id: String,
    pub subject_id: String,
    /// `"user"`, `"ai"`, or `"system"`.
    pub role: String,
    pub content: String,
    /// Set on user messages only; the AI's replies are not scored.
    pub sentiment_score: Option<f64>,
    pub sentiment_magnitude: Option<f64>,
    /// The only field ever mutated after insert.
    pub saved: bool,
    pub created_at: DateTime<Utc>,
}
