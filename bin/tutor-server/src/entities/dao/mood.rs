use chrono::{DateTime, Utc};

/// A row in the `mood_logs` table.  Written once per user chat turn,
/// read-only thereafter.
#[derive(Debug, Clone)]
pub struct MoodLog {
    pub id: String,
    pub user_id: String,
    pub subject_id: String,
    /// Polarity in [-1, 1].
    pub score: f64,
    /// Intensity in [0, 1].
    pub magnitude: f64,
    /// The user message the score was derived from.
    pub message: String,
    pub created_at: DateTime<Utc>,
}
