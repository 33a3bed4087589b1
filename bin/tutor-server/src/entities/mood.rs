use std::future::Future;

use chrono::{Duration, Utc};

use crate::entities::{dao::MoodLog, parse_timestamp, SqliteStore};

type MoodRow = (String, String, String, f64, f64, String, String);

pub trait MoodStore: Send + Sync + 'static {
    fn append_mood(&self, log: MoodLog) -> impl Future<Output = Result<(), sqlx::Error>> + Send;

    /// All of a user's mood entries across subjects, newest first,
    /// optionally restricted to the last `days` days.
    fn list_mood_logs(
        &self,
        user_id: &str,
        days: Option<u32>,
    ) -> impl Future<Output = Result<Vec<MoodLog>, sqlx::Error>> + Send;

    /// Delete every mood entry for one (user, subject) pair.  Idempotent.
    fn clear_mood_logs(
        &self,
        user_id: &str,
        subject_id: &str,
    ) -> impl Future<Output = Result<u64, sqlx::Error>> + Send;
}

impl MoodStore for SqliteStore {
    async fn append_mood(&self, log: MoodLog) -> Result<(), sqlx::Error> {
        let created_at = log.created_at.to_rfc3339();
        sqlx::query(
            "INSERT INTO mood_logs (id, user_id, subject_id, score, magnitude, message, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(&log.id)
        .bind(&log.user_id)
        .bind(&log.subject_id)
        .bind(log.score)
        .bind(log.magnitude)
        .bind(&log.message)
        .bind(&created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_mood_logs(
        &self,
        user_id: &str,
        days: Option<u32>,
    ) -> Result<Vec<MoodLog>, sqlx::Error> {
        let rows: Vec<MoodRow> = if let Some(days) = days {
            // RFC 3339 UTC strings compare lexicographically in time order.
            let cutoff = (Utc::now() - Duration::days(i64::from(days))).to_rfc3339();
            sqlx::query_as(
                "SELECT id, user_id, subject_id, score, magnitude, message, created_at \
                 FROM mood_logs WHERE user_id = ?1 AND created_at >= ?2 \
                 ORDER BY created_at DESC",
            )
            .bind(user_id)
            .bind(&cutoff)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as(
                "SELECT id, user_id, subject_id, score, magnitude, message, created_at \
                 FROM mood_logs WHERE user_id = ?1 \
                 ORDER BY created_at DESC",
            )
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?
        };
        Ok(rows.into_iter().map(row_to_mood).collect())
    }

    async fn clear_mood_logs(&self, user_id: &str, subject_id: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM mood_logs WHERE user_id = ?1 AND subject_id = ?2")
            .bind(user_id)
            .bind(subject_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

fn row_to_mood(
    (id, user_id, subject_id, score, magnitude, message, created_at): MoodRow,
) -> MoodLog {
    MoodLog {
        id,
        user_id,
        subject_id,
        score,
        magnitude,
        message,
        created_at: parse_timestamp(&created_at, "mood_logs.created_at"),
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
