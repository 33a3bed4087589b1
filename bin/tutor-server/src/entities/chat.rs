use std::future::Future;

use crate::entities::{dao::ChatMessage, parse_timestamp, SqliteStore};

type MessageRow = (
    String,
    String,
    String,
    String,
    String,
    Option<f64>,
    Option<f64>,
    bool,
    String,
);

pub trait ChatStore: Send + Sync + 'static {
    fn append_message(
        &self,
        msg: ChatMessage,
    ) -> impl Future<Output = Result<(), sqlx::Error>> + Send;

    /// Chronological history (oldest first) for one (user, subject) pair.
    ///
    /// `limit` keeps only the most recent N messages while preserving
    /// chronological output order.
    fn list_history(
        &self,
        user_id: &str,
        subject_id: &str,
        limit: Option<u32>,
    ) -> impl Future<Output = Result<Vec<ChatMessage>, sqlx::Error>> + Send;

    /// Delete every message for the pair.  Idempotent; returns the number
    /// of rows removed.
    fn clear_history(
        &self,
        user_id: &str,
        subject_id: &str,
    ) -> impl Future<Output = Result<u64, sqlx::Error>> + Send;

    /// Flip the saved flag on a message owned by `user_id`.  Returns
    /// `false` when no such message exists.
    fn set_saved(
        &self,
        message_id: &str,
        user_id: &str,
        saved: bool,
    ) -> impl Future<Output = Result<bool, sqlx::Error>> + Send;
}

impl ChatStore for SqliteStore {
    async fn append_message(&self, msg: ChatMessage) -> Result<(), sqlx::Error> {
        let created_at = msg.created_at.to_rfc3339();
        sqlx::query(
            "INSERT INTO chat_messages \
             (id, user_id, subject_id, role, content, sentiment_score, sentiment_magnitude, saved, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .bind(&msg.id)
        .bind(&msg.user_id)
        .bind(&msg.subject_id)
        .bind(&msg.role)
        .bind(&msg.content)
        .bind(msg.sentiment_score)
        .bind(msg.sentiment_magnitude)
        .bind(msg.saved)
        .bind(&created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_history(
        &self,
        user_id: &str,
        subject_id: &str,
        limit: Option<u32>,
    ) -> Result<Vec<ChatMessage>, sqlx::Error> {
        let rows: Vec<MessageRow> = if let Some(limit) = limit {
            // Newest N first, then reversed below so output stays oldest-first.
            let mut rows: Vec<MessageRow> = sqlx::query_as(
                "SELECT id, user_id, subject_id, role, content, sentiment_score, sentiment_magnitude, saved, created_at \
                 FROM chat_messages WHERE user_id = ?1 AND subject_id = ?2 \
                 ORDER BY created_at DESC LIMIT ?3",
            )
            .bind(user_id)
            .bind(subject_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
            rows.reverse();
            rows
        } else {
            sqlx::query_as(
                "SELECT id, user_id, subject_id, role, content, sentiment_score, sentiment_magnitude, saved, created_at \
                 FROM chat_messages WHERE user_id = ?1 AND subject_id = ?2 \
                 ORDER BY created_at ASC",
            )
            .bind(user_id)
            .bind(subject_id)
            .fetch_all(&self.pool)
            .await?
        };
        Ok(rows.into_iter().map(row_to_message).collect())
    }

    async fn clear_history(&self, user_id: &str, subject_id: &str) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM chat_messages WHERE user_id = ?1 AND subject_id = ?2")
                .bind(user_id)
                .bind(subject_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected())
    }

    async fn set_saved(
        &self,
        message_id: &str,
        user_id: &str,
        saved: bool,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE chat_messages SET saved = ?1 WHERE id = ?2 AND user_id = ?3")
                .bind(saved)
                .bind(message_id)
                .bind(user_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn row_to_message(
    (id, user_id, subject_id, role, content, sentiment_score, sentiment_magnitude, saved, created_at): MessageRow,
) -> ChatMessage {
    ChatMessage {
        id,
        user_id,
        subject_id,
        role,
        content,
        sentiment_score,
        sentiment_magnitude,
        saved,
        created_at: parse_timestamp(&created_at, "chat_messages.created_at"),
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;
    use crate::entities::{User, UserStore};
    use chrono::{Duration as ChronoDuration, Utc};
    use std::time::Duration;
    use uuid::Uuid;

    async fn memory_store() -> SqliteStore {
        SqliteStore::connect("sqlite::memory:", 1, Duration::from_secs(5))
            .await
            .unwrap()
    }

    async fn seeded_user(store: &SqliteStore) -> String {
        let user = User {
            id: Uuid::new_v4().to_string(),
            name: "Ada".to_owned(),
            email: format!("{}@x.com", Uuid::new_v4()),
            password_hash: "$argon2id$stub".to_owned(),
            created_at: Utc::now(),
            last_login: None,
        };
        store.insert_user(user.clone()).await.unwrap();
        user.id
    }

    fn message(user_id: &str, role: &str, content: &str, offset_ms: i64) -> ChatMessage {
        ChatMessage {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_owned(),
            subject_id: "mathematics".to_owned(),
            role: role.to_owned(),
            content: content.to_owned(),
            sentiment_score: None,
            sentiment_magnitude: None,
            saved: false,
            created_at: Utc::now() + ChronoDuration::milliseconds(offset_ms),
        }
    }

    #[tokio::test]
    async fn history_is_chronological() {
        let store = memory_store().await;
        let user_id = seeded_user(&store).await;

        for (i, text) in ["first", "second", "third"].iter().enumerate() {
            store
                .append_message(message(&user_id, "user", text, i as i64))
                .await
                .unwrap();
        }

        let history = store
            .list_history(&user_id, "mathematics", None)
            .await
            .unwrap();
        let contents: Vec<&str> = history.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["first", "second", "third"]);

        for pair in history.windows(2) {
            assert!(pair[0].created_at <= pair[1].created_at);
        }
    }

    #[tokio::test]
    async fn limit_keeps_most_recent_in_chronological_order() {
        let store = memory_store().await;
        let user_id = seeded_user(&store).await;

        for i in 0..5 {
            store
                .append_message(message(&user_id, "user", &format!("msg-{i}"), i))
                .await
                .unwrap();
        }

        let history = store
            .list_history(&user_id, "mathematics", Some(2))
            .await
            .unwrap();
        let contents: Vec<&str> = history.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["msg-3", "msg-4"]);
    }

    #[tokio::test]
    async fn clear_history_is_idempotent() {
        let store = memory_store().await;
        let user_id = seeded_user(&store).await;

        store
            .append_message(message(&user_id, "user", "hello", 0))
            .await
            .unwrap();

        let removed = store.clear_history(&user_id, "mathematics").await.unwrap();
        assert_eq!(removed, 1);

        let removed_again = store.clear_history(&user_id, "mathematics").await.unwrap();
        assert_eq!(removed_again, 0);

        let history = store
            .list_history(&user_id, "mathematics", None)
            .await
            .unwrap();
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn set_saved_flips_flag_for_owner_only() {
        let store = memory_store().await;
        let user_id = seeded_user(&store).await;

        let msg = message(&user_id, "ai", "remember this", 0);
        store.append_message(msg.clone()).await.unwrap();

        assert!(store.set_saved(&msg.id, &user_id, true).await.unwrap());
        let history = store
            .list_history(&user_id, "mathematics", None)
            .await
            .unwrap();
        assert!(history[0].saved);

        assert!(!store.set_saved(&msg.id, "someone-else", true).await.unwrap());
        assert!(!store.set_saved("no-such-id", &user_id, true).await.unwrap());
    }
}
