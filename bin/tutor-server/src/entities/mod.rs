//! Database abstraction layer.
//!
//! Each persistence concern gets its own trait ([`UserStore`],
//! [`SubjectStore`], [`ChatStore`], [`MoodStore`]); the default
//! implementation for all of them is [`SqliteStore`].  To swap to another
//! database (Postgres, MySQL, …), implement the traits for a new type and
//! change the concrete type in [`crate::state::AppState`].
//!
//! All trait methods use `impl Future` in their signatures (stable since
//! Rust 1.75) so no extra `async-trait` crate is required.

pub mod chat;
pub mod dao;
pub mod mood;
pub mod subject;
pub mod user;

pub use chat::ChatStore;
pub use dao::{ChatMessage, MoodLog, Subject, User};
pub use mood::MoodStore;
pub use subject::SubjectStore;
pub use user::UserStore;

use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;

/// SQLite-backed store.
#[derive(Clone, Debug)]
pub struct SqliteStore {
    pub(crate) pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the SQLite database at `url` and run pending
    /// migrations.
    ///
    /// `url` should be a sqlx-compatible SQLite URL, e.g.
    /// `"sqlite://tutor.db"` or `"sqlite::memory:"` for tests.  The pool is
    /// bounded: callers wait up to `acquire_timeout` for a free connection.
    ///
    /// `sqlx::migrate!("./migrations")` resolves the path **at compile
    /// time** relative to `CARGO_MANIFEST_DIR`, so the migration files are
    /// embedded into the binary.
    pub async fn connect(
        url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5))
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    /// Cheap liveness probe for the health endpoint.
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Parse a stored RFC 3339 timestamp, falling back to `now` with a warning
/// rather than failing the whole query on one corrupt row.
pub(crate) fn parse_timestamp(raw: &str, column: &str) -> DateTime<Utc> {
    raw.parse().unwrap_or_else(|e: chrono::ParseError| {
        tracing::warn!(raw = %raw, column = %column, error = %e, "failed to parse stored timestamp; using now");
        Utc::now()
    })
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;

    pub(crate) async fn memory_store() -> SqliteStore {
        SqliteStore::connect("sqlite::memory:", 1, Duration::from_secs(5))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn connect_runs_migrations() {
        let store = memory_store().await;
        store.ping().await.unwrap();

        let subject_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM subjects")
            .fetch_one(&store.pool)
            .await
            .unwrap();
        assert_eq!(subject_count, 8);
    }

    #[tokio::test]
    async fn foreign_keys_are_enforced() {
        let store = memory_store().await;

        let result = sqlx::query(
            "INSERT INTO chat_messages (id, user_id, subject_id, role, content, saved, created_at) \
             VALUES ('m1', 'no-such-user', 'mathematics', 'user', 'hi', 0, '2026-01-01T00:00:00+00:00')",
        )
        .execute(&store.pool)
        .await;
        assert!(result.is_err());
    }
}
