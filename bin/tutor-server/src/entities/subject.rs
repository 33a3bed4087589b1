use std::future::Future;

use crate::entities::{dao::Subject, SqliteStore};

pub trait SubjectStore: Send + Sync + 'static {
    fn list_subjects(&self) -> impl Future<Output = Result<Vec<Subject>, sqlx::Error>> + Send;
    /// Exact match on the display name (what chat clients send).
    fn get_subject_by_name(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<Subject>, sqlx::Error>> + Send;
}

impl SubjectStore for SqliteStore {
    async fn list_subjects(&self) -> Result<Vec<Subject>, sqlx::Error> {
        let rows: Vec<(String, String, String, String)> =
            sqlx::query_as("SELECT id, name, color, icon FROM subjects ORDER BY name")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows
            .into_iter()
            .map(|(id, name, color, icon)| Subject { id, name, color, icon })
            .collect())
    }

    async fn get_subject_by_name(&self, name: &str) -> Result<Option<Subject>, sqlx::Error> {
        let row: Option<(String, String, String, String)> =
            sqlx::query_as("SELECT id, name, color, icon FROM subjects WHERE name = ?1")
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(id, name, color, icon)| Subject { id, name, color, icon }))
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
