use std::future::Future;

use chrono::{DateTime, Utc};

use crate::entities::{dao::User, parse_timestamp, SqliteStore};

type UserRow = (String, String, String, String, String, Option<String>);

pub trait UserStore: Send + Sync + 'static {
    fn insert_user(&self, user: User) -> impl Future<Output = Result<(), sqlx::Error>> + Send;
    fn get_user(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<User>, sqlx::Error>> + Send;
    /// Case-sensitive exact match on the stored email.
    fn get_user_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<User>, sqlx::Error>> + Send;
    fn touch_last_login(
        &self,
        id: &str,
        when: DateTime<Utc>,
    ) -> impl Future<Output = Result<(), sqlx::Error>> + Send;
}

impl UserStore for SqliteStore {
    async fn insert_user(&self, user: User) -> Result<(), sqlx::Error> {
        let created_at = user.created_at.to_rfc3339();
        let last_login = user.last_login.map(|t| t.to_rfc3339());
        sqlx::query(
            "INSERT INTO users (id, name, email, password_hash, created_at, last_login) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&created_at)
        .bind(&last_login)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>, sqlx::Error> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, name, email, password_hash, created_at, last_login \
             FROM users WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(row_to_user))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, name, email, password_hash, created_at, last_login \
             FROM users WHERE email = ?1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(row_to_user))
    }

    async fn touch_last_login(&self, id: &str, when: DateTime<Utc>) -> Result<(), sqlx::Error> {
        let when = when.to_rfc3339();
        sqlx::query("UPDATE users SET last_login = ?1 WHERE id = ?2")
            .bind(&when)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn row_to_user((id, name, email, password_hash, created_at, last_login): UserRow) -> User {
    User {
        id,
        name,
        email,
        password_hash,
        created_at: parse_timestamp(&created_at, "users.created_at"),
        last_login: last_login.map(|t| parse_timestamp(&t, "users.last_login")),
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
