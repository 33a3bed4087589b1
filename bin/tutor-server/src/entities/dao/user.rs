use chrono::{DateTime, Utc};

/// A row in the `users` table.
#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub name: String,
    /// Unique; matched case-sensitively against the stored value.
    pub email: String,
    /// Argon2id PHC string; never serialized to clients.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}
