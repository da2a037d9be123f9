use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub fullname: String,
    pub username: String,
    /// Unique, stored lowercased.
    pub email: String,
    pub phone: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    pub created_at: OffsetDateTime,
}

/// Insert payload for a new account. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub fullname: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateUserError {
    #[error("a user already exists with email {0}")]
    DuplicateEmail(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
