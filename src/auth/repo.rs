use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::auth::repo_types::{CreateUserError, NewUser, User};

/// Storage for user accounts. Email uniqueness is the store's job, not the caller's.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    async fn create(&self, new_user: &NewUser) -> Result<User, CreateUserError>;
}

#[derive(Clone)]
pub struct PgUserRepository {
    db: PgPool,
}

impl PgUserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    /// Find a user by (normalized) email.
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, fullname, username, email, phone, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .context("select user by email")?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, fullname, username, email, phone, password_hash, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("select user by id")?;
        Ok(user)
    }

    /// Insert a new user. A taken email surfaces as `DuplicateEmail` via the
    /// `users_email_key` unique constraint.
    async fn create(&self, new_user: &NewUser) -> Result<User, CreateUserError> {
        let result = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (fullname, username, email, phone, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, fullname, username, email, phone, password_hash, created_at
            "#,
        )
        .bind(&new_user.fullname)
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.phone)
        .bind(&new_user.password_hash)
        .fetch_one(&self.db)
        .await;

        match result {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                debug!(constraint = ?db_err.constraint(), "unique violation on insert");
                Err(CreateUserError::DuplicateEmail(new_user.email.clone()))
            }
            Err(e) => Err(CreateUserError::Other(
                anyhow::Error::new(e).context("insert user"),
            )),
        }
    }
}

#[cfg(test)]
pub use memory::MemoryUserRepository;

#[cfg(test)]
mod memory {
    use super::*;
    use time::OffsetDateTime;
    use tokio::sync::RwLock;

    #[derive(Default)]
    pub struct MemoryUserRepository {
        users: RwLock<Vec<User>>,
    }

    impl MemoryUserRepository {
        pub async fn count(&self) -> usize {
            self.users.read().await.len()
        }
    }

    #[async_trait]
    impl UserRepository for MemoryUserRepository {
        async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
            let users = self.users.read().await;
            Ok(users.iter().find(|u| u.email == email).cloned())
        }

        async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
            let users = self.users.read().await;
            Ok(users.iter().find(|u| u.id == id).cloned())
        }

        async fn create(&self, new_user: &NewUser) -> Result<User, CreateUserError> {
            // check and insert under one write lock, same guarantee as the unique index
            let mut users = self.users.write().await;
            if users.iter().any(|u| u.email == new_user.email) {
                return Err(CreateUserError::DuplicateEmail(new_user.email.clone()));
            }
            let user = User {
                id: Uuid::new_v4(),
                fullname: new_user.fullname.clone(),
                username: new_user.username.clone(),
                email: new_user.email.clone(),
                phone: new_user.phone.clone(),
                password_hash: new_user.password_hash.clone(),
                created_at: OffsetDateTime::now_utc(),
            };
            users.push(user.clone());
            Ok(user)
        }
    }
}
