use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::models::User;
use crate::database::StoreError;

/// Credential store with document-style CRUD semantics.
///
/// A trait seam so the HTTP layer can be exercised against an in-memory fake;
/// production wires up [`PgUserStore`].
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Lookup by case-normalized email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Insert a new user; a concurrent duplicate email surfaces as
    /// [`StoreError::Duplicate`] via the unique index.
    async fn insert_one(&self, user: &User) -> Result<(), StoreError>;

    /// Connectivity probe for the health endpoint.
    async fn health_check(&self) -> Result<(), StoreError>;
}

pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, display_name, created_at
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn insert_one(&self, user: &User) -> Result<(), StoreError> {
        let result = sqlx::query(
            "INSERT INTO users (id, email, password_hash, display_name, created_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.display_name)
        .bind(user.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(StoreError::Duplicate(user.email.clone()))
            }
            Err(other) => Err(other.into()),
        }
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        crate::database::manager::health_check(&self.pool).await
    }
}
