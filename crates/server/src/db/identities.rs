//! Identity repository.
//!
//! Queries use runtime-checked sqlx so the crate builds without a live
//! database; the row shapes are covered by the migration in
//! `migrations/0001_init.sql`.

use async_trait::async_trait;
use sqlx::PgPool;

use bistro_core::{Email, IdentityId, Role};

use super::{IdentityStore, RepositoryError};
use crate::models::Identity;

/// Repository for identity database operations.
pub struct IdentityRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> IdentityRepository<'a> {
    /// Create a new identity repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityStore for IdentityRepository<'_> {
    async fn find_by_email(&self, email: &Email) -> Result<Option<Identity>, RepositoryError> {
        let identity = sqlx::query_as::<_, Identity>(
            r"
            SELECT id, email, name, role, created_at
            FROM identity
            WHERE email = $1
            ",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(identity)
    }

    async fn insert(
        &self,
        email: &Email,
        name: Option<&str>,
    ) -> Result<Identity, RepositoryError> {
        let identity = sqlx::query_as::<_, Identity>(
            r"
            INSERT INTO identity (id, email, name, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, name, role, created_at
            ",
        )
        .bind(IdentityId::generate())
        .bind(email)
        .bind(name)
        .bind(Role::Customer)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("email already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        Ok(identity)
    }

    async fn list(&self) -> Result<Vec<Identity>, RepositoryError> {
        let identities = sqlx::query_as::<_, Identity>(
            r"
            SELECT id, email, name, role, created_at
            FROM identity
            ORDER BY created_at ASC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(identities)
    }

    async fn set_role(&self, id: IdentityId, role: Role) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE identity
            SET role = $1
            WHERE id = $2
            ",
        )
        .bind(role)
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn count_by_role(&self, role: Role) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            r"
            SELECT COUNT(*)
            FROM identity
            WHERE role = $1
            ",
        )
        .bind(role)
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }
}
