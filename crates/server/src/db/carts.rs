//! Cart repository.

use async_trait::async_trait;
use sqlx::PgPool;

use bistro_core::{CartEntryId, CatalogItemId, Email};

use super::{CartStore, RepositoryError};
use crate::models::CartEntry;

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CartStore for CartRepository<'_> {
    async fn list_for_owner(&self, owner: &Email) -> Result<Vec<CartEntry>, RepositoryError> {
        let entries = sqlx::query_as::<_, CartEntry>(
            r"
            SELECT id, owner_email, item_id, added_at
            FROM cart_entry
            WHERE owner_email = $1
            ORDER BY added_at ASC
            ",
        )
        .bind(owner)
        .fetch_all(self.pool)
        .await?;

        Ok(entries)
    }

    async fn insert(
        &self,
        owner: &Email,
        item_id: CatalogItemId,
    ) -> Result<CartEntry, RepositoryError> {
        let entry = sqlx::query_as::<_, CartEntry>(
            r"
            INSERT INTO cart_entry (id, owner_email, item_id)
            VALUES ($1, $2, $3)
            RETURNING id, owner_email, item_id, added_at
            ",
        )
        .bind(CartEntryId::generate())
        .bind(owner)
        .bind(item_id)
        .fetch_one(self.pool)
        .await?;

        Ok(entry)
    }

    async fn delete(&self, id: CartEntryId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM cart_entry
            WHERE id = $1
            ",
        )
        .bind(id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_many(&self, ids: &[CartEntryId]) -> Result<u64, RepositoryError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let raw: Vec<uuid::Uuid> = ids.iter().map(|id| id.as_uuid()).collect();
        let result = sqlx::query(
            r"
            DELETE FROM cart_entry
            WHERE id = ANY($1)
            ",
        )
        .bind(&raw)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
