//! Catalog repository.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;

use bistro_core::CatalogItemId;

use super::{CatalogStore, RepositoryError};
use crate::models::CatalogItem;

/// Fields for a catalog item about to be created.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCatalogItem {
    pub name: String,
    pub category: String,
    pub price: Decimal,
    pub description: Option<String>,
}

/// Repository for catalog database operations.
pub struct CatalogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CatalogRepository<'a> {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogStore for CatalogRepository<'_> {
    async fn list(&self) -> Result<Vec<CatalogItem>, RepositoryError> {
        let items = sqlx::query_as::<_, CatalogItem>(
            r"
            SELECT id, name, category, price, description, created_at
            FROM catalog_item
            ORDER BY created_at ASC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(items)
    }

    async fn insert(&self, item: &NewCatalogItem) -> Result<CatalogItem, RepositoryError> {
        let item = sqlx::query_as::<_, CatalogItem>(
            r"
            INSERT INTO catalog_item (id, name, category, price, description)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, category, price, description, created_at
            ",
        )
        .bind(CatalogItemId::generate())
        .bind(&item.name)
        .bind(&item.category)
        .bind(item.price)
        .bind(item.description.as_deref())
        .fetch_one(self.pool)
        .await?;

        Ok(item)
    }

    async fn delete(&self, id: CatalogItemId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM catalog_item
            WHERE id = $1
            ",
        )
        .bind(id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            r"
            SELECT COUNT(*)
            FROM catalog_item
            ",
        )
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }
}
