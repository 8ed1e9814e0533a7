//! Payment ledger repository.
//!
//! The `payment` table is append-only: there is no update or delete here,
//! and none should ever be added. A written payment record stands even if
//! later steps of a checkout fail.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;

use bistro_core::{Email, PaymentId};

use super::{PaymentStore, RepositoryError};
use crate::models::PaymentRecord;

/// Repository for the payment ledger.
pub struct PaymentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PaymentRepository<'a> {
    /// Create a new payment repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentStore for PaymentRepository<'_> {
    async fn insert(&self, record: &PaymentRecord) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO payment
                (id, payer_email, amount, external_transaction_id,
                 item_ids, cart_entry_ids, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(record.id)
        .bind(&record.payer_email)
        .bind(record.amount)
        .bind(&record.external_transaction_id)
        .bind(&record.item_ids)
        .bind(&record.cart_entry_ids)
        .bind(record.created_at)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    async fn list(&self) -> Result<Vec<PaymentRecord>, RepositoryError> {
        let records = sqlx::query_as::<_, PaymentRecord>(
            r"
            SELECT id, payer_email, amount, external_transaction_id,
                   item_ids, cart_entry_ids, created_at
            FROM payment
            ORDER BY created_at ASC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(records)
    }

    async fn list_for_payer(&self, payer: &Email) -> Result<Vec<PaymentRecord>, RepositoryError> {
        let records = sqlx::query_as::<_, PaymentRecord>(
            r"
            SELECT id, payer_email, amount, external_transaction_id,
                   item_ids, cart_entry_ids, created_at
            FROM payment
            WHERE payer_email = $1
            ORDER BY created_at DESC
            ",
        )
        .bind(payer)
        .fetch_all(self.pool)
        .await?;

        Ok(records)
    }

    async fn find(&self, id: PaymentId) -> Result<Option<PaymentRecord>, RepositoryError> {
        let record = sqlx::query_as::<_, PaymentRecord>(
            r"
            SELECT id, payer_email, amount, external_transaction_id,
                   item_ids, cart_entry_ids, created_at
            FROM payment
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(record)
    }

    async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            r"
            SELECT COUNT(*)
            FROM payment
            ",
        )
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }

    async fn total_amount(&self) -> Result<Decimal, RepositoryError> {
        let total: Option<Decimal> = sqlx::query_scalar(
            r"
            SELECT SUM(amount)
            FROM payment
            ",
        )
        .fetch_one(self.pool)
        .await?;

        Ok(total.unwrap_or_default())
    }
}
