//! Database access for the bistro backend.
//!
//! # Tables
//!
//! - `identity` - registered users and their roles
//! - `catalog_item` - the menu
//! - `cart_entry` - pending selections, keyed by owner email
//! - `payment` - append-only settlement ledger
//! - `review` - customer reviews
//!
//! # Store traits
//!
//! Each collection is fronted by a store trait so the settlement and
//! analytics services receive an injected dependency rather than a shared
//! connection handle. The sqlx repositories in this module are the
//! production implementations; tests inject in-memory fakes.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and are not run
//! automatically on startup.

use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use bistro_core::{CartEntryId, CatalogItemId, Email, IdentityId, PaymentId, Role};

use crate::models::{CartEntry, CatalogItem, Identity, PaymentRecord};

pub mod carts;
pub mod catalog;
pub mod identities;
#[cfg(test)]
pub mod memory;
pub mod payments;
pub mod reviews;

pub use carts::CartRepository;
pub use catalog::{CatalogRepository, NewCatalogItem};
pub use identities::IdentityRepository;
pub use payments::PaymentRepository;
pub use reviews::ReviewRepository;

/// Errors from repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Keyed collection of identity records, queried by email.
#[async_trait]
pub trait IdentityStore {
    async fn find_by_email(&self, email: &Email) -> Result<Option<Identity>, RepositoryError>;
    async fn insert(&self, email: &Email, name: Option<&str>)
    -> Result<Identity, RepositoryError>;
    async fn list(&self) -> Result<Vec<Identity>, RepositoryError>;
    /// Role promotion. The only mutation an identity record receives.
    async fn set_role(&self, id: IdentityId, role: Role) -> Result<(), RepositoryError>;
    async fn count_by_role(&self, role: Role) -> Result<i64, RepositoryError>;
}

/// Keyed collection of catalog items.
#[async_trait]
pub trait CatalogStore {
    async fn list(&self) -> Result<Vec<CatalogItem>, RepositoryError>;
    async fn insert(&self, item: &NewCatalogItem) -> Result<CatalogItem, RepositoryError>;
    /// Returns `true` if the item existed and was deleted.
    async fn delete(&self, id: CatalogItemId) -> Result<bool, RepositoryError>;
    async fn count(&self) -> Result<i64, RepositoryError>;
}

/// Keyed collection of cart entries, owned by a customer email.
#[async_trait]
pub trait CartStore {
    async fn list_for_owner(&self, owner: &Email) -> Result<Vec<CartEntry>, RepositoryError>;
    async fn insert(
        &self,
        owner: &Email,
        item_id: CatalogItemId,
    ) -> Result<CartEntry, RepositoryError>;
    /// Returns `true` if the entry existed and was deleted.
    async fn delete(&self, id: CartEntryId) -> Result<bool, RepositoryError>;
    /// Bulk deletion used by settlement. Returns the number of rows that
    /// actually went away, which may be fewer than requested.
    async fn delete_many(&self, ids: &[CartEntryId]) -> Result<u64, RepositoryError>;
}

/// Append-only collection of payment records.
#[async_trait]
pub trait PaymentStore {
    async fn insert(&self, record: &PaymentRecord) -> Result<(), RepositoryError>;
    async fn list(&self) -> Result<Vec<PaymentRecord>, RepositoryError>;
    async fn list_for_payer(&self, payer: &Email) -> Result<Vec<PaymentRecord>, RepositoryError>;
    async fn find(&self, id: PaymentId) -> Result<Option<PaymentRecord>, RepositoryError>;
    async fn count(&self) -> Result<i64, RepositoryError>;
    /// Sum of `amount` across all records. Zero when the ledger is empty.
    async fn total_amount(&self) -> Result<Decimal, RepositoryError>;
}
