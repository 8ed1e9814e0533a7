//! Persistent domain records.
//!
//! One struct per collection. Request/response DTOs live next to their
//! handlers in [`crate::routes`]; these are the shapes the repositories
//! read and write.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bistro_core::{CartEntryId, CatalogItemId, Email, IdentityId, PaymentId, ReviewId, Role};

/// A registered user record carrying an access role.
///
/// Created on first self-registration; mutated only by role promotion;
/// never deleted in normal operation.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Identity {
    pub id: IdentityId,
    pub email: Email,
    pub name: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl Identity {
    /// Whether this identity holds the elevated role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// A purchasable menu entry with a category and price.
///
/// Owned by catalog management; read-only from the settlement and
/// analytics paths.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CatalogItem {
    pub id: CatalogItemId,
    pub name: String,
    pub category: String,
    pub price: Decimal,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A pending, uncommitted selection of a catalog item by a customer.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CartEntry {
    pub id: CartEntryId,
    pub owner_email: Email,
    pub item_id: CatalogItemId,
    pub added_at: DateTime<Utc>,
}

/// The durable ledger entry representing a completed checkout.
///
/// Append-only: never mutated or deleted after creation. Once written it is
/// the source of truth for "this checkout happened" even if the follow-up
/// cart cleanup fails.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PaymentRecord {
    pub id: PaymentId,
    pub payer_email: Email,
    pub amount: Decimal,
    pub external_transaction_id: String,
    /// Catalog items purchased in this checkout.
    pub item_ids: Vec<CatalogItemId>,
    /// Cart rows this checkout settled.
    pub cart_entry_ids: Vec<CartEntryId>,
    pub created_at: DateTime<Utc>,
}

/// A customer review. Plain CRUD, no invariants.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Review {
    pub id: ReviewId,
    pub reviewer_name: String,
    pub details: String,
    pub rating: i16,
    pub created_at: DateTime<Utc>,
}
