//! Shared domain types.

pub mod email;
pub mod id;
pub mod role;

pub use email::{Email, EmailError};
pub use id::{CartEntryId, CatalogItemId, IdentityId, PaymentId, ReviewId};
pub use role::Role;
