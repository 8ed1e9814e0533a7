//! In-memory store implementations for unit tests.
//!
//! These back the same traits as the sqlx repositories so the settlement
//! coordinator, analytics aggregator, and guards can be exercised without a
//! database. Failure toggles simulate upstream outages.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;

use bistro_core::{CartEntryId, CatalogItemId, Email, IdentityId, PaymentId, Role};

use super::{
    CartStore, CatalogStore, IdentityStore, NewCatalogItem, PaymentStore, RepositoryError,
};
use crate::models::{CartEntry, CatalogItem, Identity, PaymentRecord};

fn outage() -> RepositoryError {
    RepositoryError::Database(sqlx::Error::PoolClosed)
}

/// In-memory identity store. Counts lookups so tests can assert that guard
/// checks stay side-effect-free.
#[derive(Default)]
pub struct MemoryIdentityStore {
    identities: Mutex<Vec<Identity>>,
    pub lookups: AtomicUsize,
}

impl MemoryIdentityStore {
    #[must_use]
    pub fn with(identities: Vec<Identity>) -> Self {
        Self {
            identities: Mutex::new(identities),
            lookups: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn find_by_email(&self, email: &Email) -> Result<Option<Identity>, RepositoryError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let identities = self.identities.lock().expect("lock poisoned");
        Ok(identities.iter().find(|i| &i.email == email).cloned())
    }

    async fn insert(
        &self,
        email: &Email,
        name: Option<&str>,
    ) -> Result<Identity, RepositoryError> {
        let mut identities = self.identities.lock().expect("lock poisoned");
        if identities.iter().any(|i| &i.email == email) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }
        let identity = Identity {
            id: IdentityId::generate(),
            email: email.clone(),
            name: name.map(ToOwned::to_owned),
            role: Role::Customer,
            created_at: Utc::now(),
        };
        identities.push(identity.clone());
        Ok(identity)
    }

    async fn list(&self) -> Result<Vec<Identity>, RepositoryError> {
        Ok(self.identities.lock().expect("lock poisoned").clone())
    }

    async fn set_role(&self, id: IdentityId, role: Role) -> Result<(), RepositoryError> {
        let mut identities = self.identities.lock().expect("lock poisoned");
        match identities.iter_mut().find(|i| i.id == id) {
            Some(identity) => {
                identity.role = role;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    async fn count_by_role(&self, role: Role) -> Result<i64, RepositoryError> {
        let identities = self.identities.lock().expect("lock poisoned");
        Ok(i64::try_from(identities.iter().filter(|i| i.role == role).count()).unwrap_or(i64::MAX))
    }
}

/// In-memory catalog store.
#[derive(Default)]
pub struct MemoryCatalogStore {
    items: Mutex<Vec<CatalogItem>>,
}

impl MemoryCatalogStore {
    #[must_use]
    pub fn with(items: Vec<CatalogItem>) -> Self {
        Self {
            items: Mutex::new(items),
        }
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn list(&self) -> Result<Vec<CatalogItem>, RepositoryError> {
        Ok(self.items.lock().expect("lock poisoned").clone())
    }

    async fn insert(&self, item: &NewCatalogItem) -> Result<CatalogItem, RepositoryError> {
        let created = CatalogItem {
            id: CatalogItemId::generate(),
            name: item.name.clone(),
            category: item.category.clone(),
            price: item.price,
            description: item.description.clone(),
            created_at: Utc::now(),
        };
        self.items.lock().expect("lock poisoned").push(created.clone());
        Ok(created)
    }

    async fn delete(&self, id: CatalogItemId) -> Result<bool, RepositoryError> {
        let mut items = self.items.lock().expect("lock poisoned");
        let before = items.len();
        items.retain(|i| i.id != id);
        Ok(items.len() < before)
    }

    async fn count(&self) -> Result<i64, RepositoryError> {
        Ok(i64::try_from(self.items.lock().expect("lock poisoned").len()).unwrap_or(i64::MAX))
    }
}

/// In-memory cart store with a deletion-failure toggle.
#[derive(Default)]
pub struct MemoryCartStore {
    entries: Mutex<Vec<CartEntry>>,
    pub fail_deletes: AtomicBool,
    pub delete_calls: AtomicUsize,
}

impl MemoryCartStore {
    #[must_use]
    pub fn with(entries: Vec<CartEntry>) -> Self {
        Self {
            entries: Mutex::new(entries),
            fail_deletes: AtomicBool::new(false),
            delete_calls: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.entries.lock().expect("lock poisoned").len()
    }
}

#[async_trait]
impl CartStore for MemoryCartStore {
    async fn list_for_owner(&self, owner: &Email) -> Result<Vec<CartEntry>, RepositoryError> {
        let entries = self.entries.lock().expect("lock poisoned");
        Ok(entries
            .iter()
            .filter(|e| &e.owner_email == owner)
            .cloned()
            .collect())
    }

    async fn insert(
        &self,
        owner: &Email,
        item_id: CatalogItemId,
    ) -> Result<CartEntry, RepositoryError> {
        let entry = CartEntry {
            id: CartEntryId::generate(),
            owner_email: owner.clone(),
            item_id,
            added_at: Utc::now(),
        };
        self.entries.lock().expect("lock poisoned").push(entry.clone());
        Ok(entry)
    }

    async fn delete(&self, id: CartEntryId) -> Result<bool, RepositoryError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(outage());
        }
        let mut entries = self.entries.lock().expect("lock poisoned");
        let before = entries.len();
        entries.retain(|e| e.id != id);
        Ok(entries.len() < before)
    }

    async fn delete_many(&self, ids: &[CartEntryId]) -> Result<u64, RepositoryError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(outage());
        }
        let mut entries = self.entries.lock().expect("lock poisoned");
        let before = entries.len();
        entries.retain(|e| !ids.contains(&e.id));
        Ok((before - entries.len()) as u64)
    }
}

/// In-memory payment ledger with an insert-failure toggle.
#[derive(Default)]
pub struct MemoryPaymentStore {
    records: Mutex<Vec<PaymentRecord>>,
    pub fail_inserts: AtomicBool,
}

impl MemoryPaymentStore {
    #[must_use]
    pub fn with(records: Vec<PaymentRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            fail_inserts: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn stored(&self) -> Vec<PaymentRecord> {
        self.records.lock().expect("lock poisoned").clone()
    }
}

#[async_trait]
impl PaymentStore for MemoryPaymentStore {
    async fn insert(&self, record: &PaymentRecord) -> Result<(), RepositoryError> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(outage());
        }
        self.records.lock().expect("lock poisoned").push(record.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<PaymentRecord>, RepositoryError> {
        Ok(self.records.lock().expect("lock poisoned").clone())
    }

    async fn list_for_payer(&self, payer: &Email) -> Result<Vec<PaymentRecord>, RepositoryError> {
        let records = self.records.lock().expect("lock poisoned");
        Ok(records
            .iter()
            .filter(|r| &r.payer_email == payer)
            .cloned()
            .collect())
    }

    async fn find(&self, id: PaymentId) -> Result<Option<PaymentRecord>, RepositoryError> {
        let records = self.records.lock().expect("lock poisoned");
        Ok(records.iter().find(|r| r.id == id).cloned())
    }

    async fn count(&self) -> Result<i64, RepositoryError> {
        Ok(i64::try_from(self.records.lock().expect("lock poisoned").len()).unwrap_or(i64::MAX))
    }

    async fn total_amount(&self) -> Result<Decimal, RepositoryError> {
        let records = self.records.lock().expect("lock poisoned");
        Ok(records.iter().map(|r| r.amount).sum())
    }
}
