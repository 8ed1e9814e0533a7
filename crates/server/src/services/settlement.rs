//! Checkout settlement.
//!
//! Settlement runs three steps in strict order: persist the payment record,
//! clear the settled cart rows, hand off the confirmation. The payment
//! insert is the only step that can abort the checkout. A payment once
//! written is never rolled back; a failed cart cleanup is reported back to
//! the caller in the settlement outcome instead.

use rust_decimal::Decimal;
use serde::Serialize;

use bistro_core::{CartEntryId, CatalogItemId, Email, PaymentId};

use crate::db::{CartStore, PaymentStore, RepositoryError};
use crate::models::PaymentRecord;
use crate::services::notifier::{NotificationQueue, PaymentConfirmation};

/// A validated checkout ready to settle.
#[derive(Debug, Clone)]
pub struct SettlementRequest {
    pub payer: Email,
    pub amount: Decimal,
    pub item_ids: Vec<CatalogItemId>,
    pub cart_entry_ids: Vec<CartEntryId>,
    pub external_transaction_id: String,
}

/// What happened to the cart rows this settlement was meant to clear.
///
/// Serialized untagged: success is `{"deletedCount": n}`, failure is
/// `{"error": "..."}`. Either way the payment itself stands.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CartDeletionOutcome {
    #[serde(rename_all = "camelCase")]
    Cleared { deleted_count: u64 },
    #[serde(rename_all = "camelCase")]
    Failed { error: String },
}

/// Result of a completed settlement.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementOutcome {
    pub payment_record_id: PaymentId,
    pub cart_deletion_outcome: CartDeletionOutcome,
}

/// Runs checkout settlements against injected stores.
pub struct SettlementCoordinator<'a, P, C> {
    payments: &'a P,
    carts: &'a C,
    notifications: &'a NotificationQueue,
}

impl<'a, P, C> SettlementCoordinator<'a, P, C>
where
    P: PaymentStore + Sync,
    C: CartStore + Sync,
{
    pub fn new(payments: &'a P, carts: &'a C, notifications: &'a NotificationQueue) -> Self {
        Self {
            payments,
            carts,
            notifications,
        }
    }

    /// Settle a checkout.
    ///
    /// The payment record is written first; if that fails the checkout
    /// aborts and nothing else happens. Cart cleanup and confirmation
    /// delivery come after the ledger write and cannot undo it.
    ///
    /// # Errors
    ///
    /// Returns the repository error only when the payment insert fails.
    pub async fn settle(
        &self,
        request: SettlementRequest,
    ) -> Result<SettlementOutcome, RepositoryError> {
        let record = PaymentRecord {
            id: PaymentId::generate(),
            payer_email: request.payer.clone(),
            amount: request.amount,
            external_transaction_id: request.external_transaction_id.clone(),
            item_ids: request.item_ids,
            cart_entry_ids: request.cart_entry_ids,
            created_at: chrono::Utc::now(),
        };

        self.payments.insert(&record).await?;

        let cart_deletion_outcome = match self.carts.delete_many(&record.cart_entry_ids).await {
            Ok(deleted_count) => {
                if deleted_count != record.cart_entry_ids.len() as u64 {
                    tracing::warn!(
                        payment_id = %record.id,
                        requested = record.cart_entry_ids.len(),
                        deleted = deleted_count,
                        "settlement cleared fewer cart rows than referenced"
                    );
                }
                CartDeletionOutcome::Cleared { deleted_count }
            }
            Err(e) => {
                // The payment stands; the stale cart rows are the customer's
                // to see and ours to log.
                tracing::warn!(
                    payment_id = %record.id,
                    error = %e,
                    "cart cleanup failed after payment was recorded"
                );
                CartDeletionOutcome::Failed {
                    error: e.to_string(),
                }
            }
        };

        self.notifications.dispatch(PaymentConfirmation {
            recipient: request.payer,
            external_transaction_id: request.external_transaction_id,
            amount: request.amount,
        });

        Ok(SettlementOutcome {
            payment_record_id: record.id,
            cart_deletion_outcome,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use chrono::Utc;

    use super::*;
    use crate::db::memory::{MemoryCartStore, MemoryPaymentStore};
    use crate::models::CartEntry;
    use crate::services::notifier::ConfirmationSender;

    struct Recording {
        sent: std::sync::Arc<std::sync::Mutex<Vec<PaymentConfirmation>>>,
    }

    #[async_trait::async_trait]
    impl ConfirmationSender for Recording {
        async fn send(
            &self,
            confirmation: &PaymentConfirmation,
        ) -> Result<(), crate::services::notifier::NotifierError> {
            self.sent.lock().unwrap().push(confirmation.clone());
            Ok(())
        }
    }

    fn recording_queue() -> (
        NotificationQueue,
        std::sync::Arc<std::sync::Mutex<Vec<PaymentConfirmation>>>,
    ) {
        let sent = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let queue = NotificationQueue::spawn(Recording {
            sent: std::sync::Arc::clone(&sent),
        });
        (queue, sent)
    }

    fn entry(owner: &str) -> CartEntry {
        CartEntry {
            id: CartEntryId::generate(),
            owner_email: Email::parse(owner).unwrap(),
            item_id: CatalogItemId::generate(),
            added_at: Utc::now(),
        }
    }

    fn request_for(entries: &[CartEntry]) -> SettlementRequest {
        SettlementRequest {
            payer: Email::parse("diner@example.com").unwrap(),
            amount: Decimal::new(2250, 2),
            item_ids: entries.iter().map(|e| e.item_id).collect(),
            cart_entry_ids: entries.iter().map(|e| e.id).collect(),
            external_transaction_id: "tx_abc123".to_owned(),
        }
    }

    #[tokio::test]
    async fn test_settle_writes_payment_and_clears_cart() {
        let entries = vec![entry("diner@example.com"), entry("diner@example.com")];
        let carts = MemoryCartStore::with(entries.clone());
        let payments = MemoryPaymentStore::default();
        let (queue, _sent) = recording_queue();

        let coordinator = SettlementCoordinator::new(&payments, &carts, &queue);
        let outcome = coordinator.settle(request_for(&entries)).await.unwrap();

        assert!(matches!(
            outcome.cart_deletion_outcome,
            CartDeletionOutcome::Cleared { deleted_count: 2 }
        ));
        assert_eq!(carts.remaining(), 0);

        let stored = payments.stored();
        assert_eq!(stored.len(), 1);
        let record = stored.first().unwrap();
        assert_eq!(record.id, outcome.payment_record_id);
        assert_eq!(record.amount, Decimal::new(2250, 2));
        assert_eq!(record.external_transaction_id, "tx_abc123");
        assert_eq!(record.cart_entry_ids, request_for(&entries).cart_entry_ids);
    }

    #[tokio::test]
    async fn test_payment_insert_failure_aborts_before_cart_cleanup() {
        let entries = vec![entry("diner@example.com")];
        let carts = MemoryCartStore::with(entries.clone());
        let payments = MemoryPaymentStore::default();
        payments.fail_inserts.store(true, Ordering::SeqCst);
        let (queue, sent) = recording_queue();

        let coordinator = SettlementCoordinator::new(&payments, &carts, &queue);
        let err = coordinator.settle(request_for(&entries)).await.unwrap_err();

        assert!(matches!(err, RepositoryError::Database(_)));
        // No cleanup attempt, no confirmation, cart intact.
        assert_eq!(carts.delete_calls.load(Ordering::SeqCst), 0);
        assert_eq!(carts.remaining(), 1);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cart_cleanup_failure_keeps_payment_and_reports() {
        let entries = vec![entry("diner@example.com")];
        let carts = MemoryCartStore::with(entries.clone());
        carts.fail_deletes.store(true, Ordering::SeqCst);
        let payments = MemoryPaymentStore::default();
        let (queue, sent) = recording_queue();

        let coordinator = SettlementCoordinator::new(&payments, &carts, &queue);
        let outcome = coordinator.settle(request_for(&entries)).await.unwrap();

        // Checkout still succeeds and the ledger entry stays.
        assert!(matches!(
            outcome.cart_deletion_outcome,
            CartDeletionOutcome::Failed { .. }
        ));
        assert_eq!(payments.stored().len(), 1);
        assert_eq!(carts.remaining(), 1);

        // Confirmation still goes out.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_settle_clears_referenced_entries_regardless_of_owner() {
        // Cart references are taken from the request as-is; entries that
        // belong to someone else are still cleared when referenced.
        let mine = entry("diner@example.com");
        let theirs = entry("other@example.com");
        let carts = MemoryCartStore::with(vec![mine.clone(), theirs.clone()]);
        let payments = MemoryPaymentStore::default();
        let (queue, _sent) = recording_queue();

        let mut request = request_for(&[mine]);
        request.cart_entry_ids.push(theirs.id);

        let coordinator = SettlementCoordinator::new(&payments, &carts, &queue);
        let outcome = coordinator.settle(request).await.unwrap();

        assert!(matches!(
            outcome.cart_deletion_outcome,
            CartDeletionOutcome::Cleared { deleted_count: 2 }
        ));
        assert_eq!(carts.remaining(), 0);
    }

    #[tokio::test]
    async fn test_partial_cart_match_reports_actual_count() {
        let present = entry("diner@example.com");
        let carts = MemoryCartStore::with(vec![present.clone()]);
        let payments = MemoryPaymentStore::default();
        let (queue, _sent) = recording_queue();

        let mut request = request_for(&[present]);
        // One of the referenced rows no longer exists.
        request.cart_entry_ids.push(CartEntryId::generate());

        let coordinator = SettlementCoordinator::new(&payments, &carts, &queue);
        let outcome = coordinator.settle(request).await.unwrap();

        assert!(matches!(
            outcome.cart_deletion_outcome,
            CartDeletionOutcome::Cleared { deleted_count: 1 }
        ));
    }

    #[tokio::test]
    async fn test_confirmation_carries_payer_and_transaction() {
        let entries = vec![entry("diner@example.com")];
        let carts = MemoryCartStore::with(entries.clone());
        let payments = MemoryPaymentStore::default();
        let (queue, sent) = recording_queue();

        let coordinator = SettlementCoordinator::new(&payments, &carts, &queue);
        coordinator.settle(request_for(&entries)).await.unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        let sent = sent.lock().unwrap();
        let confirmation = sent.first().unwrap();
        assert_eq!(confirmation.recipient.as_str(), "diner@example.com");
        assert_eq!(confirmation.external_transaction_id, "tx_abc123");
        assert_eq!(confirmation.amount, Decimal::new(2250, 2));
    }

    #[test]
    fn test_outcome_serializes_untagged() {
        let cleared = serde_json::to_value(CartDeletionOutcome::Cleared { deleted_count: 3 })
            .unwrap();
        assert_eq!(cleared, serde_json::json!({"deletedCount": 3}));

        let failed = serde_json::to_value(CartDeletionOutcome::Failed {
            error: "pool closed".to_owned(),
        })
        .unwrap();
        assert_eq!(failed, serde_json::json!({"error": "pool closed"}));
    }
}
