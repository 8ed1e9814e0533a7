//! On-demand business metrics.
//!
//! Both reports are computed fresh from the stores on every call; nothing
//! here caches or writes. The category breakdown joins payment item
//! references against the current catalog in memory, so items deleted since
//! a payment was recorded silently drop out of the report.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;

use bistro_core::{CatalogItemId, Role};

use crate::db::{CatalogStore, IdentityStore, PaymentStore, RepositoryError};

/// Headline counters for the admin dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotMetrics {
    pub catalog_item_count: i64,
    pub payment_count: i64,
    pub customer_count: i64,
    pub total_revenue: Decimal,
}

/// Sales rolled up by catalog category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySales {
    pub category: String,
    pub quantity: u64,
    pub revenue: Decimal,
}

/// Computes reports over the catalog, payment, and identity stores.
pub struct AnalyticsAggregator<'a, Cat, Pay, Id> {
    catalog: &'a Cat,
    payments: &'a Pay,
    identities: &'a Id,
}

impl<'a, Cat, Pay, Id> AnalyticsAggregator<'a, Cat, Pay, Id>
where
    Cat: CatalogStore + Sync,
    Pay: PaymentStore + Sync,
    Id: IdentityStore + Sync,
{
    pub fn new(catalog: &'a Cat, payments: &'a Pay, identities: &'a Id) -> Self {
        Self {
            catalog,
            payments,
            identities,
        }
    }

    /// Headline counters: catalog size, settled payments, customers, and
    /// lifetime revenue.
    ///
    /// # Errors
    ///
    /// Returns the first store error encountered.
    pub async fn summary(&self) -> Result<SnapshotMetrics, RepositoryError> {
        Ok(SnapshotMetrics {
            catalog_item_count: self.catalog.count().await?,
            payment_count: self.payments.count().await?,
            customer_count: self.identities.count_by_role(Role::Customer).await?,
            total_revenue: self.payments.total_amount().await?,
        })
    }

    /// Per-category sales across all recorded payments.
    ///
    /// Each item reference in a payment counts once toward its category's
    /// quantity and contributes the item's current price to its revenue.
    /// References to items no longer in the catalog are skipped. Categories
    /// appear in the order their first sold item resolves; categories with
    /// no resolved sales are omitted entirely.
    ///
    /// # Errors
    ///
    /// Returns the first store error encountered.
    pub async fn category_breakdown(&self) -> Result<Vec<CategorySales>, RepositoryError> {
        let catalog = self.catalog.list().await?;
        let payments = self.payments.list().await?;

        let by_id: HashMap<CatalogItemId, (&str, Decimal)> = catalog
            .iter()
            .map(|item| (item.id, (item.category.as_str(), item.price)))
            .collect();

        let mut rows: Vec<CategorySales> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for payment in &payments {
            for item_id in &payment.item_ids {
                let Some(&(category, price)) = by_id.get(item_id) else {
                    continue;
                };

                let position = *index.entry(category.to_owned()).or_insert_with(|| {
                    rows.push(CategorySales {
                        category: category.to_owned(),
                        quantity: 0,
                        revenue: Decimal::ZERO,
                    });
                    rows.len() - 1
                });

                if let Some(row) = rows.get_mut(position) {
                    row.quantity += 1;
                    row.revenue += price;
                }
            }
        }

        for row in &mut rows {
            row.revenue = row.revenue.round_dp(2);
        }

        Ok(rows)
    }
}
