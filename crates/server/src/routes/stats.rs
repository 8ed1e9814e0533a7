//! Admin analytics endpoints. Computed fresh on every request.

use axum::{Json, Router, extract::State, routing::get};

use bistro_core::Role;

use crate::auth::{Authenticated, require_role};
use crate::db::{CatalogRepository, IdentityRepository, PaymentRepository};
use crate::error::Result;
use crate::services::analytics::{AnalyticsAggregator, CategorySales, SnapshotMetrics};
use crate::state::AppState;

async fn summary(
    State(state): State<AppState>,
    Authenticated(claims): Authenticated,
) -> Result<Json<SnapshotMetrics>> {
    let identities = IdentityRepository::new(state.pool());
    require_role(&identities, &claims, Role::Admin).await?;

    let catalog = CatalogRepository::new(state.pool());
    let payments = PaymentRepository::new(state.pool());
    let aggregator = AnalyticsAggregator::new(&catalog, &payments, &identities);

    Ok(Json(aggregator.summary().await?))
}

async fn by_category(
    State(state): State<AppState>,
    Authenticated(claims): Authenticated,
) -> Result<Json<Vec<CategorySales>>> {
    let identities = IdentityRepository::new(state.pool());
    require_role(&identities, &claims, Role::Admin).await?;

    let catalog = CatalogRepository::new(state.pool());
    let payments = PaymentRepository::new(state.pool());
    let aggregator = AnalyticsAggregator::new(&catalog, &payments, &identities);

    Ok(Json(aggregator.category_breakdown().await?))
}

pub(crate) fn routes() -> Router<AppState> {
    Router::new()
        .route("/stats/summary", get(summary))
        .route("/stats/by-category", get(by_category))
}
