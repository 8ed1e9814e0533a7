//! Menu catalog management. Reads are public; writes are admin-only.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use rust_decimal::Decimal;
use serde::Serialize;

use bistro_core::{CatalogItemId, Role};

use crate::auth::{Authenticated, require_role};
use crate::db::{CatalogRepository, CatalogStore, IdentityRepository, NewCatalogItem};
use crate::error::{AppError, Result};
use crate::models::CatalogItem;
use crate::state::AppState;

async fn list_menu(State(state): State<AppState>) -> Result<Json<Vec<CatalogItem>>> {
    let catalog = CatalogRepository::new(state.pool());
    Ok(Json(catalog.list().await?))
}

async fn create_item(
    State(state): State<AppState>,
    Authenticated(claims): Authenticated,
    Json(body): Json<NewCatalogItem>,
) -> Result<Json<CatalogItem>> {
    let identities = IdentityRepository::new(state.pool());
    require_role(&identities, &claims, Role::Admin).await?;

    if body.name.trim().is_empty() {
        return Err(AppError::Validation("name must not be empty".to_owned()));
    }
    if body.price < Decimal::ZERO {
        return Err(AppError::Validation(
            "price must be non-negative".to_owned(),
        ));
    }

    let catalog = CatalogRepository::new(state.pool());
    Ok(Json(catalog.insert(&body).await?))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteResponse {
    deleted_count: u64,
}

async fn delete_item(
    State(state): State<AppState>,
    Authenticated(claims): Authenticated,
    Path(id): Path<CatalogItemId>,
) -> Result<Json<DeleteResponse>> {
    let identities = IdentityRepository::new(state.pool());
    require_role(&identities, &claims, Role::Admin).await?;

    let catalog = CatalogRepository::new(state.pool());
    let deleted = catalog.delete(id).await?;

    Ok(Json(DeleteResponse {
        deleted_count: u64::from(deleted),
    }))
}

pub(crate) fn routes() -> Router<AppState> {
    Router::new()
        .route("/menu", get(list_menu).post(create_item))
        .route("/menu/{id}", axum::routing::delete(delete_item))
}
