//! Cart entries.
//!
//! Listing a cart requires the caller to be its owner. Adding and removing
//! single entries is unguarded so the storefront can build a cart before
//! sign-in; the entries only gain value at settlement, which is guarded.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get},
};
use serde::{Deserialize, Serialize};

use bistro_core::{CartEntryId, CatalogItemId, Email};

use crate::auth::{Authenticated, require_owner};
use crate::db::{CartRepository, CartStore};
use crate::error::{AppError, Result};
use crate::models::CartEntry;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct CartQuery {
    email: Option<String>,
}

/// List the caller's cart. No email parameter means an empty cart, not an
/// error.
async fn list_cart(
    State(state): State<AppState>,
    Authenticated(claims): Authenticated,
    Query(query): Query<CartQuery>,
) -> Result<Json<Vec<CartEntry>>> {
    let Some(email) = query.email else {
        return Ok(Json(Vec::new()));
    };

    let email = Email::parse(&email)
        .map_err(|e| AppError::Validation(format!("invalid email: {e}")))?;
    require_owner(&claims, &email)?;

    let carts = CartRepository::new(state.pool());
    Ok(Json(carts.list_for_owner(&email).await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddCartEntry {
    email: String,
    item_id: CatalogItemId,
}

async fn add_entry(
    State(state): State<AppState>,
    Json(body): Json<AddCartEntry>,
) -> Result<Json<CartEntry>> {
    let email = Email::parse(&body.email)
        .map_err(|e| AppError::Validation(format!("invalid email: {e}")))?;

    let carts = CartRepository::new(state.pool());
    Ok(Json(carts.insert(&email, body.item_id).await?))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteResponse {
    deleted_count: u64,
}

async fn remove_entry(
    State(state): State<AppState>,
    Path(id): Path<CartEntryId>,
) -> Result<Json<DeleteResponse>> {
    let carts = CartRepository::new(state.pool());
    let deleted = carts.delete(id).await?;

    Ok(Json(DeleteResponse {
        deleted_count: u64::from(deleted),
    }))
}

pub(crate) fn routes() -> Router<AppState> {
    Router::new()
        .route("/carts", get(list_cart).post(add_entry))
        .route("/carts/{id}", delete(remove_entry))
}
