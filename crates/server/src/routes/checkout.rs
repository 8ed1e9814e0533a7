//! Checkout settlement endpoint.

use axum::{Json, Router, extract::State, routing::post};
use rust_decimal::Decimal;
use serde::Deserialize;

use bistro_core::{CartEntryId, CatalogItemId};

use crate::auth::{Authenticated, claimed_email};
use crate::db::{CartRepository, PaymentRepository};
use crate::error::{AppError, Result};
use crate::services::settlement::{SettlementCoordinator, SettlementOutcome, SettlementRequest};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckoutRequest {
    amount: Decimal,
    catalog_item_refs: Vec<CatalogItemId>,
    cart_entry_refs: Vec<CartEntryId>,
    external_transaction_id: String,
}

/// Settle a checkout for the signed-in customer. The payer is taken from
/// the token, never from the body.
async fn checkout(
    State(state): State<AppState>,
    Authenticated(claims): Authenticated,
    Json(body): Json<CheckoutRequest>,
) -> Result<Json<SettlementOutcome>> {
    let payer = claimed_email(&claims)?;

    if body.amount < Decimal::ZERO {
        return Err(AppError::Validation(
            "amount must be non-negative".to_owned(),
        ));
    }
    if body.external_transaction_id.trim().is_empty() {
        return Err(AppError::Validation(
            "external transaction id must not be empty".to_owned(),
        ));
    }

    let payments = PaymentRepository::new(state.pool());
    let carts = CartRepository::new(state.pool());
    let coordinator = SettlementCoordinator::new(&payments, &carts, state.notifier());

    let outcome = coordinator
        .settle(SettlementRequest {
            payer,
            amount: body.amount,
            item_ids: body.catalog_item_refs,
            cart_entry_ids: body.cart_entry_refs,
            external_transaction_id: body.external_transaction_id,
        })
        .await?;

    Ok(Json(outcome))
}

pub(crate) fn routes() -> Router<AppState> {
    Router::new().route("/checkout", post(checkout))
}
